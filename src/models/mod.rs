pub mod activity;
pub mod actor_goal;
pub mod custom_data;
pub mod date;
pub mod goal;
pub mod match_actor;
pub mod match_round;
pub mod matches;
pub mod profile;
pub mod reward;
pub mod role;
pub mod search;
pub mod serde_helpers;
pub mod server_info;
pub mod user;
