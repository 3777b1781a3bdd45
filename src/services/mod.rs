pub mod catalog_service;
pub mod goal_service;
pub mod http;
pub mod match_service;
pub mod transport;
pub mod user_service;
