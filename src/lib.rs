//! Client SDK for the social gamification backend: sessions, matches with
//! per-round scoring, goals, activities and roles.

pub mod config;
pub mod errors;
pub mod guard;
pub mod models;
pub mod services;
pub mod state;
pub mod sync;

pub use config::ClientConfig;
pub use errors::{ErrorKind, Result, SgaError};
pub use guard::{OperationGuard, OperationPermit};
pub use models::matches::Match;
pub use models::profile::Profile;
pub use services::match_service::MatchHandle;
pub use services::transport::{Form, Method, Transport, WebRequest};
pub use state::SgaClient;
pub use sync::{ScoreSummary, SyncReport};
