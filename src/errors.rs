// src/errors.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SgaError {
    #[error("Operation already in progress: {0}")]
    AlreadyInProgress(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Transport(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("{0}")]
    ServerRejected(String),

    #[error("Invalid response: {0}")]
    Parse(String),

    #[error("Local user is not authenticated")]
    NotAuthenticated,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Coarse buckets callers branch on; `Cancelled` counts as a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyInProgress,
    InvalidState,
    TransportError,
    ServerRejected,
    ParseError,
    NotAuthenticated,
    Configuration,
}

impl From<reqwest::Error> for SgaError {
    fn from(err: reqwest::Error) -> Self {
        SgaError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for SgaError {
    fn from(err: serde_json::Error) -> Self {
        SgaError::Parse(format!("JSON parsing error: {}", err))
    }
}

impl From<std::num::ParseIntError> for SgaError {
    fn from(err: std::num::ParseIntError) -> Self {
        SgaError::Configuration(format!("Integer parsing error: {}", err))
    }
}

// Helper conversion functions
impl SgaError {
    pub fn already_in_progress(key: impl Into<String>) -> Self {
        SgaError::AlreadyInProgress(key.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        SgaError::InvalidState(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        SgaError::Transport(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        SgaError::ServerRejected(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        SgaError::Parse(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        SgaError::Configuration(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SgaError::AlreadyInProgress(_) => ErrorKind::AlreadyInProgress,
            SgaError::InvalidState(_) => ErrorKind::InvalidState,
            SgaError::Transport(_) | SgaError::Cancelled => ErrorKind::TransportError,
            SgaError::ServerRejected(_) => ErrorKind::ServerRejected,
            SgaError::Parse(_) => ErrorKind::ParseError,
            SgaError::NotAuthenticated => ErrorKind::NotAuthenticated,
            SgaError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Human-readable text handed back to game code alongside the failure flag.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

pub type Result<T> = std::result::Result<T, SgaError>;
