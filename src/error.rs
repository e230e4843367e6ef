use thiserror::Error;

use crate::registry::car::CarState;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Car with registration '{registration}' already exists")]
    DuplicateRegistration { registration: String },

    #[error("Car '{registration}' not found")]
    CarNotFound { registration: String },

    #[error("Car '{registration}' is already {state}")]
    InvalidTransition { registration: String, state: CarState },

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker error: {0}")]
    Worker(String),
}

/// Coarse outcome class a caller reacts to.
///
/// HTTP status mapping lives next to the router in `api.rs`
/// (`ErrorKind::status_code`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Conflict,
    NotFound,
    Internal,
}

impl FleetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FleetError::BadRequest(_) => ErrorKind::BadRequest,
            FleetError::DuplicateRegistration { .. } | FleetError::InvalidTransition { .. } => {
                ErrorKind::Conflict
            }
            FleetError::CarNotFound { .. } => ErrorKind::NotFound,
            FleetError::Config(_)
            | FleetError::Store(_)
            | FleetError::Io(_)
            | FleetError::Worker(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, FleetError>;
