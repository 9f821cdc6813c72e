use crate::dto::{
    RESPONSE_BAD_REQUEST, RESPONSE_CONFLICT, RESPONSE_INTERNAL_ERROR, RESPONSE_OK,
};
use sea_orm::DbErr;
use std::error::Error;
use std::fmt;

/// Engine failure taxonomy. Everything that rolls back a transaction
/// surfaces as one of these.
#[derive(Debug)]
pub enum EngineError {
    /// Rejected before any write: bad amount, malformed code, unknown account.
    Validation(String),
    /// Wrong-state transition or a lost optimistic-locking race.
    /// The caller must re-fetch before retrying.
    StateConflict(String),
    /// Inviter already at the direct-referral cap. Registration swallows this.
    Capacity(String),
    /// A uniqueness invariant would be broken.
    Integrity(String),
    Database(DbErr),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Validation(message) => write!(f, "{}", message),
            EngineError::StateConflict(message) => {
                write!(f, "{} Please refresh and try again.", message)
            }
            EngineError::Capacity(message) => write!(f, "{}", message),
            EngineError::Integrity(message) => write!(f, "{}", message),
            EngineError::Database(_) => {
                write!(f, "System error. Please contact administrator!")
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::Database(error) => Some(error),
            _ => None,
        }
    }
}

impl From<DbErr> for EngineError {
    fn from(error: DbErr) -> Self {
        EngineError::Database(error)
    }
}

impl EngineError {
    pub fn response_code(&self) -> u16 {
        match self {
            EngineError::Validation(_) => RESPONSE_BAD_REQUEST,
            EngineError::StateConflict(_) => RESPONSE_CONFLICT,
            EngineError::Capacity(_) => RESPONSE_OK,
            EngineError::Integrity(_) => RESPONSE_CONFLICT,
            EngineError::Database(_) => RESPONSE_INTERNAL_ERROR,
        }
    }
}
