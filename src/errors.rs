//! Error types shared by every command.

use thiserror::Error;

/// Errors surfaced by authentication, cart, and order operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown username or wrong password.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Registration attempted with a username that is already taken.
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    /// A required field is missing or an input value is out of range.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The referenced order, payment, or delivery does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The underlying store failed; the in-progress action is aborted.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
