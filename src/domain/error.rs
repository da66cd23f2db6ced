use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Bad credentials or a missing/invalid/expired token. The message
    /// stays generic so callers cannot tell "no such account" from
    /// "wrong password".
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// Authenticated, but not the owner of the record.
    #[error("Not authorized: {0}")]
    NotAuthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
