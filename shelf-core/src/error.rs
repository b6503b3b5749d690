use thiserror::Error;

/// Errors reported by the collaborators of the sync core (catalog, ownership
/// source, state store).
///
/// The variants are error *kinds* rather than transport details: adapters map
/// their own failures onto them so the core can decide what is recoverable.
#[derive(Debug, Error)]
pub enum ShelfError {
    /// Nothing matched the request (no candidates, unknown id, no stored state).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote side answered with a malformed or unexpected payload.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The remote side could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Unexpected failure inside a collaborator.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A call was made before its required setup (e.g. an expired session).
    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    /// The caller aborted the operation.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShelfError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn failed_precondition(msg: impl Into<String>) -> Self {
        Self::FailedPrecondition(msg.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
