use shelf_lib::SyncError;
use shelf_remote::RemoteError;
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The requested store has no ownership source yet
    #[error("Syncing from {0} is not supported")]
    Unsupported(String),
}

impl CliError {
    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Whether the user interrupted the command.
    pub(crate) fn is_cancelled(&self) -> bool {
        matches!(self, Self::Sync(SyncError::Cancelled))
    }
}
