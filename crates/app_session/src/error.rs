//! Application layer errors

use core_kernel::PortError;
use domain_session::SessionError;
use thiserror::Error;

/// Errors surfaced by the session service
#[derive(Debug, Error)]
pub enum AppError {
    /// An operation required a loaded session and none is
    #[error("No session is currently loaded")]
    NoCurrentSession,

    /// A ledger operation was rejected
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// A persistence collaborator failed
    ///
    /// The in-memory ledger is unchanged and authoritative; if the wrapped
    /// error is transient the whole call can be retried.
    #[error("Persistence error: {0}")]
    Store(#[from] PortError),
}

impl AppError {
    /// Returns true if retrying the failed call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Store(e) if e.is_transient())
    }
}
