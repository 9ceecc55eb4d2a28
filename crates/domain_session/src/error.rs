//! Session domain errors

use core_kernel::{Money, SessionId};
use thiserror::Error;

/// Errors that can occur in the session domain
///
/// Validation failures never mutate ledger state; the failed call is
/// all-or-nothing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Amount was not strictly positive (or was negative for a final stack)
    #[error("Invalid amount: {0}")]
    InvalidAmount(Money),

    /// Operation referenced a player that is not in the session
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    /// Mutation attempted on a completed session
    #[error("Session is not active: {0}")]
    SessionNotActive(SessionId),
}
