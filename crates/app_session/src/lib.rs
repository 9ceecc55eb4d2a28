//! Application Layer
//!
//! [`SessionService`] is the caller-facing surface of the ledger subsystem.
//! UI, permission, and session-selection components call it; it owns the
//! current session ledger, dispatches mutations to it, and drives the two
//! persistence collaborators:
//!
//! - on every explicit save, the session document is persisted verbatim and
//!   each player's provisional profile snapshot is refreshed
//! - on session end, each player's profile is finalized exactly once, then
//!   the completed session is persisted
//!
//! The service holds `&mut self` across every mutating call, which is the
//! single-logical-writer model: saves are serialized by construction, and
//! the in-memory ledger stays authoritative across store failures so any
//! failed call can simply be retried.

pub mod error;
pub mod service;

pub use error::AppError;
pub use service::SessionService;
