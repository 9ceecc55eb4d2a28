//! Profile Domain
//!
//! This crate owns a player's durable lifetime statistics and the logic that
//! folds completed sessions into them.
//!
//! # Exactly-once reconciliation
//!
//! Session data is synced to the remote store repeatedly while a session is
//! active, but each session may contribute to lifetime totals at most once.
//! The [`ProfileReconciler`] separates the two concerns:
//!
//! - [`ProfileReconciler::upsert_session_reference`] runs on every
//!   incremental save and only maintains a provisional per-session snapshot
//! - [`ProfileReconciler::finalize`] runs once at session end; a replay is
//!   caught by the profile's finalized-session record and becomes a no-op
//!
//! Every reconciler operation mutates a freshly loaded profile in memory and
//! issues a single durable write, so a failed write commits nothing and the
//! whole call can simply be retried.

pub mod ports;
pub mod profile;
pub mod reconciler;

pub use ports::ProfileStore;
pub use profile::{PlayerProfile, SessionSnapshot, SessionSummary, RECENT_SESSION_CAP};
pub use reconciler::{FinalizeOutcome, ProfileReconciler};
