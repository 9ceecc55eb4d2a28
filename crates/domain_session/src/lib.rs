//! Session Domain
//!
//! This crate models a single poker session: the transaction history of each
//! player at the table, the session lifecycle, and the chip-conservation
//! balance check.
//!
//! # Model
//!
//! - [`Transaction`]: one immutable monetary event (buy-in or cash-out)
//! - [`PlayerLedger`]: one player's ordered history plus cached totals and
//!   an optional declared final stack
//! - [`SessionLedger`]: the set of player ledgers, session lifecycle
//!   (`Draft -> Active -> Completed`), and derived aggregates
//!
//! Cached totals exist for display performance and are always recomputable
//! from history; [`PlayerLedger::validate_integrity`] detects drift and
//! [`PlayerLedger::recompute_totals`] repairs it. Balance is advisory: the
//! ledger reports it, callers decide what to do about it.

pub mod error;
pub mod ports;
pub mod player;
pub mod session;
pub mod transaction;

pub use error::SessionError;
pub use player::{PlayerLedger, PlayerSessionResult};
pub use ports::SessionStore;
pub use session::{SessionLedger, SessionStatus};
pub use transaction::{Transaction, TransactionKind};
