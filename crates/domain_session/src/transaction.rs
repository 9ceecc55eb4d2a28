//! Session transactions
//!
//! A transaction records one monetary event for one player. Records are
//! immutable once created; a correction removes the record outright and the
//! owning ledger recomputes its totals from what remains.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Money, SessionId, TransactionId};

use crate::error::SessionError;

/// Kind of monetary event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Chips brought into play
    BuyIn,
    /// Chips taken off the table mid-session
    CashOut,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::BuyIn => write!(f, "buy-in"),
            TransactionKind::CashOut => write!(f, "cash-out"),
        }
    }
}

/// One monetary event for one player in one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    session_id: SessionId,
    kind: TransactionKind,
    amount: Money,
    timestamp: DateTime<Utc>,
    note: Option<String>,
}

impl Transaction {
    /// Creates a new transaction
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidAmount`] if `amount` is not strictly
    /// positive.
    pub fn new(
        session_id: SessionId,
        kind: TransactionKind,
        amount: Money,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if !amount.is_positive() {
            return Err(SessionError::InvalidAmount(amount));
        }

        Ok(Self {
            id: TransactionId::new_v7(),
            session_id,
            kind,
            amount,
            timestamp,
            note: None,
        })
    }

    /// Attaches a free-text note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Returns the transaction identifier
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns the owning session
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Returns the kind of event
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Returns the amount
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Returns when the event happened
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the note, if any
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Returns true for buy-in events
    pub fn is_buy_in(&self) -> bool {
        self.kind == TransactionKind::BuyIn
    }

    /// Returns true for cash-out events
    pub fn is_cash_out(&self) -> bool {
        self.kind == TransactionKind::CashOut
    }
}

// Two records are the same transaction iff they carry the same id.
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Transaction {}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {}",
            self.kind,
            self.amount,
            self.timestamp.format("%H:%M")
        )
    }
}
