//! Per-player session ledger
//!
//! A `PlayerLedger` is exclusively owned by one [`SessionLedger`] for the
//! duration of the session. It keeps the ordered transaction history plus
//! cached buy-in/cash-out totals, and the optional final stack declared when
//! the player leaves the table.
//!
//! # Cached totals
//!
//! `total_buy_in` and `total_cash_out` are caches over `history`. Every
//! mutation keeps them in lockstep; [`PlayerLedger::validate_integrity`]
//! detects drift (e.g. a corrupted stored document) and
//! [`PlayerLedger::recompute_totals`] rebuilds them from history.
//!
//! # Final stack
//!
//! A declared final stack is the authoritative settlement figure and
//! supersedes ad-hoc cash-outs: declaring it zeroes the cash-out total and
//! drops the superseded cash-out records, so the two are never summed.
//! Later buy-ins raise the final stack (chips return to the table) and later
//! cash-outs lower it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use core_kernel::{Money, ProfileId, SessionId, TransactionId};

use crate::error::SessionError;
use crate::transaction::{Transaction, TransactionKind};

/// One player's running state within a single session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerLedger {
    player_name: String,
    profile_id: ProfileId,
    history: Vec<Transaction>,
    total_buy_in: Money,
    total_cash_out: Money,
    final_stack: Option<Money>,
    first_buy_in_time: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl PlayerLedger {
    /// Creates an empty ledger for a player
    pub fn new(player_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        let player_name = player_name.into();
        let profile_id = ProfileId::from_name(&player_name);
        Self {
            player_name,
            profile_id,
            history: Vec::new(),
            total_buy_in: Money::ZERO,
            total_cash_out: Money::ZERO,
            final_stack: None,
            first_buy_in_time: now,
            last_activity: now,
        }
    }

    /// Records a buy-in
    ///
    /// If a final stack has already been declared (the player had left and
    /// is buying back in), it is raised by the same amount: those chips are
    /// physically back on the table.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidAmount`] for non-positive amounts;
    /// the ledger is unchanged.
    pub fn add_buy_in(
        &mut self,
        session_id: SessionId,
        amount: Money,
        timestamp: DateTime<Utc>,
        note: Option<&str>,
    ) -> Result<TransactionId, SessionError> {
        let mut txn = Transaction::new(session_id, TransactionKind::BuyIn, amount, timestamp)?;
        if let Some(note) = note {
            txn = txn.with_note(note);
        }
        let id = txn.id();

        self.history.push(txn);
        self.total_buy_in += amount;
        if let Some(stack) = self.final_stack {
            self.final_stack = Some(stack + amount);
        }
        self.last_activity = timestamp;

        Ok(id)
    }

    /// Records a cash-out
    ///
    /// Deliberately does not check the amount against the current stack;
    /// whether enough chips are on the table is a caller-side policy so the
    /// ledger stays usable for corrective entries. A declared final stack is
    /// lowered by the same amount, symmetric to buy-in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidAmount`] for non-positive amounts;
    /// the ledger is unchanged.
    pub fn add_cash_out(
        &mut self,
        session_id: SessionId,
        amount: Money,
        timestamp: DateTime<Utc>,
        note: Option<&str>,
    ) -> Result<TransactionId, SessionError> {
        let mut txn = Transaction::new(session_id, TransactionKind::CashOut, amount, timestamp)?;
        if let Some(note) = note {
            txn = txn.with_note(note);
        }
        let id = txn.id();

        self.history.push(txn);
        self.total_cash_out += amount;
        if let Some(stack) = self.final_stack {
            self.final_stack = Some(stack - amount);
        }
        self.last_activity = timestamp;

        Ok(id)
    }

    /// Declares the player's final chip count
    ///
    /// The final stack supersedes accumulated cash-outs as the settlement
    /// figure: the cash-out total resets to zero and the superseded cash-out
    /// records are dropped from history, keeping cached and recomputed
    /// totals in agreement.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidAmount`] for negative amounts
    /// (zero is a legitimate busted stack).
    pub fn set_final_stack(
        &mut self,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if amount.is_negative() {
            return Err(SessionError::InvalidAmount(amount));
        }

        self.history.retain(|t| t.is_buy_in());
        self.total_cash_out = Money::ZERO;
        self.final_stack = Some(amount);
        self.last_activity = now;

        Ok(())
    }

    /// Removes a transaction by id, for corrections
    ///
    /// On success both totals are recomputed by summing the remaining
    /// history, never by subtracting the removed amount.
    ///
    /// Returns false if the id is not present.
    pub fn remove_transaction(&mut self, id: TransactionId) -> bool {
        let Some(position) = self.history.iter().position(|t| t.id() == id) else {
            return false;
        };

        self.history.remove(position);
        self.recompute_totals();
        true
    }

    /// Rebuilds cached totals from the transaction history
    ///
    /// This is the repair path for corrupted data: the history is the
    /// source of truth, the totals are a cache over it.
    pub fn recompute_totals(&mut self) {
        self.total_buy_in = self
            .history
            .iter()
            .filter(|t| t.is_buy_in())
            .map(|t| t.amount())
            .sum();
        self.total_cash_out = self
            .history
            .iter()
            .filter(|t| t.is_cash_out())
            .map(|t| t.amount())
            .sum();
    }

    /// Checks cached totals against totals recomputed from history
    ///
    /// Drift is logged and reported, never repaired silently; the operator
    /// decides when to run [`PlayerLedger::recompute_totals`].
    pub fn validate_integrity(&self) -> bool {
        let recomputed_buy_in: Money = self
            .history
            .iter()
            .filter(|t| t.is_buy_in())
            .map(|t| t.amount())
            .sum();
        let recomputed_cash_out: Money = self
            .history
            .iter()
            .filter(|t| t.is_cash_out())
            .map(|t| t.amount())
            .sum();

        let consistent = self.total_buy_in.approx_eq(recomputed_buy_in)
            && self.total_cash_out.approx_eq(recomputed_cash_out);

        if !consistent {
            warn!(
                player = %self.player_name,
                cached_buy_in = %self.total_buy_in,
                recomputed_buy_in = %recomputed_buy_in,
                cached_cash_out = %self.total_cash_out,
                recomputed_cash_out = %recomputed_cash_out,
                "cached totals drifted from transaction history"
            );
        }

        consistent
    }

    /// Chips currently in front of the player
    ///
    /// The declared final stack wins; otherwise buy-ins minus cash-outs.
    pub fn current_stack(&self) -> Money {
        self.final_stack
            .unwrap_or(self.total_buy_in - self.total_cash_out)
    }

    /// Profit for the session: total value returned minus investment
    pub fn profit(&self) -> Money {
        (self.current_stack() + self.total_cash_out) - self.total_buy_in
    }

    /// Settlement snapshot consumed by profile reconciliation
    ///
    /// `final_stack` defaults to the current stack when the player never
    /// declared one.
    pub fn session_result(&self) -> PlayerSessionResult {
        PlayerSessionResult {
            profile_id: self.profile_id.clone(),
            player_name: self.player_name.clone(),
            total_buy_ins: self.total_buy_in,
            total_cash_outs: self.total_cash_out,
            final_stack: self.final_stack.unwrap_or_else(|| self.current_stack()),
            transaction_count: self.history.len(),
        }
    }

    /// Display lines for the most recent activity, newest first
    pub fn recent_activity(&self) -> Vec<String> {
        let mut recent: Vec<&Transaction> = self.history.iter().collect();
        recent.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        recent.iter().take(2).map(|t| t.to_string()).collect()
    }

    /// Returns the player's display name
    pub fn name(&self) -> &str {
        &self.player_name
    }

    /// Returns the linked profile identifier
    pub fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }

    /// Returns the ordered transaction history
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    /// Returns the cached buy-in total
    pub fn total_buy_in(&self) -> Money {
        self.total_buy_in
    }

    /// Returns the cached cash-out total
    pub fn total_cash_out(&self) -> Money {
        self.total_cash_out
    }

    /// Returns the declared final stack, if any
    pub fn final_stack(&self) -> Option<Money> {
        self.final_stack
    }

    /// Returns when the player first sat down
    pub fn first_buy_in_time(&self) -> DateTime<Utc> {
        self.first_buy_in_time
    }

    /// Returns the time of the last recorded activity
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Returns the number of recorded transactions
    pub fn transaction_count(&self) -> usize {
        self.history.len()
    }
}

/// Settlement snapshot of one player's session, consumed by reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSessionResult {
    pub profile_id: ProfileId,
    pub player_name: String,
    pub total_buy_ins: Money,
    pub total_cash_outs: Money,
    pub final_stack: Money,
    pub transaction_count: usize,
}

impl PlayerSessionResult {
    /// Total chips returned to the player: mid-session cash-outs plus the
    /// final stack. This is the cash-out figure folded into lifetime stats.
    pub fn settled_cash_out(&self) -> Money {
        self.total_cash_outs + self.final_stack
    }

    /// Session profit
    pub fn profit(&self) -> Money {
        (self.final_stack + self.total_cash_outs) - self.total_buy_ins
    }
}
