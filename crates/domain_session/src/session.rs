//! Session ledger and lifecycle
//!
//! A session moves through `Draft -> Active -> Completed`. Drafts exist so a
//! session can be named and seeded with players before anything is persisted;
//! a draft is promoted to Active by the first explicit persist and only then
//! becomes discoverable. Completed is terminal: further mutation is rejected
//! with [`SessionError::SessionNotActive`].
//!
//! # Balance
//!
//! A session is balanced when total buy-ins equal total current stacks within
//! [`core_kernel::BALANCE_EPSILON`]. The check is advisory: it is surfaced to
//! the caller and never silently corrected, because an unbalanced reading
//! mid-session is normal (chips cashed out are no longer on the table).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, ProfileId, SessionId, TransactionId};

use crate::error::SessionError;
use crate::player::{PlayerLedger, PlayerSessionResult};

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Configured but never persisted; invisible to session lists
    Draft,
    /// In play and discoverable
    Active,
    /// Ended; terminal
    Completed,
}

/// A session's full state: player ledgers, lifecycle, and aggregates
///
/// # Invariants
///
/// - Player names are unique, case-insensitively
/// - `status == Completed` iff `end_time` is set
/// - Aggregates are always derived from per-player totals, never stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLedger {
    id: SessionId,
    name: String,
    hosted_by: String,
    status: SessionStatus,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    players: Vec<PlayerLedger>,
}

impl SessionLedger {
    /// Creates a new draft session
    ///
    /// The draft is not discoverable until promoted by the first persist.
    pub fn draft(
        name: impl Into<String>,
        hosted_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId::new_v7(),
            name: name.into(),
            hosted_by: hosted_by.into(),
            status: SessionStatus::Draft,
            start_time: now,
            end_time: None,
            created_at: now,
            updated_at: now,
            players: Vec::new(),
        }
    }

    /// Promotes a draft to Active ahead of its first persist
    ///
    /// Idempotent on an already-Active session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionNotActive`] on a completed session.
    pub fn promote(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Draft => {
                self.status = SessionStatus::Active;
                self.updated_at = now;
                Ok(())
            }
            SessionStatus::Active => Ok(()),
            SessionStatus::Completed => Err(SessionError::SessionNotActive(self.id)),
        }
    }

    /// Adds a player, or records an additional buy-in for an existing one
    ///
    /// This is the sole entry point for growing the player set, so every
    /// participant has at least one transaction. Names match
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// - [`SessionError::SessionNotActive`] on a completed session
    /// - [`SessionError::InvalidAmount`] for a non-positive buy-in
    pub fn add_player(
        &mut self,
        name: &str,
        buy_in: Money,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        self.ensure_mutable()?;
        let session_id = self.id;

        if let Some(player) = self.player_mut(name) {
            player.add_buy_in(session_id, buy_in, now, Some("additional buy-in"))?;
        } else {
            let mut player = PlayerLedger::new(name.trim(), now);
            player.add_buy_in(session_id, buy_in, now, None)?;
            self.players.push(player);
        }

        self.updated_at = now;
        Ok(())
    }

    /// Removes a player and all their transactions
    ///
    /// Who may remove a player is a caller-side permission decision; the
    /// ledger only rejects the operation once the session is completed.
    ///
    /// Returns false if no player matched.
    pub fn remove_player(&mut self, name: &str, now: DateTime<Utc>) -> Result<bool, SessionError> {
        self.ensure_mutable()?;

        let key = ProfileId::from_name(name);
        let before = self.players.len();
        self.players.retain(|p| *p.profile_id() != key);

        let removed = self.players.len() < before;
        if removed {
            self.updated_at = now;
        }
        Ok(removed)
    }

    /// Records a cash-out for the named player
    ///
    /// # Errors
    ///
    /// - [`SessionError::SessionNotActive`] on a completed session
    /// - [`SessionError::PlayerNotFound`] for an unknown name
    /// - [`SessionError::InvalidAmount`] for a non-positive amount
    pub fn add_cash_out(
        &mut self,
        name: &str,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        self.ensure_mutable()?;
        let session_id = self.id;
        let player = self
            .player_mut(name)
            .ok_or_else(|| SessionError::PlayerNotFound(name.to_string()))?;

        player.add_cash_out(session_id, amount, now, None)?;
        self.updated_at = now;
        Ok(())
    }

    /// Declares the named player's final stack
    ///
    /// # Errors
    ///
    /// - [`SessionError::SessionNotActive`] on a completed session
    /// - [`SessionError::PlayerNotFound`] for an unknown name
    /// - [`SessionError::InvalidAmount`] for a negative amount
    pub fn set_final_stack(
        &mut self,
        name: &str,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        self.ensure_mutable()?;
        let player = self
            .player_mut(name)
            .ok_or_else(|| SessionError::PlayerNotFound(name.to_string()))?;

        player.set_final_stack(amount, now)?;
        self.updated_at = now;
        Ok(())
    }

    /// Removes one of the named player's transactions, for corrections
    ///
    /// Returns false if the player has no transaction with that id.
    pub fn remove_transaction(
        &mut self,
        name: &str,
        transaction_id: TransactionId,
        now: DateTime<Utc>,
    ) -> Result<bool, SessionError> {
        self.ensure_mutable()?;
        let player = self
            .player_mut(name)
            .ok_or_else(|| SessionError::PlayerNotFound(name.to_string()))?;

        let removed = player.remove_transaction(transaction_id);
        if removed {
            self.updated_at = now;
        }
        Ok(removed)
    }

    /// Renames the session
    ///
    /// Blank names are ignored.
    pub fn rename(&mut self, new_name: &str, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.ensure_mutable()?;

        let trimmed = new_name.trim();
        if !trimmed.is_empty() {
            self.name = trimmed.to_string();
            self.updated_at = now;
        }
        Ok(())
    }

    /// Ends the session
    ///
    /// Idempotent at the ledger level: returns true only on the call that
    /// performed the transition. Ending the session is the sole trigger for
    /// profile finalization, which carries its own replay guard.
    pub fn end_session(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == SessionStatus::Completed {
            return false;
        }

        self.status = SessionStatus::Completed;
        self.end_time = Some(now);
        self.updated_at = now;
        true
    }

    /// Looks up a player by name, case-insensitively
    pub fn player(&self, name: &str) -> Option<&PlayerLedger> {
        let key = ProfileId::from_name(name);
        self.players.iter().find(|p| *p.profile_id() == key)
    }

    fn player_mut(&mut self, name: &str) -> Option<&mut PlayerLedger> {
        let key = ProfileId::from_name(name);
        self.players.iter_mut().find(|p| *p.profile_id() == key)
    }

    /// Returns the player ledgers in seating order
    pub fn players(&self) -> &[PlayerLedger] {
        &self.players
    }

    /// Sum of all buy-ins across players
    pub fn total_buy_in(&self) -> Money {
        self.players.iter().map(|p| p.total_buy_in()).sum()
    }

    /// Sum of all cash-outs across players
    pub fn total_cash_out(&self) -> Money {
        self.players.iter().map(|p| p.total_cash_out()).sum()
    }

    /// Sum of declared final stacks
    pub fn total_final_stacks(&self) -> Money {
        self.players
            .iter()
            .filter_map(|p| p.final_stack())
            .sum()
    }

    /// Sum of current stacks across players
    pub fn total_current_stacks(&self) -> Money {
        self.players.iter().map(|p| p.current_stack()).sum()
    }

    /// Chip-conservation check: buy-ins equal current stacks within a cent
    pub fn is_balanced(&self) -> bool {
        self.total_buy_in().approx_eq(self.total_current_stacks())
    }

    /// Settlement snapshots for every player, in seating order
    pub fn session_results(&self) -> Vec<PlayerSessionResult> {
        self.players.iter().map(|p| p.session_result()).collect()
    }

    /// Validates every player's cached totals against their history
    pub fn validate_integrity(&self) -> bool {
        self.players.iter().all(|p| p.validate_integrity())
    }

    /// Rebuilds every player's cached totals from history
    ///
    /// The explicit repair operation for corrupted stored data.
    pub fn repair_totals(&mut self, now: DateTime<Utc>) {
        for player in &mut self.players {
            player.recompute_totals();
        }
        self.updated_at = now;
    }

    fn ensure_mutable(&self) -> Result<(), SessionError> {
        if self.status == SessionStatus::Completed {
            return Err(SessionError::SessionNotActive(self.id));
        }
        Ok(())
    }

    /// Returns the session identifier
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the session name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns who hosted the session
    pub fn hosted_by(&self) -> &str {
        &self.hosted_by
    }

    /// Returns the lifecycle status
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns true while the session accepts mutations and is persisted
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Returns true once the session has ended
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Returns true before the first persist
    pub fn is_draft(&self) -> bool {
        self.status == SessionStatus::Draft
    }

    /// Returns when play started
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Returns when play ended, if it has
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Returns when the record was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the record last changed
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the number of players at the table
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Elapsed play time, up to `now` for a session still running
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        self.end_time.unwrap_or(now) - self.start_time
    }
}
