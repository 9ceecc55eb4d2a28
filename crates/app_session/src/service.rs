//! The session service
//!
//! Orchestrates one session at a time against the two persistence
//! collaborators. All mutations go through `&mut self`, so saves are
//! serialized and the in-memory ledger is the single source of truth
//! between persists.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use core_kernel::{Money, SessionId, TransactionId};
use domain_profile::{PlayerProfile, ProfileReconciler, ProfileStore, SessionSnapshot, SessionSummary};
use domain_session::{SessionLedger, SessionStore};

use crate::error::AppError;

/// Caller-facing service over the session ledger and profile reconciliation
pub struct SessionService {
    sessions: Arc<dyn SessionStore>,
    reconciler: ProfileReconciler,
    current: Option<SessionLedger>,
}

impl SessionService {
    /// Creates a service over the given persistence collaborators
    pub fn new(sessions: Arc<dyn SessionStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            sessions,
            reconciler: ProfileReconciler::new(profiles),
            current: None,
        }
    }

    /// Starts a new draft session, replacing any current one
    ///
    /// The draft is configuration-only: it is not discoverable and does not
    /// survive a crash until the first [`SessionService::save`] promotes it.
    /// With no name given, one is generated from the start time.
    pub fn create_draft(
        &mut self,
        name: Option<&str>,
        hosted_by: &str,
        now: DateTime<Utc>,
    ) -> &SessionLedger {
        let name = match name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => default_session_name(now),
        };

        info!(session_name = %name, "created draft session");
        self.current.insert(SessionLedger::draft(name, hosted_by, now))
    }

    /// Returns the currently loaded session, if any
    pub fn current(&self) -> Option<&SessionLedger> {
        self.current.as_ref()
    }

    /// Adds a player or an additional buy-in for an existing one
    pub fn add_player(
        &mut self,
        name: &str,
        buy_in: Money,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.current_mut()?.add_player(name, buy_in, now)?;
        Ok(())
    }

    /// Removes a player and all their transactions
    pub fn remove_player(&mut self, name: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        Ok(self.current_mut()?.remove_player(name, now)?)
    }

    /// Records a cash-out for the named player
    pub fn add_cash_out(
        &mut self,
        name: &str,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.current_mut()?.add_cash_out(name, amount, now)?;
        Ok(())
    }

    /// Declares the named player's final stack
    pub fn set_final_stack(
        &mut self,
        name: &str,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.current_mut()?.set_final_stack(name, amount, now)?;
        Ok(())
    }

    /// Removes one of the named player's transactions, for corrections
    pub fn remove_transaction(
        &mut self,
        name: &str,
        transaction_id: TransactionId,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        Ok(self
            .current_mut()?
            .remove_transaction(name, transaction_id, now)?)
    }

    /// Renames the current session
    pub fn rename(&mut self, new_name: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        self.current_mut()?.rename(new_name, now)?;
        Ok(())
    }

    /// Chip-conservation check on the current session
    pub fn is_balanced(&self) -> Result<bool, AppError> {
        Ok(self.current_ref()?.is_balanced())
    }

    /// Total buy-ins across the current session
    pub fn total_buy_in(&self) -> Result<Money, AppError> {
        Ok(self.current_ref()?.total_buy_in())
    }

    /// Total cash-outs across the current session
    pub fn total_cash_out(&self) -> Result<Money, AppError> {
        Ok(self.current_ref()?.total_cash_out())
    }

    /// Persists the current session and refreshes provisional profile data
    ///
    /// The first save promotes a draft to Active, making it discoverable.
    /// Each player's provisional session snapshot is refreshed before the
    /// session document is written; neither step touches lifetime totals.
    #[instrument(skip(self, now))]
    pub async fn save(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        let session = self.current.as_mut().ok_or(AppError::NoCurrentSession)?;
        session.promote(now)?;

        let session_id = session.id();
        let results = session.session_results();
        for result in &results {
            self.reconciler
                .upsert_session_reference(
                    &result.player_name,
                    session_id,
                    SessionSnapshot::new(result.total_buy_ins, result.total_cash_outs),
                    now,
                )
                .await?;
        }

        self.sessions.save(session).await?;
        info!(session = %session_id, players = results.len(), "saved session");
        Ok(())
    }

    /// Ends the current session and folds results into player profiles
    ///
    /// Sets the end time (idempotently), finalizes every player's profile,
    /// persists the completed session, and clears the current ledger. Safe
    /// to retry after any failure: the end time is already set, profiles
    /// that were finalized are skipped by the replay guard, and the session
    /// write is a whole-document replacement.
    #[instrument(skip(self, now))]
    pub async fn end_session(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        let session = self.current.as_mut().ok_or(AppError::NoCurrentSession)?;
        if session.is_draft() {
            session.promote(now)?;
        }
        session.end_session(now);

        let session_id = session.id();
        let session_name = session.name().to_string();
        let started_at = session.start_time();
        let ended_at = session.end_time().unwrap_or(now);
        let player_count = session.player_count();

        let results = session.session_results();
        for result in &results {
            let summary = SessionSummary {
                session_id,
                session_name: session_name.clone(),
                started_at,
                ended_at,
                buy_in: result.total_buy_ins,
                cash_out: result.settled_cash_out(),
                player_count,
            };
            self.reconciler
                .finalize(&result.player_name, summary, now)
                .await?;
        }

        self.sessions.save(session).await?;
        info!(session = %session_id, players = results.len(), "ended session");
        self.current = None;
        Ok(())
    }

    /// Loads a stored session as the current one
    ///
    /// Integrity of cached totals is checked on load; drift is surfaced in
    /// the logs and left for the explicit repair operation.
    pub async fn load(&mut self, id: SessionId) -> Result<bool, AppError> {
        let Some(session) = self.sessions.load(id).await? else {
            return Ok(false);
        };

        if !session.validate_integrity() {
            warn!(session = %id, "loaded session has drifted cached totals");
        }

        self.current = Some(session);
        Ok(true)
    }

    /// Deletes a session and reverses its effect on player profiles
    ///
    /// Profile reversal runs before the document delete so that a failure
    /// part-way leaves the session loadable and the whole call retryable;
    /// reversals that already ran are no-ops on retry.
    #[instrument(skip(self))]
    pub async fn delete_session(&mut self, id: SessionId) -> Result<(), AppError> {
        if let Some(session) = self.sessions.load(id).await? {
            for player in session.players() {
                self.reconciler.remove_session(player.name(), id).await?;
            }
        }

        self.sessions.delete(id).await?;
        if self.current.as_ref().map(|s| s.id()) == Some(id) {
            self.current = None;
        }
        info!(session = %id, "deleted session");
        Ok(())
    }

    /// Sessions started within the last `days_back` days, newest first
    pub async fn recent_sessions(&self, days_back: i64) -> Result<Vec<SessionLedger>, AppError> {
        Ok(self.sessions.load_recent(days_back).await?)
    }

    /// Recent sessions still running
    pub async fn active_sessions(&self, days_back: i64) -> Result<Vec<SessionLedger>, AppError> {
        let mut sessions = self.recent_sessions(days_back).await?;
        sessions.retain(|s| s.is_active());
        Ok(sessions)
    }

    /// Recent sessions that have ended
    pub async fn completed_sessions(&self, days_back: i64) -> Result<Vec<SessionLedger>, AppError> {
        let mut sessions = self.recent_sessions(days_back).await?;
        sessions.retain(|s| s.is_completed());
        Ok(sessions)
    }

    /// Read access to a player's durable profile
    pub async fn player_profile(
        &self,
        player_name: &str,
    ) -> Result<Option<PlayerProfile>, AppError> {
        Ok(self.reconciler.load_profile(player_name).await?)
    }

    fn current_mut(&mut self) -> Result<&mut SessionLedger, AppError> {
        self.current.as_mut().ok_or(AppError::NoCurrentSession)
    }

    fn current_ref(&self) -> Result<&SessionLedger, AppError> {
        self.current.as_ref().ok_or(AppError::NoCurrentSession)
    }
}

/// "Wednesday Aug 06 at 19:30"-style default session name
fn default_session_name(now: DateTime<Utc>) -> String {
    now.format("%A %b %d at %H:%M").to_string()
}
