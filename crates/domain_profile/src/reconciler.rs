//! Profile reconciliation
//!
//! The reconciler is the only writer of player profiles. Each operation
//! follows the same shape: load the profile fresh from the store, apply the
//! whole mutation in memory, then issue a single durable write.
//!
//! That shape is the resilience story for the subsystem. A write that fails
//! commits nothing, so the caller retries the whole call; a retry after a
//! write that actually succeeded is caught by the profile's finalized-session
//! record and degrades to a no-op. No distributed lock is needed because the
//! product has a single logical writer.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use core_kernel::{PortError, ProfileId, SessionId};

use crate::ports::ProfileStore;
use crate::profile::{PlayerProfile, SessionSnapshot, SessionSummary};

/// Result of a finalization attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// The session was folded into lifetime totals by this call
    Applied,
    /// The session had already been folded in; nothing was written
    AlreadyFinalized,
}

/// Reconciles session results into durable player profiles
pub struct ProfileReconciler {
    store: Arc<dyn ProfileStore>,
}

impl ProfileReconciler {
    /// Creates a reconciler over the given profile store
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Refreshes a player's provisional snapshot for an active session
    ///
    /// Idempotent and safe to call on every incremental save. Creates the
    /// profile on a player's first appearance. Lifetime totals are never
    /// touched here; the write is skipped entirely when the stored state
    /// would not change (including after finalization).
    #[instrument(skip(self, snapshot), fields(session = %session_id))]
    pub async fn upsert_session_reference(
        &self,
        player_name: &str,
        session_id: SessionId,
        snapshot: SessionSnapshot,
        now: DateTime<Utc>,
    ) -> Result<(), PortError> {
        let mut profile = self.load_or_new(player_name, now).await?;

        if let Some(previous) = profile.provisional_snapshot(session_id) {
            debug!(
                player = player_name,
                buy_in_delta = %(snapshot.buy_in - previous.buy_in),
                cash_out_delta = %(snapshot.cash_out - previous.cash_out),
                "refreshing provisional session snapshot"
            );
        }

        if profile.upsert_session_reference(session_id, snapshot) {
            self.store.save_profile(&profile).await?;
        }
        Ok(())
    }

    /// Folds a completed session into a player's lifetime statistics
    ///
    /// Called once per player from session end. The summary append, lifetime
    /// totals, finalized mark, and last-played bump land in one persisted
    /// write; a replay finds the session already finalized and returns
    /// [`FinalizeOutcome::AlreadyFinalized`] without writing.
    #[instrument(skip(self, summary), fields(session = %summary.session_id))]
    pub async fn finalize(
        &self,
        player_name: &str,
        summary: SessionSummary,
        now: DateTime<Utc>,
    ) -> Result<FinalizeOutcome, PortError> {
        let mut profile = self.load_or_new(player_name, now).await?;
        let session_id = summary.session_id;

        if !profile.finalize_session(summary, now) {
            debug!(player = player_name, "session already finalized; skipping");
            return Ok(FinalizeOutcome::AlreadyFinalized);
        }

        self.store.save_profile(&profile).await?;
        info!(
            player = player_name,
            lifetime_buy_in = %profile.lifetime_buy_in(),
            lifetime_cash_out = %profile.lifetime_cash_out(),
            "finalized session into lifetime totals"
        );
        Ok(FinalizeOutcome::Applied)
    }

    /// Reverses a session's effect on a player's profile
    ///
    /// Lifetime totals are recomputed in full from the remaining finalized
    /// records. Returns false if the profile does not exist or never saw the
    /// session.
    #[instrument(skip(self), fields(session = %session_id))]
    pub async fn remove_session(
        &self,
        player_name: &str,
        session_id: SessionId,
    ) -> Result<bool, PortError> {
        let id = ProfileId::from_name(player_name);
        let Some(mut profile) = self.store.get_profile(&id).await? else {
            return Ok(false);
        };

        if !profile.remove_session(session_id) {
            return Ok(false);
        }

        self.store.save_profile(&profile).await?;
        info!(player = player_name, "removed session from profile");
        Ok(true)
    }

    /// Loads a player's profile, fetching the stored document when present
    pub async fn load_profile(
        &self,
        player_name: &str,
    ) -> Result<Option<PlayerProfile>, PortError> {
        let id = ProfileId::from_name(player_name);
        self.store.get_profile(&id).await
    }

    async fn load_or_new(
        &self,
        player_name: &str,
        now: DateTime<Utc>,
    ) -> Result<PlayerProfile, PortError> {
        let id = ProfileId::from_name(player_name);
        let existing = self.store.get_profile(&id).await?;
        Ok(existing.unwrap_or_else(|| PlayerProfile::new(player_name, now)))
    }
}
