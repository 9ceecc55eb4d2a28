//! Durable player profiles
//!
//! A profile accumulates lifetime statistics across sessions. Three session
//! records live here:
//!
//! - `provisional`: per-session `{buy_in, cash_out}` snapshots maintained by
//!   incremental sync while a session is active; never counted into
//!   lifetime totals
//! - `finalized`: the totals of every session already folded into lifetime
//!   statistics. This is the replay guard for finalization and the source
//!   for the full recompute on deletion
//! - `recent_sessions`: a bounded display history (newest last), appended
//!   only at finalization

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{Money, ProfileId, SessionId};

/// Capacity of the recent-session display history
pub const RECENT_SESSION_CAP: usize = 10;

/// Provisional per-session totals, updated by incremental sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub buy_in: Money,
    pub cash_out: Money,
}

impl SessionSnapshot {
    pub fn new(buy_in: Money, cash_out: Money) -> Self {
        Self { buy_in, cash_out }
    }
}

/// Summary of a completed session from one player's point of view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub session_name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// The player's total buy-ins for the session
    pub buy_in: Money,
    /// Everything that came back to the player: cash-outs plus final stack
    pub cash_out: Money,
    pub player_count: usize,
}

impl SessionSummary {
    /// The player's profit for the session
    pub fn profit(&self) -> Money {
        self.cash_out - self.buy_in
    }

    /// How long the session ran
    pub fn duration(&self) -> Duration {
        self.ended_at - self.started_at
    }
}

/// A player's durable lifetime record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    id: ProfileId,
    name: String,
    created_at: DateTime<Utc>,
    last_played: DateTime<Utc>,
    lifetime_buy_in: Money,
    lifetime_cash_out: Money,
    provisional: BTreeMap<SessionId, SessionSnapshot>,
    finalized: BTreeMap<SessionId, SessionSnapshot>,
    recent_sessions: Vec<SessionSummary>,
}

impl PlayerProfile {
    /// Creates a fresh profile for a player
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        let name = name.into();
        let id = ProfileId::from_name(&name);
        Self {
            id,
            name,
            created_at: now,
            last_played: now,
            lifetime_buy_in: Money::ZERO,
            lifetime_cash_out: Money::ZERO,
            provisional: BTreeMap::new(),
            finalized: BTreeMap::new(),
            recent_sessions: Vec::new(),
        }
    }

    /// Records or refreshes the provisional snapshot for an active session
    ///
    /// Never touches lifetime totals. A session that has already been
    /// finalized is left alone, so a late incremental sync cannot resurrect
    /// or duplicate it.
    ///
    /// Returns true if stored state changed.
    pub fn upsert_session_reference(
        &mut self,
        session_id: SessionId,
        snapshot: SessionSnapshot,
    ) -> bool {
        if self.finalized.contains_key(&session_id) {
            return false;
        }
        if self.provisional.get(&session_id) == Some(&snapshot) {
            return false;
        }

        self.provisional.insert(session_id, snapshot);
        true
    }

    /// Returns the provisional snapshot last stored for a session
    pub fn provisional_snapshot(&self, session_id: SessionId) -> Option<SessionSnapshot> {
        self.provisional.get(&session_id).copied()
    }

    /// Returns true once a session has been folded into lifetime totals
    pub fn is_finalized(&self, session_id: SessionId) -> bool {
        self.finalized.contains_key(&session_id)
    }

    /// Returns true if the session is known to this profile at all
    pub fn has_participated(&self, session_id: SessionId) -> bool {
        self.provisional.contains_key(&session_id) || self.finalized.contains_key(&session_id)
    }

    /// Folds a completed session into lifetime statistics, at most once
    ///
    /// On the first call for a session id this appends the summary to the
    /// bounded recent history, adds the totals to lifetime statistics,
    /// records the session as finalized, and bumps the last-played
    /// timestamp, all in one mutation. A repeat call changes nothing and
    /// returns false.
    pub fn finalize_session(&mut self, summary: SessionSummary, now: DateTime<Utc>) -> bool {
        if self.finalized.contains_key(&summary.session_id) {
            return false;
        }

        let totals = SessionSnapshot::new(summary.buy_in, summary.cash_out);

        self.recent_sessions.push(summary.clone());
        while self.recent_sessions.len() > RECENT_SESSION_CAP {
            self.recent_sessions.remove(0);
        }

        self.lifetime_buy_in += totals.buy_in;
        self.lifetime_cash_out += totals.cash_out;
        self.finalized.insert(summary.session_id, totals);
        self.provisional.remove(&summary.session_id);
        self.last_played = now;
        true
    }

    /// Removes a session from this profile, reversing its effect
    ///
    /// Lifetime totals are rebuilt from the remaining finalized records, a
    /// full recompute rather than a subtraction. The finalized record set
    /// is unbounded precisely so this recompute stays correct after the
    /// summary has been evicted from the recent history.
    ///
    /// Returns true if anything was removed.
    pub fn remove_session(&mut self, session_id: SessionId) -> bool {
        let had_provisional = self.provisional.remove(&session_id).is_some();
        let had_finalized = self.finalized.remove(&session_id).is_some();
        let before = self.recent_sessions.len();
        self.recent_sessions.retain(|s| s.session_id != session_id);
        let had_summary = self.recent_sessions.len() < before;

        if had_finalized {
            self.recompute_lifetime_totals();
        }

        had_provisional || had_finalized || had_summary
    }

    /// Rebuilds lifetime totals from the finalized session records
    pub fn recompute_lifetime_totals(&mut self) {
        self.lifetime_buy_in = self.finalized.values().map(|s| s.buy_in).sum();
        self.lifetime_cash_out = self.finalized.values().map(|s| s.cash_out).sum();
    }

    /// Wipes all session data and lifetime totals
    ///
    /// Operator escape hatch for a profile corrupted beyond repair.
    pub fn clear_session_data(&mut self) {
        self.provisional.clear();
        self.finalized.clear();
        self.recent_sessions.clear();
        self.lifetime_buy_in = Money::ZERO;
        self.lifetime_cash_out = Money::ZERO;
    }

    /// Lifetime profit: everything returned minus everything invested
    pub fn lifetime_profit(&self) -> Money {
        self.lifetime_cash_out - self.lifetime_buy_in
    }

    /// Number of completed sessions on record
    pub fn sessions_played(&self) -> usize {
        self.finalized.len()
    }

    /// Per-session profits, oldest first, over up to `count` recent sessions
    pub fn profit_trend(&self, count: usize) -> Vec<Money> {
        let mut recent: Vec<&SessionSummary> = self.recent_sessions.iter().collect();
        recent.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        let mut trend: Vec<Money> = recent.iter().take(count).map(|s| s.profit()).collect();
        trend.reverse();
        trend
    }

    /// Mean profit across the recent-session history
    pub fn average_profit(&self) -> Money {
        if self.recent_sessions.is_empty() {
            return Money::ZERO;
        }
        let total: Money = self.recent_sessions.iter().map(|s| s.profit()).sum();
        let count = Decimal::from(self.recent_sessions.len() as u64);
        Money::new(total.amount() / count)
    }

    /// Best and worst session profit across the recent history
    pub fn best_worst_profit(&self) -> Option<(Money, Money)> {
        let profits: Vec<Money> = self.recent_sessions.iter().map(|s| s.profit()).collect();
        let best = profits.iter().max()?;
        let worst = profits.iter().min()?;
        Some((*best, *worst))
    }

    /// Returns the profile identifier
    pub fn id(&self) -> &ProfileId {
        &self.id
    }

    /// Returns the player's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns when the profile was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last time a session was finalized for this player
    pub fn last_played(&self) -> DateTime<Utc> {
        self.last_played
    }

    /// Returns lifetime buy-in total
    pub fn lifetime_buy_in(&self) -> Money {
        self.lifetime_buy_in
    }

    /// Returns lifetime cash-out total (including final stacks)
    pub fn lifetime_cash_out(&self) -> Money {
        self.lifetime_cash_out
    }

    /// Returns the bounded recent-session history, oldest first
    pub fn recent_sessions(&self) -> &[SessionSummary] {
        &self.recent_sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(value: Decimal) -> Money {
        Money::new(value)
    }

    fn summary(id: SessionId, buy_in: Decimal, cash_out: Decimal) -> SessionSummary {
        let now = Utc::now();
        SessionSummary {
            session_id: id,
            session_name: "game".to_string(),
            started_at: now,
            ended_at: now + Duration::hours(3),
            buy_in: money(buy_in),
            cash_out: money(cash_out),
            player_count: 4,
        }
    }

    #[test]
    fn test_upsert_never_touches_lifetime_totals() {
        let now = Utc::now();
        let mut profile = PlayerProfile::new("Alice", now);
        let session = SessionId::new();

        for cents in [1000, 2500, 7500] {
            profile.upsert_session_reference(
                session,
                SessionSnapshot::new(Money::from_cents(cents), Money::ZERO),
            );
        }

        assert_eq!(profile.lifetime_buy_in(), Money::ZERO);
        assert_eq!(profile.lifetime_cash_out(), Money::ZERO);
        assert_eq!(
            profile.provisional_snapshot(session),
            Some(SessionSnapshot::new(money(dec!(75)), Money::ZERO))
        );
        assert!(profile.recent_sessions().is_empty());
    }

    #[test]
    fn test_upsert_reports_whether_state_changed() {
        let now = Utc::now();
        let mut profile = PlayerProfile::new("Alice", now);
        let session = SessionId::new();
        let snapshot = SessionSnapshot::new(money(dec!(50)), Money::ZERO);

        assert!(profile.upsert_session_reference(session, snapshot));
        assert!(!profile.upsert_session_reference(session, snapshot));
    }

    #[test]
    fn test_finalize_is_exactly_once() {
        let now = Utc::now();
        let mut profile = PlayerProfile::new("Alice", now);
        let session = SessionId::new();

        assert!(profile.finalize_session(summary(session, dec!(100), dec!(70)), now));
        let after_first = profile.clone();

        // The second call is a byte-for-byte no-op.
        assert!(!profile.finalize_session(summary(session, dec!(100), dec!(70)), now));
        assert_eq!(profile, after_first);

        assert_eq!(profile.lifetime_buy_in(), money(dec!(100)));
        assert_eq!(profile.lifetime_cash_out(), money(dec!(70)));
        assert_eq!(profile.lifetime_profit(), money(dec!(-30)));
        assert_eq!(profile.sessions_played(), 1);
    }

    #[test]
    fn test_finalize_clears_provisional_and_blocks_late_upsert() {
        let now = Utc::now();
        let mut profile = PlayerProfile::new("Alice", now);
        let session = SessionId::new();

        profile.upsert_session_reference(
            session,
            SessionSnapshot::new(money(dec!(40)), Money::ZERO),
        );
        profile.finalize_session(summary(session, dec!(100), dec!(120)), now);

        assert!(profile.provisional_snapshot(session).is_none());

        // A straggling incremental sync after finalization changes nothing.
        let before = profile.clone();
        assert!(!profile.upsert_session_reference(
            session,
            SessionSnapshot::new(money(dec!(999)), Money::ZERO)
        ));
        assert_eq!(profile, before);
    }

    #[test]
    fn test_recent_history_evicts_oldest() {
        let now = Utc::now();
        let mut profile = PlayerProfile::new("Alice", now);

        let first = SessionId::new();
        profile.finalize_session(summary(first, dec!(1), dec!(1)), now);
        for _ in 0..RECENT_SESSION_CAP {
            profile.finalize_session(summary(SessionId::new(), dec!(10), dec!(10)), now);
        }

        assert_eq!(profile.recent_sessions().len(), RECENT_SESSION_CAP);
        assert!(profile
            .recent_sessions()
            .iter()
            .all(|s| s.session_id != first));
        // The evicted session still counts toward lifetime totals.
        assert_eq!(profile.lifetime_buy_in(), money(dec!(101)));
        assert_eq!(profile.sessions_played(), RECENT_SESSION_CAP + 1);
    }

    #[test]
    fn test_remove_session_recomputes_from_finalized_records() {
        let now = Utc::now();
        let mut profile = PlayerProfile::new("Alice", now);

        let evicted = SessionId::new();
        let removed = SessionId::new();
        profile.finalize_session(summary(evicted, dec!(100), dec!(150)), now);
        for _ in 0..RECENT_SESSION_CAP {
            profile.finalize_session(summary(SessionId::new(), dec!(10), dec!(10)), now);
        }
        profile.finalize_session(summary(removed, dec!(30), dec!(5)), now);

        assert!(profile.remove_session(removed));

        // The recompute still counts the session evicted from the recent
        // display history.
        assert_eq!(profile.lifetime_buy_in(), money(dec!(200)));
        assert_eq!(profile.lifetime_cash_out(), money(dec!(250)));
        assert!(!profile.is_finalized(removed));

        assert!(!profile.remove_session(removed));
    }

    #[test]
    fn test_analytics_over_recent_history() {
        let now = Utc::now();
        let mut profile = PlayerProfile::new("Alice", now);

        let mut s1 = summary(SessionId::new(), dec!(100), dec!(150)); // +50
        s1.started_at = now - Duration::days(2);
        let mut s2 = summary(SessionId::new(), dec!(100), dec!(80)); // -20
        s2.started_at = now - Duration::days(1);

        profile.finalize_session(s1, now);
        profile.finalize_session(s2, now);

        assert_eq!(
            profile.profit_trend(10),
            vec![money(dec!(50)), money(dec!(-20))]
        );
        assert_eq!(profile.average_profit(), money(dec!(15)));
        assert_eq!(
            profile.best_worst_profit(),
            Some((money(dec!(50)), money(dec!(-20))))
        );
    }

    #[test]
    fn test_clear_session_data() {
        let now = Utc::now();
        let mut profile = PlayerProfile::new("Alice", now);
        profile.finalize_session(summary(SessionId::new(), dec!(100), dec!(70)), now);

        profile.clear_session_data();
        assert_eq!(profile.lifetime_buy_in(), Money::ZERO);
        assert_eq!(profile.sessions_played(), 0);
        assert!(profile.recent_sessions().is_empty());
    }
}
