//! Test data builders
//!
//! Builders construct entities with sensible defaults so tests specify only
//! what they care about.

use chrono::{DateTime, Utc};

use core_kernel::Money;
use domain_profile::{PlayerProfile, SessionSummary};
use domain_session::SessionLedger;

use crate::fixtures::TemporalFixtures;

/// Builder for an Active session seeded with players
pub struct SessionBuilder {
    name: String,
    hosted_by: String,
    started_at: DateTime<Utc>,
    players: Vec<(String, Money)>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    /// Creates a builder with default values
    pub fn new() -> Self {
        Self {
            name: "Friday game".to_string(),
            hosted_by: "host".to_string(),
            started_at: TemporalFixtures::session_start(),
            players: Vec::new(),
        }
    }

    /// Sets the session name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the host
    pub fn with_host(mut self, hosted_by: impl Into<String>) -> Self {
        self.hosted_by = hosted_by.into();
        self
    }

    /// Sets the start time
    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    /// Seats a player with an initial buy-in
    pub fn with_player(mut self, name: impl Into<String>, buy_in: Money) -> Self {
        self.players.push((name.into(), buy_in));
        self
    }

    /// Builds an Active session
    ///
    /// # Panics
    ///
    /// Panics on an invalid seeded buy-in; builders are test-only.
    pub fn build(self) -> SessionLedger {
        let mut session = SessionLedger::draft(self.name, self.hosted_by, self.started_at);
        session
            .promote(self.started_at)
            .expect("fresh draft always promotes");
        for (name, buy_in) in self.players {
            session
                .add_player(&name, buy_in, self.started_at)
                .expect("seeded buy-in must be valid");
        }
        session
    }

    /// Builds a session still in Draft
    pub fn build_draft(self) -> SessionLedger {
        let mut session = SessionLedger::draft(self.name, self.hosted_by, self.started_at);
        for (name, buy_in) in self.players {
            session
                .add_player(&name, buy_in, self.started_at)
                .expect("seeded buy-in must be valid");
        }
        session
    }
}

/// Builder for a player profile with finalized session history
pub struct ProfileBuilder {
    name: String,
    created_at: DateTime<Utc>,
    finalized: Vec<SessionSummary>,
}

impl ProfileBuilder {
    /// Creates a builder for the named player
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: TemporalFixtures::session_start(),
            finalized: Vec::new(),
        }
    }

    /// Appends a finalized session
    pub fn with_finalized(mut self, summary: SessionSummary) -> Self {
        self.finalized.push(summary);
        self
    }

    /// Builds the profile
    pub fn build(self) -> PlayerProfile {
        let mut profile = PlayerProfile::new(self.name, self.created_at);
        for summary in self.finalized {
            let ended = summary.ended_at;
            profile.finalize_session(summary, ended);
        }
        profile
    }
}
