//! Failure-injecting store doubles
//!
//! Wrappers around [`MemoryStore`] that fail a configurable window of save
//! calls with a transient error, for exercising retry and exactly-once
//! semantics. Reads always pass through.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use core_kernel::{DomainPort, PortError, ProfileId, SessionId};
use domain_profile::{PlayerProfile, ProfileStore};
use domain_session::{SessionLedger, SessionStore};
use infra_store::MemoryStore;

const DISARMED: usize = usize::MAX;

/// Shared fail-window state
struct FailWindow {
    saves_seen: AtomicUsize,
    fail_from: AtomicUsize,
    fail_until: AtomicUsize,
}

impl FailWindow {
    fn new() -> Self {
        Self {
            saves_seen: AtomicUsize::new(0),
            fail_from: AtomicUsize::new(DISARMED),
            fail_until: AtomicUsize::new(DISARMED),
        }
    }

    /// Arms the window: after `skip` further saves, fail the next `count`
    fn arm(&self, skip: usize, count: usize) {
        let from = self.saves_seen.load(Ordering::SeqCst) + skip;
        self.fail_from.store(from, Ordering::SeqCst);
        self.fail_until.store(from + count, Ordering::SeqCst);
    }

    /// Counts a save attempt; returns an error if it falls in the window
    fn check(&self, what: &str) -> Result<(), PortError> {
        let index = self.saves_seen.fetch_add(1, Ordering::SeqCst);
        if index >= self.fail_from.load(Ordering::SeqCst)
            && index < self.fail_until.load(Ordering::SeqCst)
        {
            return Err(PortError::connection(format!("{what} store unreachable")));
        }
        Ok(())
    }
}

/// Profile store whose saves can be made to fail on demand
pub struct FlakyProfileStore {
    inner: Arc<MemoryStore>,
    window: FailWindow,
}

impl FlakyProfileStore {
    /// Wraps an in-memory store; no failures until armed
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            window: FailWindow::new(),
        }
    }

    /// After `skip` further saves, fail the next `count` saves
    pub fn fail_saves(&self, skip: usize, count: usize) {
        self.window.arm(skip, count);
    }
}

impl DomainPort for FlakyProfileStore {}

#[async_trait]
impl ProfileStore for FlakyProfileStore {
    async fn get_profile(&self, id: &ProfileId) -> Result<Option<PlayerProfile>, PortError> {
        self.inner.get_profile(id).await
    }

    async fn save_profile(&self, profile: &PlayerProfile) -> Result<(), PortError> {
        self.window.check("profile")?;
        self.inner.save_profile(profile).await
    }
}

/// Session store whose saves can be made to fail on demand
pub struct FlakySessionStore {
    inner: Arc<MemoryStore>,
    window: FailWindow,
}

impl FlakySessionStore {
    /// Wraps an in-memory store; no failures until armed
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            window: FailWindow::new(),
        }
    }

    /// After `skip` further saves, fail the next `count` saves
    pub fn fail_saves(&self, skip: usize, count: usize) {
        self.window.arm(skip, count);
    }
}

impl DomainPort for FlakySessionStore {}

#[async_trait]
impl SessionStore for FlakySessionStore {
    async fn save(&self, session: &SessionLedger) -> Result<(), PortError> {
        self.window.check("session")?;
        self.inner.save(session).await
    }

    async fn load(&self, id: SessionId) -> Result<Option<SessionLedger>, PortError> {
        self.inner.load(id).await
    }

    async fn delete(&self, id: SessionId) -> Result<(), PortError> {
        self.inner.delete(id).await
    }

    async fn load_recent(&self, days_back: i64) -> Result<Vec<SessionLedger>, PortError> {
        self.inner.load_recent(days_back).await
    }
}
