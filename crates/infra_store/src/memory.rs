//! In-memory document store
//!
//! Documents are stored as serialized JSON values and swapped whole, so a
//! concurrent reader sees either the previous or the new document, never a
//! partial update.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use core_kernel::{DomainPort, PortError, ProfileId, SessionId};
use domain_profile::{PlayerProfile, ProfileStore};
use domain_session::{SessionLedger, SessionStore};

/// In-memory implementation of [`SessionStore`] and [`ProfileStore`]
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<SessionId, Value>>,
    profiles: RwLock<HashMap<ProfileId, Value>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored session documents
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Number of stored profile documents
    pub fn profile_count(&self) -> usize {
        self.profiles.read().len()
    }
}

impl DomainPort for MemoryStore {}

fn encode<T: serde::Serialize>(entity: &T) -> Result<Value, PortError> {
    serde_json::to_value(entity).map_err(|e| PortError::serialization(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(doc: Value) -> Result<T, PortError> {
    serde_json::from_value(doc).map_err(|e| PortError::serialization(e.to_string()))
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn save(&self, session: &SessionLedger) -> Result<(), PortError> {
        if session.is_draft() {
            return Err(PortError::validation(
                "draft sessions are not persisted; promote first",
            ));
        }

        let doc = encode(session)?;
        self.sessions.write().insert(session.id(), doc);
        debug!(session = %session.id(), "saved session document");
        Ok(())
    }

    async fn load(&self, id: SessionId) -> Result<Option<SessionLedger>, PortError> {
        let doc = self.sessions.read().get(&id).cloned();
        doc.map(decode).transpose()
    }

    async fn delete(&self, id: SessionId) -> Result<(), PortError> {
        // Deleting an absent document is fine; deletion is idempotent.
        self.sessions.write().remove(&id);
        Ok(())
    }

    async fn load_recent(&self, days_back: i64) -> Result<Vec<SessionLedger>, PortError> {
        let cutoff = Utc::now() - Duration::days(days_back);
        let docs: Vec<Value> = self.sessions.read().values().cloned().collect();

        let mut sessions = Vec::with_capacity(docs.len());
        for doc in docs {
            let session: SessionLedger = decode(doc)?;
            if session.start_time() >= cutoff {
                sessions.push(session);
            }
        }
        sessions.sort_by(|a, b| b.start_time().cmp(&a.start_time()));
        Ok(sessions)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, id: &ProfileId) -> Result<Option<PlayerProfile>, PortError> {
        let doc = self.profiles.read().get(id).cloned();
        doc.map(decode).transpose()
    }

    async fn save_profile(&self, profile: &PlayerProfile) -> Result<(), PortError> {
        let doc = encode(profile)?;
        self.profiles.write().insert(profile.id().clone(), doc);
        debug!(profile = %profile.id(), "saved profile document");
        Ok(())
    }
}
