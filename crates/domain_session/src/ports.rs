//! Session domain ports
//!
//! The session store is an opaque document save/load service. The contract
//! it must honor: whole-document writes are atomic (a concurrent reader sees
//! either the previous or the new document, never a partial update), and the
//! full entity graph (session -> players -> transactions) round-trips
//! losslessly.

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError, SessionId};

use crate::session::SessionLedger;

/// Persistence collaborator for session documents
///
/// Implementations must refuse to persist Draft sessions: a draft becomes
/// discoverable only through promotion, and must not survive a crash.
#[async_trait]
pub trait SessionStore: DomainPort {
    /// Persists the full session document atomically
    async fn save(&self, session: &SessionLedger) -> Result<(), PortError>;

    /// Loads a session by id
    async fn load(&self, id: SessionId) -> Result<Option<SessionLedger>, PortError>;

    /// Deletes a session document
    async fn delete(&self, id: SessionId) -> Result<(), PortError>;

    /// Loads sessions whose start time falls within the last `days_back` days
    async fn load_recent(&self, days_back: i64) -> Result<Vec<SessionLedger>, PortError>;
}
