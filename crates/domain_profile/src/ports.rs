//! Profile domain ports

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError, ProfileId};

use crate::profile::PlayerProfile;

/// Persistence collaborator for player profiles
///
/// Profiles are keyed by normalized player name. Writes replace the whole
/// profile document atomically; a reader sees either the previous or the new
/// document, never a partial update. That contract is what makes the
/// reconciler's load-mutate-save cycle safely retryable.
#[async_trait]
pub trait ProfileStore: DomainPort {
    /// Loads a profile, or None if the player has no durable record yet
    async fn get_profile(&self, id: &ProfileId) -> Result<Option<PlayerProfile>, PortError>;

    /// Persists the full profile document atomically
    async fn save_profile(&self, profile: &PlayerProfile) -> Result<(), PortError>;
}
