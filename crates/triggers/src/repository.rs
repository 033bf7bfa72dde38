//! Collaborator traits for the remote workflow platform.

use async_trait::async_trait;

use crate::{
    error::ApiFailure,
    types::{ChannelId, TriggerId, TriggerRecord, TriggerSpec},
};

/// Filter for [`TriggerRepository::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    /// Only triggers created by this app.
    pub owned_only: bool,
}

impl ListFilter {
    pub const OWNED: Self = Self { owned_only: true };
}

/// Remote store of trigger resources.
///
/// Implementations do not retry and are not required to paginate; a single
/// `list` call may return a partial page.
#[async_trait]
pub trait TriggerRepository: Send + Sync {
    async fn list(&self, filter: ListFilter) -> Result<Vec<TriggerRecord>, ApiFailure>;
    async fn create(&self, spec: &TriggerSpec) -> Result<TriggerRecord, ApiFailure>;
    /// Replace the whole definition of `id` with `spec`.
    async fn update(&self, id: &TriggerId, spec: &TriggerSpec) -> Result<TriggerRecord, ApiFailure>;
}

/// Successful response to a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStatus {
    Joined,
    AlreadyMember,
}

/// Channel membership of the app's bot user.
#[async_trait]
pub trait ChannelMembership: Send + Sync {
    async fn join(&self, channel: &ChannelId) -> Result<JoinStatus, ApiFailure>;
}
