//! Authorization port consulted before a backlog is modified.

use crate::backlog::domain::{ActorId, ProjectId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for access policy checks.
pub type AccessPolicyResult<T> = Result<T, AccessPolicyError>;

/// Decides whether an actor may reorder a project's stories.
#[async_trait]
pub trait ProjectAccessPolicy: Send + Sync {
    /// Returns `true` when `actor` may modify the backlog of `project_id`.
    async fn can_modify_backlog(
        &self,
        actor: ActorId,
        project_id: ProjectId,
    ) -> AccessPolicyResult<bool>;
}

/// Failure of the policy backend itself, distinct from a refusal.
#[derive(Debug, Clone, Error)]
#[error("access policy unavailable: {0}")]
pub struct AccessPolicyError(Arc<dyn std::error::Error + Send + Sync>);

impl AccessPolicyError {
    /// Wraps a policy backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
