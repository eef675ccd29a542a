//! In-memory project membership used as an access policy.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::backlog::{
    domain::{ActorId, ProjectId},
    ports::{AccessPolicyError, AccessPolicyResult, ProjectAccessPolicy},
};

/// Grants backlog access to actors registered as project members.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectMembers {
    members: Arc<RwLock<HashSet<(ProjectId, ActorId)>>>,
}

impl InMemoryProjectMembers {
    /// Creates a policy with no members.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `actor` as a member of `project_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessPolicyError`] when the membership lock is poisoned.
    pub fn add_member(&self, project_id: ProjectId, actor: ActorId) -> AccessPolicyResult<()> {
        let mut members = self
            .members
            .write()
            .map_err(|err| AccessPolicyError::backend(std::io::Error::other(err.to_string())))?;
        members.insert((project_id, actor));
        Ok(())
    }
}

#[async_trait]
impl ProjectAccessPolicy for InMemoryProjectMembers {
    async fn can_modify_backlog(
        &self,
        actor: ActorId,
        project_id: ProjectId,
    ) -> AccessPolicyResult<bool> {
        let members = self
            .members
            .read()
            .map_err(|err| AccessPolicyError::backend(std::io::Error::other(err.to_string())))?;
        Ok(members.contains(&(project_id, actor)))
    }
}
