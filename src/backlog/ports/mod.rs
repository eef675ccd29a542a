//! Port contracts for backlog ordering.
//!
//! Ports define infrastructure-agnostic interfaces used by backlog services.

pub mod access;
pub mod repository;

pub use access::{AccessPolicyError, AccessPolicyResult, ProjectAccessPolicy};
pub use repository::{BacklogRepository, BacklogRepositoryError, BacklogRepositoryResult};
