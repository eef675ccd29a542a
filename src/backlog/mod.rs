//! Backlog and milestone ordering for user stories.
//!
//! A bulk move takes an ordered list of stories, an optional anchor story
//! and a target group (the backlog or a milestone), splices the stories in
//! after the anchor and renumbers everything that follows. The module
//! follows hexagonal architecture:
//!
//! - Domain types and the reorder planner in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
