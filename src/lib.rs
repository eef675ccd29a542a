//! Storyboard: backlog and sprint ordering for user stories.
//!
//! This crate keeps user stories ordered inside a project's backlog and its
//! milestones, and implements the bulk move used when stories are dragged
//! between or within those groups.
//!
//! # Architecture
//!
//! Storyboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`backlog`]: Stories, milestones and the bulk reorder operation
//! - [`config`]: Runtime configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod backlog;
pub mod config;
pub mod telemetry;
