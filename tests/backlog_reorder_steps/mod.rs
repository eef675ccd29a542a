//! Step definitions for backlog reorder scenarios.

mod given;
mod when;
pub mod world;
