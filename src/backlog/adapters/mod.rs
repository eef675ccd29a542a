//! Adapter implementations of the backlog ports.

pub mod memory;
pub mod postgres;
