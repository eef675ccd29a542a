//! Unit tests for the backlog context.
