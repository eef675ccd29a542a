//! In-memory adapters for tests and embedding.

mod access;
mod repository;

pub use access::InMemoryProjectMembers;
pub use repository::InMemoryBacklogRepository;
