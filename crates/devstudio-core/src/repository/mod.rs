//! Repository trait definitions.
//!
//! Traits use native async fn (RPITIT). The project store ships with an
//! in-memory implementation; other backings implement the same trait.

pub mod in_memory;
pub mod project;

pub use in_memory::InMemoryProjectRepository;
pub use project::ProjectRepository;
