//! Application services.
//!
//! Services are generic over the repository/store traits so this crate
//! never depends on devstudio-infra.

pub mod assistant;
pub mod project;

pub use assistant::AssistantService;
pub use project::ProjectService;
