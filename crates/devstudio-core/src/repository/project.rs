//! Project repository trait definition.

use devstudio_types::error::RepositoryError;
use devstudio_types::project::{Project, ProjectId};

/// Repository trait for project persistence.
///
/// Files live inside their project, so a single record covers both.
/// `modify` must apply its closure atomically with respect to other
/// mutations of the same project.
pub trait ProjectRepository: Send + Sync {
    /// Store a new project. Fails with `Conflict` if the id already exists.
    fn insert(
        &self,
        project: Project,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn get(
        &self,
        id: &ProjectId,
    ) -> impl std::future::Future<Output = Result<Option<Project>, RepositoryError>> + Send;

    /// All projects, oldest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Project>, RepositoryError>> + Send;

    /// Run `f` against the stored project under an exclusive lock.
    ///
    /// Returns `None` if the project does not exist.
    fn modify<F, R>(
        &self,
        id: &ProjectId,
        f: F,
    ) -> impl std::future::Future<Output = Result<Option<R>, RepositoryError>> + Send
    where
        F: FnOnce(&mut Project) -> R + Send,
        R: Send;

    /// Delete a project and its files. Returns whether it existed.
    fn remove(
        &self,
        id: &ProjectId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
