//! In-memory project repository backed by `DashMap`.
//!
//! Values are cloned on read so no `DashMap` guard is held across an await.
//! `modify` runs under the shard's write lock, which serializes concurrent
//! read-modify-write cycles on the same project.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use devstudio_types::error::RepositoryError;
use devstudio_types::project::{Project, ProjectId};

use super::project::ProjectRepository;

/// Thread-safe project store. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    inner: Arc<DashMap<ProjectId, Project>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectRepository for InMemoryProjectRepository {
    async fn insert(&self, project: Project) -> Result<(), RepositoryError> {
        match self.inner.entry(project.id) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict(format!(
                "project {} already exists",
                project.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(project);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Ok(self.inner.get(id).map(|p| p.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        let mut projects: Vec<Project> = self.inner.iter().map(|e| e.value().clone()).collect();
        // v7 ids sort by creation time
        projects.sort_by_key(|p| p.id);
        Ok(projects)
    }

    async fn modify<F, R>(&self, id: &ProjectId, f: F) -> Result<Option<R>, RepositoryError>
    where
        F: FnOnce(&mut Project) -> R + Send,
        R: Send,
    {
        Ok(self.inner.get_mut(id).map(|mut entry| f(entry.value_mut())))
    }

    async fn remove(&self, id: &ProjectId) -> Result<bool, RepositoryError> {
        Ok(self.inner.remove(id).is_some())
    }
}
