//! Project management service.
//!
//! Wraps a [`ProjectRepository`] with the project/file CRUD contract:
//! unknown ids surface as `ProjectNotFound`/`FileNotFound`, and every
//! mutation bumps the owning project's `updated_at`.

use chrono::Utc;

use devstudio_types::error::{ProjectError, RepositoryError};
use devstudio_types::project::{
    AddFileRequest, CreateProjectRequest, FileId, Project, ProjectFile, ProjectId,
    UpdateFileRequest, UpdateProjectRequest,
};

use crate::repository::project::ProjectRepository;

fn storage(e: RepositoryError) -> ProjectError {
    ProjectError::StorageError(e.to_string())
}

/// Service orchestrating project and file lifecycles.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn create(&self, request: CreateProjectRequest) -> Result<Project, ProjectError> {
        let project = Project::new(request, Utc::now());
        self.repo.insert(project.clone()).await.map_err(storage)?;
        tracing::info!(project_id = %project.id, name = %project.name, "Project created");
        Ok(project)
    }

    pub async fn get(&self, id: &ProjectId) -> Result<Project, ProjectError> {
        self.repo
            .get(id)
            .await
            .map_err(storage)?
            .ok_or(ProjectError::ProjectNotFound)
    }

    /// All projects, oldest first.
    pub async fn list(&self) -> Result<Vec<Project>, ProjectError> {
        self.repo.list().await.map_err(storage)
    }

    /// Apply a partial update; `id`, `created_at` and files are preserved.
    pub async fn update(
        &self,
        id: &ProjectId,
        update: UpdateProjectRequest,
    ) -> Result<Project, ProjectError> {
        self.repo
            .modify(id, move |project| {
                project.apply_update(update, Utc::now());
                project.clone()
            })
            .await
            .map_err(storage)?
            .ok_or(ProjectError::ProjectNotFound)
    }

    /// Delete a project together with its files.
    pub async fn delete(&self, id: &ProjectId) -> Result<(), ProjectError> {
        if self.repo.remove(id).await.map_err(storage)? {
            tracing::info!(project_id = %id, "Project deleted");
            Ok(())
        } else {
            Err(ProjectError::ProjectNotFound)
        }
    }

    pub async fn add_file(
        &self,
        id: &ProjectId,
        request: AddFileRequest,
    ) -> Result<ProjectFile, ProjectError> {
        self.repo
            .modify(id, move |project| {
                let now = Utc::now();
                let file = ProjectFile::new(request, now);
                project.files.push(file.clone());
                project.touch(now);
                file
            })
            .await
            .map_err(storage)?
            .ok_or(ProjectError::ProjectNotFound)
    }

    pub async fn get_file(
        &self,
        id: &ProjectId,
        file_id: &FileId,
    ) -> Result<ProjectFile, ProjectError> {
        self.get(id)
            .await?
            .file(file_id)
            .cloned()
            .ok_or(ProjectError::FileNotFound)
    }

    /// Apply a partial file update; `id` and `created_at` are preserved.
    pub async fn update_file(
        &self,
        id: &ProjectId,
        file_id: &FileId,
        update: UpdateFileRequest,
    ) -> Result<ProjectFile, ProjectError> {
        let file_id = *file_id;
        self.repo
            .modify(id, move |project| {
                let now = Utc::now();
                let file = project
                    .files
                    .iter_mut()
                    .find(|f| f.id == file_id)
                    .ok_or(ProjectError::FileNotFound)?;
                file.apply_update(update, now);
                let updated = file.clone();
                project.touch(now);
                Ok(updated)
            })
            .await
            .map_err(storage)?
            .ok_or(ProjectError::ProjectNotFound)?
    }

    pub async fn delete_file(&self, id: &ProjectId, file_id: &FileId) -> Result<(), ProjectError> {
        let file_id = *file_id;
        self.repo
            .modify(id, move |project| {
                let before = project.files.len();
                project.files.retain(|f| f.id != file_id);
                if project.files.len() == before {
                    return Err(ProjectError::FileNotFound);
                }
                project.touch(Utc::now());
                Ok(())
            })
            .await
            .map_err(storage)?
            .ok_or(ProjectError::ProjectNotFound)?
    }
}
