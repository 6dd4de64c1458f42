//! Project and file CRUD handlers.
//!
//! Endpoints:
//! - POST   /api/projects                        - Create a project (201)
//! - GET    /api/projects                        - List projects, oldest first
//! - GET    /api/projects/{id}                   - Get a project
//! - PUT    /api/projects/{id}                   - Partial update
//! - DELETE /api/projects/{id}                   - Delete with its files
//! - POST   /api/projects/{id}/files             - Add a file (201)
//! - GET    /api/projects/{id}/files/{fileId}    - Get a file
//! - PUT    /api/projects/{id}/files/{fileId}    - Partial file update
//! - DELETE /api/projects/{id}/files/{fileId}    - Delete a file

use axum::extract::{Path, State};
use serde::Serialize;

use devstudio_types::error::ProjectError;
use devstudio_types::project::{
    AddFileRequest, CreateProjectRequest, FileId, Project, ProjectFile, ProjectId,
    UpdateFileRequest, UpdateProjectRequest,
};

use crate::http::error::AppError;
use crate::http::extractors::Validated;
use crate::http::response::{ApiResponse, ResultBody};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeletedBody {
    pub deleted: bool,
}

/// Ids that are not UUIDs cannot name a stored record.
fn parse_project_id(raw: &str) -> Result<ProjectId, AppError> {
    raw.parse()
        .map_err(|_| AppError::Project(ProjectError::ProjectNotFound))
}

fn parse_file_id(raw: &str) -> Result<FileId, AppError> {
    raw.parse()
        .map_err(|_| AppError::Project(ProjectError::FileNotFound))
}

pub async fn create_project(
    State(state): State<AppState>,
    Validated(request): Validated<CreateProjectRequest>,
) -> Result<ApiResponse<ResultBody<Project>>, AppError> {
    let project = state.project_service.create(request).await?;
    Ok(ApiResponse::created_result(project))
}

pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<ApiResponse<ResultBody<Vec<Project>>>, AppError> {
    let projects = state.project_service.list().await?;
    Ok(ApiResponse::result(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ResultBody<Project>>, AppError> {
    let id = parse_project_id(&id)?;
    let project = state.project_service.get(&id).await?;
    Ok(ApiResponse::result(project))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Validated(update): Validated<UpdateProjectRequest>,
) -> Result<ApiResponse<ResultBody<Project>>, AppError> {
    let id = parse_project_id(&id)?;
    let project = state.project_service.update(&id, update).await?;
    Ok(ApiResponse::result(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<DeletedBody>, AppError> {
    let id = parse_project_id(&id)?;
    state.project_service.delete(&id).await?;
    Ok(ApiResponse::success(DeletedBody { deleted: true }))
}

pub async fn add_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Validated(request): Validated<AddFileRequest>,
) -> Result<ApiResponse<ResultBody<ProjectFile>>, AppError> {
    let id = parse_project_id(&id)?;
    let file = state.project_service.add_file(&id, request).await?;
    Ok(ApiResponse::created_result(file))
}

pub async fn get_file(
    State(state): State<AppState>,
    Path((id, file_id)): Path<(String, String)>,
) -> Result<ApiResponse<ResultBody<ProjectFile>>, AppError> {
    let id = parse_project_id(&id)?;
    let file_id = parse_file_id(&file_id)?;
    let file = state.project_service.get_file(&id, &file_id).await?;
    Ok(ApiResponse::result(file))
}

pub async fn update_file(
    State(state): State<AppState>,
    Path((id, file_id)): Path<(String, String)>,
    Validated(update): Validated<UpdateFileRequest>,
) -> Result<ApiResponse<ResultBody<ProjectFile>>, AppError> {
    let id = parse_project_id(&id)?;
    let file_id = parse_file_id(&file_id)?;
    let file = state
        .project_service
        .update_file(&id, &file_id, update)
        .await?;
    Ok(ApiResponse::result(file))
}

pub async fn delete_file(
    State(state): State<AppState>,
    Path((id, file_id)): Path<(String, String)>,
) -> Result<ApiResponse<DeletedBody>, AppError> {
    let id = parse_project_id(&id)?;
    let file_id = parse_file_id(&file_id)?;
    state.project_service.delete_file(&id, &file_id).await?;
    Ok(ApiResponse::success(DeletedBody { deleted: true }))
}
