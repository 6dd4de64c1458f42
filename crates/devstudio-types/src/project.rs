use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a project, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    /// Create a new ProjectId using UUID v7 (time-sortable, guaranteed ordering).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a file inside a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub Uuid);

impl FileId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A code project owned by the project store.
///
/// Files are owned exclusively by their project and are destroyed with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Files in insertion order.
    pub files: Vec<ProjectFile>,
}

impl Project {
    /// Build a fresh project with no files.
    pub fn new(request: CreateProjectRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: ProjectId::new(),
            name: request.name,
            description: request.description,
            language: request.language,
            framework: request.framework,
            created_at: now,
            updated_at: now,
            files: Vec::new(),
        }
    }

    /// Bump `updated_at`, never letting it fall behind `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Apply a partial update. Only supplied fields change; `id`,
    /// `created_at` and `files` are preserved.
    pub fn apply_update(&mut self, update: UpdateProjectRequest, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(language) = update.language {
            self.language = language;
        }
        if let Some(framework) = update.framework {
            self.framework = Some(framework);
        }
        self.touch(now);
    }

    pub fn file(&self, file_id: &FileId) -> Option<&ProjectFile> {
        self.files.iter().find(|f| f.id == *file_id)
    }
}

/// A single source file inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub id: FileId,
    pub name: String,
    pub path: String,
    pub content: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectFile {
    pub fn new(request: AddFileRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: FileId::new(),
            name: request.name,
            path: request.path,
            content: request.content,
            language: request.language,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, preserving `id` and `created_at`.
    pub fn apply_update(&mut self, update: UpdateFileRequest, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(path) = update.path {
            self.path = path;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(language) = update.language {
            self.language = language;
        }
        self.updated_at = now.max(self.created_at);
    }
}

/// Request to create a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: String,
    pub language: String,
    pub framework: Option<String>,
}

/// Partial project update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub framework: Option<String>,
}

/// Request to add a file to a project. `content` may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFileRequest {
    pub name: String,
    pub path: String,
    pub content: String,
    pub language: String,
}

/// Partial file update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileRequest {
    pub name: Option<String>,
    pub path: Option<String>,
    pub content: Option<String>,
    pub language: Option<String>,
}
