use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A request payload that failed validation, listing every violated field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid request: {}", summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldViolation::new(field, message)])
    }

    /// Whether any violation names `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors related to project and file operations.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project not found")]
    ProjectNotFound,

    #[error("file not found")]
    FileNotFound,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to session memory.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("storage error: {0}")]
    StorageError(String),

    #[error("corrupt memory store: {0}")]
    Corrupt(String),
}

/// Errors from repository operations (used by trait definitions in devstudio-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("conflict: {0}")]
    Conflict(String),
}
