//! Payload rules for project and file requests.

use serde_json::Value;

use devstudio_types::error::ValidationError;
use devstudio_types::project::{
    AddFileRequest, CreateProjectRequest, UpdateFileRequest, UpdateProjectRequest,
};

use super::{FieldReader, Validate, ValidationRules};

impl Validate for CreateProjectRequest {
    fn validate(raw: &Value, _rules: &ValidationRules) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw);
        let request = CreateProjectRequest {
            name: r.required_string("name"),
            description: r.required_string("description"),
            language: r.required_string("language"),
            framework: r.optional_string("framework"),
        };
        r.finish(request)
    }
}

impl Validate for UpdateProjectRequest {
    fn validate(raw: &Value, _rules: &ValidationRules) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw);
        let request = UpdateProjectRequest {
            name: r.optional_non_empty_string("name"),
            description: r.optional_string("description"),
            language: r.optional_non_empty_string("language"),
            framework: r.optional_string("framework"),
        };
        r.finish(request)
    }
}

impl Validate for AddFileRequest {
    fn validate(raw: &Value, _rules: &ValidationRules) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw);
        let request = AddFileRequest {
            name: r.required_string("name"),
            path: r.required_string("path"),
            content: r.string_allow_empty("content"),
            language: r.required_string("language"),
        };
        r.finish(request)
    }
}

impl Validate for UpdateFileRequest {
    fn validate(raw: &Value, _rules: &ValidationRules) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw);
        let request = UpdateFileRequest {
            name: r.optional_non_empty_string("name"),
            path: r.optional_non_empty_string("path"),
            content: r.optional_string("content"),
            language: r.optional_non_empty_string("language"),
        };
        r.finish(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_project_requires_fields() {
        let err = CreateProjectRequest::validate(&json!({"name": "demo"}), &ValidationRules::default())
            .unwrap_err();
        assert!(err.mentions("description"));
        assert!(err.mentions("language"));
        assert!(!err.mentions("name"));
    }

    #[test]
    fn test_add_file_allows_empty_content() {
        let raw = json!({"name": "main.go", "path": "/main.go", "content": "", "language": "go"});
        let req = AddFileRequest::validate(&raw, &ValidationRules::default()).unwrap();
        assert_eq!(req.content, "");

        let raw = json!({"name": "main.go", "path": "/main.go", "language": "go"});
        let err = AddFileRequest::validate(&raw, &ValidationRules::default()).unwrap_err();
        assert!(err.mentions("content"));
    }

    #[test]
    fn test_updates_reject_blank_identity_fields() {
        let err = UpdateProjectRequest::validate(&json!({"name": " "}), &ValidationRules::default())
            .unwrap_err();
        assert!(err.mentions("name"));

        let req = UpdateProjectRequest::validate(&json!({"description": ""}), &ValidationRules::default())
            .unwrap();
        assert_eq!(req.description.as_deref(), Some(""));
        assert_eq!(req.name, None);

        let err = UpdateFileRequest::validate(&json!({"path": ""}), &ValidationRules::default())
            .unwrap_err();
        assert!(err.mentions("path"));
    }
}
