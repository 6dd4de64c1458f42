//! Payload rules for the LLM-backed operations.

use chrono::{DateTime, Utc};
use serde_json::Value;

use devstudio_types::chat::{ChatMessage, ChatRole, ClearMemoryRequest};
use devstudio_types::error::ValidationError;
use devstudio_types::operation::{
    ChatContext, ChatRequest, DebugRequest, DocStyle, DocumentRequest, ExplainRequest, FocusArea,
    GenerateRequest, Operation, OperationRequest, RefactorGoal, RefactorRequest, ReviewRequest,
    TestRequest,
};

use super::{FieldReader, Validate, ValidationRules};

/// Validate `raw` against the rules of `operation`.
pub fn validate_operation(
    operation: Operation,
    raw: &Value,
    rules: &ValidationRules,
) -> Result<OperationRequest, ValidationError> {
    let request = match operation {
        Operation::Generate => OperationRequest::Generate(GenerateRequest::validate(raw, rules)?),
        Operation::Review => OperationRequest::Review(ReviewRequest::validate(raw, rules)?),
        Operation::Debug => OperationRequest::Debug(DebugRequest::validate(raw, rules)?),
        Operation::Document => OperationRequest::Document(DocumentRequest::validate(raw, rules)?),
        Operation::Test => OperationRequest::Test(TestRequest::validate(raw, rules)?),
        Operation::Chat => OperationRequest::Chat(ChatRequest::validate(raw, rules)?),
        Operation::Refactor => OperationRequest::Refactor(RefactorRequest::validate(raw, rules)?),
        Operation::Explain => OperationRequest::Explain(ExplainRequest::validate(raw, rules)?),
    };
    Ok(request)
}

impl Validate for GenerateRequest {
    fn validate(raw: &Value, _rules: &ValidationRules) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw);
        let request = GenerateRequest {
            prompt: r.required_string("prompt"),
            language: r.required_string("language"),
            context: r.optional_string("context"),
            framework: r.optional_string("framework"),
            provider: r.optional_provider(),
        };
        r.finish(request)
    }
}

impl Validate for ReviewRequest {
    fn validate(raw: &Value, _rules: &ValidationRules) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw);
        let request = ReviewRequest {
            code: r.required_string("code"),
            language: r.required_string("language"),
            focus_areas: r.optional_enum_array::<FocusArea>("focusAreas", &FocusArea::NAMES),
            provider: r.optional_provider(),
        };
        r.finish(request)
    }
}

impl Validate for DebugRequest {
    fn validate(raw: &Value, _rules: &ValidationRules) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw);
        let request = DebugRequest {
            code: r.required_string("code"),
            language: r.required_string("language"),
            error: r.optional_string("error"),
            context: r.optional_string("context"),
            provider: r.optional_provider(),
        };
        r.finish(request)
    }
}

impl Validate for DocumentRequest {
    fn validate(raw: &Value, _rules: &ValidationRules) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw);
        let request = DocumentRequest {
            code: r.required_string("code"),
            language: r.required_string("language"),
            style: r.optional_enum::<DocStyle>("style", &DocStyle::NAMES),
            provider: r.optional_provider(),
        };
        r.finish(request)
    }
}

impl Validate for TestRequest {
    fn validate(raw: &Value, _rules: &ValidationRules) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw);
        let request = TestRequest {
            code: r.required_string("code"),
            language: r.required_string("language"),
            framework: r.optional_string("framework"),
            coverage_target: r.optional_number_in_range("coverageTarget", 0.0, 100.0),
            provider: r.optional_provider(),
        };
        r.finish(request)
    }
}

impl Validate for RefactorRequest {
    fn validate(raw: &Value, _rules: &ValidationRules) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw);
        let request = RefactorRequest {
            code: r.required_string("code"),
            language: r.required_string("language"),
            goal: r.optional_enum::<RefactorGoal>("goal", &RefactorGoal::NAMES),
            provider: r.optional_provider(),
        };
        r.finish(request)
    }
}

impl Validate for ExplainRequest {
    fn validate(raw: &Value, _rules: &ValidationRules) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw);
        let request = ExplainRequest {
            code: r.required_string("code"),
            language: r.required_string("language"),
            provider: r.optional_provider(),
        };
        r.finish(request)
    }
}

impl Validate for ChatRequest {
    fn validate(raw: &Value, rules: &ValidationRules) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw);
        let message = r.required_string("message");

        let history_key = if r.get("history").is_none() && r.get("conversationHistory").is_some() {
            "conversationHistory"
        } else {
            "history"
        };
        let history = r.optional_object_array(history_key, read_chat_message);

        let context = r.optional_object("context", |ctx| ChatContext {
            code: ctx.optional_string("code"),
            language: ctx.optional_string("language"),
            project_info: ctx.optional_string("projectInfo"),
        });
        let session_id = r.optional_non_empty_string("sessionId");

        let model = r.optional_non_empty_string("model");
        let disallowed = model.as_ref().is_some_and(|m| {
            !rules.allowed_chat_models.is_empty() && !rules.allowed_chat_models.contains(m)
        });
        if disallowed {
            r.violate(
                "model",
                format!(
                    "model must be one of: {}",
                    rules.allowed_chat_models.join(", ")
                ),
            );
        }

        let request = ChatRequest {
            message,
            history,
            context,
            session_id,
            model,
            use_memory: r.optional_bool("useMemory"),
            provider: r.optional_provider(),
        };
        r.finish(request)
    }
}

fn read_chat_message(m: &mut FieldReader<'_>) -> ChatMessage {
    let role = m.optional_enum::<ChatRole>("role", &["user", "assistant"]);
    if role.is_none() && m.get("role").is_none() {
        let field = m.path("role");
        m.violate(field.clone(), format!("{field} is required"));
    }
    let content = m.string_allow_empty("content");
    let timestamp = m.optional_string("timestamp").and_then(|ts| {
        match DateTime::parse_from_rfc3339(&ts) {
            Ok(parsed) => Some(parsed.with_timezone(&Utc)),
            Err(_) => {
                let field = m.path("timestamp");
                m.violate(field.clone(), format!("{field} must be an RFC 3339 timestamp"));
                None
            }
        }
    });
    ChatMessage {
        role: role.unwrap_or(ChatRole::User),
        content,
        timestamp,
    }
}

impl Validate for ClearMemoryRequest {
    fn validate(raw: &Value, _rules: &ValidationRules) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw);
        let request = ClearMemoryRequest {
            session_id: r.required_string("sessionId"),
        };
        r.finish(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devstudio_types::llm::ProviderKind;
    use serde_json::json;

    fn rules() -> ValidationRules {
        ValidationRules::default()
    }

    #[test]
    fn test_generate_valid() {
        let raw = json!({"prompt": "add two numbers", "language": "python", "provider": "openai"});
        let req = validate_operation(Operation::Generate, &raw, &rules()).unwrap();
        let OperationRequest::Generate(req) = req else {
            panic!("expected generate request");
        };
        assert_eq!(req.prompt, "add two numbers");
        assert_eq!(req.provider, Some(ProviderKind::OpenAi));
        assert_eq!(req.context, None);
    }

    #[test]
    fn test_empty_code_cites_code() {
        let raw = json!({"code": "", "language": "typescript"});
        let err = validate_operation(Operation::Test, &raw, &rules()).unwrap_err();
        assert!(err.mentions("code"));
        assert!(!err.mentions("language"));
    }

    #[test]
    fn test_every_missing_field_is_reported() {
        for op in Operation::ALL {
            let err = validate_operation(op, &json!({}), &rules()).unwrap_err();
            match op {
                Operation::Generate => {
                    assert!(err.mentions("prompt") && err.mentions("language"));
                }
                Operation::Chat => assert!(err.mentions("message")),
                _ => assert!(err.mentions("code") && err.mentions("language"), "{op}"),
            }
        }
    }

    #[test]
    fn test_coverage_target_bounds() {
        let ok = json!({"code": "x", "language": "ts", "coverageTarget": 100});
        assert!(validate_operation(Operation::Test, &ok, &rules()).is_ok());

        let bad = json!({"code": "x", "language": "ts", "coverageTarget": 101});
        let err = validate_operation(Operation::Test, &bad, &rules()).unwrap_err();
        assert!(err.mentions("coverageTarget"));

        let negative = json!({"code": "x", "language": "ts", "coverageTarget": -1});
        assert!(validate_operation(Operation::Test, &negative, &rules()).is_err());
    }

    #[test]
    fn test_enum_fields_are_restricted() {
        let raw = json!({"code": "x", "language": "js", "style": "haiku"});
        let err = validate_operation(Operation::Document, &raw, &rules()).unwrap_err();
        assert!(err.mentions("style"));

        let raw = json!({"code": "x", "language": "js", "focusAreas": ["security", "vibes"]});
        let err = validate_operation(Operation::Review, &raw, &rules()).unwrap_err();
        assert!(err.mentions("focusAreas[1]"));
        assert!(!err.mentions("focusAreas[0]"));

        let raw = json!({"code": "x", "language": "js", "goal": "dry"});
        let req = validate_operation(Operation::Refactor, &raw, &rules()).unwrap();
        let OperationRequest::Refactor(req) = req else {
            panic!("expected refactor request");
        };
        assert_eq!(req.goal, Some(RefactorGoal::Dry));
    }

    #[test]
    fn test_multiple_violations_collected() {
        let raw = json!({"code": 42, "style": "poem", "provider": "cohere"});
        let err = validate_operation(Operation::Document, &raw, &rules()).unwrap_err();
        assert!(err.mentions("code"));
        assert!(err.mentions("language"));
        assert!(err.mentions("style"));
        assert!(err.mentions("provider"));
        assert_eq!(err.violations.len(), 4);
    }

    #[test]
    fn test_chat_full_payload() {
        let raw = json!({
            "message": "why?",
            "conversationHistory": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "", "timestamp": "2024-05-01T10:00:00Z"}
            ],
            "context": {"code": "fn main() {}", "language": "rust", "projectInfo": "cli"},
            "sessionId": "s1",
            "useMemory": true
        });
        let req = ChatRequest::validate(&raw, &rules()).unwrap();
        assert_eq!(req.history.len(), 2);
        assert_eq!(req.history[1].role, ChatRole::Assistant);
        assert!(req.history[1].timestamp.is_some());
        assert_eq!(req.context.as_ref().unwrap().project_info.as_deref(), Some("cli"));
        assert_eq!(req.memory_session(), Some("s1"));
    }

    #[test]
    fn test_chat_history_violations_are_indexed() {
        let raw = json!({
            "message": "hi",
            "history": [{"role": "system", "content": "x"}, {"content": "y"}, "nope"]
        });
        let err = ChatRequest::validate(&raw, &rules()).unwrap_err();
        assert!(err.mentions("history[0].role"));
        assert!(err.mentions("history[1].role"));
        assert!(err.mentions("history[2]"));
    }

    #[test]
    fn test_chat_model_must_be_allowed() {
        let rules = ValidationRules {
            allowed_chat_models: vec!["gpt-4o".to_string()],
        };
        let raw = json!({"message": "hi", "model": "claude-3-opus"});
        let err = ChatRequest::validate(&raw, &rules).unwrap_err();
        assert!(err.mentions("model"));

        let raw = json!({"message": "hi", "model": "gpt-4o"});
        assert!(ChatRequest::validate(&raw, &rules).is_ok());

        // empty allow-list accepts any model
        let raw = json!({"message": "hi", "model": "claude-3-opus"});
        assert!(ChatRequest::validate(&raw, &ValidationRules::default()).is_ok());
    }

    #[test]
    fn test_chat_use_memory_must_be_bool() {
        let raw = json!({"message": "hi", "useMemory": "yes"});
        let err = ChatRequest::validate(&raw, &rules()).unwrap_err();
        assert!(err.mentions("useMemory"));
    }

    #[test]
    fn test_clear_memory_requires_session() {
        let err = ClearMemoryRequest::validate(&json!({}), &rules()).unwrap_err();
        assert!(err.mentions("sessionId"));
        let req = ClearMemoryRequest::validate(&json!({"sessionId": "s1"}), &rules()).unwrap();
        assert_eq!(req.session_id, "s1");
    }
}
