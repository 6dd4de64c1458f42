//! Handlers for the single-shot LLM operations.
//!
//! Endpoints:
//! - POST /api/ai/generate
//! - POST /api/ai/review
//! - POST /api/ai/debug
//! - POST /api/ai/document
//! - POST /api/ai/test
//! - POST /api/ai/refactor
//! - POST /api/ai/explain

use axum::extract::State;
use serde::Serialize;
use serde_json::Value;

use devstudio_core::prompt::extract_code;
use devstudio_core::validation::validate_operation;
use devstudio_types::llm::{AiResponse, ProviderKind, Usage};
use devstudio_types::operation::{Operation, OperationRequest};

use crate::http::error::AppError;
use crate::http::extractors::JsonBody;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body of a successful assist call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistBody {
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl From<AiResponse> for AssistBody {
    fn from(resp: AiResponse) -> Self {
        Self {
            result: resp.result.unwrap_or_default(),
            usage: resp.usage,
            provider: resp.provider,
            model: resp.model,
        }
    }
}

/// Generation adds the extracted code and the requested language.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    pub code: String,
    pub language: String,
    #[serde(flatten)]
    pub assist: AssistBody,
}

/// Validate, run, and turn a provider failure into an error response.
pub(crate) async fn run_operation(
    state: &AppState,
    operation: Operation,
    body: &Value,
) -> Result<(OperationRequest, AiResponse), AppError> {
    let request = validate_operation(operation, body, &state.rules)?;
    let response = state.assistant_service.execute(&request).await?;
    match AppError::from_ai_failure(&response) {
        Some(err) => Err(err),
        None => Ok((request, response)),
    }
}

async fn assist(
    state: AppState,
    operation: Operation,
    body: Value,
) -> Result<ApiResponse<AssistBody>, AppError> {
    let (_, response) = run_operation(&state, operation, &body).await?;
    Ok(ApiResponse::success(response.into()))
}

/// POST /api/ai/generate
pub async fn generate(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<GenerateBody>, AppError> {
    let (request, response) = run_operation(&state, Operation::Generate, &body).await?;
    let language = match request {
        OperationRequest::Generate(generate) => generate.language,
        _ => String::new(),
    };
    let assist = AssistBody::from(response);

    Ok(ApiResponse::success(GenerateBody {
        code: extract_code(&assist.result),
        language,
        assist,
    }))
}

/// POST /api/ai/review
pub async fn review(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<AssistBody>, AppError> {
    assist(state, Operation::Review, body).await
}

/// POST /api/ai/debug
pub async fn debug(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<AssistBody>, AppError> {
    assist(state, Operation::Debug, body).await
}

/// POST /api/ai/document
pub async fn document(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<AssistBody>, AppError> {
    assist(state, Operation::Document, body).await
}

/// POST /api/ai/test
pub async fn test(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<AssistBody>, AppError> {
    assist(state, Operation::Test, body).await
}

/// POST /api/ai/refactor
pub async fn refactor(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<AssistBody>, AppError> {
    assist(state, Operation::Refactor, body).await
}

/// POST /api/ai/explain
pub async fn explain(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<AssistBody>, AppError> {
    assist(state, Operation::Explain, body).await
}
