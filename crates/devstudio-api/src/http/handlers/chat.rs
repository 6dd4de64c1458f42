//! Chat and model listing handlers.

use axum::extract::State;
use serde::Serialize;

use devstudio_types::llm::{ProviderKind, Usage};
use devstudio_types::operation::{Operation, OperationRequest};

use crate::http::error::AppError;
use crate::http::extractors::JsonBody;
use crate::http::handlers::ai::run_operation;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    pub response: String,
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsBody {
    pub models: Vec<String>,
    pub default_provider: ProviderKind,
}

/// POST /api/ai/chat - One conversational turn, with optional session memory.
pub async fn chat(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<ChatBody>, AppError> {
    let (request, response) = run_operation(&state, Operation::Chat, &body).await?;
    let session_id = match request {
        OperationRequest::Chat(chat) => chat.session_id,
        _ => None,
    };

    Ok(ApiResponse::success(ChatBody {
        response: response.result.unwrap_or_default(),
        model: response.model,
        session_id,
        usage: response.usage,
        provider: response.provider,
    }))
}

/// GET /api/ai/models - Models a client may pick for chat.
pub async fn list_models(State(state): State<AppState>) -> ApiResponse<ModelsBody> {
    ApiResponse::success(ModelsBody {
        models: state.assistant_service.models(),
        default_provider: state.assistant_service.default_provider(),
    })
}
