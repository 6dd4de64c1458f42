//! Session memory handlers.
//!
//! Endpoints:
//! - POST /api/ai/memory/clear        - Forget a session
//! - GET  /api/ai/memory/{sessionId}  - Recent messages (`?limit=`, default 20)

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use devstudio_core::memory::DEFAULT_MEMORY_LIMIT;
use devstudio_types::chat::{ChatMessage, ClearMemoryRequest};

use crate::http::error::AppError;
use crate::http::extractors::Validated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MemoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesBody {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedBody {
    pub session_id: String,
}

/// POST /api/ai/memory/clear
pub async fn clear_memory(
    State(state): State<AppState>,
    Validated(request): Validated<ClearMemoryRequest>,
) -> Result<ApiResponse<ClearedBody>, AppError> {
    state
        .assistant_service
        .clear_memory(&request.session_id)
        .await?;
    Ok(ApiResponse::success(ClearedBody {
        session_id: request.session_id,
    }))
}

/// GET /api/ai/memory/{sessionId}
pub async fn get_memory(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    query: Result<Query<MemoryQuery>, QueryRejection>,
) -> Result<ApiResponse<MessagesBody>, AppError> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_MEMORY_LIMIT);
    let messages = state
        .assistant_service
        .session_history(&session_id, limit)
        .await?;

    Ok(ApiResponse::success(MessagesBody {
        session_id,
        messages,
    }))
}
