//! Liveness endpoint.

use axum::extract::State;
use serde::Serialize;

use devstudio_types::llm::ProviderKind;

use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub providers: Vec<ProviderKind>,
}

/// GET /health - Simple health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthBody> {
    ApiResponse::success(HealthBody {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        providers: state.assistant_service.adapter().configured(),
    })
}
