//! Success envelope for API responses.
//!
//! Every success body is a JSON object carrying `"success": true` next to
//! the handler's own fields:
//! ```json
//! { "success": true, "result": { ... } }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Success envelope. `T` must serialize to a JSON object; its fields are
/// flattened next to `success`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

/// Body for endpoints that return a single value under `result`.
#[derive(Debug, Serialize)]
pub struct ResultBody<T: Serialize> {
    pub result: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            status: StatusCode::OK,
        }
    }

    /// 201 Created.
    pub fn created(data: T) -> Self {
        Self {
            success: true,
            data,
            status: StatusCode::CREATED,
        }
    }
}

impl<T: Serialize> ApiResponse<ResultBody<T>> {
    pub fn result(result: T) -> Self {
        Self::success(ResultBody { result })
    }

    pub fn created_result(result: T) -> Self {
        Self::created(ResultBody { result })
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
