//! Application error type mapping to HTTP status codes and the error envelope.
//!
//! Error bodies have the shape
//! `{"success": false, "error": "...", "code": "...", "details"?: [...], "trace"?: "..."}`.
//! `into_response` always renders the full body and stashes an
//! [`ErrorEnvelope`] in the response extensions; in production the
//! [`redact_errors`] layer re-renders it without diagnostics.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use devstudio_types::config::Environment;
use devstudio_types::error::{FieldViolation, MemoryError, ProjectError, ValidationError};
use devstudio_types::llm::{AiResponse, ProviderErrorKind};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Payload failed field validation.
    Validation(ValidationError),
    /// Body or query string could not be parsed.
    MalformedRequest(String),
    /// Body exceeded the size limit.
    PayloadTooLarge,
    /// Project store errors.
    Project(ProjectError),
    /// Session memory backing failed.
    Memory(MemoryError),
    /// Provider adapter reported a failure.
    Provider {
        kind: ProviderErrorKind,
        message: String,
    },
    /// Client exceeded its request budget.
    RateLimited { retry_after_secs: u64 },
    /// No route matched.
    RouteNotFound,
    /// Known path, unsupported method.
    MethodNotAllowed,
    /// Generic internal error.
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e)
    }
}

impl From<ProjectError> for AppError {
    fn from(e: ProjectError) -> Self {
        AppError::Project(e)
    }
}

impl From<MemoryError> for AppError {
    fn from(e: MemoryError) -> Self {
        AppError::Memory(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::MalformedRequest(rejection.body_text())
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}

impl AppError {
    /// Turn a failed [`AiResponse`] into an error. Returns `None` on success.
    pub fn from_ai_failure(response: &AiResponse) -> Option<Self> {
        if response.success {
            return None;
        }
        Some(AppError::Provider {
            kind: response.error_kind.unwrap_or(ProviderErrorKind::Call),
            message: response
                .error
                .clone()
                .unwrap_or_else(|| "provider call failed".to_string()),
        })
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Project(ProjectError::ProjectNotFound | ProjectError::FileNotFound) => {
                StatusCode::NOT_FOUND
            }
            AppError::Project(ProjectError::StorageError(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Memory(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Provider {
                kind: ProviderErrorKind::Timeout,
                ..
            } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Provider { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn envelope(&self) -> ErrorEnvelope {
        let (code, error, trace): (&str, String, Option<String>) = match self {
            AppError::Validation(_) => ("VALIDATION_ERROR", "Invalid request data".into(), None),
            AppError::MalformedRequest(msg) => {
                ("INVALID_JSON", "Malformed request".into(), Some(msg.clone()))
            }
            AppError::PayloadTooLarge => ("PAYLOAD_TOO_LARGE", "Request body too large".into(), None),
            AppError::Project(ProjectError::ProjectNotFound) => {
                ("PROJECT_NOT_FOUND", "Project not found".into(), None)
            }
            AppError::Project(ProjectError::FileNotFound) => {
                ("FILE_NOT_FOUND", "File not found".into(), None)
            }
            AppError::Project(e @ ProjectError::StorageError(_)) => {
                ("STORAGE_ERROR", "Project storage failed".into(), Some(e.to_string()))
            }
            AppError::Memory(e) => (
                "MEMORY_ERROR",
                "Session memory unavailable".into(),
                Some(e.to_string()),
            ),
            AppError::Provider { kind, message } => {
                let code = match kind {
                    ProviderErrorKind::Config => "PROVIDER_CONFIG",
                    ProviderErrorKind::Call => "PROVIDER_ERROR",
                    ProviderErrorKind::Timeout => "PROVIDER_TIMEOUT",
                };
                (code, message.clone(), Some(message.clone()))
            }
            AppError::RateLimited { .. } => (
                "RATE_LIMITED",
                "Too many requests, please try again later".into(),
                None,
            ),
            AppError::RouteNotFound => ("ROUTE_NOT_FOUND", "Route not found".into(), None),
            AppError::MethodNotAllowed => {
                ("METHOD_NOT_ALLOWED", "Method not allowed".into(), None)
            }
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone(), Some(msg.clone())),
        };

        let details = match self {
            AppError::Validation(v) => Some(v.violations.clone()),
            _ => None,
        };

        ErrorEnvelope {
            success: false,
            error,
            code: code.to_string(),
            details,
            trace,
        }
    }
}

/// Serialized error body. Also stored as a response extension so the
/// production layer can redact it.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldViolation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl ErrorEnvelope {
    /// Body without internal diagnostics. Server-side failures also lose
    /// their message.
    pub fn redacted(mut self, status: StatusCode) -> Self {
        self.trace = None;
        if status.is_server_error() {
            self.error = "Internal server error".to_string();
        }
        self
    }

    fn into_response_with(self, status: StatusCode) -> Response {
        let body = serde_json::to_string(&self).unwrap_or_else(|_| {
            r#"{"success":false,"error":"Internal server error","code":"SERIALIZATION_ERROR"}"#
                .to_string()
        });

        let mut response = (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, %status, "Request failed");
        } else {
            tracing::debug!(error = ?self, %status, "Request rejected");
        }

        let mut response = self.envelope().into_response_with(status);
        if let AppError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

/// In production, strip diagnostics from error bodies.
pub async fn redact_errors(
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !environment.is_production() {
        return response;
    }

    let status = response.status();
    let envelope = response.extensions().get::<ErrorEnvelope>().cloned();
    match envelope {
        Some(envelope) => {
            let (parts, _) = response.into_parts();
            let mut redacted = envelope.redacted(status).into_response_with(status);
            for (name, value) in parts.headers.iter() {
                if name != header::CONTENT_LENGTH {
                    redacted.headers_mut().insert(name.clone(), value.clone());
                }
            }
            redacted
        }
        None => response,
    }
}

/// Body for a caught panic: the generic 500 envelope.
pub fn panic_response(_panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked");
    AppError::Internal("Internal server error".to_string()).into_response()
}
