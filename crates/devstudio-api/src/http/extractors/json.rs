//! JSON body extractors that report failures through the error envelope.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde_json::Value;

use devstudio_core::validation::Validate;

use crate::http::error::AppError;
use crate::state::AppState;

/// Any well-formed JSON body. Malformed JSON becomes a 400 envelope
/// instead of axum's plain-text rejection.
#[derive(Debug)]
pub struct JsonBody(pub Value);

impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

/// A body that passed field validation for `T`.
#[derive(Debug)]
pub struct Validated<T>(pub T);

impl<T: Validate + Send> FromRequest<AppState> for Validated<T> {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::from_request(req, state).await?;
        let typed = T::validate(&value, &state.rules)?;
        Ok(Validated(typed))
    }
}
