//! HTTP/REST API layer for Dev Studio.
//!
//! Axum-based JSON API under `/api/ai` and `/api/projects` with a uniform
//! success/error envelope, CORS, rate limiting and request tracing.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;
