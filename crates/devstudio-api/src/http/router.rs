//! Axum router configuration with middleware.
//!
//! Routes live under `/api/ai` and `/api/projects`, plus `/health`.
//! Middleware: request tracing, CORS, rate limiting on `/api`, a 10 MB body
//! limit, a panic catcher, and error redaction in production.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::error::{AppError, panic_response, redact_errors};
use crate::http::handlers::{ai, chat, health, memory, project};
use crate::http::middleware::rate_limit::rate_limit;
use crate::state::AppState;

/// Maximum accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// CORS restricted to `allowed_origin` (with credentials) when configured,
/// permissive otherwise.
fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let permissive = || {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    match allowed_origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        Some(Err(err)) => {
            tracing::warn!("Invalid allowed origin ({err}), falling back to permissive CORS");
            permissive()
        }
        None => permissive(),
    }
}

async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // LLM operations
        .route("/ai/generate", post(ai::generate))
        .route("/ai/review", post(ai::review))
        .route("/ai/debug", post(ai::debug))
        .route("/ai/document", post(ai::document))
        .route("/ai/test", post(ai::test))
        .route("/ai/refactor", post(ai::refactor))
        .route("/ai/explain", post(ai::explain))
        // Chat
        .route("/ai/chat", post(chat::chat))
        .route("/ai/models", get(chat::list_models))
        // Session memory
        .route("/ai/memory/clear", post(memory::clear_memory))
        .route("/ai/memory/{session_id}", get(memory::get_memory))
        // Projects
        .route(
            "/projects",
            post(project::create_project).get(project::list_projects),
        )
        .route(
            "/projects/{id}",
            get(project::get_project)
                .put(project::update_project)
                .delete(project::delete_project),
        )
        .route("/projects/{id}/files", post(project::add_file))
        .route(
            "/projects/{id}/files/{file_id}",
            get(project::get_file)
                .put(project::update_file)
                .delete(project::delete_file),
        )
        // Must follow the routes it covers and precede the layer.
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit,
        ));

    let cors = cors_layer(state.allowed_origin.as_deref());

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health_check))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(
            state.environment,
            redact_errors,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use serde_json::json;

    use devstudio_types::config::{Environment, ServerConfig};

    use crate::http::testing::{StubProvider, TestApp};

    const PROJECT: &str = r#"{"name":"api","description":"a service","language":"go"}"#;

    #[tokio::test]
    async fn health_reports_ok() {
        let app = TestApp::new(StubProvider::replying("unused"));
        let (status, body) = app.get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["providers"], json!(["anthropic"]));
    }

    #[tokio::test]
    async fn generate_returns_code_and_language() {
        let provider = StubProvider::replying("def add(a,b): return a+b");
        let app = TestApp::new(provider.clone());

        let (status, body) = app
            .post(
                "/api/ai/generate",
                json!({"prompt": "add two numbers", "language": "python"}),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["code"], "def add(a,b): return a+b");
        assert_eq!(body["language"], "python");
        assert_eq!(body["usage"]["outputTokens"], 7);
        assert_eq!(body["provider"], "anthropic");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn empty_code_is_rejected_without_provider_call() {
        let provider = StubProvider::replying("unused");
        let app = TestApp::new(provider.clone());

        let (status, body) = app
            .post("/api/ai/test", json!({"code": "", "language": "typescript"}))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"][0]["field"], "code");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn every_missing_field_is_reported() {
        let app = TestApp::new(StubProvider::replying("unused"));
        let (status, body) = app.post("/api/ai/review", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["code", "language"]);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = TestApp::new(StubProvider::replying("unused"));
        let (status, body) = app.post_raw("/api/ai/explain", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_JSON");
        assert!(body["trace"].is_string());
    }

    #[tokio::test]
    async fn project_with_file_round_trip() {
        let app = TestApp::new(StubProvider::replying("unused"));

        let (status, created) = app
            .post("/api/projects", serde_json::from_str(PROJECT).unwrap())
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["result"]["id"].as_str().unwrap().to_string();

        let (status, file) = app
            .post(
                &format!("/api/projects/{id}/files"),
                json!({
                    "name": "main.go",
                    "path": "/main.go",
                    "content": "package main",
                    "language": "go"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let file_id = file["result"]["id"].as_str().unwrap().to_string();

        let (status, project) = app.get(&format!("/api/projects/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        let files = project["result"]["files"].as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["name"], "main.go");
        assert_eq!(files[0]["content"], "package main");

        let (status, updated) = app
            .put(
                &format!("/api/projects/{id}/files/{file_id}"),
                json!({"content": "package main\n\nfunc main() {}"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["result"]["name"], "main.go");
        assert_eq!(updated["result"]["createdAt"], file["result"]["createdAt"]);

        let (status, _) = app.delete(&format!("/api/projects/{id}/files/{file_id}")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = app.get(&format!("/api/projects/{id}/files/{file_id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "FILE_NOT_FOUND");
    }

    #[tokio::test]
    async fn project_update_list_and_delete() {
        let app = TestApp::new(StubProvider::replying("unused"));
        let (_, created) = app
            .post("/api/projects", serde_json::from_str(PROJECT).unwrap())
            .await;
        let id = created["result"]["id"].as_str().unwrap().to_string();

        let (status, updated) = app
            .put(&format!("/api/projects/{id}"), json!({"framework": "gin"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["result"]["framework"], "gin");
        assert_eq!(updated["result"]["name"], "api");
        assert_eq!(updated["result"]["createdAt"], created["result"]["createdAt"]);

        let (status, bad) = app
            .put(&format!("/api/projects/{id}"), json!({"name": ""}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(bad["details"][0]["field"], "name");

        let (_, listed) = app.get("/api/projects").await;
        assert_eq!(listed["result"].as_array().unwrap().len(), 1);

        let (status, deleted) = app.delete(&format!("/api/projects/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["deleted"], true);

        let (status, _) = app.get(&format!("/api/projects/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_uuid_project_id_is_not_found() {
        let app = TestApp::new(StubProvider::replying("unused"));
        let (status, body) = app.get("/api/projects/not-a-uuid").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "PROJECT_NOT_FOUND");
    }

    #[tokio::test]
    async fn chat_memory_carries_previous_turn() {
        let provider = StubProvider::replying("hello!");
        let app = TestApp::new(provider.clone());
        let turn = json!({"message": "hi", "sessionId": "s1", "useMemory": true});

        let (status, first) = app.post("/api/ai/chat", turn.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["response"], "hello!");
        assert_eq!(first["sessionId"], "s1");
        assert_eq!(first["model"], "stub-model");

        app.post("/api/ai/chat", turn).await;

        let second = &provider.requests()[1];
        let contents: Vec<&str> = second.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hi", "hello!", "hi"]);

        let (status, memory) = app.get("/api/ai/memory/s1?limit=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(memory["messages"].as_array().unwrap().len(), 3);

        let (status, _) = app
            .post("/api/ai/memory/clear", json!({"sessionId": "s1"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        let (_, memory) = app.get("/api/ai/memory/s1").await;
        assert!(memory["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn memory_clear_requires_session_id() {
        let app = TestApp::new(StubProvider::replying("unused"));
        let (status, body) = app.post("/api/ai/memory/clear", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "sessionId");
    }

    #[tokio::test]
    async fn models_lists_configured_defaults() {
        let app = TestApp::new(StubProvider::replying("unused"));
        let (status, body) = app.get("/api/ai/models").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["models"], json!(["stub-model"]));
        assert_eq!(body["defaultProvider"], "anthropic");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = TestApp::new(StubProvider::replying("unused"));
        let (status, body) = app.get("/api/nothing-here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route not found");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn wrong_method_gets_error_envelope() {
        let provider = StubProvider::replying("unused");
        let app = TestApp::new(provider.clone());

        let (status, body) = app.get("/api/ai/generate").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
        assert_eq!(provider.calls(), 0);

        let (status, body) = app.delete("/health").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn rate_limit_rejects_after_budget() {
        let mut config = ServerConfig::default();
        config.rate_limit.max_requests = 2;
        let app = TestApp::with_config(StubProvider::replying("unused"), config);

        for _ in 0..2 {
            let (status, _) = app.get("/api/projects").await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = app.get("/api/projects").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["code"], "RATE_LIMITED");

        // health is outside the limited tree
        let (status, _) = app.get("/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn provider_timeout_is_gateway_timeout() {
        let provider = StubProvider::replying("late").with_delay(Duration::from_millis(200));
        let mut config = ServerConfig::default();
        config.providers.timeout_secs = 0;
        let app = TestApp::with_config(provider, config);

        let (status, body) = app
            .post("/api/ai/explain", json!({"code": "x = 1", "language": "python"}))
            .await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["code"], "PROVIDER_TIMEOUT");
    }

    #[tokio::test]
    async fn missing_credentials_is_config_error() {
        let app = TestApp::unconfigured(ServerConfig::default());
        let (status, body) = app
            .post("/api/ai/explain", json!({"code": "x = 1", "language": "python"}))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "PROVIDER_CONFIG");
        assert!(body["trace"].is_string());
    }

    #[tokio::test]
    async fn production_hides_diagnostics() {
        let mut config = ServerConfig::default();
        config.environment = Environment::Production;
        let app = TestApp::unconfigured(config);

        let (status, body) = app
            .post("/api/ai/explain", json!({"code": "x = 1", "language": "python"}))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], "PROVIDER_CONFIG");
        assert!(body.get("trace").is_none());
    }
}
