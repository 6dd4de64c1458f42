//! Router test harness: a stub LLM backend and oneshot request helpers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use devstudio_core::llm::adapter::{CallPolicy, ProviderAdapter};
use devstudio_core::llm::box_provider::BoxLlmProvider;
use devstudio_core::llm::provider::LlmProvider;
use devstudio_core::memory::{BoxSessionMemoryStore, InMemorySessionStore};
use devstudio_types::config::ServerConfig;
use devstudio_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderKind, Usage};

use crate::http::router::build_router;
use crate::state::AppState;

/// Anthropic-kind backend that always answers with `reply`.
#[derive(Clone)]
pub struct StubProvider {
    reply: String,
    delay: Duration,
    seen: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl StubProvider {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            delay: Duration::ZERO,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl LlmProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn default_model(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.seen.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.delay).await;
        Ok(CompletionResponse {
            id: "stub-1".to_string(),
            content: self.reply.clone(),
            model: String::new(),
            usage: Usage {
                input_tokens: 11,
                output_tokens: 7,
            },
        })
    }
}

/// A router over fresh state, driven with `oneshot`.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(provider: StubProvider) -> Self {
        Self::with_config(provider, ServerConfig::default())
    }

    pub fn with_config(provider: StubProvider, config: ServerConfig) -> Self {
        let adapter = ProviderAdapter::new(
            config.providers.default_provider,
            CallPolicy::from_config(&config.providers),
        )
        .with_provider(BoxLlmProvider::new(provider));
        Self::from_adapter(adapter, config)
    }

    /// No backend has credentials.
    pub fn unconfigured(config: ServerConfig) -> Self {
        let adapter = ProviderAdapter::new(
            config.providers.default_provider,
            CallPolicy::from_config(&config.providers),
        );
        Self::from_adapter(adapter, config)
    }

    fn from_adapter(adapter: ProviderAdapter, config: ServerConfig) -> Self {
        let memory = BoxSessionMemoryStore::new(InMemorySessionStore::new());
        let state = AppState::from_parts(&config, adapter, memory);
        Self {
            router: build_router(state),
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body.to_string())).await
    }

    pub async fn post_raw(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body.to_string())).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body.to_string())).await
    }
}
