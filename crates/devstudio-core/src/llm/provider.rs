//! LlmProvider trait definition.
//!
//! This is the core abstraction that all LLM backends implement.

use devstudio_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderKind};

/// Trait for LLM provider backends (Anthropic, OpenAI).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in devstudio-infra (e.g., `AnthropicProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "anthropic", "openai").
    fn name(&self) -> &str;

    /// Which backend this provider talks to.
    fn kind(&self) -> ProviderKind;

    /// Model used when a request leaves `model` empty.
    fn default_model(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
