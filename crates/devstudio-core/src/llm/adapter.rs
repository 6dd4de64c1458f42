//! Provider adapter: one entry point over every configured backend.
//!
//! Selects a provider for each call, bounds the call with a timeout, retries
//! transient failures with exponential backoff, and folds every outcome into
//! an [`AiResponse`]. Provider errors never leave this module as `Err`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use devstudio_types::config::ProvidersConfig;
use devstudio_types::llm::{
    AiResponse, CompletionRequest, LlmError, Message, ProviderErrorKind, ProviderKind,
};

use super::box_provider::BoxLlmProvider;

/// Timeout, retry and token limits applied to every provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Extra attempts after a transient failure.
    pub max_retries: u32,
    /// First backoff delay; doubles on each retry.
    pub retry_base_delay: Duration,
    pub max_output_tokens: u32,
}

impl CallPolicy {
    pub fn from_config(config: &ProvidersConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// Delay before retry number `attempt` (0-based).
    fn backoff(&self, attempt: u32, err: &LlmError) -> Duration {
        let exponential = self
            .retry_base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        match err {
            LlmError::RateLimited {
                retry_after_ms: Some(ms),
            } => exponential.max(Duration::from_millis(*ms)),
            _ => exponential,
        }
    }
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self::from_config(&ProvidersConfig::default())
    }
}

/// Outcome of provider selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub provider: ProviderKind,
    /// Model to request; `None` means the provider's default.
    pub model: Option<String>,
}

/// Uniform completion interface over the configured backends.
pub struct ProviderAdapter {
    providers: HashMap<ProviderKind, BoxLlmProvider>,
    default_provider: ProviderKind,
    policy: CallPolicy,
}

impl ProviderAdapter {
    pub fn new(default_provider: ProviderKind, policy: CallPolicy) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider,
            policy,
        }
    }

    /// Register a backend under its own kind, replacing any previous one.
    pub fn with_provider(mut self, provider: BoxLlmProvider) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn default_provider(&self) -> ProviderKind {
        self.default_provider
    }

    /// Kinds that have a registered backend, in stable order.
    pub fn configured(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.providers.contains_key(kind))
            .collect()
    }

    /// Default model of every configured backend, default provider first.
    pub fn default_models(&self) -> Vec<String> {
        let mut kinds = self.configured();
        kinds.sort_by_key(|kind| *kind != self.default_provider);
        kinds
            .into_iter()
            .filter_map(|kind| self.providers.get(&kind))
            .map(|p| p.default_model().to_string())
            .collect()
    }

    /// Pick the backend for a call.
    ///
    /// Explicit provider, then the provider implied by the model hint, then
    /// the configured default. An unconfigured choice falls back to the
    /// default without the model hint. Returns `None` when the default is
    /// not configured either.
    pub fn select(
        &self,
        requested: Option<ProviderKind>,
        model_hint: Option<&str>,
    ) -> Option<Selection> {
        let inferred = model_hint.and_then(ProviderKind::infer_from_model);
        let wanted = requested.or(inferred).unwrap_or(self.default_provider);

        if self.providers.contains_key(&wanted) {
            // A hint naming another vendor's model cannot be honored here.
            let model = model_hint
                .filter(|_| inferred.is_none_or(|kind| kind == wanted))
                .map(str::to_string);
            return Some(Selection {
                provider: wanted,
                model,
            });
        }

        if self.providers.contains_key(&self.default_provider) {
            tracing::warn!(
                requested = %wanted,
                fallback = %self.default_provider,
                "Requested provider not configured, using default"
            );
            return Some(Selection {
                provider: self.default_provider,
                model: None,
            });
        }

        None
    }

    /// Single-turn completion.
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        model_hint: Option<&str>,
        provider: Option<ProviderKind>,
    ) -> AiResponse {
        self.complete_conversation(system, vec![Message::user(user)], model_hint, provider)
            .await
    }

    /// Multi-turn completion; `messages` are oldest first and end with the
    /// new user turn.
    pub async fn complete_conversation(
        &self,
        system: &str,
        messages: Vec<Message>,
        model_hint: Option<&str>,
        provider: Option<ProviderKind>,
    ) -> AiResponse {
        let selection = match self.select(provider, model_hint) {
            Some(selection) => selection,
            None => {
                let wanted = provider.unwrap_or(self.default_provider);
                tracing::error!(provider = %wanted, "No LLM provider configured");
                return AiResponse::failure(
                    ProviderErrorKind::Config,
                    format!(
                        "provider '{wanted}' is not configured and default provider '{}' has no credentials",
                        self.default_provider
                    ),
                );
            }
        };

        let backend = match self.providers.get(&selection.provider) {
            Some(backend) => backend,
            None => {
                return AiResponse::failure(
                    ProviderErrorKind::Config,
                    format!("provider '{}' is not configured", selection.provider),
                );
            }
        };

        let request = CompletionRequest {
            model: selection.model.unwrap_or_default(),
            messages,
            system: Some(system.to_string()),
            max_tokens: self.policy.max_output_tokens,
            temperature: None,
        };

        self.call_with_retry(backend, &request)
            .await
            .with_provider(selection.provider)
    }

    async fn call_with_retry(
        &self,
        backend: &BoxLlmProvider,
        request: &CompletionRequest,
    ) -> AiResponse {
        let mut attempt = 0u32;
        loop {
            let start = Instant::now();
            let outcome = tokio::time::timeout(self.policy.timeout, backend.complete(request)).await;
            let latency_ms = start.elapsed().as_millis() as u64;

            match outcome {
                Ok(Ok(response)) => {
                    tracing::info!(
                        provider = backend.name(),
                        model = %response.model,
                        input_tokens = response.usage.input_tokens,
                        output_tokens = response.usage.output_tokens,
                        latency_ms,
                        "LLM call completed"
                    );
                    let model = if response.model.is_empty() {
                        backend.default_model().to_string()
                    } else {
                        response.model
                    };
                    return AiResponse::ok(response.content, response.usage, backend.kind(), model);
                }
                Ok(Err(err)) if err.is_transient() && attempt < self.policy.max_retries => {
                    let delay = self.policy.backoff(attempt, &err);
                    tracing::warn!(
                        provider = backend.name(),
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient LLM error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Ok(Err(err)) => {
                    tracing::error!(
                        provider = backend.name(),
                        attempts = attempt + 1,
                        error = %err,
                        "LLM call failed"
                    );
                    return AiResponse::failure(ProviderErrorKind::Call, err.to_string());
                }
                Err(_) => {
                    tracing::error!(
                        provider = backend.name(),
                        timeout_secs = self.policy.timeout.as_secs_f64(),
                        "LLM call timed out"
                    );
                    return AiResponse::failure(
                        ProviderErrorKind::Timeout,
                        format!(
                            "provider '{}' did not respond within {:?}",
                            backend.name(),
                            self.policy.timeout
                        ),
                    );
                }
            }
        }
    }
}
