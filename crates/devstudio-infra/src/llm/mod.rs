//! LLM provider implementations and the adapter factory.

pub mod anthropic;
pub mod openai;

use devstudio_core::llm::adapter::{CallPolicy, ProviderAdapter};
use devstudio_core::llm::box_provider::BoxLlmProvider;
use devstudio_types::config::ProvidersConfig;
use devstudio_types::llm::ProviderKind;

use crate::config::ProviderCredentials;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

/// Build a [`ProviderAdapter`] with every backend that has a credential.
///
/// Backends without a key are left out; the adapter then reports a
/// configuration failure if a request can reach no backend at all.
pub fn create_adapter(config: &ProvidersConfig, creds: &ProviderCredentials) -> ProviderAdapter {
    let mut adapter = ProviderAdapter::new(config.default_provider, CallPolicy::from_config(config));

    if let Some(key) = creds.get(ProviderKind::Anthropic) {
        let mut provider = AnthropicProvider::new(key.clone(), config.anthropic_model.clone());
        if let Some(url) = &config.anthropic_base_url {
            provider = provider.with_base_url(url.clone());
        }
        adapter = adapter.with_provider(BoxLlmProvider::new(provider));
    }

    if let Some(key) = creds.get(ProviderKind::OpenAi) {
        let provider = match &config.openai_base_url {
            Some(url) => OpenAiProvider::with_base_url(key, config.openai_model.clone(), url),
            None => OpenAiProvider::new(key, config.openai_model.clone()),
        };
        adapter = adapter.with_provider(BoxLlmProvider::new(provider));
    }

    let configured = adapter.configured();
    if configured.is_empty() {
        tracing::warn!("No LLM provider API key set; AI operations will fail until one is configured");
    } else {
        if !configured.contains(&config.default_provider) {
            tracing::warn!(
                default = %config.default_provider,
                "Default provider has no API key; requests must name a configured provider"
            );
        }
        tracing::info!(
            providers = ?configured,
            default = %config.default_provider,
            "LLM providers configured"
        );
    }

    adapter
}
