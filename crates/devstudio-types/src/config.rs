//! Server configuration types for Dev Studio.
//!
//! `ServerConfig` mirrors the optional `devstudio.toml` file. Every field has
//! a default, so an empty file (or no file at all) yields a runnable config.
//! Environment overrides and provider credentials are applied by the loader
//! in `devstudio-infra`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::llm::ProviderKind;

/// Deployment environment. Controls diagnostic detail in error bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("invalid environment: '{other}'")),
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// Origin allowed to call the API from a browser. `None` allows any.
    pub allowed_origin: Option<String>,
    pub providers: ProvidersConfig,
    pub rate_limit: RateLimitConfig,
    pub memory: MemoryConfig,
    /// Chat models exposed to clients. Empty means "each provider's default".
    pub chat_models: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            environment: Environment::default(),
            allowed_origin: None,
            providers: ProvidersConfig::default(),
            rate_limit: RateLimitConfig::default(),
            memory: MemoryConfig::default(),
            chat_models: Vec::new(),
        }
    }
}

/// Provider selection, models and call policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub default_provider: ProviderKind,
    pub anthropic_model: String,
    pub openai_model: String,
    pub anthropic_base_url: Option<String>,
    pub openai_base_url: Option<String>,
    pub max_output_tokens: u32,
    /// Per-attempt timeout for a provider call.
    pub timeout_secs: u64,
    /// Extra attempts after a transient failure.
    pub max_retries: u32,
    /// First backoff delay; doubles on each retry.
    pub retry_base_delay_ms: u64,
}

impl ProvidersConfig {
    pub fn model_for(&self, provider: ProviderKind) -> &str {
        match provider {
            ProviderKind::Anthropic => &self.anthropic_model,
            ProviderKind::OpenAi => &self.openai_model,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            default_provider: ProviderKind::Anthropic,
            anthropic_model: "claude-3-5-sonnet-20241022".to_string(),
            openai_model: "gpt-4-turbo-preview".to_string(),
            anthropic_base_url: None,
            openai_base_url: None,
            max_output_tokens: 4096,
            timeout_secs: 120,
            max_retries: 2,
            retry_base_delay_ms: 500,
        }
    }
}

/// Fixed-window rate limiting for `/api` routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub window_ms: u64,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            max_requests: 100,
        }
    }
}

/// Backing storage for session memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryBackend {
    #[default]
    File,
    Memory,
}

impl FromStr for MemoryBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(MemoryBackend::File),
            "memory" => Ok(MemoryBackend::Memory),
            other => Err(format!("invalid memory backend: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub backend: MemoryBackend,
    pub path: PathBuf,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: MemoryBackend::default(),
            path: PathBuf::from("data").join("memory.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default_values() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.providers.default_provider, ProviderKind::Anthropic);
        assert_eq!(config.providers.max_output_tokens, 4096);
        assert_eq!(config.memory.backend, MemoryBackend::File);
        assert!(config.chat_models.is_empty());
    }

    #[test]
    fn test_server_config_partial_toml() {
        let config: ServerConfig = toml::from_str(
            r#"
port = 8080
environment = "production"
chat_models = ["gpt-4o", "claude-3-5-sonnet-20241022"]

[providers]
default_provider = "openai"
timeout_secs = 30

[memory]
backend = "memory"
"#,
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.environment.is_production());
        assert_eq!(config.chat_models.len(), 2);
        assert_eq!(config.providers.default_provider, ProviderKind::OpenAi);
        assert_eq!(config.providers.timeout_secs, 30);
        // untouched fields keep their defaults
        assert_eq!(config.providers.max_retries, 2);
        assert_eq!(config.memory.backend, MemoryBackend::Memory);
        assert_eq!(config.rate_limit.max_requests, 100);
    }

    #[test]
    fn test_model_for_provider() {
        let providers = ProvidersConfig::default();
        assert_eq!(
            providers.model_for(ProviderKind::OpenAi),
            "gpt-4-turbo-preview"
        );
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(
            "Development".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert!("staging".parse::<Environment>().is_err());
    }
}
