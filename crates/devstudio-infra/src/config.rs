//! Configuration loading: optional TOML file, then environment overrides.
//!
//! Provider credentials are read separately into [`ProviderCredentials`] so
//! they never travel inside the serializable [`ServerConfig`].

use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;

use devstudio_types::config::{Environment, MemoryBackend, ServerConfig};
use devstudio_types::llm::ProviderKind;

/// File consulted when no `--config` path is given.
pub const DEFAULT_CONFIG_FILE: &str = "devstudio.toml";

/// Load the server configuration file.
///
/// - If `path` is `None`, `./devstudio.toml` is tried.
/// - If the file does not exist, returns [`ServerConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_server_config(path: Option<&Path>) -> ServerConfig {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return ServerConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ServerConfig::default();
        }
    };

    match toml::from_str::<ServerConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ServerConfig::default()
        }
    }
}

/// Parse `key` with `FromStr`, warning (and returning `None`) on bad input.
fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let raw = non_empty(lookup, key)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, value = %raw, "Ignoring invalid environment value: {err}");
            None
        }
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Apply environment overrides on top of a file-loaded config.
///
/// `lookup` resolves a variable name; production code passes
/// `|k| std::env::var(k).ok()`. Empty values count as unset.
pub fn apply_env_overrides(config: &mut ServerConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(host) = non_empty(&lookup, "HOST") {
        config.host = host;
    }
    if let Some(port) = parsed::<u16>(&lookup, "PORT") {
        config.port = port;
    }
    if let Some(env) = parsed::<Environment>(&lookup, "APP_ENV") {
        config.environment = env;
    }
    if let Some(origin) = non_empty(&lookup, "FRONTEND_URL") {
        config.allowed_origin = Some(origin);
    }

    let providers = &mut config.providers;
    if let Some(kind) = parsed::<ProviderKind>(&lookup, "DEFAULT_AI_PROVIDER") {
        providers.default_provider = kind;
    }
    if let Some(model) = non_empty(&lookup, "DEFAULT_MODEL") {
        let kind = ProviderKind::infer_from_model(&model).unwrap_or(providers.default_provider);
        match kind {
            ProviderKind::Anthropic => providers.anthropic_model = model,
            ProviderKind::OpenAi => providers.openai_model = model,
        }
    }
    if let Some(model) = non_empty(&lookup, "ANTHROPIC_MODEL") {
        providers.anthropic_model = model;
    }
    if let Some(model) = non_empty(&lookup, "OPENAI_MODEL") {
        providers.openai_model = model;
    }
    if let Some(url) = non_empty(&lookup, "ANTHROPIC_BASE_URL") {
        providers.anthropic_base_url = Some(url);
    }
    if let Some(url) = non_empty(&lookup, "OPENAI_BASE_URL") {
        providers.openai_base_url = Some(url);
    }
    if let Some(secs) = parsed::<u64>(&lookup, "PROVIDER_TIMEOUT_SECS") {
        providers.timeout_secs = secs;
    }
    if let Some(retries) = parsed::<u32>(&lookup, "PROVIDER_MAX_RETRIES") {
        providers.max_retries = retries;
    }
    if let Some(tokens) = parsed::<u32>(&lookup, "MAX_OUTPUT_TOKENS") {
        providers.max_output_tokens = tokens;
    }

    if let Some(window) = parsed::<u64>(&lookup, "RATE_LIMIT_WINDOW_MS") {
        config.rate_limit.window_ms = window;
    }
    if let Some(max) = parsed::<u32>(&lookup, "RATE_LIMIT_MAX_REQUESTS") {
        config.rate_limit.max_requests = max;
    }

    if let Some(backend) = parsed::<MemoryBackend>(&lookup, "MEMORY_BACKEND") {
        config.memory.backend = backend;
    }
    if let Some(path) = non_empty(&lookup, "MEMORY_PATH") {
        config.memory.path = PathBuf::from(path);
    }

    if let Some(models) = non_empty(&lookup, "CHAT_MODELS") {
        config.chat_models = models
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
    }
}

/// API keys for the provider backends. A missing key leaves that backend
/// unconfigured.
#[derive(Default)]
pub struct ProviderCredentials {
    pub anthropic: Option<SecretString>,
    pub openai: Option<SecretString>,
}

impl ProviderCredentials {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            anthropic: non_empty(&lookup, "ANTHROPIC_API_KEY").map(SecretString::from),
            openai: non_empty(&lookup, "OPENAI_API_KEY").map(SecretString::from),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&SecretString> {
        match kind {
            ProviderKind::Anthropic => self.anthropic.as_ref(),
            ProviderKind::OpenAi => self.openai.as_ref(),
        }
    }

    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        self.get(kind).is_some()
    }
}

/// Load the config file, apply process environment overrides, and read
/// provider credentials.
pub async fn resolve_config(path: Option<&Path>) -> (ServerConfig, ProviderCredentials) {
    let mut config = load_server_config(path).await;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    (config, ProviderCredentials::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn load_server_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_server_config(Some(&tmp.path().join("absent.toml"))).await;
        assert_eq!(config, ServerConfig::default());
    }

    #[tokio::test]
    async fn load_server_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("devstudio.toml");
        tokio::fs::write(
            &path,
            r#"
port = 4000
allowed_origin = "http://localhost:5173"

[rate_limit]
max_requests = 5
"#,
        )
        .await
        .unwrap();

        let config = load_server_config(Some(&path)).await;
        assert_eq!(config.port, 4000);
        assert_eq!(config.allowed_origin.as_deref(), Some("http://localhost:5173"));
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_ms, 60_000);
    }

    #[tokio::test]
    async fn load_server_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("devstudio.toml");
        tokio::fs::write(&path, "port = \"not a number\"").await.unwrap();

        let config = load_server_config(Some(&path)).await;
        assert_eq!(config.port, 3001);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = ServerConfig::default();
        apply_env_overrides(
            &mut config,
            lookup_from(&[
                ("PORT", "8080"),
                ("APP_ENV", "production"),
                ("FRONTEND_URL", "https://studio.example.com"),
                ("DEFAULT_AI_PROVIDER", "openai"),
                ("RATE_LIMIT_WINDOW_MS", "1000"),
                ("RATE_LIMIT_MAX_REQUESTS", "3"),
                ("MEMORY_BACKEND", "memory"),
                ("MEMORY_PATH", "/tmp/mem.json"),
                ("CHAT_MODELS", "gpt-4o, claude-3-5-sonnet-20241022,"),
                ("PROVIDER_TIMEOUT_SECS", "15"),
            ]),
        );

        assert_eq!(config.port, 8080);
        assert!(config.environment.is_production());
        assert_eq!(
            config.allowed_origin.as_deref(),
            Some("https://studio.example.com")
        );
        assert_eq!(config.providers.default_provider, ProviderKind::OpenAi);
        assert_eq!(config.rate_limit.window_ms, 1000);
        assert_eq!(config.rate_limit.max_requests, 3);
        assert_eq!(config.memory.backend, MemoryBackend::Memory);
        assert_eq!(config.memory.path, PathBuf::from("/tmp/mem.json"));
        assert_eq!(
            config.chat_models,
            vec!["gpt-4o", "claude-3-5-sonnet-20241022"]
        );
        assert_eq!(config.providers.timeout_secs, 15);
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let mut config = ServerConfig::default();
        apply_env_overrides(
            &mut config,
            lookup_from(&[("PORT", "eighty"), ("DEFAULT_AI_PROVIDER", "cohere"), ("HOST", "")]),
        );
        assert_eq!(config.port, 3001);
        assert_eq!(config.providers.default_provider, ProviderKind::Anthropic);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn default_model_targets_its_provider() {
        let mut config = ServerConfig::default();
        apply_env_overrides(&mut config, lookup_from(&[("DEFAULT_MODEL", "gpt-4o")]));
        assert_eq!(config.providers.openai_model, "gpt-4o");
        assert_eq!(config.providers.anthropic_model, "claude-3-5-sonnet-20241022");

        // unrecognized model names apply to the default provider
        let mut config = ServerConfig::default();
        apply_env_overrides(&mut config, lookup_from(&[("DEFAULT_MODEL", "my-proxy-model")]));
        assert_eq!(config.providers.anthropic_model, "my-proxy-model");
    }

    #[test]
    fn credentials_from_lookup() {
        let creds = ProviderCredentials::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
            ("OPENAI_API_KEY", "  "),
        ]));
        assert!(creds.is_configured(ProviderKind::Anthropic));
        assert!(!creds.is_configured(ProviderKind::OpenAi));
    }
}
