//! `devstudio config`: print the resolved configuration.

use serde_json::json;

use devstudio_infra::config::ProviderCredentials;
use devstudio_types::config::ServerConfig;
use devstudio_types::llm::ProviderKind;

/// Resolved configuration as JSON. Credentials appear only as
/// `configured` / `absent`.
pub fn render(config: &ServerConfig, creds: &ProviderCredentials) -> serde_json::Value {
    let credentials: serde_json::Map<String, serde_json::Value> = ProviderKind::ALL
        .into_iter()
        .map(|kind| {
            let status = if creds.is_configured(kind) {
                "configured"
            } else {
                "absent"
            };
            (kind.to_string(), json!(status))
        })
        .collect();

    json!({
        "config": config,
        "credentials": credentials,
    })
}

pub fn print(config: &ServerConfig, creds: &ProviderCredentials) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&render(config, creds))?);
    Ok(())
}
