//! Application state wiring all services together.
//!
//! Services are generic over their store traits; AppState pins them to the
//! concrete implementations chosen at startup.

use std::sync::Arc;
use std::time::Duration;

use devstudio_core::llm::adapter::ProviderAdapter;
use devstudio_core::memory::BoxSessionMemoryStore;
use devstudio_core::repository::InMemoryProjectRepository;
use devstudio_core::service::{AssistantService, ProjectService};
use devstudio_core::validation::ValidationRules;
use devstudio_infra::config::ProviderCredentials;
use devstudio_infra::llm::create_adapter;
use devstudio_infra::memory::open_memory_store;
use devstudio_types::config::{Environment, ServerConfig};

use crate::http::middleware::rate_limit::RateLimiter;

/// Concrete type aliases for the service generics.
pub type ConcreteProjectService = ProjectService<InMemoryProjectRepository>;

pub type ConcreteAssistantService = AssistantService<BoxSessionMemoryStore>;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub project_service: Arc<ConcreteProjectService>,
    pub assistant_service: Arc<ConcreteAssistantService>,
    pub rules: Arc<ValidationRules>,
    pub rate_limiter: RateLimiter,
    pub environment: Environment,
    pub allowed_origin: Option<String>,
}

impl AppState {
    /// Build providers and open the session memory backing from config.
    pub async fn init(config: &ServerConfig, creds: &ProviderCredentials) -> anyhow::Result<Self> {
        let adapter = create_adapter(&config.providers, creds);
        let memory = open_memory_store(&config.memory).await?;
        Ok(Self::from_parts(config, adapter, memory))
    }

    /// Wire services from already-built parts.
    pub fn from_parts(
        config: &ServerConfig,
        adapter: ProviderAdapter,
        memory: BoxSessionMemoryStore,
    ) -> Self {
        let rules = ValidationRules {
            allowed_chat_models: config.chat_models.clone(),
        };
        let assistant = AssistantService::new(adapter, memory, config.chat_models.clone());

        Self {
            project_service: Arc::new(ProjectService::new(InMemoryProjectRepository::new())),
            assistant_service: Arc::new(assistant),
            rules: Arc::new(rules),
            rate_limiter: RateLimiter::new(
                Duration::from_millis(config.rate_limit.window_ms),
                config.rate_limit.max_requests,
            ),
            environment: config.environment,
            allowed_origin: config.allowed_origin.clone(),
        }
    }
}
