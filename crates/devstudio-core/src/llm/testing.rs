//! Scripted provider shared by unit tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use devstudio_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderKind, Usage};

use super::provider::LlmProvider;

/// Answers from a script of canned results, recording every request.
/// An exhausted script answers `"default"`.
#[derive(Clone)]
pub struct ScriptedProvider {
    pub kind: ProviderKind,
    pub script: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    pub seen: Arc<Mutex<Vec<CompletionRequest>>>,
    pub delay: Duration,
}

impl ScriptedProvider {
    pub fn new(kind: ProviderKind, script: Vec<Result<String, LlmError>>) -> Self {
        Self {
            kind,
            script: Arc::new(Mutex::new(script.into())),
            seen: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::ZERO,
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        match self.kind {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
        }
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn default_model(&self) -> &str {
        match self.kind {
            ProviderKind::Anthropic => "claude-test",
            ProviderKind::OpenAi => "gpt-test",
        }
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.seen.lock().unwrap().push(request.clone());
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("default".to_string()));
        let delay = self.delay;
        let model = if request.model.is_empty() {
            self.default_model().to_string()
        } else {
            request.model.clone()
        };
        async move {
            tokio::time::sleep(delay).await;
            next.map(|content| CompletionResponse {
                id: "resp-1".to_string(),
                content,
                model,
                usage: Usage {
                    input_tokens: 3,
                    output_tokens: 5,
                },
            })
        }
    }
}
