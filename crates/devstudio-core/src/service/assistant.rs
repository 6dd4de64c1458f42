//! Assistant service: runs LLM-backed operations end to end.
//!
//! Builds prompts for a validated request, calls the provider adapter, and
//! for chat turns threads session memory through the conversation.

use std::time::Instant;

use devstudio_types::chat::ChatMessage;
use devstudio_types::error::MemoryError;
use devstudio_types::llm::{AiResponse, Message, ProviderKind};
use devstudio_types::operation::{ChatRequest, OperationRequest};

use crate::llm::adapter::ProviderAdapter;
use crate::memory::{DEFAULT_MEMORY_LIMIT, SessionMemoryStore};
use crate::prompt;

/// Orchestrates prompt building, provider calls and session memory.
pub struct AssistantService<M: SessionMemoryStore> {
    adapter: ProviderAdapter,
    memory: M,
    chat_models: Vec<String>,
}

impl<M: SessionMemoryStore> AssistantService<M> {
    /// - `adapter`: configured provider backends
    /// - `memory`: session memory backing
    /// - `chat_models`: models exposed to clients; empty means each
    ///   provider's default
    pub fn new(adapter: ProviderAdapter, memory: M, chat_models: Vec<String>) -> Self {
        Self {
            adapter,
            memory,
            chat_models,
        }
    }

    pub fn adapter(&self) -> &ProviderAdapter {
        &self.adapter
    }

    pub fn default_provider(&self) -> ProviderKind {
        self.adapter.default_provider()
    }

    /// Models a client may pick for chat.
    pub fn models(&self) -> Vec<String> {
        if self.chat_models.is_empty() {
            self.adapter.default_models()
        } else {
            self.chat_models.clone()
        }
    }

    /// Run one operation. Provider failures come back inside the
    /// [`AiResponse`]; only session memory failures are `Err`.
    pub async fn execute(&self, request: &OperationRequest) -> Result<AiResponse, MemoryError> {
        let start = Instant::now();
        let operation = request.operation();

        let response = match request {
            OperationRequest::Chat(chat) => self.chat(chat).await?,
            other => {
                let prompts = prompt::build(other);
                self.adapter
                    .complete(&prompts.system, &prompts.user, None, other.provider())
                    .await
            }
        };

        tracing::info!(
            %operation,
            success = response.success,
            provider = ?response.provider,
            duration_ms = start.elapsed().as_millis() as u64,
            "Operation finished"
        );
        Ok(response)
    }

    /// One chat turn.
    ///
    /// The provider sees, in order: remembered turns for the session, the
    /// client-supplied history, then the new message. A successful turn is
    /// appended to memory as the raw user message plus the reply.
    async fn chat(&self, request: &ChatRequest) -> Result<AiResponse, MemoryError> {
        let session = request.memory_session();
        let remembered = match session {
            Some(id) => self.memory.get(id, DEFAULT_MEMORY_LIMIT).await?,
            None => Vec::new(),
        };

        let prompts = prompt::chat(request);
        let mut messages: Vec<Message> = remembered
            .iter()
            .chain(request.history.iter())
            .map(Message::from)
            .collect();
        messages.push(Message::user(prompts.user));

        tracing::debug!(
            session_id = session.unwrap_or("-"),
            remembered = remembered.len(),
            history = request.history.len(),
            "Chat context assembled"
        );

        let response = self
            .adapter
            .complete_conversation(
                &prompts.system,
                messages,
                request.model.as_deref(),
                request.provider,
            )
            .await;

        if let (Some(id), true, Some(reply)) = (session, response.success, &response.result) {
            self.memory
                .append(
                    id,
                    vec![
                        ChatMessage::user(request.message.clone()),
                        ChatMessage::assistant(reply.clone()),
                    ],
                )
                .await?;
        }

        Ok(response)
    }

    /// Stored turns for a session, oldest first.
    pub async fn session_history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, MemoryError> {
        self.memory.get(session_id, limit).await
    }

    pub async fn clear_memory(&self, session_id: &str) -> Result<(), MemoryError> {
        self.memory.clear(session_id).await?;
        tracing::info!(session_id, "Session memory cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::adapter::CallPolicy;
    use crate::llm::box_provider::BoxLlmProvider;
    use crate::llm::testing::ScriptedProvider;
    use crate::memory::InMemorySessionStore;
    use devstudio_types::llm::{LlmError, MessageRole, ProviderErrorKind};
    use devstudio_types::operation::{ExplainRequest, GenerateRequest};

    fn service(
        provider: &ScriptedProvider,
        chat_models: Vec<String>,
    ) -> AssistantService<InMemorySessionStore> {
        let adapter = ProviderAdapter::new(ProviderKind::Anthropic, CallPolicy::default())
            .with_provider(BoxLlmProvider::new(provider.clone()));
        AssistantService::new(adapter, InMemorySessionStore::new(), chat_models)
    }

    fn chat_request(message: &str, session: Option<&str>) -> OperationRequest {
        OperationRequest::Chat(ChatRequest {
            message: message.to_string(),
            history: Vec::new(),
            context: None,
            session_id: session.map(str::to_string),
            model: None,
            use_memory: Some(true),
            provider: None,
        })
    }

    #[tokio::test]
    async fn test_generate_sends_built_prompts() {
        let provider = ScriptedProvider::new(
            ProviderKind::Anthropic,
            vec![Ok("def add(a,b): return a+b".into())],
        );
        let svc = service(&provider, vec![]);
        let request = OperationRequest::Generate(GenerateRequest {
            prompt: "add two numbers".to_string(),
            language: "python".to_string(),
            context: None,
            framework: None,
            provider: None,
        });

        let resp = svc.execute(&request).await.unwrap();
        assert_eq!(resp.result.as_deref(), Some("def add(a,b): return a+b"));

        let expected = prompt::build(&request);
        let seen = provider.requests();
        assert_eq!(seen[0].system.as_deref(), Some(expected.system.as_str()));
        assert_eq!(seen[0].messages, vec![Message::user(expected.user)]);
    }

    #[tokio::test]
    async fn test_second_chat_turn_sees_first_turn() {
        let provider = ScriptedProvider::new(
            ProviderKind::Anthropic,
            vec![Ok("hello!".into()), Ok("hello again".into())],
        );
        let svc = service(&provider, vec![]);

        svc.execute(&chat_request("hi", Some("s1"))).await.unwrap();
        svc.execute(&chat_request("hi", Some("s1"))).await.unwrap();

        let second = &provider.requests()[1];
        let turns: Vec<_> = second
            .messages
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            turns,
            vec![
                (MessageRole::User, "hi"),
                (MessageRole::Assistant, "hello!"),
                (MessageRole::User, "hi"),
            ]
        );

        let stored = svc.session_history("s1", DEFAULT_MEMORY_LIMIT).await.unwrap();
        assert_eq!(stored.len(), 4);
    }

    #[tokio::test]
    async fn test_failed_chat_is_not_remembered() {
        let provider = ScriptedProvider::new(
            ProviderKind::Anthropic,
            vec![Err(LlmError::AuthenticationFailed)],
        );
        let svc = service(&provider, vec![]);

        let resp = svc.execute(&chat_request("hi", Some("s1"))).await.unwrap();
        assert_eq!(resp.error_kind, Some(ProviderErrorKind::Call));
        assert!(svc.session_history("s1", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_without_session_skips_memory() {
        let provider = ScriptedProvider::new(ProviderKind::Anthropic, vec![]);
        let svc = service(&provider, vec![]);

        svc.execute(&chat_request("one", None)).await.unwrap();
        svc.execute(&chat_request("two", None)).await.unwrap();
        assert_eq!(provider.requests()[1].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_memory_forgets_session() {
        let provider = ScriptedProvider::new(ProviderKind::Anthropic, vec![]);
        let svc = service(&provider, vec![]);

        svc.execute(&chat_request("hi", Some("s1"))).await.unwrap();
        svc.clear_memory("s1").await.unwrap();
        svc.execute(&chat_request("hi", Some("s1"))).await.unwrap();
        assert_eq!(provider.requests()[1].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_explain_passes_explicit_provider() {
        // only anthropic configured; the openai request falls back
        let provider = ScriptedProvider::new(ProviderKind::Anthropic, vec![]);
        let svc = service(&provider, vec![]);
        let resp = svc
            .execute(&OperationRequest::Explain(ExplainRequest {
                code: "x = 1".to_string(),
                language: "python".to_string(),
                provider: Some(ProviderKind::OpenAi),
            }))
            .await
            .unwrap();
        assert!(resp.success);
        assert_eq!(resp.provider, Some(ProviderKind::Anthropic));
    }

    #[test]
    fn test_models_prefers_configured_list() {
        let provider = ScriptedProvider::new(ProviderKind::Anthropic, vec![]);
        assert_eq!(service(&provider, vec![]).models(), vec!["claude-test"]);
        assert_eq!(
            service(&provider, vec!["gpt-4o".to_string()]).models(),
            vec!["gpt-4o"]
        );
    }
}
