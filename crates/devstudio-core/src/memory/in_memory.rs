//! In-memory session store backed by `DashMap`.

use std::sync::Arc;

use dashmap::DashMap;

use devstudio_types::chat::ChatMessage;
use devstudio_types::error::MemoryError;

use super::{SessionMemoryStore, merge_capped, tail};

/// Process-local session memory. Appends hold the entry lock for the
/// session, so concurrent appends to one session are serialized.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<DashMap<String, Vec<ChatMessage>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionMemoryStore for InMemorySessionStore {
    async fn get(&self, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>, MemoryError> {
        Ok(self
            .sessions
            .get(session_id)
            .map(|messages| tail(messages.value(), limit))
            .unwrap_or_default())
    }

    async fn append(
        &self,
        session_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<Vec<ChatMessage>, MemoryError> {
        let mut entry = self.sessions.entry(session_id.to_string()).or_default();
        merge_capped(entry.value_mut(), messages);
        Ok(entry.value().clone())
    }

    async fn clear(&self, session_id: &str) -> Result<(), MemoryError> {
        self.sessions.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{BoxSessionMemoryStore, DEFAULT_MEMORY_LIMIT, MAX_SESSION_MESSAGES};
    use devstudio_types::chat::ChatRole;

    fn pair(i: usize) -> Vec<ChatMessage> {
        vec![
            ChatMessage::user(format!("q{i}")),
            ChatMessage::assistant(format!("a{i}")),
        ]
    }

    #[tokio::test]
    async fn test_unknown_session_is_empty() {
        let store = InMemorySessionStore::new();
        assert!(store.get("nope", DEFAULT_MEMORY_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overflow_keeps_newest_fifty_in_order() {
        let store = InMemorySessionStore::new();
        for i in 0..30 {
            store.append("s1", pair(i)).await.unwrap();
        }

        let all = store.get("s1", usize::MAX).await.unwrap();
        assert_eq!(all.len(), MAX_SESSION_MESSAGES);
        assert_eq!(all[0].content, "q5");
        assert_eq!(all[49].content, "a29");

        let recent = store.get("s1", DEFAULT_MEMORY_LIMIT).await.unwrap();
        assert_eq!(recent.len(), 20);
        assert_eq!(recent[0].content, "q20");
        assert_eq!(recent[0].role, ChatRole::User);
    }

    #[tokio::test]
    async fn test_clear_then_get_is_empty() {
        let store = InMemorySessionStore::new();
        store.append("s1", pair(0)).await.unwrap();
        store.append("s2", pair(1)).await.unwrap();
        store.clear("s1").await.unwrap();
        assert!(store.get("s1", 20).await.unwrap().is_empty());
        assert_eq!(store.get("s2", 20).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_boxed_store_delegates() {
        let store = BoxSessionMemoryStore::new(InMemorySessionStore::new());
        let stored = store.append("s1", pair(0)).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(store.get("s1", 1).await.unwrap()[0].content, "a0");

        store.clear("s1").await.unwrap();
        assert!(store.get("s1", DEFAULT_MEMORY_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_are_not_lost() {
        let store = InMemorySessionStore::new();
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append("shared", pair(i)).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.get("shared", usize::MAX).await.unwrap().len(), 40);
    }
}
