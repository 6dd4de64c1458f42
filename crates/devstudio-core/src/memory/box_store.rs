//! BoxSessionMemoryStore -- object-safe wrapper for SessionMemoryStore.
//!
//! Same pattern as `BoxLlmProvider`: a boxed-future companion trait with a
//! blanket impl, so the backing can be chosen from configuration at startup.

use std::future::Future;
use std::pin::Pin;

use devstudio_types::chat::ChatMessage;
use devstudio_types::error::MemoryError;

use super::SessionMemoryStore;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`SessionMemoryStore`].
pub trait SessionMemoryStoreDyn: Send + Sync {
    fn get_boxed<'a>(
        &'a self,
        session_id: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ChatMessage>, MemoryError>>;

    fn append_boxed<'a>(
        &'a self,
        session_id: &'a str,
        messages: Vec<ChatMessage>,
    ) -> BoxFuture<'a, Result<Vec<ChatMessage>, MemoryError>>;

    fn clear_boxed<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<(), MemoryError>>;
}

impl<T: SessionMemoryStore> SessionMemoryStoreDyn for T {
    fn get_boxed<'a>(
        &'a self,
        session_id: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ChatMessage>, MemoryError>> {
        Box::pin(self.get(session_id, limit))
    }

    fn append_boxed<'a>(
        &'a self,
        session_id: &'a str,
        messages: Vec<ChatMessage>,
    ) -> BoxFuture<'a, Result<Vec<ChatMessage>, MemoryError>> {
        Box::pin(self.append(session_id, messages))
    }

    fn clear_boxed<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(self.clear(session_id))
    }
}

/// Type-erased session memory store.
pub struct BoxSessionMemoryStore {
    inner: Box<dyn SessionMemoryStoreDyn>,
}

impl BoxSessionMemoryStore {
    pub fn new<T: SessionMemoryStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }
}

impl SessionMemoryStore for BoxSessionMemoryStore {
    async fn get(&self, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>, MemoryError> {
        self.inner.get_boxed(session_id, limit).await
    }

    async fn append(
        &self,
        session_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<Vec<ChatMessage>, MemoryError> {
        self.inner.append_boxed(session_id, messages).await
    }

    async fn clear(&self, session_id: &str) -> Result<(), MemoryError> {
        self.inner.clear_boxed(session_id).await
    }
}
