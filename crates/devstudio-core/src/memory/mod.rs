//! Session memory: a capped, per-session chat log.
//!
//! - `SessionMemoryStore`: RPITIT trait implemented by each backing
//! - `BoxSessionMemoryStore`: object-safe wrapper for runtime selection
//! - `InMemorySessionStore`: `DashMap` backing, atomic per session id
//!
//! The file backing lives in devstudio-infra.

pub mod box_store;
pub mod in_memory;

use devstudio_types::chat::ChatMessage;
use devstudio_types::error::MemoryError;

pub use box_store::BoxSessionMemoryStore;
pub use in_memory::InMemorySessionStore;

/// Maximum messages retained per session.
pub const MAX_SESSION_MESSAGES: usize = 50;

/// Messages returned by a read when the caller gives no limit.
pub const DEFAULT_MEMORY_LIMIT: usize = 20;

/// Storage for per-session chat history.
pub trait SessionMemoryStore: Send + Sync {
    /// The most recent `limit` messages, oldest first. Unknown sessions
    /// yield an empty list.
    fn get(
        &self,
        session_id: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, MemoryError>> + Send;

    /// Append `messages`, keep only the newest [`MAX_SESSION_MESSAGES`],
    /// and return what is now stored.
    fn append(
        &self,
        session_id: &str,
        messages: Vec<ChatMessage>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, MemoryError>> + Send;

    /// Remove the session entirely.
    fn clear(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<(), MemoryError>> + Send;
}

/// Extend `stored` with `incoming` and drop the oldest entries beyond the cap.
pub fn merge_capped(stored: &mut Vec<ChatMessage>, incoming: Vec<ChatMessage>) {
    stored.extend(incoming);
    if stored.len() > MAX_SESSION_MESSAGES {
        let excess = stored.len() - MAX_SESSION_MESSAGES;
        stored.drain(..excess);
    }
}

/// The last `limit` messages of `messages`, in order.
pub fn tail(messages: &[ChatMessage], limit: usize) -> Vec<ChatMessage> {
    let start = messages.len().saturating_sub(limit);
    messages[start..].to_vec()
}
