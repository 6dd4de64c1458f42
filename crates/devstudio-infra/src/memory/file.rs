//! JSON-file session memory store.
//!
//! All sessions live in one document:
//!
//! ```json
//! { "sessions": { "<session id>": [ { "role": "user", "content": "...", "timestamp": "..." } ] } }
//! ```
//!
//! The document is loaded once at open and cached. Every mutation holds a
//! single async lock while it updates the cache and rewrites the file, so
//! writers never interleave. Writes go to a sibling temp file that is then
//! renamed over the target.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use devstudio_core::memory::{SessionMemoryStore, merge_capped, tail};
use devstudio_types::chat::ChatMessage;
use devstudio_types::error::MemoryError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct MemoryDocument {
    #[serde(default)]
    sessions: HashMap<String, Vec<ChatMessage>>,
}

/// Session memory persisted to a JSON file.
pub struct FileSessionStore {
    path: PathBuf,
    document: Mutex<MemoryDocument>,
}

impl FileSessionStore {
    /// Open the store at `path`. A missing file starts empty; the parent
    /// directory is created on first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, MemoryError> {
        let path = path.into();
        let document = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => MemoryDocument::default(),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| MemoryError::Corrupt(format!("{}: {e}", path.display())))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => MemoryDocument::default(),
            Err(err) => {
                return Err(MemoryError::StorageError(format!(
                    "failed to read {}: {err}",
                    path.display()
                )));
            }
        };

        tracing::debug!(
            path = %path.display(),
            sessions = document.sessions.len(),
            "Opened session memory file"
        );

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, document: &MemoryDocument) -> Result<(), MemoryError> {
        let storage_err =
            |what: &str, e: std::io::Error| MemoryError::StorageError(format!("{what}: {e}"));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_err("failed to create memory directory", e))?;
        }

        let json = serde_json::to_vec_pretty(document)
            .map_err(|e| MemoryError::StorageError(format!("failed to serialize memory: {e}")))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| storage_err("failed to write memory file", e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage_err("failed to replace memory file", e))?;
        Ok(())
    }
}

impl SessionMemoryStore for FileSessionStore {
    async fn get(&self, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>, MemoryError> {
        let document = self.document.lock().await;
        Ok(document
            .sessions
            .get(session_id)
            .map(|messages| tail(messages, limit))
            .unwrap_or_default())
    }

    async fn append(
        &self,
        session_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<Vec<ChatMessage>, MemoryError> {
        let mut document = self.document.lock().await;
        let previous = document.sessions.get(session_id).cloned();
        let mut stored = previous.clone().unwrap_or_default();
        merge_capped(&mut stored, messages);
        document
            .sessions
            .insert(session_id.to_string(), stored.clone());

        // The cache must never hold what the file does not.
        if let Err(e) = self.persist(&document).await {
            match previous {
                Some(previous) => {
                    document.sessions.insert(session_id.to_string(), previous);
                }
                None => {
                    document.sessions.remove(session_id);
                }
            }
            return Err(e);
        }
        Ok(stored)
    }

    async fn clear(&self, session_id: &str) -> Result<(), MemoryError> {
        let mut document = self.document.lock().await;
        if let Some(previous) = document.sessions.remove(session_id) {
            if let Err(e) = self.persist(&document).await {
                document.sessions.insert(session_id.to_string(), previous);
                return Err(e);
            }
        }
        Ok(())
    }
}
