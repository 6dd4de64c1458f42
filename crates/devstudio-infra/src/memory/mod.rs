//! Session memory backings that need the filesystem.

pub mod file;

use devstudio_core::memory::{BoxSessionMemoryStore, InMemorySessionStore};
use devstudio_types::config::{MemoryBackend, MemoryConfig};
use devstudio_types::error::MemoryError;

pub use file::FileSessionStore;

/// Open the session memory backing named by `config`.
pub async fn open_memory_store(config: &MemoryConfig) -> Result<BoxSessionMemoryStore, MemoryError> {
    let store = match config.backend {
        MemoryBackend::File => {
            BoxSessionMemoryStore::new(FileSessionStore::open(config.path.clone()).await?)
        }
        MemoryBackend::Memory => BoxSessionMemoryStore::new(InMemorySessionStore::new()),
    };
    tracing::info!(backend = ?config.backend, path = %config.path.display(), "Session memory ready");
    Ok(store)
}
