//! Durable single-value storage for the workshop token.
//!
//! Exactly one logical secret lives behind a [`SecretStore`]. Backends must
//! make `set` atomic from a reader's point of view: a concurrent `get`
//! observes the complete old value or the complete new value.
//!
//! `get` distinguishes three outcomes:
//! - `Ok(Some(token))`: a token is configured
//! - `Ok(None)`: nothing has been stored yet
//! - `Err(_)`: the backend could not be read
//!
//! ## Backends
//!
//! - [`SqliteTokenStore`]: one row in a sqlite table (default)
//! - [`FileTokenStore`]: one file, replaced via write-then-rename
//! - [`MemoryTokenStore`]: process memory, for tests and throwaway runs

pub mod file;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{StoreBackend, StoreConfig};

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;
pub use sqlite::SqliteTokenStore;

/// Token store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored token is not valid UTF-8")]
    Corrupt,

    #[error("Refusing to store an empty token")]
    EmptyValue,

    #[error("Invalid secret name: {0}")]
    InvalidKey(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Get/set access to the single current workshop token.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Current token, or `None` if it was never set.
    async fn get(&self) -> StoreResult<Option<String>>;

    /// Replace the current token. Empty values are rejected.
    async fn set(&self, value: &str) -> StoreResult<()>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Shared store handle injected into every handler.
pub type SharedSecretStore = Arc<dyn SecretStore>;

/// Build the backend selected in configuration.
pub async fn open_store(config: &StoreConfig) -> StoreResult<SharedSecretStore> {
    let store: SharedSecretStore = match config.backend {
        StoreBackend::Sqlite => Arc::new(SqliteTokenStore::connect(&config.url, &config.key).await?),
        StoreBackend::File => Arc::new(FileTokenStore::new(&config.path, &config.key)?),
        StoreBackend::Memory => Arc::new(MemoryTokenStore::new()),
    };
    info!("Token store ready (backend={})", store.backend());
    Ok(store)
}

pub(crate) fn reject_empty(value: &str) -> StoreResult<()> {
    if value.is_empty() {
        return Err(StoreError::EmptyValue);
    }
    Ok(())
}
