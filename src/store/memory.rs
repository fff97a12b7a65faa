use async_trait::async_trait;
use tokio::sync::RwLock;
use zeroize::Zeroizing;

use super::{reject_empty, SecretStore, StoreResult};

/// In-memory token store.
///
/// Not durable: the token is lost on restart. Previous values are zeroized
/// when overwritten.
pub struct MemoryTokenStore {
    token: RwLock<Option<Zeroizing<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self {
            token: RwLock::new(None),
        }
    }

    /// Store pre-populated with a token.
    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(Zeroizing::new(token.to_string()))),
        }
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTokenStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl SecretStore for MemoryTokenStore {
    async fn get(&self) -> StoreResult<Option<String>> {
        Ok(self.token.read().await.as_ref().map(|t| t.as_str().to_string()))
    }

    async fn set(&self, value: &str) -> StoreResult<()> {
        reject_empty(value)?;
        *self.token.write().await = Some(Zeroizing::new(value.to_string()));
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
