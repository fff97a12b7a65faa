//! Admin-gated token rotation and inspection.
//!
//! Each call is one complete transaction:
//! authorize admin → validate the proposed token → persist → acknowledge.
//! Nothing is retried here; a failed write is reported and the operator
//! decides whether to try again.

use thiserror::Error;
use tracing::{error, info};

use crate::admin::gate::AdminGate;
use crate::config::{PolicyConfig, MIN_TOKEN_LENGTH_FLOOR};
use crate::store::{SharedSecretStore, StoreError};

/// Terminal failures of a rotation or inspection.
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("Admin secret not configured")]
    AdminUnconfigured,

    #[error("Invalid admin secret")]
    Unauthorized,

    #[error("{0}")]
    InvalidNewToken(String),

    #[error("Token storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// Shape rules for a proposed workshop token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    min_length: usize,
    max_length: Option<usize>,
}

impl TokenPolicy {
    /// Lengths are counted in characters after trimming. The minimum never
    /// drops below [`MIN_TOKEN_LENGTH_FLOOR`].
    pub fn new(min_length: usize, max_length: Option<usize>) -> Self {
        Self {
            min_length: min_length.max(MIN_TOKEN_LENGTH_FLOOR),
            max_length,
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(config.min_token_length, config.max_token_length)
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Returns the trimmed token to persist, or the reason it was refused.
    pub fn check<'a>(&self, proposed: &'a str) -> Result<&'a str, String> {
        let token = proposed.trim();
        let len = token.chars().count();

        if len == 0 {
            return Err("New token must not be empty".to_string());
        }
        if len < self.min_length {
            return Err(format!(
                "New token must be at least {} characters",
                self.min_length
            ));
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Err(format!("New token must be at most {} characters", max));
            }
        }
        Ok(token)
    }
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self::new(MIN_TOKEN_LENGTH_FLOOR, None)
    }
}

/// Orchestrates admin authorization, token validation and persistence.
pub struct RotationProtocol {
    admin: AdminGate,
    store: SharedSecretStore,
    policy: TokenPolicy,
}

impl std::fmt::Debug for RotationProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationProtocol")
            .field("admin", &self.admin)
            .field("backend", &self.store.backend())
            .field("policy", &self.policy)
            .finish()
    }
}

impl RotationProtocol {
    pub fn new(admin: AdminGate, store: SharedSecretStore, policy: TokenPolicy) -> Self {
        Self {
            admin,
            store,
            policy,
        }
    }

    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    async fn authorize(&self, admin_secret: &str) -> Result<(), RotationError> {
        if !self.admin.is_configured() {
            error!("Rejecting admin request: admin secret not configured");
            return Err(RotationError::AdminUnconfigured);
        }
        if !self.admin.authorize(admin_secret).await {
            return Err(RotationError::Unauthorized);
        }
        Ok(())
    }

    /// Replace the workshop token. The new value is never logged or echoed.
    pub async fn rotate(&self, admin_secret: &str, new_token: &str) -> Result<(), RotationError> {
        self.authorize(admin_secret).await?;

        let token = self
            .policy
            .check(new_token)
            .map_err(RotationError::InvalidNewToken)?;

        self.store.set(token).await.map_err(|e| {
            error!("Token rotation failed to persist: {}", e);
            RotationError::Storage(e)
        })?;

        info!("Token rotated");
        Ok(())
    }

    /// Return the current token verbatim to an authorized operator.
    pub async fn inspect(&self, admin_secret: &str) -> Result<Option<String>, RotationError> {
        self.authorize(admin_secret).await?;

        let token = self.store.get().await.map_err(|e| {
            error!("Token read failed: {}", e);
            RotationError::Storage(e)
        })?;
        info!("Token inspected by admin");
        Ok(token)
    }

    /// Write `token` only if the store holds nothing yet. Returns whether
    /// it was written. Used for the startup bootstrap token; no admin check.
    pub async fn seed_if_absent(&self, token: &str) -> Result<bool, RotationError> {
        if self.store.get().await?.is_some() {
            return Ok(false);
        }
        let token = self
            .policy
            .check(token)
            .map_err(RotationError::InvalidNewToken)?;
        self.store.set(token).await?;
        info!("Initial workshop token seeded");
        Ok(true)
    }
}
