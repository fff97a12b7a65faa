use std::time::Duration;
use tracing::{error, info, warn};
use zeroize::Zeroizing;

use crate::auth::matcher::ConstantTimeMatcher;
use crate::credentials::CredentialBundle;
use crate::store::{SharedSecretStore, StoreResult};

/// Outcome of checking a participant's workshop token.
#[derive(Debug, Clone)]
pub enum AuthResult {
    Accepted(CredentialBundle),
    Rejected,
    /// No token stored yet, or the credential bundle is incomplete.
    Unconfigured,
}

impl AuthResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Releases the credential bundle to holders of the current workshop token.
///
/// The token is re-read from the store on every call so rotations take
/// effect immediately.
pub struct AuthGate {
    store: SharedSecretStore,
    bundle: CredentialBundle,
    failure_delay: Duration,
}

impl AuthGate {
    pub fn new(store: SharedSecretStore, bundle: CredentialBundle, failure_delay: Duration) -> Self {
        Self {
            store,
            bundle,
            failure_delay,
        }
    }

    /// Check `provided` against the stored token.
    ///
    /// Every rejection sleeps for the configured delay before returning,
    /// including empty input. The sleep only parks this request.
    pub async fn validate(&self, provided: &str) -> StoreResult<AuthResult> {
        if !self.bundle.is_configured() {
            error!("Credential endpoint or api key not configured");
            return Ok(AuthResult::Unconfigured);
        }

        let current = match self.store.get().await? {
            Some(token) if !token.is_empty() => Zeroizing::new(token),
            _ => {
                error!("Workshop token not configured in {} store", self.store.backend());
                return Ok(AuthResult::Unconfigured);
            }
        };

        // Non-short-circuit `&` keeps the comparison on the empty-input path too.
        let matched = !provided.is_empty() & ConstantTimeMatcher::equals(provided, &current);
        if !matched {
            warn!("Invalid token attempt");
            tokio::time::sleep(self.failure_delay).await;
            return Ok(AuthResult::Rejected);
        }

        info!("Valid token attempt");
        Ok(AuthResult::Accepted(self.bundle.clone()))
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("backend", &self.store.backend())
            .field("failure_delay", &self.failure_delay)
            .finish_non_exhaustive()
    }
}
