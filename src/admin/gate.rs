use std::time::Duration;
use tracing::{error, warn};

use crate::auth::ConstantTimeMatcher;
use crate::config::SecretString;

/// Checks the operator's static admin secret before privileged operations.
///
/// An unset secret fails closed: `authorize` always returns `false`, and
/// callers should check [`AdminGate::is_configured`] first so they can report
/// a configuration error instead of "unauthorized".
pub struct AdminGate {
    secret: SecretString,
    failure_delay: Duration,
}

impl AdminGate {
    pub fn new(secret: SecretString, failure_delay: Duration) -> Self {
        Self {
            secret,
            failure_delay,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.secret.is_blank()
    }

    /// Constant-time check of `provided`; sleeps for the failure delay on
    /// every mismatch.
    pub async fn authorize(&self, provided: &str) -> bool {
        if !self.is_configured() {
            error!("Admin secret not configured; privileged operations disabled");
            return false;
        }

        let matched =
            !provided.is_empty() & ConstantTimeMatcher::equals(provided, self.secret.expose());
        if !matched {
            warn!("Invalid admin secret attempt");
            tokio::time::sleep(self.failure_delay).await;
        }
        matched
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("configured", &self.is_configured())
            .field("failure_delay", &self.failure_delay)
            .finish()
    }
}
