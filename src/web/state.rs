use std::sync::Arc;

use crate::admin::{AdminGate, RotationProtocol, TokenPolicy};
use crate::auth::AuthGate;
use crate::config::AppConfig;
use crate::store::SharedSecretStore;

/// Application state for web handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthGate>,
    pub rotation: Arc<RotationProtocol>,
}

impl AppState {
    /// Wire both request paths to the same store handle.
    pub fn new(store: SharedSecretStore, config: &AppConfig) -> Self {
        let auth = AuthGate::new(
            store.clone(),
            config.credential_bundle(),
            config.auth.token_failure_delay(),
        );
        let admin = AdminGate::new(config.admin_secret(), config.auth.admin_failure_delay());
        let rotation =
            RotationProtocol::new(admin, store, TokenPolicy::from_config(&config.policy));

        Self {
            auth: Arc::new(auth),
            rotation: Arc::new(rotation),
        }
    }
}
