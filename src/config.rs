use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use zeroize::Zeroizing;

use crate::credentials::CredentialBundle;

/// Smallest token length the rotation policy will ever accept.
pub const MIN_TOKEN_LENGTH_FLOOR: usize = 4;

/// A configured secret value. Wiped on drop and never printed by `Debug`.
#[derive(Clone, Default)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// HTTP listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which durable backend holds the workshop token.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Sqlite,
    File,
    /// Process memory only. Lost on restart.
    Memory,
}

/// Token store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    /// sqlx connection string for the sqlite backend
    #[serde(default = "default_store_url")]
    pub url: String,
    /// Directory holding the token file for the file backend
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Name of the single stored secret
    #[serde(default = "default_store_key")]
    pub key: String,
}

fn default_backend() -> StoreBackend {
    StoreBackend::Sqlite
}

fn default_store_url() -> String {
    "sqlite://data/secrets.db?mode=rwc".to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data")
}

fn default_store_key() -> String {
    "workshop-token".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_store_url(),
            path: default_store_path(),
            key: default_store_key(),
        }
    }
}

/// Operator authentication
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminConfig {
    /// Static admin secret. Empty means privileged operations fail closed.
    #[serde(default)]
    pub secret: SecretString,
}

/// Provisioning details handed out to participants
#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: SecretString,
    #[serde(default = "default_chat_deployment")]
    pub chat_deployment: String,
    #[serde(default = "default_embedding_deployment")]
    pub embedding_deployment: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_chat_deployment() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_deployment() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_api_version() -> String {
    "2024-08-01-preview".to_string()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: SecretString::default(),
            chat_deployment: default_chat_deployment(),
            embedding_deployment: default_embedding_deployment(),
            api_version: default_api_version(),
        }
    }
}

/// Failure-path delays
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_token_failure_delay_ms")]
    pub token_failure_delay_ms: u64,
    #[serde(default = "default_admin_failure_delay_ms")]
    pub admin_failure_delay_ms: u64,
}

fn default_token_failure_delay_ms() -> u64 {
    500
}

fn default_admin_failure_delay_ms() -> u64 {
    1000
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_failure_delay_ms: default_token_failure_delay_ms(),
            admin_failure_delay_ms: default_admin_failure_delay_ms(),
        }
    }
}

impl AuthConfig {
    pub fn token_failure_delay(&self) -> Duration {
        Duration::from_millis(self.token_failure_delay_ms)
    }

    pub fn admin_failure_delay(&self) -> Duration {
        Duration::from_millis(self.admin_failure_delay_ms)
    }
}

/// Strength rules for newly rotated tokens
#[derive(Debug, Deserialize, Clone)]
pub struct PolicyConfig {
    #[serde(default = "default_min_token_length")]
    pub min_token_length: usize,
    #[serde(default)]
    pub max_token_length: Option<usize>,
}

fn default_min_token_length() -> usize {
    MIN_TOKEN_LENGTH_FLOOR
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_token_length: default_min_token_length(),
            max_token_length: None,
        }
    }
}

/// Root application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Initial token written at startup when the store is still empty
    #[serde(default)]
    pub bootstrap_token: Option<SecretString>,
}

/// Environment overrides. Values stay raw strings: secrets like `007` must
/// not be coerced to numbers. Numeric fields are converted on deserialize.
fn env_source() -> Environment {
    Environment::with_prefix("WORKSHOP_SECRETS").separator("__")
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default config file
            .add_source(File::with_name("config/default").required(false))
            // Override with local config if present
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (prefix: WORKSHOP_SECRETS__)
            // e.g., WORKSHOP_SECRETS__ADMIN__SECRET, WORKSHOP_SECRETS__SERVER__PORT
            .add_source(env_source())
            .build()?;

        config.try_deserialize()
    }

    /// Listen address for the HTTP server
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Build the credential bundle, normalizing copy/paste whitespace.
    pub fn credential_bundle(&self) -> CredentialBundle {
        CredentialBundle::new(
            &self.credentials.endpoint,
            self.credentials.api_key.expose(),
            &self.credentials.chat_deployment,
            &self.credentials.embedding_deployment,
            &self.credentials.api_version,
        )
    }

    /// Admin secret with surrounding whitespace removed.
    pub fn admin_secret(&self) -> SecretString {
        SecretString::new(self.admin.secret.expose().trim())
    }
}
