//! JSON request and response bodies for the workshop secrets HTTP API.
//!
//! Shared between the server (`workshop-secrets`) and the operator CLI
//! (`workshop-secrets-admin`) so both sides agree on field names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of `POST /get-credentials`.
#[derive(Clone, Serialize, Deserialize)]
pub struct GetCredentialsRequest {
    pub workshop_token: String,
}

impl fmt::Debug for GetCredentialsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetCredentialsRequest")
            .field("workshop_token", &"<redacted>")
            .finish()
    }
}

/// Successful `POST /get-credentials` response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsResponse {
    pub endpoint: String,
    pub api_key: String,
    pub chat_deployment: String,
    pub embedding_deployment: String,
    pub api_version: String,
}

impl fmt::Debug for CredentialsResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsResponse")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("chat_deployment", &self.chat_deployment)
            .field("embedding_deployment", &self.embedding_deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Body of `POST /rotate-token`.
#[derive(Clone, Serialize, Deserialize)]
pub struct RotateTokenRequest {
    pub admin_secret: String,
    pub new_token: String,
}

impl fmt::Debug for RotateTokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotateTokenRequest").finish_non_exhaustive()
    }
}

/// Successful `POST /rotate-token` response. Never carries the new token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotateTokenResponse {
    pub success: bool,
    pub message: String,
}

/// Body of `POST /get-token`.
#[derive(Clone, Serialize, Deserialize)]
pub struct GetTokenRequest {
    pub admin_secret: String,
}

impl fmt::Debug for GetTokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetTokenRequest").finish_non_exhaustive()
    }
}

/// Successful `POST /get-token` response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// `GET /health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub code: Option<u16>,
}
