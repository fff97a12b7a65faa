//! The static provisioning bundle released to participants holding a valid token.

use crate::config::SecretString;
use workshop_secrets_types::CredentialsResponse;

/// Endpoint, api key and deployment identifiers for the model service.
///
/// Values are normalized once at construction: surrounding whitespace is
/// trimmed, and the api key also loses any embedded CR/LF picked up by
/// copy/paste into deployment settings.
#[derive(Debug, Clone)]
pub struct CredentialBundle {
    endpoint: String,
    api_key: SecretString,
    chat_deployment: String,
    embedding_deployment: String,
    api_version: String,
}

impl CredentialBundle {
    pub fn new(
        endpoint: &str,
        api_key: &str,
        chat_deployment: &str,
        embedding_deployment: &str,
        api_version: &str,
    ) -> Self {
        let api_key: String = api_key
            .trim()
            .chars()
            .filter(|c| *c != '\r' && *c != '\n')
            .collect();

        Self {
            endpoint: endpoint.trim().to_string(),
            api_key: SecretString::new(api_key),
            chat_deployment: chat_deployment.trim().to_string(),
            embedding_deployment: embedding_deployment.trim().to_string(),
            api_version: api_version.trim().to_string(),
        }
    }

    /// Endpoint and api key are both required before any token is checked.
    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty() && !self.api_key.is_blank()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn chat_deployment(&self) -> &str {
        &self.chat_deployment
    }

    pub fn embedding_deployment(&self) -> &str {
        &self.embedding_deployment
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Full wire representation, api key included.
    pub fn to_response(&self) -> CredentialsResponse {
        CredentialsResponse {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.expose().to_string(),
            chat_deployment: self.chat_deployment.clone(),
            embedding_deployment: self.embedding_deployment.clone(),
            api_version: self.api_version.clone(),
        }
    }
}
