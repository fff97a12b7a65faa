use anyhow::{anyhow, Result};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use workshop_secrets_types::{
    CredentialsResponse, ErrorResponse, GetCredentialsRequest, GetTokenRequest, HealthResponse,
    RotateTokenRequest, RotateTokenResponse, TokenResponse,
};

/// Client for the workshop secrets HTTP API.
pub struct SecretsClient {
    http: reqwest::Client,
    base_url: String,
}

impl SecretsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let resp = self.http.get(self.url("/health")).send().await?;
        decode(resp).await
    }

    pub async fn rotate(&self, admin_secret: &str, new_token: &str) -> Result<RotateTokenResponse> {
        let body = RotateTokenRequest {
            admin_secret: admin_secret.to_string(),
            new_token: new_token.to_string(),
        };
        self.post("/rotate-token", &body).await
    }

    pub async fn get_token(&self, admin_secret: &str) -> Result<String> {
        let body = GetTokenRequest {
            admin_secret: admin_secret.to_string(),
        };
        let token: TokenResponse = self.post("/get-token", &body).await?;
        Ok(token.token)
    }

    pub async fn get_credentials(&self, workshop_token: &str) -> Result<CredentialsResponse> {
        let body = GetCredentialsRequest {
            workshop_token: workshop_token.to_string(),
        };
        self.post("/get-credentials", &body).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        debug!("POST {}", url);
        let resp = self.http.post(&url).json(body).send().await?;
        decode(resp).await
    }
}

/// Decode a success body, or turn the server's `{"error"}` body into an error.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let text = resp.text().await.unwrap_or_default();
    Err(anyhow!("server returned {}: {}", status, error_message(text)))
}

/// The `error` field of a JSON error body, or the raw text.
fn error_message(text: String) -> String {
    serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.error)
        .unwrap_or(text)
}
