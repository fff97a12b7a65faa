use thiserror::Error;

use crate::admin::RotationError;
use crate::store::StoreError;

/// Application-wide error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Invalid new token: {0}")]
    InvalidNewToken(String),

    #[error("Invalid workshop token")]
    InvalidToken,

    #[error("Invalid admin secret")]
    InvalidAdminSecret,

    #[error("Not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AppError {
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedRequest(msg.into())
    }

    /// Message safe to send to the caller. Internal causes stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::NotConfigured(_) => {
                "Server configuration error. Contact instructor.".to_string()
            }
            Self::Storage(_) => "Token storage unavailable. Try again later.".to_string(),
            Self::MalformedRequest(msg) => format!("Invalid request body. {}", msg),
            Self::InvalidNewToken(msg) => msg.clone(),
            Self::InvalidToken => {
                "Invalid workshop token. Please check with your instructor.".to_string()
            }
            Self::InvalidAdminSecret => self.to_string(),
        }
    }
}

impl From<RotationError> for AppError {
    fn from(err: RotationError) -> Self {
        match err {
            RotationError::AdminUnconfigured => Self::NotConfigured("admin secret"),
            RotationError::Unauthorized => Self::InvalidAdminSecret,
            RotationError::InvalidNewToken(msg) => Self::InvalidNewToken(msg),
            RotationError::Storage(e) => Self::Storage(e),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convert AppError to HTTP status codes for web responses
impl AppError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidNewToken(_) => StatusCode::BAD_REQUEST,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::InvalidAdminSecret => StatusCode::UNAUTHORIZED,
            Self::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = workshop_secrets_types::ErrorResponse {
            error: self.public_message(),
            code: Some(status.as_u16()),
        };
        (status, axum::Json(body)).into_response()
    }
}
