use crate::auth::AuthResult;
use crate::error::{AppError, AppResult};
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;
use workshop_secrets_types::{
    CredentialsResponse, GetCredentialsRequest, GetTokenRequest, HealthResponse,
    RotateTokenRequest, RotateTokenResponse, TokenResponse,
};

const SERVICE_NAME: &str = "workshop-secrets-server";

/// Kind of body rejection. Serde's error text quotes submitted values, so
/// only the kind is ever logged.
fn rejection_kind(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::JsonDataError(_) => "json data error",
        JsonRejection::JsonSyntaxError(_) => "json syntax error",
        JsonRejection::MissingJsonContentType(_) => "missing json content type",
        JsonRejection::BytesRejection(_) => "unreadable body",
        _ => "other",
    }
}

/// Map an unreadable JSON body to a 400 without echoing its contents.
fn malformed(rejection: JsonRejection, expected: &str) -> AppError {
    debug!(
        "Rejected request body: {} ({})",
        rejection_kind(&rejection),
        rejection.status()
    );
    AppError::malformed(format!("Expected JSON with {}.", expected))
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handler: POST /get-credentials
///
/// Exchanges a valid workshop token for the credential bundle.
pub async fn get_credentials(
    State(state): State<AppState>,
    payload: Result<Json<GetCredentialsRequest>, JsonRejection>,
) -> AppResult<Json<CredentialsResponse>> {
    let Json(request) = payload.map_err(|e| malformed(e, "'workshop_token'"))?;

    match state.auth.validate(&request.workshop_token).await? {
        AuthResult::Accepted(bundle) => Ok(Json(bundle.to_response())),
        AuthResult::Rejected => Err(AppError::InvalidToken),
        AuthResult::Unconfigured => Err(AppError::NotConfigured("workshop token or credentials")),
    }
}

/// Handler: POST /rotate-token
///
/// Replaces the workshop token. The response never contains the new value.
pub async fn rotate_token(
    State(state): State<AppState>,
    payload: Result<Json<RotateTokenRequest>, JsonRejection>,
) -> AppResult<Json<RotateTokenResponse>> {
    let Json(request) = payload.map_err(|e| malformed(e, "'admin_secret' and 'new_token'"))?;

    state
        .rotation
        .rotate(&request.admin_secret, &request.new_token)
        .await?;

    Ok(Json(RotateTokenResponse {
        success: true,
        message: "Workshop token updated successfully".to_string(),
    }))
}

/// Handler: POST /get-token
///
/// Returns the current workshop token to an authorized operator.
pub async fn get_token(
    State(state): State<AppState>,
    payload: Result<Json<GetTokenRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Json(request) = payload.map_err(|e| malformed(e, "'admin_secret'"))?;

    let token = state
        .rotation
        .inspect(&request.admin_secret)
        .await?
        .ok_or(AppError::NotConfigured("workshop token"))?;

    Ok(Json(TokenResponse { token }))
}

/// Create the web router
///
/// Routes are served at the root and again under `/api`, the prefix used
/// by serverless deployments of the same service.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api: Router<AppState> = Router::new()
        .route("/health", get(health))
        .route("/get-credentials", post(get_credentials))
        .route("/rotate-token", post(rotate_token))
        .route("/get-token", post(get_token));

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
