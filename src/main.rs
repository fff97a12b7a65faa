use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workshop_secrets::{config::AppConfig, store, web};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before anything reads the environment
    let _ = dotenvy::dotenv();

    // Initialize logging first
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workshop_secrets=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting workshop secrets server v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!("Configuration loaded");

    // Missing values are reported per request as configuration errors so
    // /health keeps answering; flag them loudly at startup.
    if config.admin.secret.is_blank() {
        error!("Admin secret not configured! Token rotation and inspection are disabled.");
        error!("Set admin.secret in config/local.toml or WORKSHOP_SECRETS__ADMIN__SECRET");
    }
    if !config.credential_bundle().is_configured() {
        error!("Credential endpoint or api key not configured! /get-credentials will fail.");
    }

    let secret_store = store::open_store(&config.store)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open token store: {}", e))?;

    let state = web::AppState::new(secret_store, &config);

    if let Some(token) = &config.bootstrap_token {
        match state.rotation.seed_if_absent(token.expose()).await {
            Ok(true) => info!("Bootstrap token written to empty store"),
            Ok(false) => info!("Store already holds a token; bootstrap token ignored"),
            Err(e) => return Err(anyhow::anyhow!("Bootstrap token rejected: {}", e)),
        }
    } else if !config.admin.secret.is_blank() {
        info!("Waiting for an admin to set the workshop token via /rotate-token");
    }

    let app = web::create_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
