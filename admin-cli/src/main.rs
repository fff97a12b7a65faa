mod client;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use client::SecretsClient;

#[derive(Parser)]
#[command(name = "workshop-secrets-admin")]
#[command(about = "Operator CLI for the workshop secrets server")]
struct Cli {
    /// Base URL of the secrets server
    #[arg(long, env = "WORKSHOP_SECRETS_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Admin secret (prompted for when not given)
    #[arg(long, env = "WORKSHOP_ADMIN_SECRET", hide_env_values = true, global = true)]
    admin_secret: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the workshop token
    Rotate {
        /// New token; the server enforces its configured length policy
        new_token: String,
    },
    /// Print the current workshop token
    ShowToken,
    /// Fetch the credential bundle with a participant token
    Credentials {
        workshop_token: String,
        /// Print the api key instead of masking it
        #[arg(long)]
        reveal: bool,
    },
    /// Check that the server is up
    Health,
}

fn admin_secret(provided: Option<String>) -> anyhow::Result<Zeroizing<String>> {
    let secret = match provided {
        Some(secret) => secret,
        None => rpassword::read_password_from_tty(Some("Admin secret: "))
            .context("failed to read admin secret")?,
    };
    if secret.trim().is_empty() {
        bail!("admin secret must not be empty");
    }
    Ok(Zeroizing::new(secret))
}

fn mask(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    format!("{}…", visible)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = SecretsClient::new(&cli.url, Duration::from_secs(cli.timeout_secs))?;

    match cli.command {
        Commands::Rotate { new_token } => {
            let secret = admin_secret(cli.admin_secret)?;
            let resp = client.rotate(&secret, &new_token).await?;
            println!("{}", resp.message);
        }
        Commands::ShowToken => {
            let secret = admin_secret(cli.admin_secret)?;
            println!("{}", client.get_token(&secret).await?);
        }
        Commands::Credentials {
            workshop_token,
            reveal,
        } => {
            let mut creds = client.get_credentials(&workshop_token).await?;
            if !reveal {
                creds.api_key = mask(&creds.api_key);
            }
            println!("endpoint:             {}", creds.endpoint);
            println!("api_key:              {}", creds.api_key);
            println!("chat_deployment:      {}", creds.chat_deployment);
            println!("embedding_deployment: {}", creds.embedding_deployment);
            println!("api_version:          {}", creds.api_version);
        }
        Commands::Health => {
            let health = client.health().await?;
            println!("{} ({} v{})", health.status, health.service, health.version);
        }
    }

    Ok(())
}
