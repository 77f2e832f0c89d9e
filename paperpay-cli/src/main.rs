//! paperpay
//!
//! Operator CLI for the signed payment-intent client.

mod commands;
mod config;
mod shutdown;

use clap::{Parser, Subcommand};
use commands::{CreateIntentArgs, SignArgs};
use config::ConfigLoader;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// paperpay - create signed payment intents against the payment server
#[derive(Parser, Debug)]
#[command(name = "paperpay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (default: ./paperpay.toml, optional)
    #[arg(short, long, env = "PAPERPAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the payment server base URL
    #[arg(long)]
    base_url: Option<Url>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a payment intent and print the gateway fields
    CreateIntent(CreateIntentArgs),
    /// Print the signature headers for a request body (needs only the API
    /// key and secret)
    Sign(SignArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    tracing::debug!("Starting paperpay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let loader = ConfigLoader::new(cli.config.as_deref(), cli.base_url);

    match cli.command {
        Command::CreateIntent(args) => {
            let config = loader.load().map_err(|e| {
                tracing::error!("Failed to load configuration: {}", e);
                e
            })?;
            commands::create_intent(config, args).await
        }
        Command::Sign(args) => {
            // Signing only needs the credentials, not the server address.
            let signer = loader.load_signer().map_err(|e| {
                tracing::error!("Failed to load credentials: {}", e);
                e
            })?;
            commands::sign(&signer, args)
        }
    }
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper_util=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
