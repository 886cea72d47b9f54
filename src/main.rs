//! vmcusage - VMware Cloud on AWS usage reporting CLI.
//!
//! Authenticates against the Cloud Services Platform and reports deployment
//! usage and subscription line items for an organization.

#![deny(clippy::all)]

mod auth;
mod config;
mod connection;
mod error;
mod report;
mod vmc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{ApiToken, Config};
use error::AppError;
use vmc::VmcClient;

#[derive(Parser, Debug)]
#[command(
    name = "vmcusage",
    version,
    about = "Report VMware Cloud on AWS deployment usage and subscriptions"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Organization ID the reports run against
    #[arg(long, global = true, env = "VMC_ORG_ID")]
    org_id: Option<String>,

    /// Long-lived CSP API refresh token
    #[arg(long, global = true, env = "VMC_REFRESH_TOKEN", hide_env_values = true)]
    refresh_token: Option<String>,

    /// CSP host used for the token exchange
    #[arg(long, global = true)]
    csp_server: Option<String>,

    /// VMware Cloud API host
    #[arg(long, global = true)]
    vmc_server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report per-deployment vSphere and vSAN usage
    Deployments {
        /// Only show deployments whose id or name matches
        #[arg(long)]
        filter: Option<String>,
    },
    /// Report subscription line items
    Subscriptions {
        /// Only show the subscription with this id
        #[arg(long)]
        filter: Option<String>,

        /// Expand bundled subscriptions into one row per contained product
        #[arg(long)]
        expand_bundles: bool,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present) before anything else
    if let Err(e) = dotenvy::dotenv() {
        // .env file is optional - only log if it's not a "file not found" error
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    info!("Starting vmcusage v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli, &config).await {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        if let Some(app_error) = e.downcast_ref::<AppError>() {
            eprintln!("{}", app_error.user_message());
            if app_error.requires_reauth() {
                eprintln!(
                    "Hint: generate a fresh API token in the CSP console and update \
                     VMC_REFRESH_TOKEN."
                );
            }
        }
        std::process::exit(1);
    }
}

/// Load configuration, apply command-line overrides, then validate.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(org_id) = &cli.org_id {
        config.vmc.org_id = org_id.clone();
    }
    if let Some(refresh_token) = &cli.refresh_token {
        config.auth.refresh_token = ApiToken::new(refresh_token.clone());
    }
    if let Some(csp_server) = &cli.csp_server {
        config.auth.csp_server = csp_server.clone();
    }
    if let Some(vmc_server) = &cli.vmc_server {
        config.vmc.server = vmc_server.clone();
    }

    config.validate()?;

    Ok(config)
}

/// Initialize tracing/logging.
fn init_logging(config: &Config) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Authenticate and dispatch the requested report.
async fn run(cli: Cli, config: &Config) -> Result<()> {
    connection::connect(config).await?;
    let client = VmcClient::new().map_err(AppError::Api)?;

    match cli.command {
        Commands::Deployments { filter } => {
            report::deployment_report(&client, filter.as_deref()).await?;
        }
        Commands::Subscriptions {
            filter,
            expand_bundles,
        } => {
            report::subscription_report(&client, filter.as_deref(), expand_bundles).await?;
        }
    }

    Ok(())
}
