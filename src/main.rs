/// Stratus - declarative GKE cluster bring-up
///
/// A Rust-based tool for declaring a managed GKE cluster with a separately
/// managed node pool, and producing a kubeconfig for downstream tooling.
mod config;
mod gke;
mod graph;
mod k8s;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::StackConfig;
use crate::gke::{ContainerEngine, GkeClient, GkeEngine};

#[derive(Parser)]
#[command(name = "stratus")]
#[command(about = "Declare a GKE cluster with a managed node pool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Stack configuration file path
    #[arg(short, long, default_value = "stack.yaml")]
    config: PathBuf,

    /// Output directory for generated files
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Declare the cluster and node pool, then write the kubeconfig
    Up,

    /// Show cluster status
    Status,

    /// Generate example stack configuration file
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("stratus={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Up => up(&cli).await,
        Commands::Status => show_status(&cli).await,
        Commands::Init => init_config(&cli).await,
    };

    if let Err(e) = result {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Declare the resource graph and write the kubeconfig
async fn up(cli: &Cli) -> Result<()> {
    info!("Starting cluster bring-up...");

    // Configuration errors are fatal before any resource declaration is made
    let config = StackConfig::from_file(&cli.config).context("Failed to load configuration")?;

    info!("Cluster name: {}", config.cluster_name);

    let token = config.get_access_token()?;
    let client = GkeClient::new(token, config.project.clone(), config.zone.clone())?;
    let engine = GkeEngine::new(client, config.zone.clone());

    let outputs = graph::build(&engine, &config).await?;

    let kubeconfig_path = outputs.provider.write_kubeconfig(&cli.output).await?;

    info!("✓ Cluster bring-up completed successfully!");
    info!("");
    info!("Cluster details:");
    info!("  Name: {}", outputs.cluster.name);
    info!("  Endpoint: https://{}", outputs.cluster.endpoint);
    info!("  Location: {}", outputs.cluster.location);
    info!("  Control-plane version: {}", outputs.version);
    info!("  Node pool: {} ({} nodes)", graph::PRIMARY_NODE_POOL, config.cluster_node_count);
    info!("");
    info!("To access your cluster:");
    info!("  export KUBECONFIG={}", kubeconfig_path.display());
    info!("  kubectl get nodes");

    Ok(())
}

/// Show cluster status
async fn show_status(cli: &Cli) -> Result<()> {
    let config = StackConfig::from_file(&cli.config).context("Failed to load configuration")?;

    let token = config.get_access_token()?;
    let client = GkeClient::new(token, config.project.clone(), config.zone.clone())?;
    let engine = GkeEngine::new(client, config.zone.clone());

    let cluster = engine.get_cluster(&config.cluster_name).await?;

    info!("Cluster: {}", cluster.name);
    info!("  Status: {}", cluster.status);
    info!("  Endpoint: https://{}", cluster.endpoint);
    info!("  Location: {}", cluster.location);
    info!("  Control-plane version: {}", cluster.current_master_version);

    Ok(())
}

/// Initialize example stack configuration file
async fn init_config(cli: &Cli) -> Result<()> {
    if cli.config.exists() {
        anyhow::bail!(
            "Configuration file already exists: {}",
            cli.config.display()
        );
    }

    tokio::fs::write(&cli.config, StackConfig::example_yaml())
        .await
        .context("Failed to write configuration file")?;

    info!("Example configuration created: {}", cli.config.display());
    info!("");
    info!("Next steps:");
    info!("  1. Edit the configuration file to match your requirements");
    info!("  2. Set your API access token:");
    info!("     export GOOGLE_OAUTH_ACCESS_TOKEN=$(gcloud auth print-access-token)");
    info!("  3. Bring up the cluster:");
    info!("     stratus up");

    Ok(())
}
