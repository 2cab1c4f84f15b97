//! Search Console MCP Server
//!
//! A Model Context Protocol (MCP) server exposing Google Search Console:
//! search analytics, URL inspection, sitemap management and property
//! administration.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use gsc_mcp_server_rust::config::Config;
use gsc_mcp_server_rust::error::Result;
use gsc_mcp_server_rust::gsc::auth::Authenticator;
use gsc_mcp_server_rust::gsc::client::GscClient;
use gsc_mcp_server_rust::mcp::server::McpServer;

/// Search Console MCP Server
#[derive(Parser)]
#[command(name = "gsc-mcp-server")]
#[command(author, version, about = "A Model Context Protocol server for Google Search Console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with Search Console (run this first)
    Auth,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::new()?;

    match cli.command {
        Some(Commands::Auth) => {
            let authenticator = Authenticator::new(config).await?;
            authenticator.authenticate_interactive().await?;
            eprintln!("Authentication completed successfully!");
            std::process::exit(0);
        }
        None => {
            run_server(config).await?;
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    if !config.oauth_keys_exist() {
        eprintln!("Error: OAuth keys file not found.");
        eprintln!(
            "Please place gcp-oauth.keys.json in the current directory or {}",
            config.config_dir.display()
        );
        std::process::exit(1);
    }

    let authenticator = Authenticator::new(config).await?;

    if !authenticator.is_authenticated().await {
        eprintln!("Error: Not authenticated. Please run 'gsc-mcp-server auth' first.");
        std::process::exit(1);
    }

    let client = Arc::new(GscClient::new(Arc::new(authenticator)));

    let mut server = McpServer::new(client);
    server.run_stdio().await?;

    Ok(())
}
