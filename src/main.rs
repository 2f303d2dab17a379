//! gmail-mcp-rs: Read-only Gmail MCP server over stdio
//!
//! This server exposes a Gmail mailbox to MCP clients through five read-only
//! tools (list, get, search, labels, unread count). Every message is
//! normalized into a fixed record shape with a single extracted text body.
//!
//! # Architecture
//!
//! - [`main`]: Process entry point with CLI flags, env loading and stdio serving
//! - [`config`]: Environment-driven configuration for the Gmail connection
//! - [`errors`]: Application error model with MCP error mapping
//! - [`mail_client`]: Provider seam trait and raw provider records
//! - [`gmail`]: Gmail REST transport implementing the provider seam
//! - [`mime`]: Header lookup and three-tier body extraction
//! - [`normalize`]: Raw record to output record conversion
//! - [`mailbox`]: Query operations over an injected mail client
//! - [`server`]: MCP tool handlers with validation
//! - [`models`]: Input/output DTOs and schema-bearing types

mod config;
mod errors;
mod gmail;
mod mail_client;
mod mailbox;
mod mime;
mod models;
mod normalize;
mod server;

use std::path::PathBuf;

use clap::Parser;
use config::ServerConfig;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing_subscriber::EnvFilter;

/// Command-line flags
#[derive(Debug, Parser)]
#[command(name = "gmail-mcp-rs", version, about = "Read-only Gmail MCP server over stdio")]
struct Cli {
    /// Load environment variables from this file instead of `./.env`
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,
}

/// Application entry point
///
/// Parses flags, loads the env file, initializes tracing to stderr, loads
/// config, and serves the MCP server over stdio. This process expects to be
/// spawned by an MCP client via `stdio` transport.
///
/// # Environment Variables
///
/// See [`ServerConfig::load_from_env`] for full configuration options.
///
/// # Example
///
/// ```no_run
/// GMAIL_MCP_ACCESS_TOKEN=ya29.a0Af... \
/// cargo run
/// ```
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::load_from_env()?;
    let client = gmail::GmailClient::new(&config)?;
    let mailbox = mailbox::Mailbox::new(client, config.fetch_concurrency);
    tracing::info!(
        user_id = %config.user_id,
        api_base_url = %config.api_base_url,
        "starting Gmail MCP server on stdio"
    );

    let service = server::GmailMcpServer::new(mailbox).serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
