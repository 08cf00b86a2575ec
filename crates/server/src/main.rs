use anyhow::{Context, Result};
use clap::Parser;
use luskad_client::{LuskadClient, ProjectApi};
use luskad_mcp::{stdio, McpServer};
use std::sync::Arc;

mod config;
mod http;

use config::{Args, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // A .env file is optional
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout belongs to the stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "luskad_server=info,luskad_mcp=info,luskad_client=info,tower_http=info".into()
            }),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ServerConfig::from_args(args)?;

    tracing::info!("Starting Luskad MCP server");
    tracing::info!("API URL: {}", config.api_url);

    let client = LuskadClient::builder()
        .base_url(&config.api_url)
        .api_key(&config.api_key)
        .build()
        .context("Failed to create Luskad API client")?;
    let api: Arc<dyn ProjectApi> = Arc::new(client);

    if config.transport.is_http() {
        http::serve(&config, api).await?;
    } else {
        tracing::info!("Luskad MCP Server running on stdio");
        stdio::serve_stdio(McpServer::new(api)).await?;
    }

    Ok(())
}
