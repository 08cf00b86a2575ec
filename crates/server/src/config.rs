use clap::{Parser, ValueEnum};
use luskad_client::DEFAULT_API_URL;
use std::fmt;

/// Extra ports tried after the configured one when it is already taken.
pub const PORT_FALLBACK_ATTEMPTS: u16 = 10;

#[derive(Parser, Debug)]
#[command(name = "luskad")]
#[command(about = "MCP server exposing Luskad project data to AI agents", long_about = None)]
#[command(version)]
pub struct Args {
    /// Luskad API base URL
    #[arg(long, env = "API_URL")]
    pub url: Option<String>,

    /// Luskad API key
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Transport to serve MCP over
    #[arg(long, env = "MCP_TRANSPORT", value_enum, ignore_case = true, default_value_t = TransportKind::Stdio)]
    pub transport: TransportKind,

    /// Port to listen on (http and sse transports)
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Host to bind to (http and sse transports)
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportKind {
    /// Newline-delimited JSON-RPC on stdin/stdout
    Stdio,
    /// HTTP server with `/mcp` and the legacy SSE endpoints
    Http,
    /// Same HTTP server as `http`
    Sse,
}

impl TransportKind {
    pub fn is_http(self) -> bool {
        matches!(self, Self::Http | Self::Sse)
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
            Self::Sse => "sse",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API key is not set. Pass --key or set the API_KEY environment variable")]
    MissingApiKey,
}

/// Validated startup configuration
#[derive(Clone)]
pub struct ServerConfig {
    pub api_url: String,
    pub api_key: String,
    pub transport: TransportKind,
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let api_key = args
            .key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let api_url = args
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_url,
            api_key,
            transport: args.transport,
            host: args.host,
            port: args.port,
        })
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("transport", &self.transport)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}
