// MCP (Model Context Protocol) server for the Luskad API
// Exposes read-only project data as tools to agent clients

pub mod error;
pub mod protocol;
pub mod server;
pub mod stdio;
pub mod tools;

pub use error::ToolError;
pub use server::McpServer;
