// Tool execution errors

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Failure of a tool invocation at the protocol level.
///
/// Backend failures are not represented here: those are reported inside a successful
/// tool result so the calling agent can read them.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Arguments do not match the tool's input schema.
    #[error("Invalid arguments for tool {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
}

impl ToolError {
    pub fn invalid_arguments(tool: &str, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}

/// Deserialize tool arguments, treating a missing arguments object as empty.
pub fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::invalid_arguments(tool, e.to_string()))
}
