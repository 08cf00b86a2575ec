// Clock tool, the one tool that never touches the network

use crate::error::ToolError;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_object, Tool};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

/// Tool returning the current date and time
pub struct CurrentDateTool;

impl CurrentDateTool {
    pub const NAME: &'static str = "get-current-date";

    /// Current UTC time as RFC 3339 with millisecond precision, e.g. `2025-03-01T09:30:00.000Z`
    pub fn now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[async_trait::async_trait]
impl Tool for CurrentDateTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.to_string(),
            title: Some("Get Current Date".to_string()),
            description: "Retrieve the current date and time in ISO format for reference in project planning and scheduling".to_string(),
            input_schema: json_schema_object(serde_json::json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult, ToolError> {
        Ok(CallToolResult::text(Self::now()))
    }
}
