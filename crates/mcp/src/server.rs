// MCP server: JSON-RPC dispatch over a tool registry

use crate::protocol::{
    negotiate_protocol_version, CallToolParams, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo,
    ToolsCapability, JSONRPC_VERSION,
};
use crate::tools::{self, ToolRegistry};
use luskad_client::ProjectApi;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const SERVER_NAME: &str = "Luskad";

pub const SERVER_INSTRUCTIONS: &str =
    "Luskad is a tool that allows you to search for and retrieve information from the Luskad API.";

/// One MCP server instance.
///
/// Instances are cheap and hold no connection state, so each connection gets its own.
pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    /// Create a server exposing the full Luskad catalog.
    pub fn new(api: Arc<dyn ProjectApi>) -> Self {
        Self {
            registry: tools::catalog(api),
        }
    }

    /// Handle a decoded JSON-RPC payload: a single message or a batch array.
    ///
    /// Returns `None` when nothing should be sent back (notifications and client
    /// responses).
    pub async fn handle_payload(&self, payload: Value) -> Option<Value> {
        match payload {
            Value::Array(messages) => {
                if messages.is_empty() {
                    return Some(to_json(&JsonRpcResponse::error(
                        Value::Null,
                        JsonRpcError::invalid_request(),
                    )));
                }

                let mut responses = Vec::with_capacity(messages.len());
                for message in messages {
                    if let Some(response) = self.handle_message(message).await {
                        responses.push(response);
                    }
                }

                if responses.is_empty() {
                    None
                } else {
                    Some(to_json(&responses))
                }
            }
            message => self
                .handle_message(message)
                .await
                .map(|response| to_json(&response)),
        }
    }

    /// Handle a single JSON-RPC message.
    pub async fn handle_message(&self, message: Value) -> Option<JsonRpcResponse> {
        if message.get("method").is_none() {
            if message.get("result").is_some() || message.get("error").is_some() {
                debug!("Ignoring JSON-RPC response sent by client");
                return None;
            }
            let id = message.get("id").cloned().unwrap_or(Value::Null);
            return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
        }

        let id = message.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                warn!("Malformed JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            warn!("Invalid JSON-RPC version: {}", request.jsonrpc);
            return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
        }

        self.handle_request(request).await
    }

    /// Dispatch a parsed request to its method handler.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            self.handle_notification(&request.method);
            return None;
        }
        let id = request.id.unwrap_or(Value::Null);

        debug!(method = %request.method, "Handling request");

        let result = match request.method.as_str() {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => Ok(to_json(&ListToolsResult {
                tools: self.registry.list_schemas(),
            })),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(err) => JsonRpcResponse::error(id, err),
        })
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" => info!("Client initialized"),
            "notifications/cancelled" => debug!("Client cancelled a request"),
            other => debug!("Ignoring notification: {}", other),
        }
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = match params {
            Some(params) => serde_json::from_value(params).map_err(|e| {
                JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e))
            })?,
            None => InitializeParams::default(),
        };

        let protocol_version = negotiate_protocol_version(params.protocol_version.as_deref());
        match &params.client_info {
            Some(client) => info!(
                client = %client.name,
                client_version = %client.version,
                protocol_version,
                "Initializing MCP session"
            ),
            None => info!(protocol_version, "Initializing MCP session"),
        }

        Ok(to_json(&InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }))
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params for tools/call"))
            .and_then(|p| {
                serde_json::from_value(p).map_err(|e| {
                    JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e))
                })
            })?;

        let tool = self.registry.get(&params.name).ok_or_else(|| {
            JsonRpcError::invalid_params(format!("Tool {} not found", params.name))
        })?;

        info!(tool = %params.name, "Calling tool");
        let arguments = params.arguments.unwrap_or(Value::Null);

        match tool.execute(arguments).await {
            Ok(result) => Ok(to_json(&result)),
            Err(err) => {
                warn!("{}", err);
                Err(JsonRpcError::invalid_params(err.to_string()))
            }
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        error!("Failed to serialize response: {}", e);
        Value::Null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::StubApi;
    use luskad_client::Resource;

    fn server() -> (McpServer, Arc<StubApi>) {
        let api = StubApi::new().respond(Resource::Tasks, serde_json::json!([{"title": "Ship"}]));
        (McpServer::new(api.clone()), api)
    }

    fn call(id: i64, name: &str, arguments: Value) -> Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        })
    }

    #[tokio::test]
    async fn test_initialize() {
        let (server, _) = server();

        let response = server
            .handle_payload(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "0.0.1"}
                }
            }))
            .await
            .unwrap();

        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(response["result"]["serverInfo"]["name"], "Luskad");
        assert_eq!(response["result"]["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let (server, _) = server();

        let response = server
            .handle_payload(serde_json::json!({
                "jsonrpc": "2.0",
                "method": "notifications/initialized"
            }))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let (server, _) = server();

        let response = server
            .handle_payload(serde_json::json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"}))
            .await
            .unwrap();

        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 11);
        let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
        assert!(names.contains(&"get-tasks"));
        assert!(names.contains(&"get-current-date"));
    }

    #[tokio::test]
    async fn test_tools_call_returns_text_content() {
        let (server, api) = server();

        let response = server
            .handle_payload(call(2, "get-tasks", serde_json::json!({"projectId": "P"})))
            .await
            .unwrap();

        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, serde_json::json!([{"title": "Ship"}]));
        assert_eq!(response["result"]["content"][0]["type"], "text");
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_required_argument_is_invalid_params() {
        let (server, api) = server();

        let response = server
            .handle_payload(call(3, "get-risks", serde_json::json!({})))
            .await
            .unwrap();

        assert_eq!(response["error"]["code"], JsonRpcError::INVALID_PARAMS);
        assert!(response.get("result").is_none());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_arguments_object_is_invalid_params() {
        let (server, api) = server();

        let response = server
            .handle_payload(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": {"name": "get-features"}
            }))
            .await
            .unwrap();

        assert_eq!(response["error"]["code"], JsonRpcError::INVALID_PARAMS);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_is_successful_response() {
        let (server, _) = server();

        let response = server
            .handle_payload(call(5, "get-contacts", serde_json::json!({"projectId": "P"})))
            .await
            .unwrap();

        assert!(response.get("error").is_none());
        assert_eq!(
            response["result"]["content"][0]["text"],
            "Failed to retrieve contacts"
        );
        assert!(response["result"].get("isError").is_none());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (server, _) = server();

        let response = server
            .handle_payload(call(6, "delete-everything", serde_json::json!({})))
            .await
            .unwrap();

        assert_eq!(response["error"]["code"], JsonRpcError::INVALID_PARAMS);
        assert_eq!(response["error"]["message"], "Tool delete-everything not found");
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let (server, _) = server();

        let response = server
            .handle_payload(serde_json::json!({"jsonrpc": "2.0", "id": 7, "method": "resources/list"}))
            .await
            .unwrap();

        assert_eq!(response["error"]["code"], JsonRpcError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_jsonrpc_version() {
        let (server, _) = server();

        let response = server
            .handle_payload(serde_json::json!({"jsonrpc": "1.0", "id": 8, "method": "ping"}))
            .await
            .unwrap();

        assert_eq!(response["error"]["code"], JsonRpcError::INVALID_REQUEST);
        assert_eq!(response["id"], 8);
    }

    #[tokio::test]
    async fn test_batch() {
        let (server, _) = server();

        let response = server
            .handle_payload(serde_json::json!([
                {"jsonrpc": "2.0", "id": 1, "method": "ping"},
                {"jsonrpc": "2.0", "method": "notifications/initialized"},
                {"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "get-current-date", "arguments": {}}}
            ]))
            .await
            .unwrap();

        let responses = response.as_array().unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["result"], serde_json::json!({}));
        assert_eq!(responses[1]["id"], 2);
    }

    #[tokio::test]
    async fn test_client_response_is_ignored() {
        let (server, _) = server();

        let response = server
            .handle_payload(serde_json::json!({"jsonrpc": "2.0", "id": 9, "result": {}}))
            .await;
        assert!(response.is_none());
    }
}
