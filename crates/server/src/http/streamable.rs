// Stateless `/mcp` endpoint: one POST in, one JSON-RPC reply out

use super::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use luskad_mcp::protocol::{JsonRpcError, JsonRpcResponse};
use luskad_mcp::McpServer;
use serde_json::Value;

/// Handle one POST carrying a JSON-RPC message or batch.
///
/// A fresh [`McpServer`] serves every request, so nothing is shared
/// between requests beyond the API client.
pub async fn handle_post(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Rejected unparsable /mcp body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error())),
            )
                .into_response();
        }
    };

    let server = McpServer::new(state.api.clone());
    match server.handle_payload(payload).await {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(JsonRpcResponse::error(Value::Null, JsonRpcError::method_not_allowed())),
    )
        .into_response()
}
