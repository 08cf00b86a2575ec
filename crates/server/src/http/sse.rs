// Legacy SSE binding: GET /sse opens a stream, POST /messages feeds it

use super::error::{HttpError, HttpResult};
use super::{AppState, MESSAGES_PATH};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use futures::{stream, Stream, StreamExt};
use luskad_mcp::McpServer;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

pub(crate) const SESSION_CHANNEL_CAPACITY: usize = 64;

/// One open SSE stream and the server answering on it
#[derive(Clone)]
pub struct Session {
    server: Arc<McpServer>,
    outbound: mpsc::Sender<Value>,
}

/// Open SSE sessions keyed by session id
#[derive(Default)]
pub struct SessionTable {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, session_id: String, session: Session) {
        self.lock().insert(session_id, session);
    }

    pub fn get(&self, session_id: &str) -> Option<Session> {
        self.lock().get(session_id).cloned()
    }

    pub fn remove(&self, session_id: &str) -> bool {
        self.lock().remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Drops the session from the table when its stream goes away
struct SessionGuard {
    session_id: String,
    sessions: Arc<SessionTable>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.sessions.remove(&self.session_id) {
            tracing::info!(session_id = %self.session_id, "SSE stream closed");
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// GET /sse
pub async fn handle_subscribe(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4().to_string();
    let (outbound, inbound) = mpsc::channel(SESSION_CHANNEL_CAPACITY);

    state.sessions.insert(
        session_id.clone(),
        Session {
            server: Arc::new(McpServer::new(state.api.clone())),
            outbound,
        },
    );
    tracing::info!(session_id = %session_id, open = state.sessions.len(), "SSE stream opened");

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("{}?sessionId={}", MESSAGES_PATH, session_id));

    let guard = SessionGuard {
        session_id,
        sessions: state.sessions.clone(),
    };
    let messages = ReceiverStream::new(inbound).map(move |message: Value| {
        let _guard = &guard;
        Event::default().event("message").data(message.to_string())
    });

    let events = stream::once(async move { endpoint })
        .chain(messages)
        .map(Ok::<_, Infallible>);

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// POST /messages?sessionId=...
///
/// Acknowledged with `202` once the message parses; the reply follows on the stream.
pub async fn handle_post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> HttpResult<impl IntoResponse> {
    let session_id = query
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| HttpError::bad_request("Missing sessionId parameter"))?;

    let session = state.sessions.get(&session_id).ok_or_else(|| {
        HttpError::bad_request(format!("No transport found for sessionId: {}", session_id))
    })?;

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| HttpError::bad_request(format!("Invalid message: {}", e)))?;

    // Replies travel on the stream; a slow reader must not hold up the POST
    tokio::spawn(async move {
        if let Some(reply) = session.server.handle_payload(payload).await {
            if session.outbound.send(reply).await.is_err() {
                tracing::warn!(session_id = %session_id, "SSE stream closed before reply was delivered");
            }
        }
    });

    Ok((StatusCode::ACCEPTED, "Accepted"))
}
