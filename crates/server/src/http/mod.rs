use crate::config::{ServerConfig, PORT_FALLBACK_ATTEMPTS};
use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Router,
};
use luskad_client::ProjectApi;
use std::any::Any;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

mod error;
mod sse;
mod streamable;

use error::HttpError;
use sse::SessionTable;

pub const MCP_PATH: &str = "/mcp";
pub const SSE_PATH: &str = "/sse";
pub const MESSAGES_PATH: &str = "/messages";

/// State shared by every HTTP handler
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn ProjectApi>,
    pub sessions: Arc<SessionTable>,
}

impl AppState {
    pub fn new(api: Arc<dyn ProjectApi>) -> Self {
        Self {
            api,
            sessions: Arc::new(SessionTable::new()),
        }
    }
}

/// Bind the listener and serve both HTTP bindings until the process exits
pub async fn serve(config: &ServerConfig, api: Arc<dyn ProjectApi>) -> Result<()> {
    let listener = bind_with_fallback(&config.host, config.port, PORT_FALLBACK_ATTEMPTS).await?;
    let port = listener.local_addr()?.port();

    tracing::info!(
        "Luskad MCP Server running on {} at http://localhost:{}{} (legacy SSE at {})",
        config.transport,
        port,
        MCP_PATH,
        SSE_PATH
    );

    axum::serve(listener, create_router(AppState::new(api))).await?;

    Ok(())
}

/// Bind `host:port`, moving up one port at a time while the address is taken.
///
/// At most `extra_attempts` ports past `port` are tried. Errors other than
/// "address in use" fail immediately.
pub async fn bind_with_fallback(host: &str, port: u16, extra_attempts: u16) -> Result<TcpListener> {
    let last = port.saturating_add(extra_attempts);
    let mut candidate = port;

    loop {
        match TcpListener::bind((host, candidate)).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse && candidate < last => {
                tracing::warn!("Port {} is in use, trying port {}", candidate, candidate + 1);
                candidate += 1;
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to start server on {}:{}", host, candidate))
            }
        }
    }
}

/// Create the router serving `/mcp`, `/sse`, `/messages` and `/ping`
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .route(
            MCP_PATH,
            post(streamable::handle_post).fallback(streamable::method_not_allowed),
        )
        .route(SSE_PATH, get(sse::handle_subscribe).fallback(not_found))
        .route(
            MESSAGES_PATH,
            post(sse::handle_post_message).fallback(not_found),
        )
        .route("/ping", any(ping))
        .fallback(not_found)
        .with_state(state);

    with_middleware(router)
}

fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("mcp-session-id"),
        ])
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Request handler panicked: {}", detail);

    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

async fn ping() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "pong")
}

async fn not_found() -> HttpError {
    HttpError::not_found()
}
