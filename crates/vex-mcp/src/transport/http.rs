//! HTTP transport — one JSON-RPC message per POST, plus /health.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson, Response},
    routing::{get, post},
    Router,
};
use serde_json::Value;

use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult};

use super::framing;

/// HTTP transport for web-based MCP clients.
pub struct HttpTransport {
    handler: Arc<ProtocolHandler>,
}

impl HttpTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/mcp", post(handle_request))
            .route("/health", get(handle_health))
            .with_state(self.handler.clone())
    }

    /// Run the HTTP server on the given address.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(McpError::Io)?;

        tracing::info!("HTTP transport listening on {addr}");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// The body is taken as raw text so malformed JSON gets a JSON-RPC error
/// instead of axum's own rejection.
async fn handle_request(State(handler): State<Arc<ProtocolHandler>>, body: String) -> Response {
    match respond(&handler, &body).await {
        Some(response) => AxumJson(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn respond(handler: &ProtocolHandler, body: &str) -> Option<Value> {
    match framing::parse_message(body) {
        Ok(msg) => handler.handle_message(msg).await,
        Err(e) => {
            tracing::warn!("Parse error: {e}");
            serde_json::to_value(framing::error_response(body, &e)).ok()
        }
    }
}

async fn handle_health() -> AxumJson<Value> {
    AxumJson(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
