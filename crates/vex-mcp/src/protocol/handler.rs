//! Main request dispatcher — receives JSON-RPC messages, routes to handlers.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::tools::ToolRegistry;
use crate::types::*;

use super::negotiation::negotiate;
use super::validator::validate_request;

/// Dispatches incoming JSON-RPC messages. Holds no per-request state; the
/// tool registry is the only thing shared between calls.
pub struct ProtocolHandler {
    tools: Arc<ToolRegistry>,
}

impl ProtocolHandler {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Handle one message. Returns the serialized response, or `None` for
    /// messages that are never answered (notifications, stray responses).
    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif);
                None
            }
            _ => {
                tracing::warn!("Received unexpected message type from client");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        if let Err(e) = validate_request(&request) {
            tracing::warn!("Rejected request {}: {e}", request.id);
            return serde_json::to_value(e.to_json_rpc_error(request.id)).unwrap_or_default();
        }

        let id = request.id.clone();
        tracing::debug!("Dispatching {} (id {id})", request.method);

        match self.dispatch_request(request).await {
            Ok(value) => serde_json::to_value(JsonRpcResponse::new(id, value)).unwrap_or_default(),
            Err(e) => {
                tracing::debug!("Request {id} failed: {e}");
                serde_json::to_value(e.to_json_rpc_error(id)).unwrap_or_default()
            }
        }
    }

    async fn dispatch_request(&self, request: JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params).await,
            _ => Err(McpError::MethodNotFound(request.method)),
        }
    }

    fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "initialized" | "notifications/initialized" => {
                tracing::info!("MCP handshake complete");
            }
            "notifications/cancelled" | "$/cancelRequest" => {
                tracing::info!("Received cancellation notification");
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = decode_params(params)?.unwrap_or_default();
        let result = negotiate(init_params)?;
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: self.tools.list_tools(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    /// Runs the tool on the blocking pool so a panic inside it surfaces as a
    /// join error instead of unwinding through the dispatch loop.
    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let call_params: ToolCallParams = decode_params(params)?
            .ok_or_else(|| McpError::InvalidParams("Tool call params required".to_string()))?;

        let tool = self.tools.get(&call_params.name)?;
        let args = match call_params.arguments {
            Some(Value::Null) | None => Value::Object(serde_json::Map::new()),
            Some(args) => args,
        };

        let result = match tokio::task::spawn_blocking(move || tool.execute(args)).await {
            Ok(result) => result?,
            Err(e) => {
                tracing::error!("Tool '{}' did not complete: {e}", call_params.name);
                return Err(McpError::InternalError(format!(
                    "tool '{}' failed unexpectedly",
                    call_params.name
                )));
            }
        };

        if result.is_error() {
            tracing::info!("Tool '{}' reported an error", call_params.name);
        }

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }
}

/// Decode optional params. An explicit `null` counts as absent.
fn decode_params<T: DeserializeOwned>(params: Option<Value>) -> McpResult<Option<T>> {
    match params {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| McpError::InvalidParams(e.to_string())),
    }
}
