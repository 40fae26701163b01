//! Protocol version negotiation for `initialize`.

use crate::types::{InitializeParams, InitializeResult, McpError, McpResult, MCP_VERSION};

/// Answer an `initialize` request. A client that names a protocol version
/// must name the one this server speaks; omitting it is accepted.
pub fn negotiate(params: InitializeParams) -> McpResult<InitializeResult> {
    if let Some(requested) = params.protocol_version.as_deref() {
        if requested != MCP_VERSION {
            tracing::warn!(
                "Client requested protocol version {requested}, server supports {MCP_VERSION}"
            );
            return Err(McpError::InvalidParams(format!(
                "Unsupported protocol version \"{requested}\" (supported: {MCP_VERSION})"
            )));
        }
    }

    match &params.client_info {
        Some(client) => tracing::info!("Initialized with client: {} v{}", client.name, client.version),
        None => tracing::info!("Initialized with anonymous client"),
    }

    Ok(InitializeResult::default_result())
}
