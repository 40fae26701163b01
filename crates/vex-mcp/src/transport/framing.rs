//! Message framing for newline-delimited JSON.

use serde_json::Value;

use crate::types::{JsonRpcError, JsonRpcMessage, McpError, McpResult, RequestId};

/// Parse a single line of text as a JSON-RPC message.
///
/// Text that is not JSON is a parse error; JSON that is not a JSON-RPC
/// message is an invalid request.
pub fn parse_message(line: &str) -> McpResult<JsonRpcMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }

    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))?;

    serde_json::from_value(value)
        .map_err(|_| McpError::InvalidRequest("Not a valid JSON-RPC 2.0 message".to_string()))
}

/// Error response for a line [`parse_message`] rejected, keyed by whatever
/// id can still be read from it.
pub fn error_response(line: &str, error: &McpError) -> JsonRpcError {
    let id = serde_json::from_str::<Value>(line.trim())
        .map(|v| RequestId::recover(&v))
        .unwrap_or(RequestId::Null);
    error.to_json_rpc_error(id)
}

/// Serialize a value to a JSON line (with trailing newline).
pub fn frame_message(value: &impl serde::Serialize) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parse_message(r#"{"broken":"#).unwrap_err();
        assert_eq!(err.code(), -32700);

        let resp = error_response(r#"{"broken":"#, &err);
        assert_eq!(resp.id, RequestId::Null);
    }

    #[test]
    fn test_json_but_not_message_keeps_id() {
        let line = r#"{"jsonrpc":"2.0","id":9}"#;
        let err = parse_message(line).unwrap_err();
        assert_eq!(err.code(), -32600);
        assert_eq!(error_response(line, &err).id, RequestId::from(9));
    }

    #[test]
    fn test_empty_line() {
        assert!(parse_message("   ").is_err());
    }

    #[test]
    fn test_frame_is_single_line() {
        let framed = frame_message(&json!({"text": "a\nb"})).unwrap();
        assert!(framed.ends_with('\n'));
        assert_eq!(framed.matches('\n').count(), 1);
    }
}
