//! Stdio transport — reads JSON-RPC from stdin, writes to stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult, RequestId};

use super::framing;

/// Line-oriented transport for desktop MCP clients.
pub struct StdioTransport {
    handler: ProtocolHandler,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self { handler }
    }

    /// Run the transport loop — reads from stdin, writes to stdout.
    pub async fn run(&self) -> McpResult<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();

        tracing::info!("Stdio transport started");
        self.serve(stdin, stdout).await
    }

    /// Serve requests from `reader` until EOF, writing one response line per
    /// answered request to `writer` in request order.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> McpResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let bytes_read = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(McpError::Io)?;

            if bytes_read == 0 {
                tracing::info!("EOF on input, shutting down");
                break;
            }

            let framed = match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match self.respond(trimmed).await? {
                        Some(framed) => framed,
                        None => continue,
                    }
                }
                Err(e) => {
                    tracing::warn!("Discarding line that is not valid UTF-8: {e}");
                    let err = McpError::ParseError(format!("invalid UTF-8: {e}"));
                    framing::frame_message(&err.to_json_rpc_error(RequestId::Null))?
                }
            };

            writer
                .write_all(framed.as_bytes())
                .await
                .map_err(McpError::Io)?;
            writer.flush().await.map_err(McpError::Io)?;
        }

        Ok(())
    }

    /// Framed reply for one decoded line, or `None` when nothing is owed.
    async fn respond(&self, line: &str) -> McpResult<Option<String>> {
        match framing::parse_message(line) {
            Ok(msg) => match self.handler.handle_message(msg).await {
                Some(response) => framing::frame_message(&response).map(Some),
                None => Ok(None),
            },
            Err(e) => {
                tracing::warn!("Parse error: {e}");
                framing::frame_message(&framing::error_response(line, &e)).map(Some)
            }
        }
    }
}
