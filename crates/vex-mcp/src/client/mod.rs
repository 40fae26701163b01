//! VEX domain client: builds and merges OpenVEX documents on behalf of the
//! tool adapters.
//!
//! The client holds only immutable configuration; every call builds fresh
//! documents, so one instance is shared freely across requests.

pub mod create;
pub mod merge;

use chrono::{DateTime, Utc};

use vex_core::VexError;

use crate::validation::ValidationError;

pub use create::CreateStatementRequest;
pub use merge::{MergeRequest, STATUS_PRIORITY};

/// Value stamped into the `tooling` field of every generated document.
pub const TOOLING: &str = concat!("vex-mcp/", env!("CARGO_PKG_VERSION"));

const DOCUMENT_ID_BASE: &str = "https://openvex.dev/docs/public";

/// Security and domain failures. Both are reported to the caller as a tool
/// result with `isError` set, never as a protocol error.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Vex(VexError),

    #[error("invalid VEX statement: {0}")]
    InvalidStatement(VexError),

    #[error("document {index} is not a VEX document: {reason}")]
    MalformedDocument { index: usize, reason: String },

    #[error("document {index}: {source}")]
    ParseDocument { index: usize, source: VexError },
}

pub type ClientResult<T> = Result<T, ClientError>;

pub struct VexClient {
    default_author: String,
}

impl VexClient {
    pub fn new(default_author: impl Into<String>) -> Self {
        Self {
            default_author: default_author.into(),
        }
    }

    pub fn default_author(&self) -> &str {
        &self.default_author
    }

    fn resolve_author<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit.unwrap_or(&self.default_author)
    }
}

/// Document IRI unique per call, derived from the creation time.
fn generate_document_id(prefix: &str, now: DateTime<Utc>) -> String {
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros() * 1_000);
    format!("{DOCUMENT_ID_BASE}/{prefix}-{nanos}")
}

/// Treat `Some("")` and whitespace-only values as absent.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
