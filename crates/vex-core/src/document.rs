//! Document construction, parsing, and serialization.

use chrono::Utc;

use crate::types::{Document, VexError, VexResult, OPENVEX_CONTEXT, OPENVEX_CONTEXT_PREFIX};

impl Document {
    /// Create an empty document with the current OpenVEX context, version 1,
    /// and a fresh timestamp.
    pub fn new(id: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            context: OPENVEX_CONTEXT.to_string(),
            id: id.into(),
            author: author.into(),
            role: None,
            timestamp: Some(Utc::now()),
            last_updated: None,
            version: 1,
            tooling: None,
            statements: Vec::new(),
        }
    }

    /// Parse an OpenVEX JSON document.
    ///
    /// Fails if the bytes are not JSON, if required fields are missing or have
    /// unknown enum values, or if `@context` is not an OpenVEX namespace.
    pub fn parse(data: &[u8]) -> VexResult<Self> {
        let doc: Document =
            serde_json::from_slice(data).map_err(|e| VexError::Parse(e.to_string()))?;

        if !doc.context.starts_with(OPENVEX_CONTEXT_PREFIX) {
            return Err(VexError::InvalidDocument(format!(
                "unsupported @context \"{}\" (expected {OPENVEX_CONTEXT_PREFIX}/...)",
                doc.context
            )));
        }

        tracing::debug!(
            "Parsed VEX document {} with {} statements",
            doc.id,
            doc.statements.len()
        );

        Ok(doc)
    }

    /// Serialize the document to pretty-printed JSON.
    pub fn to_json(&self) -> VexResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
