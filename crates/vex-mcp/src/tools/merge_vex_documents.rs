//! Tool: merge_vex_documents — Merge several OpenVEX documents into one.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::{MergeRequest, VexClient};
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};
use crate::validation::{MAX_MERGE_DOCUMENTS, MIN_MERGE_DOCUMENTS};

use super::Tool;

pub const NAME: &str = "merge_vex_documents";

#[derive(Debug, Deserialize)]
struct MergeParams {
    #[serde(default)]
    documents: Vec<Value>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    author_role: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    products: Vec<String>,
    #[serde(default)]
    vulnerabilities: Vec<String>,
}

impl From<MergeParams> for MergeRequest {
    fn from(params: MergeParams) -> Self {
        Self {
            documents: params.documents,
            author: params.author,
            author_role: params.author_role,
            id: params.id,
            products: params.products,
            vulnerabilities: params.vulnerabilities,
        }
    }
}

pub struct MergeVexDocumentsTool {
    client: Arc<VexClient>,
}

impl MergeVexDocumentsTool {
    pub fn new(client: Arc<VexClient>) -> Self {
        Self { client }
    }
}

impl Tool for MergeVexDocumentsTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_string(),
            description: "Merge multiple OpenVEX documents into one, resolving conflicting statements \
                          (fixed > not_affected > under_investigation > affected) and optionally \
                          filtering by product or vulnerability"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "documents": {
                        "type": "array",
                        "minItems": MIN_MERGE_DOCUMENTS,
                        "maxItems": MAX_MERGE_DOCUMENTS,
                        "description": "OpenVEX documents to merge",
                        "items": {
                            "type": "object",
                            "properties": {
                                "@context": { "type": "string" },
                                "statements": { "type": "array" }
                            },
                            "required": ["@context", "statements"]
                        }
                    },
                    "author": {
                        "type": "string",
                        "description": "Author of the merged document"
                    },
                    "author_role": {
                        "type": "string",
                        "description": "Role of the author (e.g. Vendor, Document Creator)"
                    },
                    "id": {
                        "type": "string",
                        "description": "Identifier (IRI) for the merged document"
                    },
                    "products": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Only keep statements about these product identifiers"
                    },
                    "vulnerabilities": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Only keep statements about these vulnerabilities"
                    }
                },
                "required": ["documents"]
            }),
        }
    }

    fn execute(&self, args: Value) -> McpResult<ToolCallResult> {
        let params: MergeParams = super::decode_arguments(args)?;
        let request = MergeRequest::from(params);

        let merged = match self.client.merge_documents(&request) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("{NAME} rejected: {e}");
                return Ok(ToolCallResult::error(format!(
                    "Failed to merge VEX documents: {e}"
                )));
            }
        };

        let text = merged
            .to_json()
            .map_err(|e| McpError::InternalError(e.to_string()))?;
        Ok(ToolCallResult::text(text))
    }
}
