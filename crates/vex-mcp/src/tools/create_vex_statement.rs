//! Tool: create_vex_statement — Create a single-statement OpenVEX document.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use vex_core::{Justification, Status};

use crate::client::{CreateStatementRequest, VexClient};
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::Tool;

pub const NAME: &str = "create_vex_statement";

/// Required fields default to empty so a missing one is reported by the
/// security checks as a tool error rather than a decode failure.
#[derive(Debug, Deserialize)]
struct CreateParams {
    #[serde(default)]
    product: String,
    #[serde(default)]
    vulnerability: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    justification: Option<String>,
    #[serde(default)]
    impact_statement: Option<String>,
    #[serde(default)]
    action_statement: Option<String>,
    #[serde(default)]
    author: Option<String>,
}

impl From<CreateParams> for CreateStatementRequest {
    fn from(params: CreateParams) -> Self {
        Self {
            product: params.product,
            vulnerability: params.vulnerability,
            status: params.status,
            justification: params.justification,
            impact_statement: params.impact_statement,
            action_statement: params.action_statement,
            author: params.author,
        }
    }
}

pub struct CreateVexStatementTool {
    client: Arc<VexClient>,
}

impl CreateVexStatementTool {
    pub fn new(client: Arc<VexClient>) -> Self {
        Self { client }
    }
}

impl Tool for CreateVexStatementTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn definition(&self) -> ToolDefinition {
        let statuses: Vec<&str> = Status::ALL.iter().map(Status::as_str).collect();
        let justifications: Vec<&str> = Justification::ALL.iter().map(Justification::as_str).collect();

        ToolDefinition {
            name: NAME.to_string(),
            description: "Create an OpenVEX document with one statement about a product and a vulnerability"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "product": {
                        "type": "string",
                        "description": "Product identifier, usually a Package URL (e.g. pkg:npm/lodash@4.17.21)"
                    },
                    "vulnerability": {
                        "type": "string",
                        "description": "Vulnerability identifier (e.g. CVE-2023-1234)"
                    },
                    "status": {
                        "type": "string",
                        "enum": statuses,
                        "description": "Exploitability status of the product"
                    },
                    "justification": {
                        "type": "string",
                        "enum": justifications,
                        "description": "Why the product is not affected (for status=not_affected)"
                    },
                    "impact_statement": {
                        "type": "string",
                        "description": "Free-text explanation of why the product is not affected"
                    },
                    "action_statement": {
                        "type": "string",
                        "description": "Remediation guidance (required for status=affected)"
                    },
                    "author": {
                        "type": "string",
                        "description": "Document author (defaults to the server's configured author)"
                    }
                },
                "required": ["product", "vulnerability", "status"]
            }),
        }
    }

    fn execute(&self, args: Value) -> McpResult<ToolCallResult> {
        let params: CreateParams = super::decode_arguments(args)?;
        let request = CreateStatementRequest::from(params);

        let doc = match self.client.create_statement(&request) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("{NAME} rejected: {e}");
                return Ok(ToolCallResult::error(format!(
                    "Failed to create VEX statement: {e}"
                )));
            }
        };

        let text = doc
            .to_json()
            .map_err(|e| McpError::InternalError(e.to_string()))?;
        Ok(ToolCallResult::text(text))
    }
}
