//! Single-statement document creation.

use chrono::Utc;

use vex_core::{Document, Justification, Product, Statement, Status, Vulnerability};

use super::{generate_document_id, non_empty, ClientError, ClientResult, VexClient, TOOLING};
use crate::validation::{
    validate_field, validate_optional_field, validate_required, MAX_AUTHOR_LENGTH,
    MAX_FIELD_LENGTH,
};

/// Typed input for [`VexClient::create_statement`].
#[derive(Debug, Clone, Default)]
pub struct CreateStatementRequest {
    pub product: String,
    pub vulnerability: String,
    pub status: String,
    pub justification: Option<String>,
    pub impact_statement: Option<String>,
    pub action_statement: Option<String>,
    pub author: Option<String>,
}

impl VexClient {
    /// Build a document holding exactly one statement.
    ///
    /// Inputs pass the security checks first, then status and justification
    /// are mapped onto the library enums, and the finished statement goes
    /// through `Statement::validate`.
    pub fn create_statement(&self, request: &CreateStatementRequest) -> ClientResult<Document> {
        validate_required("product", &request.product)?;
        validate_required("vulnerability", &request.vulnerability)?;
        validate_required("status", &request.status)?;

        validate_field("product", &request.product, MAX_FIELD_LENGTH)?;
        validate_field("vulnerability", &request.vulnerability, MAX_FIELD_LENGTH)?;
        validate_field("status", &request.status, MAX_FIELD_LENGTH)?;

        let justification = non_empty(request.justification.as_deref());
        let impact_statement = non_empty(request.impact_statement.as_deref());
        let action_statement = non_empty(request.action_statement.as_deref());
        let author = non_empty(request.author.as_deref());

        validate_optional_field("justification", justification, MAX_FIELD_LENGTH)?;
        validate_optional_field("impact_statement", impact_statement, MAX_FIELD_LENGTH)?;
        validate_optional_field("action_statement", action_statement, MAX_FIELD_LENGTH)?;
        validate_optional_field("author", author, MAX_AUTHOR_LENGTH)?;

        let status: Status = request.status.trim().parse().map_err(ClientError::Vex)?;
        let justification = justification
            .map(|j| j.trim().parse::<Justification>())
            .transpose()
            .map_err(ClientError::Vex)?;

        let now = Utc::now();
        let mut doc = Document::new(generate_document_id("vex", now), self.resolve_author(author));
        doc.timestamp = Some(now);
        doc.tooling = Some(TOOLING.to_string());

        let mut statement = Statement::new(
            Vulnerability::new(request.vulnerability.trim()),
            vec![Product::new(request.product.trim())],
            status,
        );
        statement.justification = justification;
        statement.impact_statement = impact_statement.map(str::to_string);
        statement.action_statement = action_statement.map(str::to_string);

        statement.validate().map_err(ClientError::InvalidStatement)?;
        doc.statements.push(statement);

        tracing::debug!(
            "Created VEX document {} ({} / {} -> {})",
            doc.id,
            request.vulnerability,
            request.product,
            status
        );

        Ok(doc)
    }
}
