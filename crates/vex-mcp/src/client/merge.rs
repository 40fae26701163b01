//! Merging several VEX documents into one.
//!
//! Statements are keyed by `(vulnerability name, component ID)`. Keys seen
//! once pass through; keys seen several times collapse into one statement
//! whose status is the highest entry of [`STATUS_PRIORITY`].

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use serde_json::Value;

use vex_core::{Document, Justification, Statement, Status};

use super::{generate_document_id, non_empty, ClientError, ClientResult, VexClient, TOOLING};
use crate::validation::{
    validate_document_count, validate_field, validate_optional_field, MAX_AUTHOR_LENGTH,
    MAX_FIELD_LENGTH,
};

/// Conflict precedence, highest first. A `fixed` claim from any source
/// outranks `affected` from another.
pub const STATUS_PRIORITY: [Status; 4] = [
    Status::Fixed,
    Status::NotAffected,
    Status::UnderInvestigation,
    Status::Affected,
];

/// Typed input for [`VexClient::merge_documents`].
#[derive(Debug, Clone, Default)]
pub struct MergeRequest {
    /// Raw documents as decoded JSON objects.
    pub documents: Vec<Value>,
    pub author: Option<String>,
    pub author_role: Option<String>,
    pub id: Option<String>,
    /// Keep only statements about these component IDs.
    pub products: Vec<String>,
    /// Keep only statements about these vulnerabilities (name or alias).
    pub vulnerabilities: Vec<String>,
}

type StatementKey = (String, String);

impl VexClient {
    /// Merge 2 to 20 documents. Any document failing the structural check or
    /// the library parse aborts the whole merge.
    pub fn merge_documents(&self, request: &MergeRequest) -> ClientResult<Document> {
        validate_document_count(request.documents.len())?;

        let author = non_empty(request.author.as_deref());
        let author_role = non_empty(request.author_role.as_deref());
        let id = non_empty(request.id.as_deref());

        validate_optional_field("author", author, MAX_AUTHOR_LENGTH)?;
        validate_optional_field("author_role", author_role, MAX_AUTHOR_LENGTH)?;
        validate_optional_field("id", id, MAX_FIELD_LENGTH)?;
        for (i, product) in request.products.iter().enumerate() {
            validate_field(&format!("products[{i}]"), product, MAX_FIELD_LENGTH)?;
        }
        for (i, vuln) in request.vulnerabilities.iter().enumerate() {
            validate_field(&format!("vulnerabilities[{i}]"), vuln, MAX_FIELD_LENGTH)?;
        }

        let documents = request
            .documents
            .iter()
            .enumerate()
            .map(|(i, raw)| parse_document(i + 1, raw))
            .collect::<ClientResult<Vec<_>>>()?;

        let input_statements: usize = documents.iter().map(|d| d.statements.len()).sum();
        let mut statements = merge_statements(&documents);

        let now = Utc::now();
        let mut merged = Document::new(
            id.map(str::to_string)
                .unwrap_or_else(|| generate_document_id("merged-vex", now)),
            self.resolve_author(author),
        );
        merged.role = author_role.map(str::to_string);
        merged.version = documents.iter().map(|d| d.version).max().unwrap_or(1);
        merged.tooling = Some(TOOLING.to_string());

        filter_statements(&mut statements, &request.products, &request.vulnerabilities);
        merged.statements = statements;
        merged.timestamp = Some(now);
        merged.last_updated = Some(now);

        tracing::debug!(
            "Merged {} documents: {} statements in, {} out",
            documents.len(),
            input_statements,
            merged.statements.len()
        );

        Ok(merged)
    }
}

/// Structural pre-check then full parse through the library. `index` is
/// 1-based.
fn parse_document(index: usize, raw: &Value) -> ClientResult<Document> {
    let object = raw.as_object().ok_or_else(|| ClientError::MalformedDocument {
        index,
        reason: "expected a JSON object".to_string(),
    })?;

    if !object.contains_key("@context") {
        return Err(ClientError::MalformedDocument {
            index,
            reason: "missing @context".to_string(),
        });
    }

    if !object.get("statements").is_some_and(Value::is_array) {
        return Err(ClientError::MalformedDocument {
            index,
            reason: "missing statements array".to_string(),
        });
    }

    let bytes = serde_json::to_vec(raw).map_err(|e| ClientError::ParseDocument {
        index,
        source: e.into(),
    })?;
    Document::parse(&bytes).map_err(|source| ClientError::ParseDocument { index, source })
}

/// Group, resolve, and sort statements across all documents.
fn merge_statements(documents: &[Document]) -> Vec<Statement> {
    // BTreeMap keeps the output sorted by key.
    let mut groups: BTreeMap<StatementKey, Vec<Statement>> = BTreeMap::new();

    for doc in documents {
        for statement in &doc.statements {
            for (key, entry) in split_by_product(statement) {
                groups.entry(key).or_default().push(entry);
            }
        }
    }

    groups.into_values().map(resolve_group).collect()
}

/// One entry per listed product, each narrowed to that product.
fn split_by_product(statement: &Statement) -> Vec<(StatementKey, Statement)> {
    let vuln = statement.vulnerability.name.clone();

    if statement.products.len() <= 1 {
        let component = statement
            .products
            .first()
            .map(|p| p.id.clone())
            .unwrap_or_default();
        return vec![((vuln, component), statement.clone())];
    }

    statement
        .products
        .iter()
        .map(|product| {
            let mut entry = statement.clone();
            entry.products = vec![product.clone()];
            ((vuln.clone(), product.id.clone()), entry)
        })
        .collect()
}

fn status_rank(status: Status) -> usize {
    STATUS_PRIORITY
        .iter()
        .position(|s| *s == status)
        .unwrap_or(STATUS_PRIORITY.len())
}

/// Collapse statements sharing a key. The earliest statement carrying the
/// winning status becomes the base.
fn resolve_group(mut group: Vec<Statement>) -> Statement {
    if group.len() == 1 {
        return group.remove(0);
    }

    let mut justifications: Vec<Justification> = Vec::new();
    for j in group.iter().filter_map(|s| s.justification) {
        if !justifications.contains(&j) {
            justifications.push(j);
        }
    }

    let base_index = group
        .iter()
        .enumerate()
        .min_by_key(|(i, s)| (status_rank(s.status), *i))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut merged = group.swap_remove(base_index);

    if justifications.is_empty() {
        return merged;
    }
    let listed = justifications
        .iter()
        .map(Justification::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    // Only not_affected statements may carry a justification.
    if merged.status != Status::NotAffected {
        append_status_note(&mut merged, format!("superseded justifications: {listed}"));
        return merged;
    }

    if merged.justification.is_none() {
        merged.justification = Some(justifications[0]);
    }
    if justifications.len() > 1 {
        append_status_note(&mut merged, format!("multiple justifications: {listed}"));
    }

    merged
}

fn append_status_note(statement: &mut Statement, note: String) {
    statement.status_notes = Some(match statement.status_notes.take() {
        Some(existing) if !existing.is_empty() => format!("{existing}; {note}"),
        _ => note,
    });
}

/// Both filters must hold when both are given; an empty filter keeps all.
fn filter_statements(statements: &mut Vec<Statement>, products: &[String], vulnerabilities: &[String]) {
    if !products.is_empty() {
        let wanted: HashSet<&str> = products.iter().map(String::as_str).collect();
        statements.retain(|s| s.component_ids().any(|id| wanted.contains(id)));
    }

    if !vulnerabilities.is_empty() {
        statements.retain(|s| vulnerabilities.iter().any(|v| s.vulnerability.matches(v)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> VexClient {
        VexClient::new("Merge Bot")
    }

    fn statement(vuln: &str, product: &str, status: &str) -> Value {
        json!({
            "vulnerability": { "name": vuln },
            "products": [ { "@id": product } ],
            "status": status
        })
    }

    fn doc(id: &str, statements: Vec<Value>) -> Value {
        json!({
            "@context": "https://openvex.dev/ns/v0.2.0",
            "@id": id,
            "author": "Upstream",
            "timestamp": "2024-01-01T00:00:00Z",
            "version": 1,
            "statements": statements
        })
    }

    fn merge(documents: Vec<Value>) -> ClientResult<Document> {
        client().merge_documents(&MergeRequest {
            documents,
            ..Default::default()
        })
    }

    #[test]
    fn test_fixed_beats_affected() {
        let a = doc("a", vec![statement("CVE-1", "pkg:npm/a@1", "affected")]);
        let b = doc("b", vec![statement("CVE-1", "pkg:npm/a@1", "fixed")]);

        let merged = merge(vec![a, b]).unwrap();
        assert_eq!(merged.statements.len(), 1);
        assert_eq!(merged.statements[0].status, Status::Fixed);
    }

    #[test]
    fn test_priority_table_order() {
        let statuses = ["affected", "under_investigation", "not_affected"];
        let docs = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| doc(&format!("d{i}"), vec![statement("CVE-1", "pkg:x", s)]))
            .collect();
        let merged = merge(docs).unwrap();
        assert_eq!(merged.statements[0].status, Status::NotAffected);

        let docs = ["affected", "under_investigation"]
            .iter()
            .enumerate()
            .map(|(i, s)| doc(&format!("d{i}"), vec![statement("CVE-1", "pkg:x", s)]))
            .collect();
        let merged = merge(docs).unwrap();
        assert_eq!(merged.statements[0].status, Status::UnderInvestigation);
    }

    #[test]
    fn test_commutative_for_distinct_keys() {
        let a = doc(
            "a",
            vec![
                statement("CVE-2", "pkg:npm/b@1", "fixed"),
                statement("CVE-1", "pkg:npm/a@1", "under_investigation"),
            ],
        );
        let b = doc("b", vec![statement("CVE-1", "pkg:npm/c@1", "fixed")]);

        let ab = merge(vec![a.clone(), b.clone()]).unwrap();
        let ba = merge(vec![b, a]).unwrap();
        assert_eq!(ab.statements, ba.statements);

        let keys: Vec<_> = ab
            .statements
            .iter()
            .map(|s| (s.vulnerability.name.as_str(), s.products[0].id.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("CVE-1", "pkg:npm/a@1"),
                ("CVE-1", "pkg:npm/c@1"),
                ("CVE-2", "pkg:npm/b@1"),
            ]
        );
    }

    #[test]
    fn test_single_justification_kept() {
        let mut s1 = statement("CVE-1", "pkg:x", "not_affected");
        s1["justification"] = json!("component_not_present");
        let s2 = statement("CVE-1", "pkg:x", "under_investigation");

        let merged = merge(vec![doc("a", vec![s1]), doc("b", vec![s2])]).unwrap();
        let stmt = &merged.statements[0];
        assert_eq!(stmt.status, Status::NotAffected);
        assert_eq!(stmt.justification, Some(Justification::ComponentNotPresent));
        assert!(stmt.status_notes.is_none());
    }

    #[test]
    fn test_multiple_justifications_recorded() {
        let mut s1 = statement("CVE-1", "pkg:x", "not_affected");
        s1["justification"] = json!("component_not_present");
        let mut s2 = statement("CVE-1", "pkg:x", "not_affected");
        s2["justification"] = json!("inline_mitigations_already_exist");

        let merged = merge(vec![doc("a", vec![s1]), doc("b", vec![s2])]).unwrap();
        let stmt = &merged.statements[0];
        assert_eq!(stmt.justification, Some(Justification::ComponentNotPresent));
        assert_eq!(
            stmt.status_notes.as_deref(),
            Some("multiple justifications: component_not_present, inline_mitigations_already_exist")
        );
    }

    #[test]
    fn test_justification_dropped_when_fixed_wins() {
        let mut s1 = statement("CVE-1", "pkg:x", "not_affected");
        s1["justification"] = json!("component_not_present");
        let s2 = statement("CVE-1", "pkg:x", "fixed");

        let merged = merge(vec![doc("a", vec![s1]), doc("b", vec![s2])]).unwrap();
        let stmt = &merged.statements[0];
        assert_eq!(stmt.status, Status::Fixed);
        assert_eq!(stmt.justification, None);
        assert_eq!(
            stmt.status_notes.as_deref(),
            Some("superseded justifications: component_not_present")
        );
        assert!(stmt.validate().is_ok());
    }

    #[test]
    fn test_multi_product_statement_is_split() {
        let multi = json!({
            "vulnerability": { "name": "CVE-1" },
            "products": [ { "@id": "pkg:a" }, { "@id": "pkg:b" } ],
            "status": "under_investigation"
        });
        let fix = statement("CVE-1", "pkg:b", "fixed");

        let merged = merge(vec![doc("a", vec![multi]), doc("b", vec![fix])]).unwrap();
        assert_eq!(merged.statements.len(), 2);
        assert_eq!(merged.statements[0].products[0].id, "pkg:a");
        assert_eq!(merged.statements[0].status, Status::UnderInvestigation);
        assert_eq!(merged.statements[1].products[0].id, "pkg:b");
        assert_eq!(merged.statements[1].status, Status::Fixed);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let a = doc(
            "a",
            vec![
                statement("CVE-1", "pkg:a", "fixed"),
                statement("CVE-2", "pkg:a", "fixed"),
                statement("CVE-1", "pkg:b", "fixed"),
            ],
        );
        let b = doc("b", vec![statement("CVE-3", "pkg:c", "fixed")]);

        let merged = client()
            .merge_documents(&MergeRequest {
                documents: vec![a.clone(), b.clone()],
                products: vec!["pkg:a".to_string()],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(merged.statements.len(), 2);

        let merged = client()
            .merge_documents(&MergeRequest {
                documents: vec![a, b],
                products: vec!["pkg:a".to_string()],
                vulnerabilities: vec!["CVE-1".to_string()],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(merged.statements.len(), 1);
        assert_eq!(merged.statements[0].vulnerability.name, "CVE-1");
        assert_eq!(merged.statements[0].products[0].id, "pkg:a");
    }

    #[test]
    fn test_vulnerability_filter_matches_alias() {
        let mut s = statement("CVE-1", "pkg:a", "fixed");
        s["vulnerability"]["aliases"] = json!(["GHSA-1111-2222-3333"]);
        let merged = client()
            .merge_documents(&MergeRequest {
                documents: vec![doc("a", vec![s]), doc("b", vec![])],
                vulnerabilities: vec!["GHSA-1111-2222-3333".to_string()],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(merged.statements.len(), 1);
    }

    #[test]
    fn test_metadata_overrides() {
        let merged = client()
            .merge_documents(&MergeRequest {
                documents: vec![doc("a", vec![]), doc("b", vec![])],
                author: Some("Release Team".to_string()),
                author_role: Some("Vendor".to_string()),
                id: Some("https://example.com/vex/merged-1".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(merged.id, "https://example.com/vex/merged-1");
        assert_eq!(merged.author, "Release Team");
        assert_eq!(merged.role.as_deref(), Some("Vendor"));
        assert!(merged.timestamp.is_some());
        assert_eq!(merged.timestamp, merged.last_updated);
    }

    #[test]
    fn test_defaults_without_overrides() {
        let merged = merge(vec![doc("a", vec![]), doc("b", vec![])]).unwrap();
        assert_eq!(merged.author, "Merge Bot");
        assert!(merged.role.is_none());
        assert!(merged.id.contains("merged-vex-"));
    }

    #[test]
    fn test_version_is_highest_input() {
        let mut newer = doc("b", vec![]);
        newer["version"] = json!(4);
        let merged = merge(vec![doc("a", vec![]), newer]).unwrap();
        assert_eq!(merged.version, 4);
    }

    #[test]
    fn test_document_count_bounds() {
        let err = merge(vec![doc("a", vec![])]).unwrap_err();
        assert!(err.to_string().contains("least 2"));

        let many: Vec<Value> = (0..21).map(|i| doc(&format!("d{i}"), vec![])).collect();
        let err = merge(many).unwrap_err();
        assert!(err.to_string().contains("maximum"));

        let twenty: Vec<Value> = (0..20).map(|i| doc(&format!("d{i}"), vec![])).collect();
        assert!(merge(twenty).is_ok());
    }

    #[test]
    fn test_structural_precheck_names_index() {
        let bad = json!({ "statements": [] });
        let err = merge(vec![doc("a", vec![]), bad]).unwrap_err();
        assert!(matches!(err, ClientError::MalformedDocument { index: 2, .. }));
        assert!(err.to_string().contains("@context"));

        let bad = json!({ "@context": "https://openvex.dev/ns/v0.2.0" });
        let err = merge(vec![bad, doc("a", vec![])]).unwrap_err();
        assert!(err.to_string().starts_with("document 1"));
        assert!(err.to_string().contains("statements"));

        let err = merge(vec![json!("nope"), doc("a", vec![])]).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn test_parse_failure_aborts_merge() {
        let broken = doc("b", vec![statement("CVE-1", "pkg:a", "patched")]);
        let err = merge(vec![doc("a", vec![]), broken]).unwrap_err();
        assert!(matches!(err, ClientError::ParseDocument { index: 2, .. }));
    }

    #[test]
    fn test_filter_entries_are_checked() {
        let err = client()
            .merge_documents(&MergeRequest {
                documents: vec![doc("a", vec![]), doc("b", vec![])],
                products: vec!["pkg:a".to_string(), "pkg:b|cat".to_string()],
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "products[1] contains dangerous characters");
    }
}
