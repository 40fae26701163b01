//! Statement constructors and structural validation.

use crate::types::{Product, Statement, Status, VexError, VexResult, Vulnerability};

impl Vulnerability {
    /// Create a vulnerability reference from its name (e.g. a CVE ID).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            aliases: Vec::new(),
        }
    }

    /// Whether `name` matches the vulnerability name or one of its aliases.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }
}

impl Product {
    /// Create a product from its component ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            identifiers: Default::default(),
            hashes: Default::default(),
            subcomponents: Vec::new(),
        }
    }
}

impl Statement {
    /// Create a statement with no justification or free-text fields.
    pub fn new(vulnerability: Vulnerability, products: Vec<Product>, status: Status) -> Self {
        Self {
            id: None,
            vulnerability,
            products,
            status,
            status_notes: None,
            justification: None,
            impact_statement: None,
            action_statement: None,
            timestamp: None,
        }
    }

    /// Check that the statement is well formed for its status.
    ///
    /// `not_affected` needs a justification or an impact statement, `affected`
    /// needs an action statement, and justification/impact only make sense on
    /// `not_affected`.
    pub fn validate(&self) -> VexResult<()> {
        if self.vulnerability.name.trim().is_empty() {
            return Err(invalid("vulnerability name must be set"));
        }

        if self.products.is_empty() {
            return Err(invalid("at least one product must be listed"));
        }

        if self.products.iter().any(|p| p.id.trim().is_empty()) {
            return Err(invalid("product identifier must not be empty"));
        }

        let has_impact = is_set(&self.impact_statement);
        let has_action = is_set(&self.action_statement);

        match self.status {
            Status::NotAffected => {
                if self.justification.is_none() && !has_impact {
                    return Err(invalid(
                        "either justification or impact statement must be defined when using status \"not_affected\"",
                    ));
                }
            }
            Status::Affected => {
                if self.justification.is_some() {
                    return Err(invalid(
                        "justification should not be set when using status \"affected\"",
                    ));
                }
                if has_impact {
                    return Err(invalid(
                        "impact statement should not be set when using status \"affected\"",
                    ));
                }
                if !has_action {
                    return Err(invalid(
                        "action statement must be set when using status \"affected\"",
                    ));
                }
            }
            Status::Fixed | Status::UnderInvestigation => {
                if self.justification.is_some() {
                    return Err(VexError::InvalidStatement(format!(
                        "justification should not be set when using status \"{}\"",
                        self.status
                    )));
                }
                if has_impact {
                    return Err(VexError::InvalidStatement(format!(
                        "impact statement should not be set when using status \"{}\"",
                        self.status
                    )));
                }
            }
        }

        Ok(())
    }

    /// Component IDs of every product in the statement.
    pub fn component_ids(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(|p| p.id.as_str())
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn invalid(message: &str) -> VexError {
    VexError::InvalidStatement(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Justification;

    fn statement(status: Status) -> Statement {
        Statement::new(
            Vulnerability::new("CVE-2023-1234"),
            vec![Product::new("pkg:npm/lodash@4.17.21")],
            status,
        )
    }

    #[test]
    fn test_not_affected_requires_reason() {
        let stmt = statement(Status::NotAffected);
        let err = stmt.validate().unwrap_err();
        assert!(err.to_string().contains("justification"));

        let mut with_justification = stmt.clone();
        with_justification.justification = Some(Justification::ComponentNotPresent);
        assert!(with_justification.validate().is_ok());

        let mut with_impact = stmt;
        with_impact.impact_statement = Some("Only used in tests".to_string());
        assert!(with_impact.validate().is_ok());
    }

    #[test]
    fn test_blank_impact_statement_does_not_count() {
        let mut stmt = statement(Status::NotAffected);
        stmt.impact_statement = Some("   ".to_string());
        assert!(stmt.validate().is_err());
    }

    #[test]
    fn test_affected_requires_action() {
        let mut stmt = statement(Status::Affected);
        assert!(stmt.validate().unwrap_err().to_string().contains("action statement"));
        stmt.action_statement = Some("Upgrade to 4.17.22".to_string());
        assert!(stmt.validate().is_ok());
    }

    #[test]
    fn test_justification_rejected_outside_not_affected() {
        for status in [Status::Affected, Status::Fixed, Status::UnderInvestigation] {
            let mut stmt = statement(status);
            stmt.action_statement = Some("Upgrade".to_string());
            stmt.justification = Some(Justification::ComponentNotPresent);
            let err = stmt.validate().unwrap_err();
            assert!(err.to_string().contains("justification should not be set"));
        }
    }

    #[test]
    fn test_fixed_and_under_investigation_are_valid_bare() {
        assert!(statement(Status::Fixed).validate().is_ok());
        assert!(statement(Status::UnderInvestigation).validate().is_ok());
    }

    #[test]
    fn test_missing_products() {
        let mut stmt = statement(Status::Fixed);
        stmt.products.clear();
        assert!(stmt.validate().unwrap_err().to_string().contains("product"));
    }

    #[test]
    fn test_vulnerability_alias_match() {
        let mut vuln = Vulnerability::new("CVE-2023-1234");
        vuln.aliases.push("GHSA-xxxx-yyyy-zzzz".to_string());
        assert!(vuln.matches("CVE-2023-1234"));
        assert!(vuln.matches("GHSA-xxxx-yyyy-zzzz"));
        assert!(!vuln.matches("CVE-2023-9999"));
    }
}
