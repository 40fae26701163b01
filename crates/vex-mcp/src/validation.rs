//! Security-boundary checks applied to every tool input before it reaches
//! the VEX library. Format and enum rules are left to `vex-core`.

/// Cap for general free-text and identifier fields.
pub const MAX_FIELD_LENGTH: usize = 1000;

/// Cap for author and author role fields.
pub const MAX_AUTHOR_LENGTH: usize = 200;

pub const MIN_MERGE_DOCUMENTS: usize = 2;
pub const MAX_MERGE_DOCUMENTS: usize = 20;

/// Shell and structural metacharacters rejected in any input string.
pub const DANGEROUS_CHARS: &[char] = &[
    ';', '&', '|', '`', '$', '(', ')', '{', '}', '[', ']', '<', '>', '\'', '"', '\\',
];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} contains dangerous characters")]
    DangerousCharacters { field: String },

    #[error("at least {min} documents are required for merging, got {count}")]
    TooFewDocuments { count: usize, min: usize },

    #[error("too many documents: maximum is {max}, got {count}")]
    TooManyDocuments { count: usize, max: usize },
}

pub type ValidationResult = Result<(), ValidationError>;

/// Reject empty or whitespace-only values.
pub fn validate_required(field: &str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Length is counted in characters, not bytes.
pub fn validate_length(field: &str, value: &str, max: usize) -> ValidationResult {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

pub fn validate_safe_chars(field: &str, value: &str) -> ValidationResult {
    if value.contains(DANGEROUS_CHARS) {
        return Err(ValidationError::DangerousCharacters {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Length cap plus character denylist.
pub fn validate_field(field: &str, value: &str, max: usize) -> ValidationResult {
    validate_length(field, value, max)?;
    validate_safe_chars(field, value)
}

/// Like [`validate_field`], skipping absent values.
pub fn validate_optional_field(field: &str, value: Option<&str>, max: usize) -> ValidationResult {
    match value {
        Some(v) => validate_field(field, v, max),
        None => Ok(()),
    }
}

pub fn validate_document_count(count: usize) -> ValidationResult {
    if count < MIN_MERGE_DOCUMENTS {
        return Err(ValidationError::TooFewDocuments {
            count,
            min: MIN_MERGE_DOCUMENTS,
        });
    }
    if count > MAX_MERGE_DOCUMENTS {
        return Err(ValidationError::TooManyDocuments {
            count,
            max: MAX_MERGE_DOCUMENTS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert!(validate_required("product", "pkg:npm/a@1").is_ok());
        let err = validate_required("product", "  ").unwrap_err();
        assert_eq!(err.to_string(), "product is required");
    }

    #[test]
    fn test_length_counts_chars() {
        let ascii = "a".repeat(MAX_AUTHOR_LENGTH);
        assert!(validate_length("author", &ascii, MAX_AUTHOR_LENGTH).is_ok());

        // 200 multi-byte chars are still within the cap.
        let wide = "é".repeat(MAX_AUTHOR_LENGTH);
        assert!(validate_length("author", &wide, MAX_AUTHOR_LENGTH).is_ok());

        let over = "a".repeat(MAX_AUTHOR_LENGTH + 1);
        let err = validate_length("author", &over, MAX_AUTHOR_LENGTH).unwrap_err();
        assert!(err.to_string().contains("maximum length of 200"));
    }

    #[test]
    fn test_every_dangerous_char_rejected() {
        for c in DANGEROUS_CHARS {
            let value = format!("pkg:npm/lodash{c}@4.17.21");
            let err = validate_safe_chars("product", &value).unwrap_err();
            assert!(err.to_string().contains("dangerous characters"), "{c}");
        }
    }

    #[test]
    fn test_purl_and_urls_pass() {
        for value in [
            "pkg:npm/%40angular/core@16.0.0",
            "pkg:apk/wolfi/git@2.39.0-r1?arch=x86_64#sub/path",
            "https://openvex.dev/docs/public/vex-1",
            "CVE-2023-1234",
            "Upgrade to version 4.17.22, see advisory.",
        ] {
            assert!(validate_field("value", value, MAX_FIELD_LENGTH).is_ok(), "{value}");
        }
    }

    #[test]
    fn test_optional_field() {
        assert!(validate_optional_field("author", None, MAX_AUTHOR_LENGTH).is_ok());
        assert!(validate_optional_field("author", Some("a;b"), MAX_AUTHOR_LENGTH).is_err());
    }

    #[test]
    fn test_document_count_bounds() {
        assert!(validate_document_count(1)
            .unwrap_err()
            .to_string()
            .contains("least 2"));
        assert!(validate_document_count(2).is_ok());
        assert!(validate_document_count(20).is_ok());
        assert!(validate_document_count(21)
            .unwrap_err()
            .to_string()
            .contains("maximum"));
    }
}
