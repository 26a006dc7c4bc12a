//! Validation plumbing shared by rules and schemas
//!
//! - `base`: the [`Validator`] trait and [`ValidationContext`]
//! - `error`: configuration errors and validation failures
//!
//! Batch validation runs one validator over many documents. Each validator
//! reports at most one failure per document; the batch decides whether to
//! stop at the first failing document or keep collecting.
//!
//! Copyright (c) 2025 Continuum Team
//! Licensed under the Apache-2.0 license

pub mod base;
pub mod error;

// Re-export commonly used types
pub use base::{render_path, PathSegment, ValidationContext, Validator};
pub use error::{ConfigError, Failure, FailureKind, Failures, ValidationResult};

use serde_json::Value;
use tracing::debug;

/// Validation configuration for batch operations
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    /// Whether to stop on first error or collect all errors
    pub fail_fast: bool,
    /// Maximum number of errors to collect (0 = unlimited)
    pub max_errors: usize,
}

impl ValidationConfig {
    /// Collect every failure
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fail-fast mode
    pub fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Set maximum number of errors to collect
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }
}

/// Validate many documents with one validator
///
/// Every document is checked under the path `$[i]`, with `base` supplying
/// the external context for `$` references.
pub fn validate_batch<V: Validator + ?Sized>(
    validator: &V,
    documents: &[Value],
    base: &ValidationContext<'_>,
    config: &ValidationConfig,
) -> Result<(), Failures> {
    let mut errors = Failures::new();

    for (i, document) in documents.iter().enumerate() {
        let document_context = base.batch_item(i);
        match validator.validate_with_context(document, &document_context) {
            Ok(_) => continue,
            Err(error) => {
                debug!(document = i, kind = %error.kind, "Document failed validation");
                errors.add(error);

                if config.fail_fast {
                    break;
                }

                if config.max_errors > 0 && errors.len() >= config.max_errors {
                    break;
                }
            }
        }
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuous::{Comparator, ContinuousRule};
    use serde_json::json;

    fn documents() -> Vec<Value> {
        vec![
            json!([{"idx": 0}, {"idx": 1}]),
            json!([{"idx": 1}]),
            json!([{"idx": 0}, {"idx": 2}]),
            json!("not an array"),
        ]
    }

    fn rule() -> ContinuousRule {
        ContinuousRule::new(Comparator::path("idx").unwrap())
    }

    #[test]
    fn test_validation_config_defaults() {
        let config = ValidationConfig::default();
        assert!(!config.fail_fast);
        assert_eq!(config.max_errors, 0);
    }

    #[test]
    fn test_validation_config_builders() {
        let config = ValidationConfig::new().with_fail_fast().with_max_errors(5);
        assert!(config.fail_fast);
        assert_eq!(config.max_errors, 5);
    }

    #[test]
    fn test_batch_collects_all_failures() {
        let failures = validate_batch(&rule(), &documents(), &ValidationContext::new(), &ValidationConfig::new())
            .unwrap_err();

        let kinds: Vec<_> = failures.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![FailureKind::ContinuousFrom, FailureKind::ContinuousBroken, FailureKind::NotAnArray]
        );
        assert_eq!(failures.errors[0].path, vec![PathSegment::Index(1)]);
        assert_eq!(failures.errors[2].path, vec![PathSegment::Index(3)]);
    }

    #[test]
    fn test_batch_fail_fast_and_limits() {
        let failures = validate_batch(
            &rule(),
            &documents(),
            &ValidationContext::new(),
            &ValidationConfig::new().with_fail_fast(),
        )
        .unwrap_err();
        assert_eq!(failures.len(), 1);

        let failures = validate_batch(
            &rule(),
            &documents(),
            &ValidationContext::new(),
            &ValidationConfig::new().with_max_errors(2),
        )
        .unwrap_err();
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn test_batch_index_stays_out_of_labels() {
        let failures = validate_batch(&rule(), &documents(), &ValidationContext::new(), &ValidationConfig::new())
            .unwrap_err();
        assert_eq!(failures.errors[2].message, "\"value\" must be an array");

        let referenced = rule().starting_at_ref("$offset").unwrap();
        let failures = validate_batch(
            &referenced,
            &[json!([{"idx": 0}])],
            &ValidationContext::new(),
            &ValidationConfig::new(),
        )
        .unwrap_err();
        assert_eq!(failures.errors[0].path, vec![PathSegment::Index(0)]);
        assert_eq!(
            failures.errors[0].message,
            "\"value\" references \"$offset\" which is not a positive integer"
        );
    }

    #[test]
    fn test_batch_all_valid() {
        let documents = vec![json!([]), json!([{"idx": 0}])];
        assert!(validate_batch(&rule(), &documents, &ValidationContext::new(), &ValidationConfig::new()).is_ok());
    }
}
