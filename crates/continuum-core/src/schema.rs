//! Applying the rule to an array inside a larger document
//!
//! Copyright (c) 2025 Continuum Team
//! Licensed under the Apache-2.0 license

use crate::continuous::comparator::resolve_segments;
use crate::continuous::{ContinuousRule, Description, FieldPath};
use crate::validation::base::{ValidationContext, Validator};
use crate::validation::error::{ConfigError, ValidationResult};
use serde_json::Value;
use tracing::trace;

/// A continuity rule bound to a location in a document
///
/// Without a target the document itself must be the array. With a target
/// such as `orders.lines`, the array is looked up in the document and the
/// object holding it (`orders`) becomes the scope for sibling references.
/// A document without the target key passes, since the key is optional.
///
/// # Examples
///
/// ```rust
/// use continuum_core::{Comparator, ContinuousRule, DocumentSchema, Validator};
/// use serde_json::json;
///
/// let rule = ContinuousRule::new(Comparator::path("obj.idx").unwrap())
///     .starting_at(1)
///     .unwrap();
/// let schema = DocumentSchema::at("arr", rule).unwrap();
///
/// let doc = json!({"arr": [{"obj": {"idx": 1}}, {"obj": {"idx": 2}}, {"obj": {"idx": 4}}]});
/// let failure = schema.validate(&doc).unwrap_err();
/// assert_eq!(failure.nested_message(), "child \"arr\" fails because [\"obj.idx\" should be 3]");
/// ```
#[derive(Debug, Clone)]
pub struct DocumentSchema {
    target: Option<FieldPath>,
    rule: ContinuousRule,
}

impl DocumentSchema {
    /// Validate whole documents as arrays
    pub fn new(rule: ContinuousRule) -> Self {
        Self { target: None, rule }
    }

    /// Validate the array found at `target`
    pub fn at(target: &str, rule: ContinuousRule) -> Result<Self, ConfigError> {
        if target.is_empty() {
            return Err(ConfigError::InvalidPath {
                path: target.to_string(),
            });
        }
        Ok(Self {
            target: Some(FieldPath::parse(target)?),
            rule,
        })
    }

    /// Location of the array, if not the document root
    pub fn target(&self) -> Option<&FieldPath> {
        self.target.as_ref()
    }

    /// The rule applied
    pub fn rule(&self) -> &ContinuousRule {
        &self.rule
    }
}

impl Validator for DocumentSchema {
    fn validate_with_context<'v>(
        &self,
        document: &'v Value,
        context: &ValidationContext<'_>,
    ) -> ValidationResult<&'v Value> {
        let Some(target) = &self.target else {
            return self.rule.validate_with_context(document, context);
        };

        let parent = match target.parent() {
            Some(parent_path) => parent_path.resolve(document),
            None => Some(document),
        };
        let (Some(parent), Some(array)) = (parent, target.resolve(document)) else {
            trace!(path = %target, "Target not present, skipping");
            return Ok(document);
        };

        // Numeric segments that stepped into an array are indices
        let mut scoped = context.rescoped(parent);
        let mut current = Some(document);
        for segment in target.segments() {
            scoped = match (current, segment.parse::<usize>()) {
                (Some(Value::Array(_)), Ok(index)) => scoped.child_index(index),
                _ => scoped.child(segment.as_str()),
            };
            current = current.and_then(|value| resolve_segments(value, std::slice::from_ref(segment)));
        }

        self.rule.validate_with_context(array, &scoped)?;
        Ok(document)
    }

    fn describe(&self) -> Description {
        let mut description = self.rule.describe();
        if let Some(target) = &self.target {
            description.kind = "object".to_string();
            description.target = Some(target.to_string());
        }
        description
    }
}
