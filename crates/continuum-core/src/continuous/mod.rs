//! The `continuous` rule
//!
//! Checks that the integers selected from each element of an array start at
//! a given index and increase by exactly one per element. The rule runs after
//! item-level validation and never re-checks element types: an element whose
//! comparator yields no integer simply fails the comparison.
//!
//! The rule is split into focused modules:
//! - `comparator`: path and function extractors
//! - `start_index`: literal and referenced start indices
//! - `messages`: failure message templates
//! - `describe`: introspection and registration metadata
//!
//! Copyright (c) 2025 Continuum Team
//! Licensed under the Apache-2.0 license

pub mod comparator;
pub mod describe;
pub mod messages;
pub mod start_index;

pub use comparator::{Comparator, FieldPath, FUNCTION_LABEL};
pub use describe::{Description, DescriptionOptions, ParamSpec, RuleArgs, RuleDescription, RuleSignature};
pub use messages::MessageTemplates;
pub use start_index::{Reference, ReferenceScope, ResolveError, StartIndex};

use crate::validation::base::{ValidationContext, Validator};
use crate::validation::error::{type_name, ConfigError, Failure, FailureKind, ValidationResult};
use serde_json::{json, Map, Value};
use tracing::{debug, trace};

/// Name the rule registers under
pub const RULE_NAME: &str = "continuous";

/// Registration contract of the rule
pub static SIGNATURE: RuleSignature = RuleSignature {
    name: RULE_NAME,
    params: &[
        ParamSpec {
            name: "comparator",
            required: true,
            allows_reference: false,
        },
        ParamSpec {
            name: "startIndex",
            required: false,
            allows_reference: true,
        },
    ],
};

/// Gap-free integer sequence rule
///
/// # Examples
///
/// ```rust
/// use continuum_core::{Comparator, ContinuousRule, Validator};
/// use serde_json::json;
///
/// let rule = ContinuousRule::new(Comparator::path("idx").unwrap())
///     .starting_at(1)
///     .unwrap();
///
/// assert!(rule.validate(&json!([{"idx": 1}, {"idx": 2}, {"idx": 3}])).is_ok());
///
/// let failure = rule.validate(&json!([{"idx": 1}, {"idx": 4}, {"idx": 3}])).unwrap_err();
/// assert_eq!(failure.message, "\"idx\" should be 2");
/// ```
#[derive(Debug, Clone)]
pub struct ContinuousRule {
    comparator: Comparator,
    start_index: StartIndex,
    messages: MessageTemplates,
}

impl ContinuousRule {
    /// Rule starting at `0`
    pub fn new(comparator: Comparator) -> Self {
        Self {
            comparator,
            start_index: StartIndex::default(),
            messages: MessageTemplates::default(),
        }
    }

    /// Build from loosely typed arguments, as a host passing configuration
    /// data would
    pub fn from_args(comparator: &Value, start_index: Option<&Value>) -> Result<Self, ConfigError> {
        let comparator = Comparator::from_value(comparator)?;
        let start_index = StartIndex::from_value(start_index)?;
        debug!(
            comparator = comparator.label(),
            start_index = %start_index.describe_text(),
            "Built continuous rule"
        );
        Ok(Self::new(comparator).with_start_index(start_index))
    }

    /// Replace the start index
    pub fn with_start_index(mut self, start_index: StartIndex) -> Self {
        self.start_index = start_index;
        self
    }

    /// Literal start index
    pub fn starting_at(self, start: i64) -> Result<Self, ConfigError> {
        Ok(self.with_start_index(StartIndex::literal(start)?))
    }

    /// Start index read from a reference at validation time
    pub fn starting_at_ref(self, reference: &str) -> Result<Self, ConfigError> {
        Ok(self.with_start_index(StartIndex::Reference(Reference::parse(reference)?)))
    }

    /// Replace the message templates
    pub fn with_messages(mut self, messages: MessageTemplates) -> Self {
        self.messages = messages;
        self
    }

    /// Registration contract
    pub fn signature() -> &'static RuleSignature {
        &SIGNATURE
    }

    /// Configured comparator
    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    /// Configured start index
    pub fn start_index(&self) -> &StartIndex {
        &self.start_index
    }

    /// Message templates in effect
    pub fn messages(&self) -> &MessageTemplates {
        &self.messages
    }

    /// Apply the comparator to every element in order
    pub fn extract_sequence(&self, elements: &[Value]) -> Vec<Option<i64>> {
        elements
            .iter()
            .map(|element| self.comparator.extract(element))
            .collect()
    }

    /// Run the start and continuity checks over already validated elements.
    ///
    /// Only the first problem is reported. An empty array passes.
    pub fn check(&self, elements: &[Value], context: &ValidationContext<'_>) -> ValidationResult<()> {
        let start = self
            .start_index
            .resolve(context)
            .map_err(|error| self.reference_failure(error, context))?;

        let records = self.extract_sequence(elements);
        trace!(path = %context.path(), start, records = ?records, "Checking continuity");

        let mut expected = i128::from(start);
        for (index, (element, value)) in elements.iter().zip(&records).enumerate() {
            if value.map(i128::from) != Some(expected) {
                let failure = if index == 0 {
                    self.start_failure(&records, start, context)
                } else {
                    self.broken_failure(element, index, expected, context)
                };
                debug!(kind = %failure.kind, path = %context.path(), "{}", failure.message);
                return Err(failure);
            }
            expected += 1;
        }

        Ok(())
    }

    /// Description of this rule alone
    pub fn rule_description(&self) -> RuleDescription {
        RuleDescription {
            name: RULE_NAME.to_string(),
            arg: RuleArgs {
                comparator: self.comparator.label().to_string(),
                start_index: self.start_index.describe_value(),
            },
            description: format!(
                "{} must be an integer and started continuous from {}",
                self.comparator.label(),
                self.start_index.describe_text()
            ),
        }
    }

    fn base_context(&self, context: &ValidationContext<'_>) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("key".to_string(), json!(context.label()));
        map.insert("label".to_string(), json!(self.comparator.label()));
        map
    }

    fn failure(
        &self,
        kind: FailureKind,
        label: &str,
        data: Map<String, Value>,
        context: &ValidationContext<'_>,
    ) -> Failure {
        let message = self.messages.render(kind, label, &data);
        Failure::new(kind, context.segments().to_vec(), message, data)
    }

    fn start_failure(&self, records: &[Option<i64>], start: i64, context: &ValidationContext<'_>) -> Failure {
        let mut data = self.base_context(context);
        data.insert("comparator".to_string(), json!(self.comparator.label()));
        data.insert("records".to_string(), json!(records));
        data.insert("startIndex".to_string(), json!(start));
        self.failure(FailureKind::ContinuousFrom, self.comparator.label(), data, context)
    }

    fn broken_failure(
        &self,
        element: &Value,
        index: usize,
        expected: i128,
        context: &ValidationContext<'_>,
    ) -> Failure {
        let mut data = self.base_context(context);
        data.insert("comparator".to_string(), json!(self.comparator.label()));
        data.insert("value".to_string(), element.clone());
        data.insert("index".to_string(), json!(index));
        data.insert("expectedValue".to_string(), integer_value(expected));
        self.failure(FailureKind::ContinuousBroken, self.comparator.label(), data, context)
    }

    fn reference_failure(&self, error: ResolveError, context: &ValidationContext<'_>) -> Failure {
        let label = context.label();
        let mut data = Map::new();
        data.insert("ref".to_string(), json!(error.reference.as_str()));
        data.insert("found".to_string(), error.found.unwrap_or(Value::Null));
        data.insert("key".to_string(), json!(label));
        data.insert("label".to_string(), json!(label));
        debug!(reference = %error.reference, path = %context.path(), "Start index reference did not resolve");
        self.failure(FailureKind::InvalidReference, &label, data, context)
    }

    fn not_an_array(&self, input: &Value, context: &ValidationContext<'_>) -> Failure {
        let label = context.label();
        let mut data = Map::new();
        data.insert("found".to_string(), json!(type_name(input)));
        data.insert("key".to_string(), json!(label));
        data.insert("label".to_string(), json!(label));
        self.failure(FailureKind::NotAnArray, &label, data, context)
    }
}

impl Validator for ContinuousRule {
    fn validate_with_context<'v>(
        &self,
        input: &'v Value,
        context: &ValidationContext<'_>,
    ) -> ValidationResult<&'v Value> {
        match input {
            Value::Array(elements) => {
                self.check(elements, context)?;
                Ok(input)
            }
            other => Err(self.not_an_array(other, context)),
        }
    }

    fn describe(&self) -> Description {
        Description {
            kind: "array".to_string(),
            target: None,
            options: DescriptionOptions {
                language: self.messages.language(),
            },
            rules: vec![self.rule_description()],
        }
    }
}

/// Expected values past `i64::MAX` still render as JSON integers
fn integer_value(n: i128) -> Value {
    if let Ok(n) = i64::try_from(n) {
        Value::from(n)
    } else if let Ok(n) = u64::try_from(n) {
        Value::from(n)
    } else {
        Value::from(n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx_rule() -> ContinuousRule {
        ContinuousRule::new(Comparator::path("idx").unwrap())
    }

    fn sample(values: &[i64]) -> Vec<Value> {
        values.iter().map(|n| json!({ "idx": n })).collect()
    }

    #[test]
    fn test_continuous_sequence_passes() {
        let rule = idx_rule().starting_at(1).unwrap();
        assert!(rule.check(&sample(&[1, 2, 3]), &ValidationContext::new()).is_ok());
    }

    #[test]
    fn test_empty_array_passes() {
        assert!(idx_rule().check(&[], &ValidationContext::new()).is_ok());
    }

    #[test]
    fn test_wrong_start_carries_records() {
        let failure = idx_rule()
            .check(&sample(&[1, 4, 3]), &ValidationContext::new())
            .unwrap_err();

        assert_eq!(failure.kind, FailureKind::ContinuousFrom);
        assert_eq!(failure.message, "\"idx\" must be start from 0");
        assert_eq!(failure.context["records"], json!([1, 4, 3]));
        assert_eq!(failure.context["startIndex"], json!(0));
        assert_eq!(failure.context["comparator"], json!("idx"));
        assert!(failure.path.is_empty());
    }

    #[test]
    fn test_first_gap_is_reported() {
        let rule = idx_rule().starting_at(1).unwrap();
        let elements = sample(&[1, 4, 3, 9]);
        let failure = rule.check(&elements, &ValidationContext::new()).unwrap_err();

        assert_eq!(failure.kind, FailureKind::ContinuousBroken);
        assert_eq!(failure.message, "\"idx\" should be 2");
        assert_eq!(failure.context["value"], json!({"idx": 4}));
        assert_eq!(failure.context["index"], json!(1));
        assert_eq!(failure.context["expectedValue"], json!(2));
    }

    #[test]
    fn test_missing_values_fail_comparison() {
        let rule = idx_rule();
        let failure = rule
            .check(&[json!({"other": 0})], &ValidationContext::new())
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::ContinuousFrom);
        assert_eq!(failure.context["records"], json!([null]));

        let failure = rule
            .check(&[json!({"idx": 0}), json!({"idx": "1"})], &ValidationContext::new())
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::ContinuousBroken);
        assert_eq!(failure.context["expectedValue"], json!(1));
    }

    #[test]
    fn test_sequence_reaching_i64_max() {
        let rule = idx_rule().starting_at(i64::MAX - 1).unwrap();
        assert!(rule
            .check(&sample(&[i64::MAX - 1, i64::MAX]), &ValidationContext::new())
            .is_ok());

        let failure = rule
            .check(&sample(&[i64::MAX - 1, i64::MAX, 0]), &ValidationContext::new())
            .unwrap_err();
        assert_eq!(failure.context["expectedValue"], json!(9_223_372_036_854_775_808u64));
    }

    #[test]
    fn test_values_past_i64_max_break_the_sequence() {
        let rule = idx_rule().starting_at(i64::MAX - 1).unwrap();
        let items = [
            json!({"idx": i64::MAX - 1}),
            json!({"idx": 9_223_372_036_854_775_808u64}),
        ];

        let failure = rule.check(&items, &ValidationContext::new()).unwrap_err();
        assert_eq!(failure.kind, FailureKind::ContinuousBroken);
        assert_eq!(failure.context["index"], json!(1));
        assert_eq!(failure.context["expectedValue"], json!(i64::MAX));
    }

    #[test]
    fn test_reference_failure_at_array_path() {
        let doc = json!({"ref": "a", "arr": []});
        let context = ValidationContext::new().with_parent(&doc).child("arr");
        let rule = idx_rule().starting_at_ref("ref").unwrap();

        let failure = rule.check(&sample(&[1]), &context).unwrap_err();
        assert_eq!(failure.kind, FailureKind::InvalidReference);
        assert_eq!(failure.message, "\"arr\" references \"ref\" which is not a positive integer");
        assert_eq!(failure.context["found"], json!("a"));
        assert_eq!(failure.path, context.segments().to_vec());
    }

    #[test]
    fn test_reference_checked_before_elements() {
        let rule = idx_rule().starting_at_ref("missing").unwrap();
        let failure = rule.check(&[], &ValidationContext::new()).unwrap_err();
        assert_eq!(failure.kind, FailureKind::InvalidReference);
        assert_eq!(failure.message, "\"value\" references \"missing\" which is not a positive integer");
    }

    #[test]
    fn test_validate_rejects_non_arrays() {
        let failure = idx_rule().validate(&json!({"idx": 0})).unwrap_err();
        assert_eq!(failure.kind, FailureKind::NotAnArray);
        assert_eq!(failure.message, "\"value\" must be an array");
        assert_eq!(failure.context["found"], json!("object"));
    }

    #[test]
    fn test_validate_returns_input_unchanged() {
        let input = json!([{"idx": 0}, {"idx": 1}]);
        let output = idx_rule().validate(&input).unwrap();
        assert!(std::ptr::eq(output, &input));
    }

    #[test]
    fn test_from_args() {
        let rule = ContinuousRule::from_args(&json!("obj.idx"), Some(&json!({"ref": "ref"}))).unwrap();
        assert_eq!(rule.comparator().label(), "obj.idx");
        assert!(matches!(rule.start_index(), StartIndex::Reference(_)));

        assert!(matches!(
            ContinuousRule::from_args(&json!({}), Some(&json!(1))),
            Err(ConfigError::InvalidComparator { .. })
        ));
        assert_eq!(
            ContinuousRule::from_args(&json!(""), Some(&json!(1))).unwrap_err(),
            ConfigError::EmptyComparator
        );
        assert!(matches!(
            ContinuousRule::from_args(&json!("idx"), Some(&json!("a"))),
            Err(ConfigError::StartIndexNotANumber { .. })
        ));
        assert!(matches!(
            ContinuousRule::from_args(&json!("idx"), Some(&json!(1.2))),
            Err(ConfigError::NonIntegerStartIndex { .. })
        ));
    }

    #[test]
    fn test_custom_messages() {
        let messages = MessageTemplates::new().with(FailureKind::ContinuousBroken, "expected {{expectedValue}} at {{index}}");
        let rule = idx_rule().starting_at(1).unwrap().with_messages(messages);
        let failure = rule.check(&sample(&[1, 3]), &ValidationContext::new()).unwrap_err();
        assert_eq!(failure.message, "\"idx\" expected 2 at 1");
    }

    #[test]
    fn test_describe() {
        let rule = idx_rule().starting_at(2).unwrap();
        let description = serde_json::to_value(rule.describe()).unwrap();

        assert_eq!(
            description,
            json!({
                "type": "array",
                "options": {
                    "language": {
                        "continuous_broken": "should be {{expectedValue}}",
                        "continuous_from": "must be start from {{startIndex}}"
                    }
                },
                "rules": [{
                    "name": "continuous",
                    "arg": {"comparator": "idx", "startIndex": 2},
                    "description": "idx must be an integer and started continuous from 2"
                }]
            })
        );
    }

    #[test]
    fn test_describe_reference_and_function() {
        let rule = ContinuousRule::new(Comparator::function(|e| e["n"].as_i64()))
            .starting_at_ref("ref")
            .unwrap();
        let description = rule.rule_description();
        assert_eq!(description.arg.comparator, FUNCTION_LABEL);
        assert_eq!(description.arg.start_index, json!({"ref": "ref"}));
        assert_eq!(
            description.description,
            "function comparator must be an integer and started continuous from ref:ref"
        );
    }

    #[test]
    fn test_signature() {
        let signature = ContinuousRule::signature();
        assert_eq!(signature.name, "continuous");
        assert!(signature.param("comparator").unwrap().required);
        assert!(!signature.param("comparator").unwrap().allows_reference);
        assert!(signature.param("startIndex").unwrap().allows_reference);
        assert!(signature.param("limit").is_none());
    }
}
