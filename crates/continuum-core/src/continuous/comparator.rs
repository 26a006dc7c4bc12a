//! Comparators select the integer each array element contributes to the
//! sequence check.
//!
//! Copyright (c) 2025 Continuum Team
//! Licensed under the Apache-2.0 license

use crate::validation::error::{type_name, ConfigError};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Label used in messages when the comparator has no path
pub const FUNCTION_LABEL: &str = "function comparator";

/// Extractor signature for function comparators
pub type Extractor = dyn Fn(&Value) -> Option<i64> + Send + Sync;

/// Dot-delimited path into a JSON value (`obj.idx`, `items.0.id`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path. Every segment must be non-empty.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        if raw.is_empty() {
            return Err(ConfigError::EmptyComparator);
        }

        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(ConfigError::InvalidPath {
                path: raw.to_string(),
            });
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The path as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Individual segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walk the path; numeric segments index into arrays
    pub fn resolve<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        resolve_segments(value, self.segments.as_slice())
    }

    /// Path of the enclosing value, `None` for single-segment paths
    pub fn parent(&self) -> Option<FieldPath> {
        let (_, head) = self.segments.split_last()?;
        if head.is_empty() {
            return None;
        }
        Some(Self {
            raw: head.join("."),
            segments: head.to_vec(),
        })
    }

    /// Final segment
    pub fn last(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

pub(crate) fn resolve_segments<'v, S: AsRef<str>>(value: &'v Value, segments: &[S]) -> Option<&'v Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment.as_ref()),
            Value::Array(items) => segment
                .as_ref()
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        })
}

/// Read a JSON number as an integer; `2.0` counts, `2.5` does not
pub fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    // Above i64::MAX
    if value.is_u64() {
        return None;
    }
    // 2^63 is exact as f64; i64::MAX is not
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let n = value.as_f64()?;
    if n.fract() == 0.0 && (-LIMIT..LIMIT).contains(&n) {
        Some(n as i64)
    } else {
        None
    }
}

/// Selects which field of each element participates in the check
#[derive(Clone)]
pub enum Comparator {
    /// Dotted path into each element
    Path(FieldPath),
    /// Arbitrary extractor
    Function(Arc<Extractor>),
}

impl Comparator {
    /// Path comparator; fails on empty or malformed paths
    pub fn path(path: &str) -> Result<Self, ConfigError> {
        FieldPath::parse(path).map(Comparator::Path)
    }

    /// Function comparator
    pub fn function<F>(extractor: F) -> Self
    where
        F: Fn(&Value) -> Option<i64> + Send + Sync + 'static,
    {
        Comparator::Function(Arc::new(extractor))
    }

    /// Build from configuration data. Only strings are accepted here since
    /// functions cannot be expressed as data.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::String(path) => Self::path(path),
            other => Err(ConfigError::InvalidComparator {
                found: type_name(other).to_string(),
            }),
        }
    }

    /// Label used in messages and descriptions
    pub fn label(&self) -> &str {
        match self {
            Comparator::Path(path) => path.as_str(),
            Comparator::Function(_) => FUNCTION_LABEL,
        }
    }

    /// Integer contributed by `element`, if it has one
    pub fn extract(&self, element: &Value) -> Option<i64> {
        match self {
            Comparator::Path(path) => path.resolve(element).and_then(as_integer),
            Comparator::Function(extractor) => extractor(element),
        }
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Path(path) => f.debug_tuple("Path").field(&path.as_str()).finish(),
            Comparator::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl TryFrom<&str> for Comparator {
    type Error = ConfigError;

    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_extracts_nested_integer() {
        let comparator = Comparator::path("obj.idx").unwrap();
        assert_eq!(comparator.extract(&json!({"obj": {"idx": 7}})), Some(7));
        assert_eq!(comparator.label(), "obj.idx");
    }

    #[test]
    fn test_as_integer_rejects_values_outside_i64() {
        assert_eq!(as_integer(&json!(i64::MAX)), Some(i64::MAX));
        assert_eq!(as_integer(&json!(9_223_372_036_854_775_808u64)), None);
        assert_eq!(as_integer(&json!(u64::MAX)), None);
        assert_eq!(as_integer(&json!(9.3e18)), None);
        assert_eq!(as_integer(&json!(-9.223_372_036_854_775_808e18)), Some(i64::MIN));
        assert_eq!(as_integer(&json!(-1e19)), None);
    }

    #[test]
    fn test_path_indexes_arrays() {
        let comparator = Comparator::path("items.1").unwrap();
        assert_eq!(comparator.extract(&json!({"items": [4, 5]})), Some(5));
        assert_eq!(comparator.extract(&json!({"items": [4]})), None);
    }

    #[test]
    fn test_missing_or_non_integer_values_extract_nothing() {
        let comparator = Comparator::path("idx").unwrap();
        assert_eq!(comparator.extract(&json!({})), None);
        assert_eq!(comparator.extract(&json!({"idx": "1"})), None);
        assert_eq!(comparator.extract(&json!({"idx": 1.5})), None);
        assert_eq!(comparator.extract(&json!({"idx": 2.0})), Some(2));
        assert_eq!(comparator.extract(&json!(3)), None);
    }

    #[test]
    fn test_function_comparator_uses_fixed_label() {
        let comparator = Comparator::function(|e| e["obj"]["idx"].as_i64());
        assert_eq!(comparator.label(), FUNCTION_LABEL);
        assert_eq!(comparator.extract(&json!({"obj": {"idx": 3}})), Some(3));
        assert_eq!(format!("{:?}", comparator), "Function(..)");
    }

    #[test]
    fn test_from_value_rejects_non_strings() {
        for value in [json!({}), json!(1), json!(null), json!([]), json!(true)] {
            let error = Comparator::from_value(&value).unwrap_err();
            assert!(matches!(error, ConfigError::InvalidComparator { .. }));
            assert!(error.to_string().contains("comparator must be a string or a function"));
        }
    }

    #[test]
    fn test_empty_and_malformed_paths() {
        assert_eq!(Comparator::path("").unwrap_err(), ConfigError::EmptyComparator);
        assert!(matches!(
            Comparator::path("a..b").unwrap_err(),
            ConfigError::InvalidPath { .. }
        ));
        assert!(matches!(
            Comparator::path(".a").unwrap_err(),
            ConfigError::InvalidPath { .. }
        ));
    }

    #[test]
    fn test_field_path_parent() {
        let path = FieldPath::parse("a.b.c").unwrap();
        assert_eq!(path.parent().unwrap().as_str(), "a.b");
        assert_eq!(path.last(), "c");
        assert!(FieldPath::parse("a").unwrap().parent().is_none());
    }
}
