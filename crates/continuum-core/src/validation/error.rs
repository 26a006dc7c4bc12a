//! Configuration and validation error types
//!
//! Copyright (c) 2025 Continuum Team
//! Licensed under the Apache-2.0 license

use crate::validation::base::{render_path, PathSegment};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Errors raised while building a rule. These are programmer mistakes and
/// abort schema construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Comparator is neither a string nor a function
    #[error("comparator must be a string or a function, found {found}")]
    InvalidComparator { found: String },

    /// Comparator path is the empty string
    #[error("comparator is not allowed to be empty")]
    EmptyComparator,

    /// Path with an empty segment, e.g. `a..b`
    #[error("invalid field path '{path}': segments must not be empty")]
    InvalidPath { path: String },

    /// Literal start index is a number but not an integer
    #[error("startIndex must be an integer, found {found}")]
    NonIntegerStartIndex { found: String },

    /// Literal start index is not a number at all
    #[error("startIndex must be a number, found {found}")]
    StartIndexNotANumber { found: String },

    /// Literal start index below zero
    #[error("startIndex must be larger than or equal to 0, found {0}")]
    NegativeStartIndex(i64),

    /// Reference without a target
    #[error("reference must name a field")]
    EmptyReference,

    /// Message override for an unknown failure kind
    #[error("unknown message key '{0}'")]
    UnknownMessageKey(String),
}

/// Describe the JSON type of a value for error messages
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The check that produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// First extracted value differs from the start index
    #[serde(rename = "array.continuous_from")]
    ContinuousFrom,
    /// An extracted value is not the previous one plus one
    #[serde(rename = "array.continuous_broken")]
    ContinuousBroken,
    /// Start index reference did not resolve to a non-negative integer
    #[serde(rename = "any.ref")]
    InvalidReference,
    /// Value handed to the rule is not an array
    #[serde(rename = "array.base")]
    NotAnArray,
}

impl FailureKind {
    /// All kinds, in declaration order
    pub const ALL: [FailureKind; 4] = [
        FailureKind::ContinuousFrom,
        FailureKind::ContinuousBroken,
        FailureKind::InvalidReference,
        FailureKind::NotAnArray,
    ];

    /// Fully qualified kind name, e.g. `array.continuous_from`
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ContinuousFrom => "array.continuous_from",
            FailureKind::ContinuousBroken => "array.continuous_broken",
            FailureKind::InvalidReference => "any.ref",
            FailureKind::NotAnArray => "array.base",
        }
    }

    /// Short name used as message key, e.g. `continuous_from`
    pub fn message_key(&self) -> &'static str {
        match self {
            FailureKind::ContinuousFrom => "continuous_from",
            FailureKind::ContinuousBroken => "continuous_broken",
            FailureKind::InvalidReference => "ref",
            FailureKind::NotAnArray => "base",
        }
    }

    /// Look up a kind by message key or fully qualified name
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.message_key() == key || kind.as_str() == key)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure with path context
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub struct Failure {
    /// Which check failed
    #[serde(rename = "type")]
    pub kind: FailureKind,
    /// Location of the array that failed
    pub path: Vec<PathSegment>,
    /// Human-readable message
    pub message: String,
    /// Values the message was rendered from
    pub context: Map<String, Value>,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validation error at '{}': {}",
            render_path(&self.path),
            self.message
        )
    }
}

impl Failure {
    /// Create a new failure
    pub fn new<M>(
        kind: FailureKind,
        path: Vec<PathSegment>,
        message: M,
        context: Map<String, Value>,
    ) -> Self
    where
        M: Into<String>,
    {
        Self {
            kind,
            path,
            message: message.into(),
            context,
        }
    }

    /// Prefix the path with the segments of an enclosing location
    pub fn within(mut self, prefix: &[PathSegment]) -> Self {
        let mut path = prefix.to_vec();
        path.append(&mut self.path);
        self.path = path;
        self
    }

    /// Message wrapped once per enclosing key:
    /// `child "arr" fails because ["idx" should be 2]`
    pub fn nested_message(&self) -> String {
        self.path.iter().rev().fold(self.message.clone(), |inner, segment| {
            format!("child \"{}\" fails because [{}]", segment, inner)
        })
    }

    /// Get a context value
    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, Failure>;

/// Multiple failures collected during batch validation
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub struct Failures {
    /// List of failures
    pub errors: Vec<Failure>,
}

impl fmt::Display for Failures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multiple validation errors occurred:")?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl Failures {
    /// Create a new failure collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add a failure to the collection
    pub fn add(&mut self, error: Failure) {
        self.errors.push(error);
    }

    /// Check if there are any failures
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of failures
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over the failures in order
    pub fn iter(&self) -> std::slice::Iter<'_, Failure> {
        self.errors.iter()
    }

    /// Convert to result - Ok if no failures, Err if any exist
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Default for Failures {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Failure> for Failures {
    fn from(error: Failure) -> Self {
        let mut errors = Self::new();
        errors.add(error);
        errors
    }
}

impl From<Vec<Failure>> for Failures {
    fn from(errors: Vec<Failure>) -> Self {
        Self { errors }
    }
}
