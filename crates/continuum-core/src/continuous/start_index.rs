//! Start index configuration and reference resolution
//!
//! A start index is either fixed when the rule is built or a reference to a
//! value that only exists at validation time: a sibling of the array in the
//! enclosing object, or (with a `$` prefix) an entry of the external context.
//!
//! Copyright (c) 2025 Continuum Team
//! Licensed under the Apache-2.0 license

use crate::continuous::comparator::{as_integer, resolve_segments};
use crate::validation::base::ValidationContext;
use crate::validation::error::{type_name, ConfigError};
use serde_json::{json, Value};
use std::fmt;
use tracing::trace;

const CONTEXT_PREFIX: char = '$';

/// Where a reference looks its value up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceScope {
    /// Object enclosing the array
    Sibling,
    /// External values supplied with the validation context
    Context,
}

/// Pointer to a value resolved at validation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    raw: String,
    scope: ReferenceScope,
    segments: Vec<String>,
}

impl Reference {
    /// Parse `field`, `nested.field` or `$contextKey`
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let (scope, path) = match raw.strip_prefix(CONTEXT_PREFIX) {
            Some(rest) => (ReferenceScope::Context, rest),
            None => (ReferenceScope::Sibling, raw),
        };

        if path.is_empty() {
            return Err(ConfigError::EmptyReference);
        }

        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(ConfigError::InvalidPath {
                path: raw.to_string(),
            });
        }

        Ok(Self {
            raw: raw.to_string(),
            scope,
            segments,
        })
    }

    /// Sibling reference shorthand
    pub fn sibling(field: &str) -> Result<Self, ConfigError> {
        Self::parse(field)
    }

    /// The reference as written, including any `$` prefix
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Lookup scope
    pub fn scope(&self) -> ReferenceScope {
        self.scope
    }

    /// Fetch the raw referenced value
    pub fn lookup<'v>(&self, context: &'v ValidationContext<'_>) -> Option<&'v Value> {
        match self.scope {
            ReferenceScope::Sibling => context
                .parent()
                .and_then(|parent| resolve_segments(parent, self.segments.as_slice())),
            ReferenceScope::Context => {
                let (first, rest) = self.segments.split_first()?;
                context
                    .get_context(first)
                    .and_then(|value| resolve_segments(value, rest))
            }
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A reference resolved to something other than a non-negative integer
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveError {
    /// The reference that failed
    pub reference: Reference,
    /// What it pointed at, if anything
    pub found: Option<Value>,
}

/// Integer the first extracted value must equal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartIndex {
    /// Fixed at configuration time
    Literal(i64),
    /// Resolved per validation call
    Reference(Reference),
}

impl Default for StartIndex {
    fn default() -> Self {
        StartIndex::Literal(0)
    }
}

impl StartIndex {
    /// Literal start index; must not be negative
    pub fn literal(value: i64) -> Result<Self, ConfigError> {
        if value < 0 {
            return Err(ConfigError::NegativeStartIndex(value));
        }
        Ok(StartIndex::Literal(value))
    }

    /// Build from configuration data. Absent and `null` mean `0`; an object
    /// of the form `{"ref": "field"}` is a reference.
    pub fn from_value(value: Option<&Value>) -> Result<Self, ConfigError> {
        let value = match value {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(value) => value,
        };

        match value {
            Value::Number(_) => match as_integer(value) {
                Some(n) => Self::literal(n),
                None => Err(ConfigError::NonIntegerStartIndex {
                    found: value.to_string(),
                }),
            },
            Value::Object(map) if map.len() == 1 => match map.get("ref") {
                Some(Value::String(raw)) => Reference::parse(raw).map(StartIndex::Reference),
                _ => Err(ConfigError::StartIndexNotANumber {
                    found: type_name(value).to_string(),
                }),
            },
            other => Err(ConfigError::StartIndexNotANumber {
                found: type_name(other).to_string(),
            }),
        }
    }

    /// Resolve to a concrete integer for this validation call
    pub fn resolve(&self, context: &ValidationContext<'_>) -> Result<i64, ResolveError> {
        match self {
            StartIndex::Literal(value) => Ok(*value),
            StartIndex::Reference(reference) => {
                let found = reference.lookup(context);
                trace!(reference = %reference, found = ?found, "Resolving start index reference");

                found
                    .and_then(coerce_non_negative)
                    .ok_or_else(|| ResolveError {
                        reference: reference.clone(),
                        found: found.cloned(),
                    })
            }
        }
    }

    /// Configured value as it appears in descriptions
    pub fn describe_value(&self) -> Value {
        match self {
            StartIndex::Literal(value) => json!(value),
            StartIndex::Reference(reference) => json!({ "ref": reference.as_str() }),
        }
    }

    /// Configured value as it appears in prose
    pub fn describe_text(&self) -> String {
        match self {
            StartIndex::Literal(value) => value.to_string(),
            StartIndex::Reference(reference) => format!("ref:{}", reference),
        }
    }
}

impl From<Reference> for StartIndex {
    fn from(reference: Reference) -> Self {
        StartIndex::Reference(reference)
    }
}

/// Numbers and numeric strings are accepted when they denote an integer >= 0
fn coerce_non_negative(value: &Value) -> Option<i64> {
    let n = match value {
        Value::Number(_) => as_integer(value)?,
        Value::String(text) => text.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (n >= 0).then_some(n)
}
