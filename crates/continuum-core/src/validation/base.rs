//! Base validation trait and the context passed through a validation call
//!
//! Copyright (c) 2025 Continuum Team
//! Licensed under the Apache-2.0 license

use crate::continuous::describe::Description;
use crate::validation::error::{Failures, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// One step of a path into a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// Array index
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Render segments as a JSONPath-like string (`$.arr[0].idx`)
pub fn render_path(segments: &[PathSegment]) -> String {
    let mut path = String::from("$");
    for segment in segments {
        match segment {
            PathSegment::Key(key) => {
                path.push('.');
                path.push_str(key);
            }
            PathSegment::Index(index) => {
                path.push_str(&format!("[{}]", index));
            }
        }
    }
    path
}

/// Validation context for passing additional information
///
/// The context carries the location of the value under validation, the
/// object enclosing it (sibling references resolve against this) and a map
/// of external values that `$`-prefixed references resolve against.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext<'a> {
    segments: Vec<PathSegment>,
    /// Segments before this index locate the document inside a batch
    document_start: usize,
    parent: Option<&'a Value>,
    context: HashMap<String, Value>,
}

impl<'a> ValidationContext<'a> {
    /// Create a new validation context at the document root
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a child context with updated path
    pub fn child<K: Into<String>>(&self, key: K) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));

        Self {
            segments,
            document_start: self.document_start,
            parent: self.parent,
            context: self.context.clone(),
        }
    }

    /// Create a child context for array index
    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));

        Self {
            segments,
            document_start: self.document_start,
            parent: self.parent,
            context: self.context.clone(),
        }
    }

    /// Context for document `index` of a batch
    ///
    /// The index is part of the path but not of the document, so a document
    /// root is still labelled `value`.
    pub fn batch_item(&self, index: usize) -> Self {
        let mut item = self.child_index(index);
        item.document_start = item.segments.len();
        item
    }

    /// Set the object that encloses the value being validated
    pub fn with_parent(mut self, parent: &'a Value) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Same location and external context, enclosed by a different object
    pub fn rescoped<'b>(&self, parent: &'b Value) -> ValidationContext<'b> {
        ValidationContext {
            segments: self.segments.clone(),
            document_start: self.document_start,
            parent: Some(parent),
            context: self.context.clone(),
        }
    }

    /// Add context data
    pub fn with_context<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Get context data
    pub fn get_context(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    /// The enclosing object, if any
    pub fn parent(&self) -> Option<&'a Value> {
        self.parent
    }

    /// Path segments from the document root
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Current JSON path
    pub fn path(&self) -> String {
        render_path(&self.segments)
    }

    /// Label for the current value: its key, or `value` at the root
    pub fn label(&self) -> String {
        match self.segments[self.document_start..].last() {
            Some(segment) => segment.to_string(),
            None => "value".to_string(),
        }
    }
}

/// Base trait for validators plugged into a host
pub trait Validator {
    /// Validate a value, returning it unchanged on success
    fn validate<'v>(&self, input: &'v Value) -> ValidationResult<&'v Value> {
        let context = ValidationContext::new();
        self.validate_with_context(input, &context)
    }

    /// Validate with a specific context
    fn validate_with_context<'v>(
        &self,
        input: &'v Value,
        context: &ValidationContext<'_>,
    ) -> ValidationResult<&'v Value>;

    /// Machine-readable description for schema introspection
    fn describe(&self) -> Description;

    /// Collect all validation errors (non-failing)
    fn collect_errors(&self, input: &Value) -> Failures {
        let mut errors = Failures::new();
        if let Err(error) = self.validate(input) {
            errors.add(error);
        }
        errors
    }
}
