//! Message templates for failures
//!
//! Templates use `{{name}}` placeholders filled from the failure context.
//! The rendered message is prefixed with the quoted label, giving messages
//! such as `"idx" must be start from 0`.
//!
//! Copyright (c) 2025 Continuum Team
//! Licensed under the Apache-2.0 license

use crate::validation::error::{ConfigError, FailureKind};
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
    })
}

fn default_template(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::ContinuousFrom => "must be start from {{startIndex}}",
        FailureKind::ContinuousBroken => "should be {{expectedValue}}",
        FailureKind::InvalidReference => "references \"{{ref}}\" which is not a positive integer",
        FailureKind::NotAnArray => "must be an array",
    }
}

/// Per-kind templates, falling back to the built-in wording
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTemplates {
    overrides: HashMap<FailureKind, String>,
}

impl MessageTemplates {
    /// Built-in templates only
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a map keyed by message key (`continuous_from`) or kind
    /// name (`array.continuous_from`)
    pub fn from_overrides<I, K, V>(overrides: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut templates = Self::new();
        for (key, template) in overrides {
            let kind = FailureKind::from_key(key.as_ref())
                .ok_or_else(|| ConfigError::UnknownMessageKey(key.as_ref().to_string()))?;
            templates.set(kind, template);
        }
        Ok(templates)
    }

    /// Override the template for one kind
    pub fn set<T: Into<String>>(&mut self, kind: FailureKind, template: T) {
        self.overrides.insert(kind, template.into());
    }

    /// Builder form of [`MessageTemplates::set`]
    pub fn with<T: Into<String>>(mut self, kind: FailureKind, template: T) -> Self {
        self.set(kind, template);
        self
    }

    /// Template in effect for `kind`
    pub fn template(&self, kind: FailureKind) -> &str {
        self.overrides
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| default_template(kind))
    }

    /// Render `"<label>" <template>` with placeholders filled from `context`
    pub fn render(&self, kind: FailureKind, label: &str, context: &Map<String, Value>) -> String {
        format!("\"{}\" {}", label, interpolate(self.template(kind), context))
    }

    /// Templates of the continuity checks, keyed by message key
    pub fn language(&self) -> BTreeMap<String, String> {
        [FailureKind::ContinuousFrom, FailureKind::ContinuousBroken]
            .into_iter()
            .map(|kind| (kind.message_key().to_string(), self.template(kind).to_string()))
            .collect()
    }
}

/// Replace `{{name}}` placeholders; unknown names render empty
pub fn interpolate(template: &str, context: &Map<String, Value>) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures<'_>| {
            context.get(&caps[1]).map(display_value).unwrap_or_default()
        })
        .into_owned()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
