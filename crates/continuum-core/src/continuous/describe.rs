//! Self-description and registration metadata
//!
//! Copyright (c) 2025 Continuum Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A parameter accepted by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    /// Parameter name
    pub name: &'static str,
    /// Whether the parameter must be supplied
    pub required: bool,
    /// Whether the parameter may be a reference resolved at validation time
    pub allows_reference: bool,
}

/// Name and parameter list a rule registers with its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleSignature {
    /// Rule name
    pub name: &'static str,
    /// Parameters in positional order
    pub params: &'static [ParamSpec],
}

impl RuleSignature {
    /// Look up a parameter by name
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|param| param.name == name)
    }
}

/// Arguments of a rule as configured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleArgs {
    /// Comparator label
    pub comparator: String,
    /// Literal start index, or `{"ref": ...}`
    #[serde(rename = "startIndex")]
    pub start_index: Value,
}

/// Description of a single rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDescription {
    /// Rule name
    pub name: String,
    /// Configured arguments
    pub arg: RuleArgs,
    /// Human-readable summary
    pub description: String,
}

/// Message templates exposed for introspection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptionOptions {
    /// Templates keyed by message key
    pub language: BTreeMap<String, String>,
}

/// Description of a validator for schema introspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// Type of value validated (`array` or `object`)
    #[serde(rename = "type")]
    pub kind: String,
    /// Location of the array within a document
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target: Option<String>,
    /// Message templates
    pub options: DescriptionOptions,
    /// Rules applied
    pub rules: Vec<RuleDescription>,
}
