//! Rule files
//!
//! A rule file binds a continuity rule to a location in a document:
//!
//! ```yaml
//! target: arr            # optional; omit to validate root arrays
//! comparator: obj.idx
//! start_index: 1         # or {ref: sibling_field} / {ref: $context_key}
//! messages:              # optional template overrides
//!   continuous_broken: "expected {{expectedValue}}"
//! ```
//!
//! Copyright (c) 2025 Continuum Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod parser;

pub use error::{LoaderError, LoaderResult};
pub use parser::{parse_content, parse_file, Format};

use crate::continuous::{ContinuousRule, MessageTemplates};
use crate::schema::DocumentSchema;
use crate::validation::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// On-disk form of a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleFile {
    /// Dotted path to the array; absent for root arrays
    #[serde(default)]
    pub target: Option<String>,
    /// Comparator path. Kept loose so a wrong type reports the rule's own error
    pub comparator: Value,
    /// Literal start index or `{ref: ...}`
    #[serde(default, alias = "startIndex")]
    pub start_index: Option<Value>,
    /// Message template overrides keyed by message key
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
}

impl RuleFile {
    /// Build the schema this file describes
    pub fn into_schema(self) -> Result<DocumentSchema, ConfigError> {
        let messages = MessageTemplates::from_overrides(self.messages)?;
        let rule = ContinuousRule::from_args(&self.comparator, self.start_index.as_ref())?
            .with_messages(messages);

        match self.target.as_deref() {
            Some(target) => DocumentSchema::at(target, rule),
            None => Ok(DocumentSchema::new(rule)),
        }
    }
}

/// Parse rule-file content in a known format
pub fn parse_rule(content: &str, format: Format, path: &Path) -> LoaderResult<DocumentSchema> {
    let value = parse_content(content, format, path)?;
    rule_from_value(value, path)
}

/// Load a rule file from disk
pub fn load_rule_file(path: &Path) -> LoaderResult<DocumentSchema> {
    info!(path = %path.display(), "Loading rule file");
    let value = parse_file(path)?;
    rule_from_value(value, path)
}

fn rule_from_value(value: Value, path: &Path) -> LoaderResult<DocumentSchema> {
    let file: RuleFile = serde_json::from_value(value).map_err(|source| LoaderError::InvalidRuleFile {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(rule = ?file, "Parsed rule file");

    file.into_schema()
        .map_err(|error| LoaderError::config(path.to_path_buf(), error))
}
