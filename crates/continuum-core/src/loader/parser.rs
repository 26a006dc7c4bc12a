//! JSON and YAML parsing for documents and rule files
//!
//! Copyright (c) 2025 Continuum Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::Value;
use std::path::Path;

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::unsupported_format(path.to_path_buf())),
        }
    }
}

/// Read and parse a file, detecting format from extension
pub fn parse_file(path: &Path) -> LoaderResult<Value> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))?;

    parse_content(&content, format, path)
}

/// Parse content with explicit format; `path` only labels errors
pub fn parse_content(content: &str, format: Format, path: &Path) -> LoaderResult<Value> {
    match format {
        Format::Yaml => {
            let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
                .map_err(|e| LoaderError::yaml_parse_error(path.to_path_buf(), e))?;

            // Convert to JSON Value for consistent handling
            serde_json::to_value(yaml_value)
                .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
        }
        Format::Json => serde_json::from_str(content)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e)),
    }
}
