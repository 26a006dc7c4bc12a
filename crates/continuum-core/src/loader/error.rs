//! Error types for rule-file loading
//!
//! Copyright (c) 2025 Continuum Team
//! Licensed under the Apache-2.0 license

use crate::validation::error::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Errors raised while reading documents and rule files
#[derive(Error, Debug)]
pub enum LoaderError {
    /// File I/O errors
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse YAML file '{path}': {source}")]
    YamlParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing errors
    #[error("Failed to parse JSON file '{path}': {source}")]
    JsonParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Unsupported file format
    #[error("Unsupported file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },

    /// Parsed file does not have the rule-file shape
    #[error("Invalid rule file '{path}': {source}")]
    InvalidRuleFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Rule file describes a rule that cannot be built
    #[error("Invalid rule in '{path}': {source}")]
    Config {
        path: PathBuf,
        source: ConfigError,
    },
}

impl LoaderError {
    /// Create an I/O error with path context
    pub fn io_error(path: PathBuf, error: std::io::Error) -> Self {
        Self::IoError {
            path,
            source: error,
        }
    }

    /// Create a YAML parsing error with path context
    pub fn yaml_parse_error(path: PathBuf, error: serde_yaml::Error) -> Self {
        Self::YamlParseError {
            path,
            source: error,
        }
    }

    /// Create a JSON parsing error with path context
    pub fn json_parse_error(path: PathBuf, error: serde_json::Error) -> Self {
        Self::JsonParseError {
            path,
            source: error,
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(path: PathBuf) -> Self {
        Self::UnsupportedFormat { path }
    }

    /// Create a configuration error with path context
    pub fn config(path: PathBuf, error: ConfigError) -> Self {
        Self::Config {
            path,
            source: error,
        }
    }

    /// The configuration error behind this failure, if any
    pub fn config_error(&self) -> Option<&ConfigError> {
        match self {
            Self::Config { source, .. } => Some(source),
            _ => None,
        }
    }
}
