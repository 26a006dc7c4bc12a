//! Error types and handling for the CLI
//!
//! Every error maps to a distinct process exit code. A document that fails
//! validation is reported as [`Error::ValidationFailed`] after the failures
//! themselves have been printed.

use continuum_core::LoaderError;
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Rule file could not be loaded or describes an invalid rule
    #[error("{0}")]
    Load(#[from] LoaderError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {} format", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// One or more documents failed validation
    #[error("{count} document(s) failed validation")]
    ValidationFailed { count: usize },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::ValidationFailed { .. } => 2,
            Self::FileNotFound { .. } => 3,
            Self::InvalidFormat { .. } => 4,
            Self::Load(_) => 5,
            Self::InvalidArgs(_) => 6,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Classify a loader error raised while reading a document
impl From<(PathBuf, LoaderError)> for Error {
    fn from((path, error): (PathBuf, LoaderError)) -> Self {
        match error {
            LoaderError::YamlParseError { .. } => Self::InvalidFormat {
                path,
                expected: "YAML".to_string(),
            },
            LoaderError::JsonParseError { .. } => Self::InvalidFormat {
                path,
                expected: "JSON".to_string(),
            },
            LoaderError::IoError { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                Self::FileNotFound { path }
            }
            other => Self::Load(other),
        }
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            Error::Io(io::Error::new(io::ErrorKind::Other, "x")),
            Error::ValidationFailed { count: 1 },
            Error::FileNotFound {
                path: PathBuf::from("a"),
            },
            Error::InvalidFormat {
                path: PathBuf::from("a"),
                expected: "JSON".to_string(),
            },
            Error::Load(LoaderError::unsupported_format(PathBuf::from("a.txt"))),
            Error::invalid_args("x"),
            Error::other("x"),
        ];

        let mut codes: Vec<i32> = errors.iter().map(Error::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert_eq!(Error::ValidationFailed { count: 3 }.exit_code(), 2);
    }

    #[test]
    fn test_document_errors_are_classified() {
        let path = PathBuf::from("doc.json");
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::from((path.clone(), LoaderError::json_parse_error(path.clone(), parse)));
        assert!(matches!(error, Error::InvalidFormat { ref expected, .. } if expected == "JSON"));

        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        let error = Error::from((path.clone(), LoaderError::io_error(path.clone(), missing)));
        assert!(matches!(error, Error::FileNotFound { .. }));

        let error = Error::from((path.clone(), LoaderError::unsupported_format(path)));
        assert!(matches!(error, Error::Load(_)));
    }

    #[test]
    fn test_format_error_without_color() {
        let error = Error::ValidationFailed { count: 2 };
        assert_eq!(
            format_error(&error, false),
            "Error: 2 document(s) failed validation"
        );
        assert!(Error::invalid_args("bad").should_show_help());
        assert!(!error.should_show_help());
    }
}
