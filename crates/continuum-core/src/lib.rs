//! Continuum - continuity rule for JSON arrays
//!
//! This crate provides a single validation rule, `continuous`, that checks
//! an array of records carries a gap-free, increasing integer sequence:
//!
//! - the value selected from the first element equals a start index
//!   (default `0`)
//! - every following value is exactly one more than the previous
//!
//! Values are selected with a **comparator**, either a dotted path into each
//! element (`obj.idx`) or a function. The start index is either a literal
//! or a **reference** to another field, resolved when validating.
//!
//! ## Quick Start
//!
//! ```rust
//! use continuum_core::{Comparator, ContinuousRule, DocumentSchema, Validator};
//! use serde_json::json;
//!
//! let rule = ContinuousRule::new(Comparator::path("idx").unwrap())
//!     .starting_at_ref("first")
//!     .unwrap();
//! let schema = DocumentSchema::at("lines", rule).unwrap();
//!
//! let order = json!({
//!     "first": 1,
//!     "lines": [{"idx": 1}, {"idx": 2}, {"idx": 3}]
//! });
//!
//! match schema.validate(&order) {
//!     Ok(_) => println!("Sequence is continuous"),
//!     Err(failure) => println!("{}", failure.nested_message()),
//! }
//! ```
//!
//! ## Failures
//!
//! A validation call reports at most one [`Failure`]:
//! - `array.continuous_from`: the first value is not the start index
//! - `array.continuous_broken`: the first gap, scanning left to right
//! - `any.ref`: the start index reference is missing or not a
//!   non-negative integer
//! - `array.base`: the value is not an array
//!
//! Configuration mistakes (a comparator that is not a string or function, a
//! non-integer start index) are [`ConfigError`]s raised when the rule is
//! built, never during validation.

pub mod continuous;
pub mod loader;
pub mod schema;
pub mod validation;

// Re-export commonly used types
pub use continuous::{
    Comparator, ContinuousRule, Description, FieldPath, MessageTemplates, Reference, RuleDescription,
    RuleSignature, StartIndex, FUNCTION_LABEL, RULE_NAME,
};
pub use loader::{load_rule_file, LoaderError, RuleFile};
pub use schema::DocumentSchema;
pub use validation::{
    validate_batch, ConfigError, Failure, FailureKind, Failures, PathSegment, ValidationConfig,
    ValidationContext, ValidationResult, Validator,
};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
