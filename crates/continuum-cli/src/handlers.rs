//! Command handlers for CLI subcommands

mod check;
mod completions;
mod describe;

pub use check::handle_check;
pub use completions::handle_completions;
pub use describe::handle_describe;

use crate::error::{Error, Result};
use continuum_core::{load_rule_file, DocumentSchema};
use std::path::Path;
use tracing::debug;

/// Load a rule file, reporting a missing file before trying to parse it
fn load_schema(path: &Path) -> Result<DocumentSchema> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let schema = load_rule_file(path)?;
    debug!(rule = %path.display(), target = ?schema.target().map(|t| t.as_str()), "Rule loaded");
    Ok(schema)
}
