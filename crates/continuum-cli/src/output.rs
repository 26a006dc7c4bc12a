//! Output formatting and writing utilities
//!
//! Results are written in the format picked with `--output`: a human-readable
//! rendering, or the serialized value as JSON or YAML.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use continuum_core::validation::render_path;
use continuum_core::{Description, Failure};
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a single validation failure
    fn format_failure(&self, failure: &Failure) -> Result<String>;

    /// Format a rule description
    fn format_description(&self, description: &Description) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_failure(&self, failure: &Failure) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_failure_human(failure)),
            _ => self.format(failure),
        }
    }

    fn format_description(&self, description: &Description) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_description_human(description)),
            _ => self.format(description),
        }
    }
}

fn format_failure_human(failure: &Failure) -> String {
    format!(
        "  at {} [{}]\n  {}",
        render_path(&failure.path),
        failure.kind,
        failure.nested_message()
    )
}

fn format_description_human(description: &Description) -> String {
    let mut lines = Vec::new();

    match &description.target {
        Some(target) => lines.push(format!("Target: {} ({})", target, description.kind)),
        None => lines.push(format!("Target: document root ({})", description.kind)),
    }

    for rule in &description.rules {
        lines.push(format!("Rule: {}", rule.name));
        lines.push(format!("  comparator: {}", rule.arg.comparator));
        lines.push(format!("  startIndex: {}", rule.arg.start_index));
        lines.push(format!("  {}", rule.description));
    }

    if !description.options.language.is_empty() {
        lines.push("Messages:".to_string());
        for (key, template) in &description.options.language {
            lines.push(format!("  {}: {}", key, template));
        }
    }

    lines.join("\n")
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Check whether the output is for people rather than programs
    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");

        match self.format {
            OutputFormat::Yaml => self.write(&formatted),
            _ => self.writeln(&formatted),
        }
    }

    /// Write a failure; machine formats are left to [`OutputWriter::data`]
    pub fn failure(&mut self, failure: &Failure) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }
        let formatted = self.format.format_failure(failure)?;
        self.error(&formatted)
    }

    /// Write a rule description
    pub fn description(&mut self, description: &Description) -> Result<()> {
        let formatted = self.format.format_description(description)?;
        match self.format {
            OutputFormat::Yaml => self.write(&formatted),
            _ => self.writeln(&formatted),
        }
    }
}
