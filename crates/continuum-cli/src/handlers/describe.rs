//! Describe command handler

use super::load_schema;
use crate::cli::DescribeArgs;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use continuum_core::Validator;
use tracing::instrument;

/// Handle the describe command
#[instrument(skip(output), fields(rule = %args.rule.display()))]
pub fn handle_describe(args: DescribeArgs, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::new("describe_command");

    let schema = load_schema(&args.rule)?;
    output.section(&format!("Rule file {}", args.rule.display()))?;
    output.description(&schema.describe())
}
