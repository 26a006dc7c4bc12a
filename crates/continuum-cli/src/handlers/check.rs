//! Check command handler

use super::load_schema;
use crate::cli::CheckArgs;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use continuum_core::loader::parse_file;
use continuum_core::{validate_batch, Failure, PathSegment, ValidationConfig, ValidationContext};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Outcome of checking one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Valid,
    Invalid,
    /// Not checked because the run stopped early
    Skipped,
}

/// Result for one document file
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub file: PathBuf,
    pub status: DocumentStatus,
    /// Failure with its path relative to the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

/// Result of a check run
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub rule: PathBuf,
    pub valid: usize,
    pub invalid: usize,
    pub skipped: usize,
    pub documents: Vec<DocumentReport>,
}

/// Handle the check command
#[instrument(skip(output), fields(rule = %args.rule.display(), documents = args.documents.len()))]
pub fn handle_check(args: CheckArgs, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("check_command", &format!("rule: {}", args.rule.display()));

    let schema = load_schema(&args.rule)?;
    let context = build_context(&args.context)?;
    let config = ValidationConfig {
        fail_fast: args.fail_fast,
        max_errors: args.max_errors,
    };

    let documents = args
        .documents
        .iter()
        .map(|path| read_document(path))
        .collect::<Result<Vec<Value>>>()?;
    info!(count = documents.len(), "Documents loaded");

    let failures = {
        let _validation_timer = Timer::new("validation");
        match validate_batch(&schema, &documents, &context, &config) {
            Ok(()) => Vec::new(),
            Err(failures) => failures.errors,
        }
    };

    let report = build_report(&args, failures, &config);
    debug!(
        valid = report.valid,
        invalid = report.invalid,
        skipped = report.skipped,
        "Check finished"
    );

    if output.is_human() {
        write_human(output, &report)?;
    } else {
        output.data(&report)?;
    }

    if report.invalid > 0 {
        warn!(count = report.invalid, "Documents failed validation");
        return Err(Error::ValidationFailed {
            count: report.invalid,
        });
    }

    Ok(())
}

fn build_context(pairs: &[(String, Value)]) -> Result<ValidationContext<'static>> {
    let mut seen = HashSet::new();
    let mut context = ValidationContext::new();

    for (key, value) in pairs {
        if !seen.insert(key.as_str()) {
            return Err(Error::invalid_args(format!(
                "context key '{}' given more than once",
                key
            )));
        }
        context = context.with_context(key.clone(), value.clone());
    }

    Ok(context)
}

fn read_document(path: &Path) -> Result<Value> {
    debug!(document = %path.display(), "Reading document");
    parse_file(path).map_err(|error| Error::from((path.to_path_buf(), error)))
}

/// Attach each failure to its document by the leading `$[i]` segment
fn build_report(args: &CheckArgs, failures: Vec<Failure>, config: &ValidationConfig) -> CheckReport {
    let stopped_early = !failures.is_empty()
        && (config.fail_fast || (config.max_errors > 0 && failures.len() >= config.max_errors));
    let last_checked = if stopped_early {
        failures.last().and_then(document_index)
    } else {
        None
    };

    let mut documents: Vec<DocumentReport> = args
        .documents
        .iter()
        .enumerate()
        .map(|(i, file)| DocumentReport {
            file: file.clone(),
            status: match last_checked {
                Some(last) if i > last => DocumentStatus::Skipped,
                _ => DocumentStatus::Valid,
            },
            failure: None,
        })
        .collect();

    for mut failure in failures {
        let Some(index) = document_index(&failure) else {
            continue;
        };
        failure.path.remove(0);
        if let Some(document) = documents.get_mut(index) {
            document.status = DocumentStatus::Invalid;
            document.failure = Some(failure);
        }
    }

    let count = |status| documents.iter().filter(|d| d.status == status).count();
    let (valid, invalid, skipped) = (
        count(DocumentStatus::Valid),
        count(DocumentStatus::Invalid),
        count(DocumentStatus::Skipped),
    );
    CheckReport {
        rule: args.rule.clone(),
        valid,
        invalid,
        skipped,
        documents,
    }
}

fn document_index(failure: &Failure) -> Option<usize> {
    match failure.path.first() {
        Some(PathSegment::Index(index)) => Some(*index),
        _ => None,
    }
}

fn write_human(output: &mut OutputWriter, report: &CheckReport) -> Result<()> {
    for document in &report.documents {
        match (&document.status, &document.failure) {
            (DocumentStatus::Valid, _) => {
                output.success(&format!("✓ {}", document.file.display()))?;
            }
            (DocumentStatus::Invalid, Some(failure)) => {
                output.error(&format!("✗ {}", document.file.display()))?;
                output.failure(failure)?;
            }
            (DocumentStatus::Invalid, None) => {
                output.error(&format!("✗ {}", document.file.display()))?;
            }
            (DocumentStatus::Skipped, _) => {
                output.warning(&format!("- {} (skipped)", document.file.display()))?;
            }
        }
    }

    output.section("Summary")?;
    output.info(&format!(
        "{} valid, {} invalid, {} skipped",
        report.valid, report.invalid, report.skipped
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::output::tests::writer;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new(rule: &str) -> Self {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("rule.yaml"), rule).unwrap();
            Self { dir }
        }

        fn document(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            fs::write(&path, content).unwrap();
            path
        }

        fn args(&self, documents: Vec<PathBuf>) -> CheckArgs {
            CheckArgs {
                rule: self.dir.path().join("rule.yaml"),
                documents,
                fail_fast: false,
                max_errors: 0,
                context: Vec::new(),
            }
        }
    }

    const NESTED_RULE: &str = "target: arr\ncomparator: obj.idx\nstart_index: 1\n";

    #[test]
    fn test_all_documents_valid() {
        let fixture = Fixture::new(NESTED_RULE);
        let a = fixture.document("a.json", r#"{"arr": [{"obj": {"idx": 1}}, {"obj": {"idx": 2}}]}"#);
        let b = fixture.document("b.yaml", "arr:\n  - obj: {idx: 1}\n");

        let (mut output, buffer) = writer(OutputFormat::Human);
        handle_check(fixture.args(vec![a, b]), &mut output).unwrap();

        let printed = buffer.contents();
        assert!(printed.contains("✓"));
        assert!(printed.contains("2 valid, 0 invalid, 0 skipped"));
    }

    #[test]
    fn test_failures_are_reported_per_document() {
        let fixture = Fixture::new(NESTED_RULE);
        let good = fixture.document("good.json", r#"{"arr": [{"obj": {"idx": 1}}]}"#);
        let bad = fixture.document(
            "bad.json",
            r#"{"arr": [{"obj": {"idx": 1}}, {"obj": {"idx": 2}}, {"obj": {"idx": 4}}]}"#,
        );

        let (mut output, buffer) = writer(OutputFormat::Json);
        let error = handle_check(fixture.args(vec![good, bad]), &mut output).unwrap_err();
        assert!(matches!(error, Error::ValidationFailed { count: 1 }));
        assert_eq!(error.exit_code(), 2);

        let report: Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(report["valid"], 1);
        assert_eq!(report["invalid"], 1);
        assert_eq!(report["documents"][0]["status"], "valid");
        assert_eq!(report["documents"][1]["status"], "invalid");
        assert_eq!(report["documents"][1]["failure"]["path"], json!(["arr"]));
        assert_eq!(
            report["documents"][1]["failure"]["message"],
            "\"obj.idx\" should be 3"
        );
    }

    #[test]
    fn test_root_array_failures_are_labelled_value() {
        let fixture = Fixture::new("comparator: idx\nstart_index:\n  ref: $offset\n");
        let doc = fixture.document("root.json", r#"[{"idx": 0}]"#);
        let scalar = fixture.document("scalar.json", "5");

        let (mut output, buffer) = writer(OutputFormat::Json);
        assert!(handle_check(fixture.args(vec![doc, scalar]), &mut output).is_err());

        let report: Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(report["documents"][0]["failure"]["path"], json!([]));
        assert_eq!(
            report["documents"][0]["failure"]["message"],
            "\"value\" references \"$offset\" which is not a positive integer"
        );
        assert_eq!(report["documents"][1]["failure"]["message"], "\"value\" must be an array");
    }

    #[test]
    fn test_human_output_shows_nested_message() {
        let fixture = Fixture::new(NESTED_RULE);
        let bad = fixture.document("bad.json", r#"{"arr": [{"obj": {"idx": 2}}]}"#);

        let (mut output, buffer) = writer(OutputFormat::Human);
        assert!(handle_check(fixture.args(vec![bad]), &mut output).is_err());
        assert!(buffer
            .contents()
            .contains("child \"arr\" fails because [\"obj.idx\" must be start from 1]"));
    }

    #[test]
    fn test_fail_fast_skips_remaining_documents() {
        let fixture = Fixture::new("comparator: idx\n");
        let bad = fixture.document("bad.json", r#"[{"idx": 1}]"#);
        let also_bad = fixture.document("also_bad.json", r#"[{"idx": 5}]"#);

        let mut args = fixture.args(vec![bad, also_bad]);
        args.fail_fast = true;

        let (mut output, buffer) = writer(OutputFormat::Json);
        let error = handle_check(args, &mut output).unwrap_err();
        assert!(matches!(error, Error::ValidationFailed { count: 1 }));

        let report: Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(report["documents"][1]["status"], "skipped");
        assert_eq!(report["skipped"], 1);
    }

    #[test]
    fn test_context_reference() {
        let fixture = Fixture::new("comparator: idx\nstart_index:\n  ref: $offset\n");
        let doc = fixture.document("doc.json", r#"[{"idx": 3}, {"idx": 4}]"#);

        let mut args = fixture.args(vec![doc.clone()]);
        args.context = vec![("offset".to_string(), json!(3))];
        let (mut output, _) = writer(OutputFormat::Human);
        handle_check(args, &mut output).unwrap();

        let (mut output, buffer) = writer(OutputFormat::Json);
        assert!(handle_check(fixture.args(vec![doc]), &mut output).is_err());
        let report: Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(report["documents"][0]["failure"]["type"], "any.ref");
    }

    #[test]
    fn test_duplicate_context_keys() {
        let fixture = Fixture::new("comparator: idx\n");
        let doc = fixture.document("doc.json", "[]");
        let mut args = fixture.args(vec![doc]);
        args.context = vec![
            ("offset".to_string(), json!(1)),
            ("offset".to_string(), json!(2)),
        ];

        let (mut output, _) = writer(OutputFormat::Human);
        let error = handle_check(args, &mut output).unwrap_err();
        assert!(matches!(error, Error::InvalidArgs(_)));
    }

    #[test]
    fn test_unreadable_inputs() {
        let fixture = Fixture::new("comparator: idx\n");
        let malformed = fixture.document("doc.json", "{not json");
        let (mut output, _) = writer(OutputFormat::Human);
        let error = handle_check(fixture.args(vec![malformed]), &mut output).unwrap_err();
        assert!(matches!(error, Error::InvalidFormat { .. }));

        let missing = fixture.dir.path().join("missing.json");
        let (mut output, _) = writer(OutputFormat::Human);
        let error = handle_check(fixture.args(vec![missing]), &mut output).unwrap_err();
        assert!(matches!(error, Error::FileNotFound { .. }));

        let bad_rule = Fixture::new("comparator: 5\n");
        let doc = bad_rule.document("doc.json", "[]");
        let (mut output, _) = writer(OutputFormat::Human);
        let error = handle_check(bad_rule.args(vec![doc]), &mut output).unwrap_err();
        assert!(matches!(error, Error::Load(_)));
        assert_eq!(error.exit_code(), 5);
    }
}
