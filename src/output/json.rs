//! JSON output formatter

use super::OutputFormatter;
use crate::engine::{FileReport, LintResult};
use serde::Serialize;

/// JSON formatter for machine-readable output
#[derive(Default)]
pub struct JsonFormatter {
    /// Pretty print with indentation
    pub pretty: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn render<T: Serialize>(&self, value: &T) -> String {
        if self.pretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    files: Vec<JsonFile<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    diagnostics: Vec<JsonDiagnostic<'a>>,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    code: Option<&'static str>,
    severity: String,
    message: &'a str,
    /// 1-based
    line: usize,
    /// 1-based
    column: usize,
    end_line: usize,
    end_column: usize,
}

#[derive(Serialize)]
struct JsonSummary {
    files_processed: usize,
    files_with_errors: usize,
    files_with_warnings: usize,
    error_count: usize,
    warning_count: usize,
    info_count: usize,
    hint_count: usize,
    duration_ms: u128,
}

fn json_file(report: &FileReport) -> JsonFile<'_> {
    JsonFile {
        file: report.path.display().to_string(),
        error: report.error.as_deref(),
        diagnostics: report
            .diagnostics
            .iter()
            .map(|d| JsonDiagnostic {
                code: d.code.map(|c| c.as_str()),
                severity: d.severity.to_string(),
                message: &d.message,
                line: d.range.start.line + 1,
                column: d.range.start.column + 1,
                end_line: d.range.end.line + 1,
                end_column: d.range.end.column + 1,
            })
            .collect(),
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &LintResult) -> String {
        let output = JsonOutput {
            files: result.files.iter().map(json_file).collect(),
            summary: JsonSummary {
                files_processed: result.files_processed,
                files_with_errors: result.files_with_errors,
                files_with_warnings: result.files_with_warnings,
                error_count: result.error_count,
                warning_count: result.warning_count,
                info_count: result.info_count,
                hint_count: result.hint_count,
                duration_ms: result.duration.as_millis(),
            },
        };
        self.render(&output)
    }

    fn format_file(&self, report: &FileReport) -> String {
        self.render(&json_file(report))
    }
}
