//! Human-readable text output formatter

use super::OutputFormatter;
use crate::diagnostic::{Diagnostic, Severity};
use crate::document::SourceDocument;
use crate::engine::{FileReport, LintResult};
use colored::*;

/// Text formatter with optional color support
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show the offending source line
    pub show_source: bool,

    /// Show statistics
    pub show_stats: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_source: true,
            show_stats: true,
        }
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn paint(&self, text: String, style: fn(ColoredString) -> ColoredString) -> String {
        if self.colored {
            style(text.as_str().normal()).to_string()
        } else {
            text
        }
    }

    fn severity_str(&self, severity: Severity) -> String {
        let s = severity.to_string();
        match severity {
            Severity::Error => self.paint(s, |c| c.red().bold()),
            Severity::Warning => self.paint(s, |c| c.yellow().bold()),
            Severity::Info => self.paint(s, |c| c.blue()),
            Severity::Hint => self.paint(s, |c| c.dimmed()),
        }
    }

    fn format_diagnostic(&self, report: &FileReport, document: &SourceDocument, diag: &Diagnostic) -> String {
        let mut output = String::new();
        let code = diag.code.map(|c| c.as_str()).unwrap_or("-");

        output.push_str(&format!(
            "{}:{}:{}: {}[{}]: {}\n",
            report.path.display(),
            diag.range.start.line + 1,
            diag.range.start.column + 1,
            self.severity_str(diag.severity),
            self.paint(code.to_string(), |c| c.cyan()),
            diag.message
        ));

        if !self.show_source {
            return output;
        }
        let Some(source) = document.line(diag.range.start.line) else {
            return output;
        };
        let source = source.trim_end_matches('\r');
        let bar = self.paint("|".to_string(), |c| c.blue());
        let width = if diag.range.end.line == diag.range.start.line {
            diag.range.end.column.saturating_sub(diag.range.start.column)
        } else {
            1
        };

        output.push_str(&format!(
            "{} {} {}\n",
            self.paint(format!("{:>4}", diag.range.start.line + 1), |c| c.blue()),
            bar,
            source
        ));
        output.push_str(&format!(
            "     {} {}{}\n",
            bar,
            " ".repeat(diag.range.start.column),
            self.paint("^".repeat(width.max(1)), |c| c.red())
        ));
        output
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();

        for report in &result.files {
            output.push_str(&self.format_file(report));
        }

        if self.show_stats {
            output.push_str(&format!(
                "{} processed",
                plural(result.files_processed, "file")
            ));

            let mut counts = Vec::new();
            if result.error_count > 0 {
                counts.push(self.paint(plural(result.error_count, "error"), |c| c.red()));
            }
            if result.warning_count > 0 {
                counts.push(self.paint(plural(result.warning_count, "warning"), |c| c.yellow()));
            }
            if result.info_count > 0 {
                counts.push(self.paint(plural(result.info_count, "info"), |c| c.blue()));
            }
            if result.hint_count > 0 {
                counts.push(self.paint(plural(result.hint_count, "hint"), |c| c.dimmed()));
            }

            if !counts.is_empty() {
                output.push_str(&format!(": {}", counts.join(", ")));
            }
            output.push('\n');

            output.push_str(&format!(
                "Finished in {:.2}s\n",
                result.duration.as_secs_f64()
            ));
        }

        output
    }

    fn format_file(&self, report: &FileReport) -> String {
        if let Some(error) = &report.error {
            return format!(
                "{}: {}: {}\n",
                report.path.display(),
                self.severity_str(Severity::Error),
                error
            );
        }
        if report.diagnostics.is_empty() {
            return String::new();
        }

        let document = report.document();
        let mut output = format!(
            "{}\n",
            self.paint(report.path.display().to_string(), |c| c.underline())
        );
        for diag in &report.diagnostics {
            output.push_str(&self.format_diagnostic(report, &document, diag));
        }
        output.push('\n');
        output
    }
}
