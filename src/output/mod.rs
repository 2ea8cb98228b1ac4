//! Output formatters for lint results

mod json;
mod lsp;
mod text;

pub use json::JsonFormatter;
pub use lsp::LspFormatter;
pub use text::TextFormatter;

use crate::config::OutputFormat;
use crate::engine::{FileReport, LintResult};

/// Output formatter trait
pub trait OutputFormatter: Send + Sync {
    /// Format the entire lint result
    fn format(&self, result: &LintResult) -> String;

    /// Format the findings of one file
    fn format_file(&self, report: &FileReport) -> String;
}

/// Formatter for a configured output format
pub fn formatter_for(format: OutputFormat, colored: bool, show_stats: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => {
            let mut formatter = TextFormatter::new();
            formatter.show_stats = show_stats;
            if !colored {
                formatter = formatter.without_color();
            }
            Box::new(formatter)
        }
        OutputFormat::Json => Box::new(JsonFormatter::new().pretty()),
        OutputFormat::Lsp => Box::new(LspFormatter::new().pretty()),
    }
}
