//! LSP `publishDiagnostics` output

use super::OutputFormatter;
use crate::engine::{FileReport, LintResult};
use crate::lsp::{file_uri, to_publish_diagnostics, PublishDiagnosticsParams};

/// Emits one `PublishDiagnosticsParams` per file
#[derive(Default)]
pub struct LspFormatter {
    /// Pretty print with indentation
    pub pretty: bool,
}

impl LspFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn params(report: &FileReport) -> PublishDiagnosticsParams {
        let uri = file_uri(&report.path);
        to_publish_diagnostics(&uri, &report.document(), &report.diagnostics, None)
    }

    fn render<T: serde::Serialize>(&self, value: &T) -> String {
        if self.pretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

impl OutputFormatter for LspFormatter {
    fn format(&self, result: &LintResult) -> String {
        let params: Vec<_> = result
            .files
            .iter()
            .filter(|f| f.error.is_none())
            .map(Self::params)
            .collect();
        self.render(&params)
    }

    fn format_file(&self, report: &FileReport) -> String {
        self.render(&Self::params(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::Engine;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_lsp_output() {
        let engine = Engine::new(Config::default()).unwrap();
        let report = engine.lint_text(Path::new("/work/main.hyp"), "Focus {\n    observe 1\n} Relax".into());
        let unreadable = FileReport {
            path: PathBuf::from("/work/gone.hyp"),
            error: Some("missing".to_string()),
            ..FileReport::default()
        };
        let result = LintResult {
            files: vec![report, unreadable],
            ..Default::default()
        };

        let value: serde_json::Value = serde_json::from_str(&LspFormatter::new().format(&result)).unwrap();
        let params = value.as_array().unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0]["uri"], "file:///work/main.hyp");
        assert_eq!(params[0]["diagnostics"][0]["severity"], 2);
        assert_eq!(params[0]["diagnostics"][0]["range"]["start"]["character"], 13);
    }
}
