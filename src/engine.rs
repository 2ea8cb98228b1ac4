//! Core lint engine

use crate::analyzer::Analyzer;
use crate::config::{Config, ConfigError};
use crate::diagnostic::{Diagnostic, Severity};
use crate::document::SourceDocument;
use crate::fixes::{apply_fixes, quick_fixes, CodeAction, FixError, FixResult};
use crate::messages::Catalog;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Analysis of one file
#[derive(Debug, Clone, Default)]
pub struct FileReport {
    pub path: PathBuf,
    /// File contents as analyzed
    pub text: String,
    /// Diagnostics after configuration filters
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the file could not be read
    pub error: Option<String>,
}

impl FileReport {
    pub fn document(&self) -> SourceDocument {
        SourceDocument::new(self.text.as_str())
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error.is_some() || self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_warning)
    }
}

/// Result of linting operation
#[derive(Debug, Default)]
pub struct LintResult {
    /// Per-file reports, in input order
    pub files: Vec<FileReport>,

    /// Files processed
    pub files_processed: usize,

    /// Files with errors (including unreadable files)
    pub files_with_errors: usize,

    /// Files with warnings
    pub files_with_warnings: usize,

    /// Total errors
    pub error_count: usize,

    /// Total warnings
    pub warning_count: usize,

    /// Total info messages
    pub info_count: usize,

    /// Total hints
    pub hint_count: usize,

    /// Processing duration
    pub duration: Duration,
}

impl LintResult {
    /// Single-file result with counts filled in
    pub fn from_report(report: FileReport) -> Self {
        let mut result = LintResult {
            files_processed: 1,
            error_count: report.count(Severity::Error) + usize::from(report.error.is_some()),
            warning_count: report.count(Severity::Warning),
            info_count: report.count(Severity::Info),
            hint_count: report.count(Severity::Hint),
            ..LintResult::default()
        };
        if report.has_errors() {
            result.files_with_errors = 1;
        }
        if report.has_warnings() {
            result.files_with_warnings = 1;
        }
        result.files.push(report);
        result
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    /// Check if result is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }

    /// Get exit code (0 = success, 1 = warnings, 2 = errors)
    pub fn exit_code(&self) -> i32 {
        if self.error_count > 0 {
            2
        } else if self.warning_count > 0 {
            1
        } else {
            0
        }
    }

    /// All diagnostics with their file
    pub fn diagnostics(&self) -> impl Iterator<Item = (&Path, &Diagnostic)> {
        self.files
            .iter()
            .flat_map(|f| f.diagnostics.iter().map(move |d| (f.path.as_path(), d)))
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: LintResult) {
        self.files.extend(other.files);
        self.files_processed += other.files_processed;
        self.files_with_errors += other.files_with_errors;
        self.files_with_warnings += other.files_with_warnings;
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.info_count += other.info_count;
        self.hint_count += other.hint_count;
    }
}

/// The main linter engine
pub struct Engine {
    /// Configuration
    config: Config,

    analyzer: Analyzer,
}

impl Engine {
    /// Create a new engine with configuration; loads the message catalog if one is set
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut analyzer = Analyzer::new(config.language.clone());
        if let Some(path) = &config.messages {
            analyzer = analyzer.with_messages(Catalog::load(path)?);
        }
        Ok(Self { config, analyzer })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Lint multiple files
    pub fn lint(&self, files: &[PathBuf]) -> LintResult {
        let start = Instant::now();

        let results: Vec<LintResult> = if self.config.engine.parallel && files.len() > 1 {
            let threads = if self.config.engine.jobs > 0 {
                self.config.engine.jobs
            } else {
                num_cpus::get()
            };
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(|| files.par_iter().map(|f| self.lint_file(f)).collect()),
                Err(e) => {
                    log::warn!("falling back to sequential linting: {}", e);
                    files.iter().map(|f| self.lint_file(f)).collect()
                }
            }
        } else {
            files.iter().map(|f| self.lint_file(f)).collect()
        };

        let mut combined = LintResult::default();
        for result in results {
            combined.merge(result);
        }

        combined.duration = start.elapsed();
        log::debug!(
            "linted {} file(s) in {:?}",
            combined.files_processed,
            combined.duration
        );
        combined
    }

    /// Lint a single file
    pub fn lint_file(&self, path: &Path) -> LintResult {
        let report = match std::fs::read_to_string(path) {
            Ok(text) => self.lint_text(path, text),
            Err(e) => {
                log::debug!("{}: {}", path.display(), e);
                FileReport {
                    path: path.to_path_buf(),
                    error: Some(format!("Failed to read file: {}", e)),
                    ..FileReport::default()
                }
            }
        };
        LintResult::from_report(report)
    }

    /// Lint text that is already in memory
    pub fn lint_text(&self, path: &Path, text: String) -> FileReport {
        let document = SourceDocument::new(text.as_str());
        let diagnostics = self.filter(self.analyzer.analyze_document(&document));
        log::debug!("{}: {} diagnostic(s)", path.display(), diagnostics.len());
        FileReport {
            path: path.to_path_buf(),
            text,
            diagnostics,
            error: None,
        }
    }

    /// Apply disabled codes, severity overrides and the severity floor
    pub fn filter(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        diagnostics
            .into_iter()
            .filter_map(|d| {
                let Some(code) = d.code else {
                    return Some(d);
                };
                if !self.config.is_code_enabled(code) {
                    return None;
                }
                match self.config.severity_override(code) {
                    Some(severity) => Some(d.with_severity(severity)),
                    None => Some(d),
                }
            })
            .filter(|d| d.severity >= self.config.rules.min_severity)
            .collect()
    }

    /// Quick fixes for a report's diagnostics
    pub fn code_actions(&self, report: &FileReport) -> Vec<CodeAction> {
        quick_fixes(
            &report.document(),
            &report.diagnostics,
            self.analyzer.facts(),
            self.analyzer.messages(),
        )
    }

    /// Apply the report's quick fixes
    pub fn fix(&self, report: &FileReport, include_unsafe: bool) -> Result<FixResult, FixError> {
        let actions = self.code_actions(report);
        apply_fixes(&report.document(), &actions, include_unsafe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCode;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_lint_files_in_order() {
        let temp = TempDir::new().unwrap();
        let clean = write(&temp, "clean.hyp", "Focus {\n    observe 1;\n} Relax\n");
        let broken = write(&temp, "broken.hyp", "observe 1\n");
        let missing = temp.path().join("missing.hyp");

        let engine = Engine::new(Config::default()).unwrap();
        let result = engine.lint(&[clean.clone(), broken.clone(), missing.clone()]);

        let paths: Vec<_> = result.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![clean, broken, missing]);
        assert_eq!(result.files_processed, 3);
        assert_eq!(result.files_with_errors, 2);
        assert_eq!(result.error_count, 3);
        assert_eq!(result.warning_count, 1);
        assert!(result.files[2].error.is_some());
        assert_eq!(result.exit_code(), 2);
    }

    #[test]
    fn test_exit_codes() {
        let engine = Engine::new(Config::default()).unwrap();
        let warn = engine.lint_text(Path::new("w.hyp"), "Focus {\n    observe 1\n} Relax".into());
        assert_eq!(LintResult::from_report(warn).exit_code(), 1);

        let hint = engine.lint_text(Path::new("h.hyp"), "Focus {\n    induce x = 1;\n} Relax".into());
        let result = LintResult::from_report(hint);
        assert_eq!(result.hint_count, 1);
        assert_eq!(result.exit_code(), 0);
    }

    #[test]
    fn test_filters() {
        let mut config = Config::default();
        config.rules.disabled.push("HS_NO_RELAX".to_string());
        config
            .rules
            .severity
            .insert("HS_MISSING_SEMICOLON".to_string(), Severity::Error);
        let engine = Engine::new(config).unwrap();

        let report = engine.lint_text(Path::new("a.hyp"), "Focus {\n    observe 1\n".into());
        let codes: Vec<_> = report.diagnostics.iter().filter_map(|d| d.code).collect();
        assert_eq!(codes, vec![DiagnosticCode::UnbalancedBrace, DiagnosticCode::MissingTerminator]);
        assert!(report.diagnostics.iter().all(|d| d.is_error()));
    }

    #[test]
    fn test_min_severity() {
        let mut config = Config::default();
        config.rules.min_severity = Severity::Warning;
        let engine = Engine::new(config).unwrap();
        let report = engine.lint_text(Path::new("a.hyp"), "Focus {\n    induce x = 1;\n} Relax".into());
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_fix_report() {
        let engine = Engine::new(Config::default()).unwrap();
        let report = engine.lint_text(Path::new("a.hyp"), "Focus {\n    observe 1\n} Relax".into());
        let fixed = engine.fix(&report, false).unwrap();
        assert_eq!(fixed.text, "Focus {\n    observe 1;\n} Relax");
        assert_eq!(fixed.applied, 1);
    }

    #[test]
    fn test_catalog_messages() {
        let temp = TempDir::new().unwrap();
        let catalog = write(&temp, "de.json", r#"{"error_no_relax": "'{close}' fehlt"}"#);
        let config = Config {
            messages: Some(catalog),
            ..Config::default()
        };
        let engine = Engine::new(config).unwrap();
        let report = engine.lint_text(Path::new("a.hyp"), "Focus {\n}\n".into());
        assert_eq!(report.diagnostics[0].message, "'Relax' fehlt");

        let config = Config {
            messages: Some(temp.path().join("nope.json")),
            ..Config::default()
        };
        assert!(matches!(Engine::new(config), Err(ConfigError::Messages(_))));
    }
}
