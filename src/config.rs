//! Configuration system for the HypnoScript linter
//!
//! Reads configuration from:
//! - `.hypnolintrc.yaml` / `.hypnolintrc.json` / `hypnolint.yaml` (project-level)
//! - the same names in the home directory (user-level)

use crate::diagnostic::{DiagnosticCode, Severity};
use crate::format::FormatConfig;
use crate::language::LanguageFacts;
use crate::messages::MessageError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File names searched by [`Config::load_default`], in order
pub const CONFIG_NAMES: [&str; 5] = [
    ".hypnolintrc.yaml",
    ".hypnolintrc.yml",
    ".hypnolintrc.json",
    "hypnolint.yaml",
    "hypnolint.json",
];

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message catalog error: {0}")]
    Messages(#[from] MessageError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Enable parallel processing
    pub parallel: bool,

    /// Number of parallel jobs (0 = auto-detect)
    pub jobs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            jobs: 0,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    /// `textDocument/publishDiagnostics` parameters, one per file
    Lsp,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "lsp" => Ok(OutputFormat::Lsp),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,

    /// Color mode
    pub color: ColorMode,

    /// Verbose output
    pub verbose: bool,

    /// Show statistics
    pub statistics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: ColorMode::Auto,
            verbose: false,
            statistics: false,
        }
    }
}

/// File handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Patterns expanded when no files are given on the command line
    pub include: Vec<String>,

    /// Exclude patterns
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            include: vec!["**/*.hyp".to_string()],
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/target/**".to_string(),
            ],
        }
    }
}

/// Rule configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RulesConfig {
    /// Disabled codes (`HS_UNUSED_VARIABLE`, ...)
    pub disabled: Vec<String>,

    /// Severity overrides (code -> severity)
    pub severity: HashMap<String, Severity>,

    /// Diagnostics below this severity are dropped
    pub min_severity: Severity,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine settings
    pub engine: EngineConfig,

    /// Output settings
    pub output: OutputConfig,

    /// File handling settings
    pub files: FilesConfig,

    /// Rule configuration
    pub rules: RulesConfig,

    /// Formatter settings
    pub format: FormatConfig,

    /// Keyword tables
    pub language: LanguageFacts,

    /// JSON message catalog
    pub messages: Option<PathBuf>,
}

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let mut config: Self = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown config file format: {}",
                    ext
                )))
            }
        };

        // Catalog paths are relative to the config file
        if let Some(messages) = config.messages.take() {
            let base_dir = path.parent().unwrap_or(Path::new("."));
            config.messages = Some(if messages.is_absolute() {
                messages
            } else {
                base_dir.join(messages)
            });
        }

        config.validate()?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        // Check current directory
        for name in &CONFIG_NAMES {
            let path = PathBuf::from(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        // Check home directory
        if let Some(home) = dirs::home_dir() {
            for name in &CONFIG_NAMES {
                let path = home.join(name);
                if path.exists() {
                    return Self::load(&path);
                }
            }
        }

        log::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Reject settings the engine cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.language.validate().map_err(ConfigError::Invalid)?;

        for code in self.rules.disabled.iter().chain(self.rules.severity.keys()) {
            code.parse::<DiagnosticCode>().map_err(ConfigError::Invalid)?;
        }
        for pattern in self.files.include.iter().chain(&self.files.exclude) {
            Glob::new(pattern)
                .map_err(|e| ConfigError::Invalid(format!("Bad pattern {:?}: {}", pattern, e)))?;
        }
        if self.format.indent_size == 0 {
            return Err(ConfigError::Invalid("indentSize must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Merge CLI arguments into configuration
    pub fn merge_cli(
        &mut self,
        format: Option<OutputFormat>,
        verbose: Option<bool>,
        jobs: Option<usize>,
        disabled_codes: Option<Vec<String>>,
        min_severity: Option<Severity>,
    ) {
        if let Some(f) = format {
            self.output.format = f;
        }
        if let Some(v) = verbose {
            self.output.verbose = v;
        }
        if let Some(j) = jobs {
            self.engine.jobs = j;
        }
        if let Some(disabled) = disabled_codes {
            self.rules.disabled.extend(disabled);
        }
        if let Some(s) = min_severity {
            self.rules.min_severity = s;
        }
    }

    /// Check if a diagnostic code is enabled
    pub fn is_code_enabled(&self, code: DiagnosticCode) -> bool {
        !self
            .rules
            .disabled
            .iter()
            .any(|d| d.trim().eq_ignore_ascii_case(code.as_str()))
    }

    /// Get severity override for a code
    pub fn severity_override(&self, code: DiagnosticCode) -> Option<Severity> {
        self.rules
            .severity
            .iter()
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(code.as_str()))
            .map(|(_, s)| *s)
    }

    /// Compiled exclude patterns
    pub fn exclude_set(&self) -> GlobSet {
        build_glob_set(&self.files.exclude)
    }

    /// Check if a file should be skipped
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude_set().is_match(path)
    }
}

fn build_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|e| {
        log::warn!("ignoring exclude patterns: {}", e);
        GlobSet::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::IndentStyle;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert!(config.engine.parallel);
        assert_eq!(config.engine.jobs, 0);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.files.include, vec!["**/*.hyp".to_string()]);
        assert_eq!(config.rules.min_severity, Severity::Hint);
        assert_eq!(config.language.open_wrapper, "Focus");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("lsp".parse::<OutputFormat>().unwrap(), OutputFormat::Lsp);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_config_merge_cli() {
        let mut config = Config::new();
        config.merge_cli(
            Some(OutputFormat::Json),
            Some(true),
            Some(4),
            Some(vec!["HS_UNUSED_VARIABLE".to_string()]),
            Some(Severity::Warning),
        );

        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.verbose);
        assert_eq!(config.engine.jobs, 4);
        assert!(!config.is_code_enabled(DiagnosticCode::UnusedVariable));
        assert!(config.is_code_enabled(DiagnosticCode::UnbalancedBrace));
        assert_eq!(config.rules.min_severity, Severity::Warning);
    }

    #[test]
    fn test_severity_override() {
        let mut config = Config::new();
        config
            .rules
            .severity
            .insert("hs_missing_semicolon".to_string(), Severity::Error);

        assert_eq!(
            config.severity_override(DiagnosticCode::MissingTerminator),
            Some(Severity::Error)
        );
        assert_eq!(config.severity_override(DiagnosticCode::UnusedVariable), None);
    }

    #[test]
    fn test_yaml_deserialize() {
        let yaml = r#"
engine:
  parallel: false
  jobs: 4
output:
  format: json
  verbose: true
rules:
  disabled:
    - HS_UNUSED_VARIABLE
  minSeverity: warning
format:
  indentStyle: tab
  indentSize: 1
language:
  terminator: "."
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.engine.parallel);
        assert_eq!(config.engine.jobs, 4);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.verbose);
        assert_eq!(config.rules.disabled.len(), 1);
        assert_eq!(config.rules.min_severity, Severity::Warning);
        assert_eq!(config.format.indent_style, IndentStyle::Tab);
        assert_eq!(config.language.terminator, '.');
        assert_eq!(config.language.close_wrapper, "Relax");
    }

    #[test]
    fn test_load_resolves_catalog_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".hypnolintrc.json");
        std::fs::write(&path, r#"{"messages": "locales/de.json"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.messages, Some(temp.path().join("locales/de.json")));
    }

    #[test]
    fn test_load_rejects_unknown_code() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hypnolint.yaml");
        std::fs::write(&path, "rules:\n  disabled: [HS_NOPE]\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hypnolint.toml");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_exclude_patterns() {
        let config = Config::new();
        assert!(config.is_excluded(Path::new("app/node_modules/lib/x.hyp")));
        assert!(!config.is_excluded(Path::new("app/src/main.hyp")));
    }
}
