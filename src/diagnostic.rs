//! Diagnostic types for analysis results

use crate::messages::MessageKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label attached to every diagnostic produced by this crate
pub const SOURCE: &str = "HypnoScript";

/// Severity level for diagnostics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Editor hint, usually rendered faded
    #[default]
    Hint,
    /// Informational message
    Info,
    /// Warning - potential issue
    Warning,
    /// Error - the program is not logically correct
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Hint => write!(f, "hint"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hint" => Ok(Severity::Hint),
            "info" | "information" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Stable diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    #[serde(rename = "HS_NO_FOCUS")]
    NoOpenWrapper,
    #[serde(rename = "HS_NO_RELAX")]
    NoCloseWrapper,
    #[serde(rename = "HS_FOCUS_ORDER")]
    WrapperOrderViolation,
    #[serde(rename = "HS_MULTIPLE_FOCUS")]
    DuplicateOpenWrapper,
    #[serde(rename = "HS_MULTIPLE_RELAX")]
    DuplicateCloseWrapper,
    #[serde(rename = "HS_MISSING_SEMICOLON")]
    MissingTerminator,
    #[serde(rename = "HS_UNBALANCED_BRACES")]
    UnbalancedBrace,
    #[serde(rename = "HS_UNUSED_VARIABLE")]
    UnusedVariable,
}

impl DiagnosticCode {
    /// Every code, in the order the analyzer can emit them
    pub const ALL: [DiagnosticCode; 8] = [
        DiagnosticCode::NoOpenWrapper,
        DiagnosticCode::NoCloseWrapper,
        DiagnosticCode::DuplicateOpenWrapper,
        DiagnosticCode::DuplicateCloseWrapper,
        DiagnosticCode::WrapperOrderViolation,
        DiagnosticCode::UnbalancedBrace,
        DiagnosticCode::MissingTerminator,
        DiagnosticCode::UnusedVariable,
    ];

    /// The string tag reported to editors
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::NoOpenWrapper => "HS_NO_FOCUS",
            DiagnosticCode::NoCloseWrapper => "HS_NO_RELAX",
            DiagnosticCode::WrapperOrderViolation => "HS_FOCUS_ORDER",
            DiagnosticCode::DuplicateOpenWrapper => "HS_MULTIPLE_FOCUS",
            DiagnosticCode::DuplicateCloseWrapper => "HS_MULTIPLE_RELAX",
            DiagnosticCode::MissingTerminator => "HS_MISSING_SEMICOLON",
            DiagnosticCode::UnbalancedBrace => "HS_UNBALANCED_BRACES",
            DiagnosticCode::UnusedVariable => "HS_UNUSED_VARIABLE",
        }
    }

    /// Severity the analyzer assigns to this code
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::MissingTerminator => Severity::Warning,
            DiagnosticCode::UnusedVariable => Severity::Hint,
            _ => Severity::Error,
        }
    }

    /// Key used to look up the human-readable message
    pub fn message_key(&self) -> MessageKey {
        match self {
            DiagnosticCode::NoOpenWrapper => MessageKey::NoFocus,
            DiagnosticCode::NoCloseWrapper => MessageKey::NoRelax,
            DiagnosticCode::WrapperOrderViolation => MessageKey::FocusOrder,
            DiagnosticCode::DuplicateOpenWrapper => MessageKey::MultipleFocus,
            DiagnosticCode::DuplicateCloseWrapper => MessageKey::MultipleRelax,
            DiagnosticCode::MissingTerminator => MessageKey::MissingSemicolon,
            DiagnosticCode::UnbalancedBrace => MessageKey::UnbalancedBraces,
            DiagnosticCode::UnusedVariable => MessageKey::UnusedVariable,
        }
    }

    /// Category used for grouping in reports
    pub fn category(&self) -> &'static str {
        match self {
            DiagnosticCode::NoOpenWrapper
            | DiagnosticCode::NoCloseWrapper
            | DiagnosticCode::WrapperOrderViolation
            | DiagnosticCode::DuplicateOpenWrapper
            | DiagnosticCode::DuplicateCloseWrapper => "structure",
            DiagnosticCode::UnbalancedBrace => "syntax",
            DiagnosticCode::MissingTerminator => "style",
            DiagnosticCode::UnusedVariable => "hygiene",
        }
    }

    /// Long-form explanation for `hypnolint explain`
    pub fn explanation(&self) -> &'static str {
        match self {
            DiagnosticCode::NoOpenWrapper => {
                "Every program must open with the Focus keyword. The analyzer found no \
                 whole-word occurrence of it outside comments and strings."
            }
            DiagnosticCode::NoCloseWrapper => {
                "Every program must close with the Relax keyword. The analyzer found no \
                 whole-word occurrence of it outside comments and strings."
            }
            DiagnosticCode::WrapperOrderViolation => {
                "The first Focus appears after the first Relax. The program wrapper must \
                 open before it closes."
            }
            DiagnosticCode::DuplicateOpenWrapper => {
                "Focus may appear only once per program. Each occurrence after the first \
                 is reported."
            }
            DiagnosticCode::DuplicateCloseWrapper => {
                "Relax may appear only once per program. Each occurrence after the first \
                 is reported."
            }
            DiagnosticCode::MissingTerminator => {
                "A line starting with a statement keyword does not end with ';'. Lines \
                 ending in '{' or '}', and lines with open parentheses that continue on \
                 the next line, are never flagged."
            }
            DiagnosticCode::UnbalancedBrace => {
                "A closing '}', ')' or ']' does not match the innermost open bracket, has \
                 nothing to close, or an opening bracket is never closed."
            }
            DiagnosticCode::UnusedVariable => {
                "The identifier never appears outside its own declarations. This is a \
                 text-occurrence heuristic, not scope analysis, so shadowed names can \
                 hide unused bindings."
            }
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiagnosticCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        DiagnosticCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == wanted)
            .ok_or_else(|| format!("Unknown diagnostic code: {}", s))
    }
}

/// Zero-based line/column position. Columns count characters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
}

impl TextPosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Same line, `columns` characters further right
    pub fn translate(self, columns: usize) -> Self {
        Self {
            line: self.line,
            column: self.column + columns,
        }
    }
}

/// Ordered pair of positions, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub start: TextPosition,
    pub end: TextPosition,
}

impl TextRange {
    /// Build a range; the endpoints are swapped if given out of order
    pub fn new(start: TextPosition, end: TextPosition) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Empty range at a single position
    pub fn empty(at: TextPosition) -> Self {
        Self { start: at, end: at }
    }

    /// Range of `len` characters starting at `start`
    pub fn with_len(start: TextPosition, len: usize) -> Self {
        Self {
            start,
            end: start.translate(len),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A single analysis finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Where the problem is
    pub range: TextRange,
    /// Human-readable message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Stable code tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<DiagnosticCode>,
    /// Always [`SOURCE`]
    pub source: String,
}

impl Diagnostic {
    /// Create a diagnostic with the code's default severity
    pub fn new(code: DiagnosticCode, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
            severity: code.severity(),
            code: Some(code),
            source: SOURCE.to_string(),
        }
    }

    /// Override the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Check if this diagnostic carries the given code
    pub fn has_code(&self, code: DiagnosticCode) -> bool {
        self.code == Some(code)
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Check if this is a warning
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}
