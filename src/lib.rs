//! hypnolint - structural analysis and formatting for HypnoScript
//!
//! HypnoScript programs are wrapped in `Focus { ... } Relax` and terminate
//! statements with `;`. This crate reports structural problems in that text
//! without parsing it, and reformats it.
//!
//! # Architecture
//!
//! ```text
//! text -> scrub -> checks (structure, balance, terminator, usage) -> diagnostics
//!                                                                  -> quick fixes
//! text -> line model -> formatter / outline
//! ```
//!
//! Every component takes the keyword tables ([`LanguageFacts`]) and, where it
//! produces text for people, a [`MessageLookup`] as explicit parameters.
//!
//! ```
//! use hypnolint::{Analyzer, DiagnosticCode};
//!
//! let diagnostics = Analyzer::default().analyze("observe 1;", 1).unwrap();
//! assert!(diagnostics[0].has_code(DiagnosticCode::NoOpenWrapper));
//! ```

pub mod analyzer;
pub mod checks;
pub mod collection;
pub mod config;
pub mod diagnostic;
pub mod document;
pub mod engine;
pub mod fixes;
pub mod format;
pub mod language;
pub mod lines;
pub mod lsp;
pub mod messages;
pub mod outline;
pub mod output;
pub mod scrub;

// Re-export main types
pub use analyzer::{AnalyzeError, Analyzer};
pub use collection::DiagnosticCollection;
pub use config::{ColorMode, Config, ConfigError, OutputFormat};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity, TextPosition, TextRange, SOURCE};
pub use document::SourceDocument;
pub use engine::{Engine, FileReport, LintResult};
pub use fixes::{apply_edits, apply_safe_fixes, quick_fixes, CodeAction, FixError, FixResult, FixSafety, TextEdit};
pub use format::{format, FormatConfig, FormatError, Formatter, IndentStyle};
pub use language::{BlockKeyword, BlockScope, LanguageFacts, SymbolKind};
pub use messages::{Catalog, DefaultMessages, MessageError, MessageKey, MessageLookup};
pub use outline::{document_symbols, folding_ranges, DocumentSymbol, FoldingRange};
pub use scrub::{scrub, ScrubState};
