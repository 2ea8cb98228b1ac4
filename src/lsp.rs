//! Language Server Protocol shapes
//!
//! Converts analysis results into the JSON structures an editor client
//! expects. Columns are converted from characters to UTF-16 code units.

use crate::diagnostic::{Diagnostic, Severity, TextPosition, TextRange};
use crate::document::SourceDocument;
use crate::fixes;
use crate::outline::{DocumentSymbol, FoldingRange};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// LSP diagnostic severity, numbered as in the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LspSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl From<Severity> for LspSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => LspSeverity::Error,
            Severity::Warning => LspSeverity::Warning,
            Severity::Info => LspSeverity::Information,
            Severity::Hint => LspSeverity::Hint,
        }
    }
}

/// LSP position (0-indexed, UTF-16 columns)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn from_text_position(document: &SourceDocument, position: TextPosition) -> Self {
        let character = document
            .line(position.line)
            .map(|line| line.chars().take(position.column).map(char::len_utf16).sum())
            .unwrap_or(position.column);
        Self {
            line: position.line as u32,
            character: character as u32,
        }
    }
}

/// LSP range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn from_text_range(document: &SourceDocument, range: &TextRange) -> Self {
        Self {
            start: Position::from_text_position(document, range.start),
            end: Position::from_text_position(document, range.end),
        }
    }
}

/// LSP diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LspDiagnostic {
    pub range: Range,
    pub severity: Option<u32>,
    pub code: Option<String>,
    pub source: Option<String>,
    pub message: String,
}

/// LSP code action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeAction {
    pub title: String,
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Vec<LspDiagnostic>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<WorkspaceEdit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_preferred: Option<bool>,
}

/// LSP workspace edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceEdit {
    pub changes: Option<HashMap<String, Vec<TextEdit>>>,
}

/// LSP text edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub range: Range,
    #[serde(rename = "newText")]
    pub new_text: String,
}

/// LSP document symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspDocumentSymbol {
    pub name: String,
    pub detail: Option<String>,
    pub kind: u8,
    pub range: Range,
    pub selection_range: Range,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<LspDocumentSymbol>,
}

/// LSP folding range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspFoldingRange {
    pub start_line: u32,
    pub end_line: u32,
    pub kind: Option<String>,
}

/// `file://` URI for a path
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Convert diagnostics to LSP diagnostics
pub fn to_lsp_diagnostics(document: &SourceDocument, diagnostics: &[Diagnostic]) -> Vec<LspDiagnostic> {
    diagnostics
        .iter()
        .map(|d| LspDiagnostic {
            range: Range::from_text_range(document, &d.range),
            severity: Some(LspSeverity::from(d.severity) as u32),
            code: d.code.map(|c| c.as_str().to_string()),
            source: Some(d.source.clone()),
            message: d.message.clone(),
        })
        .collect()
}

fn to_text_edit(document: &SourceDocument, edit: &fixes::TextEdit) -> TextEdit {
    TextEdit {
        range: Range::from_text_range(document, &edit.range),
        new_text: edit.new_text.clone(),
    }
}

/// Convert a quick fix to an LSP code action
pub fn to_code_action(document: &SourceDocument, uri: &str, action: &fixes::CodeAction) -> CodeAction {
    let edits: Vec<TextEdit> = action
        .edits
        .iter()
        .map(|e| to_text_edit(document, e))
        .collect();

    let mut changes = HashMap::new();
    changes.insert(uri.to_string(), edits);

    let kind = if action.is_safe() {
        action.kind.clone()
    } else {
        format!("{}.unsafe", action.kind)
    };

    CodeAction {
        title: action.title.clone(),
        kind: Some(kind),
        diagnostics: Some(to_lsp_diagnostics(document, &action.diagnostics)),
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
        }),
        is_preferred: Some(action.is_preferred),
    }
}

/// One edit replacing the whole document, or `None` when nothing changes
pub fn full_document_edit(document: &SourceDocument, formatted: &str) -> Option<TextEdit> {
    if formatted == document.text() {
        return None;
    }
    let whole = TextRange::new(TextPosition::default(), document.end_position());
    Some(TextEdit {
        range: Range::from_text_range(document, &whole),
        new_text: formatted.to_string(),
    })
}

/// Convert outline symbols to LSP document symbols
pub fn to_lsp_symbols(document: &SourceDocument, symbols: &[DocumentSymbol]) -> Vec<LspDocumentSymbol> {
    symbols
        .iter()
        .map(|s| LspDocumentSymbol {
            name: s.name.clone(),
            detail: Some(s.detail.clone()),
            kind: s.kind.lsp_value(),
            range: Range::from_text_range(document, &s.range),
            selection_range: Range::from_text_range(document, &s.selection_range),
            children: to_lsp_symbols(document, &s.children),
        })
        .collect()
}

/// Convert folding ranges to LSP folding ranges
pub fn to_lsp_folding_ranges(ranges: &[FoldingRange]) -> Vec<LspFoldingRange> {
    ranges
        .iter()
        .map(|r| LspFoldingRange {
            start_line: r.start_line as u32,
            end_line: r.end_line as u32,
            kind: Some("region".to_string()),
        })
        .collect()
}

/// Publish diagnostics notification parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishDiagnosticsParams {
    pub uri: String,
    pub diagnostics: Vec<LspDiagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
}

/// Create publish diagnostics params for one document
pub fn to_publish_diagnostics(
    uri: &str,
    document: &SourceDocument,
    diagnostics: &[Diagnostic],
    version: Option<i32>,
) -> PublishDiagnosticsParams {
    PublishDiagnosticsParams {
        uri: uri.to_string(),
        diagnostics: to_lsp_diagnostics(document, diagnostics),
        version,
    }
}

/// Server capabilities for LSP initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    /// Sync mode: 1 = Full, 2 = Incremental
    pub text_document_sync: u8,
    pub code_action_provider: bool,
    pub document_formatting_provider: bool,
    pub document_symbol_provider: bool,
    pub folding_range_provider: bool,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            text_document_sync: 1, // Full sync
            code_action_provider: true,
            document_formatting_provider: true,
            document_symbol_provider: true,
            folding_range_provider: true,
        }
    }
}
