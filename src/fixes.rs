//! Quick fixes derived from diagnostics
//!
//! Fixes are classified as safe or unsafe:
//! - Safe fixes only add text the diagnostic asks for and can be applied automatically
//! - Unsafe fixes delete code and require explicit opt-in

use crate::diagnostic::{Diagnostic, DiagnosticCode, TextPosition, TextRange};
use crate::document::SourceDocument;
use crate::language::LanguageFacts;
use crate::messages::{MessageKey, MessageLookup};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fix error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixError {
    #[error("Overlapping edits at {}:{} and {}:{}", .first.start.line + 1, .first.start.column + 1, .second.start.line + 1, .second.start.column + 1)]
    Overlap { first: TextRange, second: TextRange },
}

/// Fix safety classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixSafety {
    /// Safe fix - can be applied automatically
    #[default]
    Safe,
    /// Unsafe fix - removes code
    Unsafe,
}

impl std::fmt::Display for FixSafety {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixSafety::Safe => write!(f, "safe"),
            FixSafety::Unsafe => write!(f, "unsafe"),
        }
    }
}

/// Replace `range` with `new_text`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: TextRange,
    pub new_text: String,
}

impl TextEdit {
    pub fn insert(at: TextPosition, text: impl Into<String>) -> Self {
        Self {
            range: TextRange::empty(at),
            new_text: text.into(),
        }
    }

    pub fn delete(range: TextRange) -> Self {
        Self {
            range,
            new_text: String::new(),
        }
    }

    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: text.into(),
        }
    }
}

/// A titled set of edits resolving one or more diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeAction {
    pub title: String,
    /// LSP code action kind
    pub kind: String,
    pub edits: Vec<TextEdit>,
    pub diagnostics: Vec<Diagnostic>,
    pub is_preferred: bool,
    pub safety: FixSafety,
}

impl CodeAction {
    fn quick_fix(title: String, edits: Vec<TextEdit>, safety: FixSafety) -> Self {
        Self {
            title,
            kind: "quickfix".to_string(),
            edits,
            diagnostics: Vec::new(),
            is_preferred: false,
            safety,
        }
    }

    fn for_diagnostic(mut self, diagnostic: &Diagnostic) -> Self {
        self.diagnostics.push(diagnostic.clone());
        self
    }

    fn preferred(mut self) -> Self {
        self.is_preferred = true;
        self
    }

    pub fn is_safe(&self) -> bool {
        self.safety == FixSafety::Safe
    }
}

/// Text covered by a range
fn text_in<'a>(document: &'a SourceDocument, range: &TextRange) -> &'a str {
    let start = document.offset_at(range.start);
    let end = document.offset_at(range.end);
    &document.text()[start..end]
}

/// Code actions for the given diagnostics. Diagnostics without a fix are ignored;
/// missing wrappers produce a single wrap action however many are reported.
pub fn quick_fixes(
    document: &SourceDocument,
    diagnostics: &[Diagnostic],
    facts: &LanguageFacts,
    messages: &dyn MessageLookup,
) -> Vec<CodeAction> {
    let title = |key: MessageKey, extra: &[(&str, &str)]| facts.render(messages, key, extra);

    let mut actions = Vec::new();
    let mut wrap: Vec<&Diagnostic> = Vec::new();

    for diagnostic in diagnostics {
        let Some(code) = diagnostic.code else {
            continue;
        };
        match code {
            DiagnosticCode::NoOpenWrapper | DiagnosticCode::NoCloseWrapper => {
                wrap.push(diagnostic)
            }
            DiagnosticCode::MissingTerminator => {
                let edit = TextEdit::insert(diagnostic.range.end, facts.terminator.to_string());
                actions.push(
                    CodeAction::quick_fix(
                        title(MessageKey::AddSemicolon, &[]),
                        vec![edit],
                        FixSafety::Safe,
                    )
                    .for_diagnostic(diagnostic)
                    .preferred(),
                );
            }
            DiagnosticCode::UnusedVariable => {
                let name = text_in(document, &diagnostic.range);
                let line = diagnostic.range.start.line;
                let end = if line >= document.last_line() {
                    document.end_position()
                } else {
                    TextPosition::new(line + 1, 0)
                };
                let edit = TextEdit::delete(TextRange::new(TextPosition::new(line, 0), end));
                actions.push(
                    CodeAction::quick_fix(
                        title(MessageKey::RemoveUnusedVariable, &[("name", name)]),
                        vec![edit],
                        FixSafety::Unsafe,
                    )
                    .for_diagnostic(diagnostic),
                );
            }
            DiagnosticCode::DuplicateOpenWrapper | DiagnosticCode::DuplicateCloseWrapper => {
                let name = text_in(document, &diagnostic.range);
                actions.push(
                    CodeAction::quick_fix(
                        title(MessageKey::RemoveDuplicate, &[("name", name)]),
                        vec![TextEdit::delete(diagnostic.range)],
                        FixSafety::Unsafe,
                    )
                    .for_diagnostic(diagnostic),
                );
            }
            DiagnosticCode::WrapperOrderViolation | DiagnosticCode::UnbalancedBrace => {}
        }
    }

    if !wrap.is_empty() {
        let last = document.line(document.last_line()).unwrap_or("");
        let separator = if last.is_empty() { "" } else { "\n" };
        let edits = vec![
            TextEdit::insert(TextPosition::new(0, 0), format!("{} {{\n", facts.open_wrapper)),
            TextEdit::insert(
                document.end_position(),
                format!("{}}} {}\n", separator, facts.close_wrapper),
            ),
        ];
        let mut action = CodeAction::quick_fix(
            title(MessageKey::WrapInFocusRelax, &[]),
            edits,
            FixSafety::Safe,
        )
        .preferred();
        action.diagnostics = wrap.into_iter().cloned().collect();
        actions.push(action);
    }

    actions
}

/// Two byte spans share text, or one is an insertion strictly inside the other
fn spans_clash((s1, e1): (usize, usize), (s2, e2): (usize, usize)) -> bool {
    (s1 < e2 && s2 < e1) || (s1 == e1 && s2 < s1 && s1 < e2) || (s2 == e2 && s1 < s2 && s2 < e1)
}

/// Apply non-overlapping edits and return the new text
pub fn apply_edits(document: &SourceDocument, edits: &[TextEdit]) -> Result<String, FixError> {
    let mut spans: Vec<(usize, usize, &TextEdit)> = edits
        .iter()
        .map(|e| (document.offset_at(e.range.start), document.offset_at(e.range.end), e))
        .collect();
    spans.sort_by_key(|(start, end, _)| (*start, *end));

    for pair in spans.windows(2) {
        let (_, prev_end, prev) = pair[0];
        let (start, _, next) = pair[1];
        if start < prev_end {
            return Err(FixError::Overlap {
                first: prev.range,
                second: next.range,
            });
        }
    }

    let text = document.text();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end, edit) in spans {
        out.push_str(&text[cursor..start]);
        out.push_str(&edit.new_text);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

/// Result of applying a batch of code actions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixResult {
    /// Text after the applied actions
    pub text: String,
    /// Number of actions applied
    pub applied: usize,
    /// Number of actions skipped (unsafe when not allowed, or overlapping)
    pub skipped: usize,
}

/// Apply actions in order, skipping unsafe ones unless `include_unsafe` and
/// any action whose edits overlap an action already taken
pub fn apply_fixes(
    document: &SourceDocument,
    actions: &[CodeAction],
    include_unsafe: bool,
) -> Result<FixResult, FixError> {
    let mut taken: Vec<TextEdit> = Vec::new();
    let mut taken_spans: Vec<(usize, usize)> = Vec::new();
    let mut result = FixResult::default();

    for action in actions {
        if !action.is_safe() && !include_unsafe {
            result.skipped += 1;
            continue;
        }
        let spans: Vec<(usize, usize)> = action
            .edits
            .iter()
            .map(|e| (document.offset_at(e.range.start), document.offset_at(e.range.end)))
            .collect();
        let clashes = spans
            .iter()
            .any(|&a| taken_spans.iter().any(|&b| spans_clash(a, b)));
        if clashes {
            log::debug!("skipping overlapping fix: {}", action.title);
            result.skipped += 1;
            continue;
        }
        taken.extend(action.edits.iter().cloned());
        taken_spans.extend(spans);
        result.applied += 1;
    }

    result.text = apply_edits(document, &taken)?;
    Ok(result)
}

/// Apply every safe action
pub fn apply_safe_fixes(
    document: &SourceDocument,
    actions: &[CodeAction],
) -> Result<FixResult, FixError> {
    apply_fixes(document, actions, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::messages::DefaultMessages;
    use pretty_assertions::assert_eq;

    fn fixes_for(text: &str) -> (SourceDocument, Vec<CodeAction>) {
        let document = SourceDocument::new(text);
        let diagnostics = Analyzer::default().analyze_document(&document);
        let actions = quick_fixes(
            &document,
            &diagnostics,
            &LanguageFacts::default(),
            &DefaultMessages,
        );
        (document, actions)
    }

    #[test]
    fn test_add_terminator() {
        let (doc, actions) = fixes_for("Focus {\n    observe x\n} Relax");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, "Add missing ';'");
        assert!(actions[0].is_preferred);
        let result = apply_safe_fixes(&doc, &actions).unwrap();
        assert_eq!(result.text, "Focus {\n    observe x;\n} Relax");
        assert_eq!(result.applied, 1);
    }

    #[test]
    fn test_add_terminator_before_crlf() {
        let (doc, actions) = fixes_for("Focus {\r\n    observe x\r\n} Relax\r\n");
        let result = apply_safe_fixes(&doc, &actions).unwrap();
        assert_eq!(result.text, "Focus {\r\n    observe x;\r\n} Relax\r\n");
    }

    #[test]
    fn test_wrap_once_for_both_missing_wrappers() {
        let (doc, actions) = fixes_for("observe 1;");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].diagnostics.len(), 2);
        let result = apply_safe_fixes(&doc, &actions).unwrap();
        assert_eq!(result.text, "Focus {\nobserve 1;\n} Relax\n");
    }

    #[test]
    fn test_wrap_after_trailing_newline() {
        let (doc, actions) = fixes_for("observe 1;\n");
        let result = apply_safe_fixes(&doc, &actions).unwrap();
        assert_eq!(result.text, "Focus {\nobserve 1;\n} Relax\n");
    }

    #[test]
    fn test_remove_unused_variable_is_unsafe() {
        let (doc, actions) = fixes_for("Focus {\n    induce x = 1;\n} Relax");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, "Remove unused variable 'x'");
        assert_eq!(actions[0].safety, FixSafety::Unsafe);

        let safe = apply_safe_fixes(&doc, &actions).unwrap();
        assert_eq!(safe.applied, 0);
        assert_eq!(safe.skipped, 1);
        assert_eq!(safe.text, doc.text());

        let all = apply_fixes(&doc, &actions, true).unwrap();
        assert_eq!(all.text, "Focus {\n} Relax");
    }

    #[test]
    fn test_remove_unused_on_last_line() {
        let (doc, actions) = fixes_for("Focus {\n} Relax\ninduce y = 2;");
        let remove = actions
            .iter()
            .find(|a| a.title.contains("'y'"))
            .unwrap();
        let text = apply_edits(&doc, &remove.edits).unwrap();
        assert_eq!(text, "Focus {\n} Relax\n");
    }

    #[test]
    fn test_remove_duplicate_wrapper() {
        let (doc, actions) = fixes_for("Focus {\n} Relax Relax");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, "Remove duplicate 'Relax'");
        let text = apply_edits(&doc, &actions[0].edits).unwrap();
        assert_eq!(text, "Focus {\n} Relax ");
    }

    #[test]
    fn test_overlapping_edits_rejected() {
        let doc = SourceDocument::new("abcdef");
        let edits = vec![
            TextEdit::delete(TextRange::new(TextPosition::new(0, 0), TextPosition::new(0, 3))),
            TextEdit::replace(TextRange::new(TextPosition::new(0, 2), TextPosition::new(0, 4)), "x"),
        ];
        assert!(matches!(apply_edits(&doc, &edits), Err(FixError::Overlap { .. })));
    }

    #[test]
    fn test_adjacent_edits_applied() {
        let doc = SourceDocument::new("abcdef");
        let edits = vec![
            TextEdit::replace(TextRange::new(TextPosition::new(0, 3), TextPosition::new(0, 6)), "XYZ"),
            TextEdit::insert(TextPosition::new(0, 3), "-"),
            TextEdit::delete(TextRange::new(TextPosition::new(0, 0), TextPosition::new(0, 1))),
        ];
        assert_eq!(apply_edits(&doc, &edits).unwrap(), "bc-XYZ");
    }
}
