//! Integration tests for analysis, fixes and formatting

use hypnolint::fixes::apply_fixes;
use hypnolint::{
    apply_safe_fixes, format, quick_fixes, scrub, Analyzer, DefaultMessages, Diagnostic,
    DiagnosticCode, LanguageFacts, Severity, SourceDocument, TextPosition,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn analyze(text: &str) -> Vec<Diagnostic> {
    Analyzer::default().analyze_document(&SourceDocument::new(text))
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<DiagnosticCode> {
    diagnostics.iter().filter_map(|d| d.code).collect()
}

fn count(diagnostics: &[Diagnostic], code: DiagnosticCode) -> usize {
    diagnostics.iter().filter(|d| d.has_code(code)).count()
}

fn is_structural(code: DiagnosticCode) -> bool {
    matches!(
        code,
        DiagnosticCode::NoOpenWrapper
            | DiagnosticCode::NoCloseWrapper
            | DiagnosticCode::WrapperOrderViolation
            | DiagnosticCode::DuplicateOpenWrapper
            | DiagnosticCode::DuplicateCloseWrapper
    )
}

#[test]
fn test_declared_but_unused_variable() {
    let diagnostics = Analyzer::default()
        .analyze("Focus {\n induce x: number = 1;\n} Relax", 3)
        .unwrap();

    assert_eq!(codes(&diagnostics), vec![DiagnosticCode::UnusedVariable]);
    let hint = &diagnostics[0];
    assert_eq!(hint.severity, Severity::Hint);
    assert_eq!(hint.range.start, TextPosition::new(1, 8));
    assert_eq!(hint.message, "Variable 'x' is declared but never used");
}

#[test]
fn test_missing_close_wrapper() {
    let diagnostics = analyze("Focus {\n    observe 1;\n}");
    assert_eq!(codes(&diagnostics), vec![DiagnosticCode::NoCloseWrapper]);
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert_eq!(diagnostics[0].range.start, TextPosition::new(2, 0));
}

#[test]
fn test_crossed_brackets_report_twice() {
    let diagnostics = analyze("{ ( } )");
    let unbalanced: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.has_code(DiagnosticCode::UnbalancedBrace))
        .map(|d| d.range.start.column)
        .collect();
    assert_eq!(unbalanced, vec![4, 6]);
}

#[test]
fn test_stray_closer_after_balanced_text() {
    let diagnostics = analyze("Focus {()}] Relax");
    assert_eq!(codes(&diagnostics), vec![DiagnosticCode::UnbalancedBrace]);
    assert_eq!(diagnostics[0].range.start, TextPosition::new(0, 10));
}

#[test]
fn test_statement_opening_block_never_needs_terminator() {
    let facts = LanguageFacts::default();
    for keyword in &facts.statement_keywords {
        let text = format!("Focus {{\n    {} (ready) {{\n        observe 1;\n    }}\n}} Relax", keyword);
        let diagnostics = analyze(&text);
        assert_eq!(
            count(&diagnostics, DiagnosticCode::MissingTerminator),
            0,
            "{}",
            keyword
        );
    }
}

#[test]
fn test_one_pair_of_wrappers_is_structurally_clean() {
    let text = "// Focus in a comment\nFocus {\n    observe \"Relax\";\n    session Focused {\n    }\n} Relax\n";
    let diagnostics = analyze(text);
    assert!(codes(&diagnostics).into_iter().all(|c| !is_structural(c)));
}

#[test]
fn test_checks_keep_running_after_failures() {
    let diagnostics = analyze("Relax Focus Focus {\n    observe 1\n    induce unused = (1;\n");
    let found = codes(&diagnostics);
    for code in [
        DiagnosticCode::DuplicateOpenWrapper,
        DiagnosticCode::WrapperOrderViolation,
        DiagnosticCode::UnbalancedBrace,
        DiagnosticCode::MissingTerminator,
        DiagnosticCode::UnusedVariable,
    ] {
        assert!(found.contains(&code), "missing {}", code);
    }
}

#[test]
fn test_format_canonical_text_unchanged() {
    let text = "Focus {\n    session Patient {\n        suggestion greet() {\n            observe \"hi\";\n        }\n    }\n} Relax\n";
    assert_eq!(format(text), text);
}

#[test]
fn test_format_then_analyze_is_clean() {
    let text = "Focus {\ninduce name = \"Ada\";\n  observe name;\n     } Relax";
    let formatted = format(text);
    assert_eq!(formatted, "Focus {\n    induce name = \"Ada\";\n    observe name;\n} Relax");
    assert!(analyze(&formatted).is_empty());
}

#[test]
fn test_safe_fixes_resolve_diagnostics() {
    let doc = SourceDocument::new("observe 1\ninduce x = 2;\nobserve x\n");
    let facts = LanguageFacts::default();
    let diagnostics = Analyzer::default().analyze_document(&doc);
    let actions = quick_fixes(&doc, &diagnostics, &facts, &DefaultMessages);

    let fixed = apply_safe_fixes(&doc, &actions).unwrap();
    assert_eq!(fixed.text, "Focus {\nobserve 1;\ninduce x = 2;\nobserve x;\n} Relax\n");
    assert!(analyze(&fixed.text).is_empty());
    assert!(analyze(&format(&fixed.text)).is_empty());
}

#[test]
fn test_unsafe_fixes_remove_code() {
    let doc = SourceDocument::new("Focus {\n    induce unused = 1;\n    observe 2;\n} Relax Relax");
    let diagnostics = Analyzer::default().analyze_document(&doc);
    let actions = quick_fixes(&doc, &diagnostics, &LanguageFacts::default(), &DefaultMessages);

    let safe_only = apply_fixes(&doc, &actions, false).unwrap();
    assert_eq!(safe_only.applied, 0);
    assert_eq!(safe_only.text, doc.text());

    let all = apply_fixes(&doc, &actions, true).unwrap();
    assert_eq!(all.text, "Focus {\n    observe 2;\n} Relax ");
}

/// Reference bracket matcher
fn properly_nested(text: &str) -> bool {
    let mut stack = Vec::new();
    for c in text.chars() {
        match c {
            '{' | '(' | '[' => stack.push(c),
            '}' | ')' | ']' => {
                let expected = match c {
                    '}' => '{',
                    ')' => '(',
                    _ => '[',
                };
                if stack.pop() != Some(expected) {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}

proptest! {
    #[test]
    fn prop_format_is_idempotent(text in "[a-z0-9 \t\r\n{}();,\"/*\\\\=+\\-<>!&|%]{0,80}|(Focus|Relax|else|observe|\\{|\\}|\"|//|/\\*|\\*/|;|\n|\r\n| )*") {
        let once = format(&text);
        prop_assert_eq!(format(&once), once);
    }

    #[test]
    fn prop_scrub_preserves_length(text in "\\PC{0,120}") {
        let scrubbed = scrub(&text);
        prop_assert_eq!(scrubbed.len(), text.len());
        prop_assert_eq!(scrubbed.matches('\n').count(), text.matches('\n').count());
    }

    #[test]
    fn prop_balance_sound(text in "[{}()\\[\\]a \n]{0,40}") {
        let unbalanced = count(&analyze(&text), DiagnosticCode::UnbalancedBrace);
        prop_assert_eq!(unbalanced == 0, properly_nested(&text));
    }

    #[test]
    fn prop_wrapped_body_is_structurally_clean(body in "[a-z ;{}()\n]{0,60}") {
        let text = format!("Focus {{\n{}\n}} Relax", body);
        let structural = codes(&analyze(&text)).into_iter().filter(|c| is_structural(*c)).count();
        prop_assert_eq!(structural, 0);
    }
}
