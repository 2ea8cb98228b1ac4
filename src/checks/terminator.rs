//! Missing statement terminators

use super::{Check, CheckContext};
use crate::diagnostic::{Diagnostic, DiagnosticCode, TextPosition, TextRange};

pub struct TerminatorCheck;

impl Check for TerminatorCheck {
    fn name(&self) -> &'static str {
        "terminator"
    }

    fn codes(&self) -> &'static [DiagnosticCode] {
        &[DiagnosticCode::MissingTerminator]
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        ctx.lines
            .iter()
            .filter(|line| !line.is_structural_boundary())
            .filter(|line| line.starts_with_statement(ctx.facts))
            .filter(|line| !line.ends_with_terminator(ctx.facts))
            .map(|line| {
                let end = TextPosition::new(line.index, line.content_len());
                ctx.diagnostic(DiagnosticCode::MissingTerminator, TextRange::empty(end), &[])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SourceDocument;
    use crate::language::LanguageFacts;
    use crate::lines::LineModel;
    use crate::messages::DefaultMessages;
    use crate::scrub::scrub;

    fn flagged_lines(text: &str) -> Vec<TextPosition> {
        let document = SourceDocument::new(text);
        let scrubbed = scrub(text);
        let lines = LineModel::new(text);
        let facts = LanguageFacts::default();
        let ctx = CheckContext {
            document: &document,
            scrubbed: &scrubbed,
            lines: &lines,
            facts: &facts,
            messages: &DefaultMessages,
        };
        TerminatorCheck.run(&ctx).iter().map(|d| d.range.start).collect()
    }

    #[test]
    fn test_flags_statement_without_terminator() {
        let text = "Focus {\n    observe x\n    whisper y;\n} Relax";
        assert_eq!(flagged_lines(text), vec![TextPosition::new(1, 13)]);
    }

    #[test]
    fn test_block_openers_never_flagged() {
        let text = "Focus {\n  induce x {\n  oscillate flag }\n  snap {\n}\n} Relax";
        assert!(flagged_lines(text).is_empty());
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let text = "// observe x\n\n/* observe y\nobserve z\n*/ \n   ";
        assert!(flagged_lines(text).is_empty());
    }

    #[test]
    fn test_trailing_comment_after_terminator() {
        assert!(flagged_lines("observe x; // fine").is_empty());
        assert_eq!(
            flagged_lines("observe x // missing"),
            vec![TextPosition::new(0, 20)]
        );
    }

    #[test]
    fn test_multiline_continuations_skipped() {
        let text = "observe max(1,\n    2);\ninduce text = \"line one\nline two\";";
        assert!(flagged_lines(text).is_empty());
    }

    #[test]
    fn test_keyword_must_be_whole_word_at_start() {
        assert!(flagged_lines("inducer = 4\nx = observe").is_empty());
        assert_eq!(flagged_lines("sinkTo 3"), vec![TextPosition::new(0, 8)]);
    }

    #[test]
    fn test_column_stops_before_carriage_return() {
        assert_eq!(flagged_lines("drift 5\r\nsnap;"), vec![TextPosition::new(0, 7)]);
    }
}
