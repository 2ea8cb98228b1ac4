//! Line-oriented view of a document shared by the line-scanning components
//!
//! The terminator checker, the formatter and the outline builder all need
//! the same answers about a line: is it a comment, does it open or close a
//! block, does it continue on the next line. [`LineShape`] answers them once.

use crate::language::{leading_word, LanguageFacts};
use crate::scrub::{scrub_lines, ScrubState, ScrubbedLine};

/// Every line of a document paired with its scrubbed form
#[derive(Debug, Clone)]
pub struct LineModel<'a> {
    raw: Vec<&'a str>,
    scrubbed: Vec<ScrubbedLine>,
}

impl<'a> LineModel<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            raw: text.split('\n').collect(),
            scrubbed: scrub_lines(text),
        }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Shape of one line
    pub fn get(&self, index: usize) -> Option<LineShape<'_>> {
        let raw = *self.raw.get(index)?;
        let scrubbed = self.scrubbed.get(index)?;
        Some(LineShape {
            index,
            raw,
            code: &scrubbed.code,
            starts_in: scrubbed.starts_in,
            ends_in: scrubbed.ends_in,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = LineShape<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

/// One line with its scrubbed code and scanner states
#[derive(Debug, Clone, Copy)]
pub struct LineShape<'a> {
    /// Zero-based line number
    pub index: usize,
    /// Original text, without `\n`
    pub raw: &'a str,
    /// Same text with literals and comments blanked
    pub code: &'a str,
    pub starts_in: ScrubState,
    pub ends_in: ScrubState,
}

impl<'a> LineShape<'a> {
    /// Original text without a trailing `\r`
    pub fn content(&self) -> &'a str {
        self.raw.strip_suffix('\r').unwrap_or(self.raw)
    }

    /// Whether the line had a `\r\n` ending
    pub fn has_carriage_return(&self) -> bool {
        self.raw.ends_with('\r')
    }

    /// Length of [`content`](Self::content) in characters
    pub fn content_len(&self) -> usize {
        self.content().chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// The line begins inside a block comment or a string literal
    pub fn starts_in_literal(&self) -> bool {
        matches!(
            self.starts_in,
            ScrubState::BlockComment | ScrubState::String
        )
    }

    /// The line ends inside a block comment or a string literal
    pub fn ends_in_literal(&self) -> bool {
        matches!(self.ends_in, ScrubState::BlockComment | ScrubState::String)
    }

    /// The trimmed line is a `//` or `/*` comment
    pub fn is_comment_line(&self) -> bool {
        let trimmed = self.raw.trim_start();
        trimmed.starts_with("//") || trimmed.starts_with("/*")
    }

    /// Lines the formatter must not touch
    pub fn is_verbatim(&self) -> bool {
        self.starts_in_literal() || self.is_comment_line()
    }

    /// Code part with surrounding whitespace removed
    pub fn code_trimmed(&self) -> &'a str {
        self.code.trim()
    }

    /// Code part ends with `{` or `}`
    pub fn ends_with_brace(&self) -> bool {
        let code = self.code_trimmed();
        code.ends_with('{') || code.ends_with('}')
    }

    /// More `(`/`[` than `)`/`]` in the code part: the statement continues
    pub fn has_open_grouping(&self) -> bool {
        let (mut open, mut close) = (0usize, 0usize);
        for c in self.code.chars() {
            match c {
                '(' | '[' => open += 1,
                ')' | ']' => close += 1,
                _ => {}
            }
        }
        open > close
    }

    /// Lines that never carry a terminator: blank lines, comments, block
    /// boundaries, and lines continuing on the next one
    pub fn is_structural_boundary(&self) -> bool {
        self.is_blank()
            || self.is_verbatim()
            || self.ends_with_brace()
            || self.ends_in_literal()
            || self.has_open_grouping()
    }

    /// First identifier of the code part
    pub fn first_word(&self) -> Option<&'a str> {
        leading_word(self.code.trim_start())
    }

    /// Code part starts with a statement keyword (whole word)
    pub fn starts_with_statement(&self, facts: &LanguageFacts) -> bool {
        self.first_word()
            .is_some_and(|w| facts.is_statement_keyword(w))
    }

    /// Code part ends with the terminator
    pub fn ends_with_terminator(&self, facts: &LanguageFacts) -> bool {
        self.code_trimmed().ends_with(facts.terminator)
    }

    /// Number of `}` at the start of the code part, whitespace between them allowed
    pub fn leading_closers(&self) -> usize {
        self.code
            .chars()
            .filter(|c| !c.is_whitespace())
            .take_while(|c| *c == '}')
            .count()
    }

    /// `(unmatched_closers, unmatched_openers)` for `{`/`}` in the code part
    pub fn brace_delta(&self) -> (usize, usize) {
        let (mut closers, mut openers) = (0usize, 0usize);
        for c in self.code.chars() {
            match c {
                '{' => openers += 1,
                '}' if openers > 0 => openers -= 1,
                '}' => closers += 1,
                _ => {}
            }
        }
        (closers, openers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_of(text: &str, line: usize, check: impl FnOnce(LineShape<'_>)) {
        let model = LineModel::new(text);
        check(model.get(line).unwrap());
    }

    #[test]
    fn test_model_lines() {
        let model = LineModel::new("a\nb\r\n");
        assert_eq!(model.len(), 3);
        assert_eq!(model.get(1).unwrap().content(), "b");
        assert!(model.get(1).unwrap().has_carriage_return());
        assert!(model.get(2).unwrap().is_blank());
        assert!(model.get(3).is_none());
    }

    #[test]
    fn test_comment_lines_are_boundaries() {
        shape_of("  // observe x", 0, |s| {
            assert!(s.is_comment_line());
            assert!(s.is_structural_boundary());
        });
        shape_of("/* a\nobserve x\n*/", 1, |s| {
            assert!(s.starts_in_literal());
            assert!(s.is_verbatim());
        });
    }

    #[test]
    fn test_brace_endings() {
        shape_of("observe x {", 0, |s| assert!(s.ends_with_brace()));
        shape_of("} else {  // go", 0, |s| assert!(s.ends_with_brace()));
        shape_of("observe \"{\"", 0, |s| assert!(!s.ends_with_brace()));
    }

    #[test]
    fn test_open_grouping() {
        shape_of("observe max(a,", 0, |s| assert!(s.has_open_grouping()));
        shape_of("observe [1, (2)]", 0, |s| assert!(!s.has_open_grouping()));
        shape_of("observe \"(\"", 0, |s| assert!(!s.has_open_grouping()));
    }

    #[test]
    fn test_statement_detection() {
        let facts = LanguageFacts::default();
        shape_of("   induce x = 1", 0, |s| {
            assert!(s.starts_with_statement(&facts));
            assert!(!s.ends_with_terminator(&facts));
        });
        shape_of("inducement = 1", 0, |s| assert!(!s.starts_with_statement(&facts)));
        shape_of("observe x; // done", 0, |s| assert!(s.ends_with_terminator(&facts)));
        shape_of("observe \"a;\"", 0, |s| assert!(!s.ends_with_terminator(&facts)));
    }

    #[test]
    fn test_leading_closers_and_delta() {
        shape_of("} } else {", 0, |s| {
            assert_eq!(s.leading_closers(), 2);
            assert_eq!(s.brace_delta(), (2, 1));
        });
        shape_of("{ x } }", 0, |s| {
            assert_eq!(s.leading_closers(), 0);
            assert_eq!(s.brace_delta(), (1, 0));
        });
        shape_of("\"}\" {", 0, |s| {
            assert_eq!(s.leading_closers(), 0);
            assert_eq!(s.brace_delta(), (0, 1));
        });
    }
}
