//! Built-in checks run by the analyzer

pub mod balance;
pub mod structure;
pub mod terminator;
pub mod usage;

use crate::diagnostic::{Diagnostic, DiagnosticCode, TextRange};
use crate::document::SourceDocument;
use crate::language::LanguageFacts;
use crate::lines::LineModel;
use crate::messages::MessageLookup;

pub use balance::{BalanceCheck, BraceFrame};
pub use structure::StructureCheck;
pub use terminator::TerminatorCheck;
pub use usage::{UsageCheck, VariableRecord};

/// Everything a check may read about one document
pub struct CheckContext<'a> {
    pub document: &'a SourceDocument,
    /// Document text with literals and comments blanked
    pub scrubbed: &'a str,
    pub lines: &'a LineModel<'a>,
    pub facts: &'a LanguageFacts,
    pub messages: &'a dyn MessageLookup,
}

impl<'a> CheckContext<'a> {
    /// Build a diagnostic with the rendered message for `code`
    pub fn diagnostic(
        &self,
        code: DiagnosticCode,
        range: TextRange,
        extra: &[(&str, &str)],
    ) -> Diagnostic {
        let message = self.facts.render(self.messages, code.message_key(), extra);
        Diagnostic::new(code, range, message)
    }

    /// Range of `len` characters starting at a byte offset
    pub fn range_at(&self, offset: usize, len: usize) -> TextRange {
        TextRange::with_len(self.document.position_at(offset), len)
    }
}

/// A single analysis pass over a document
pub trait Check: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Codes this check can emit
    fn codes(&self) -> &'static [DiagnosticCode];

    /// Run the check; never fails on text input
    fn run(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic>;
}

/// The built-in checks in the order their results are reported
pub fn builtin_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(StructureCheck),
        Box::new(BalanceCheck),
        Box::new(TerminatorCheck),
        Box::new(UsageCheck),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_order() {
        let names: Vec<_> = builtin_checks().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["structure", "balance", "terminator", "usage"]);
    }

    #[test]
    fn test_every_code_has_one_check() {
        let mut seen = HashSet::new();
        for check in builtin_checks() {
            for code in check.codes() {
                assert!(seen.insert(*code), "{} emitted by two checks", code);
            }
        }
        assert_eq!(seen.len(), DiagnosticCode::ALL.len());
    }
}
