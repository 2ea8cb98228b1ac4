//! Diagnostic analyzer
//!
//! Runs the built-in checks over one document in a fixed order and
//! concatenates their findings. Each call owns all of its state.

use crate::checks::{builtin_checks, Check, CheckContext};
use crate::diagnostic::Diagnostic;
use crate::document::SourceDocument;
use crate::language::LanguageFacts;
use crate::lines::LineModel;
use crate::messages::{DefaultMessages, MessageLookup};
use crate::scrub::scrub;
use thiserror::Error;

/// Caller contract violation, distinct from any diagnostic
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("Line count mismatch: caller reported {expected} line(s), text has {actual}")]
    LineCountMismatch { expected: usize, actual: usize },
}

/// Stateless HypnoScript analyzer
pub struct Analyzer {
    facts: LanguageFacts,
    messages: Box<dyn MessageLookup>,
    checks: Vec<Box<dyn Check>>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(LanguageFacts::default())
    }
}

impl Analyzer {
    /// Create an analyzer with English messages
    pub fn new(facts: LanguageFacts) -> Self {
        Self {
            facts,
            messages: Box::new(DefaultMessages),
            checks: builtin_checks(),
        }
    }

    /// Use another message source
    pub fn with_messages(mut self, messages: impl MessageLookup + 'static) -> Self {
        self.messages = Box::new(messages);
        self
    }

    pub fn facts(&self) -> &LanguageFacts {
        &self.facts
    }

    pub fn messages(&self) -> &dyn MessageLookup {
        self.messages.as_ref()
    }

    /// Analyze `text`, which the caller says has `line_count` lines
    pub fn analyze(&self, text: &str, line_count: usize) -> Result<Vec<Diagnostic>, AnalyzeError> {
        let document = SourceDocument::new(text);
        if document.line_count() != line_count {
            return Err(AnalyzeError::LineCountMismatch {
                expected: line_count,
                actual: document.line_count(),
            });
        }
        Ok(self.analyze_document(&document))
    }

    /// Analyze a document; always returns a (possibly empty) list
    pub fn analyze_document(&self, document: &SourceDocument) -> Vec<Diagnostic> {
        let scrubbed = scrub(document.text());
        let lines = LineModel::new(document.text());
        let ctx = CheckContext {
            document,
            scrubbed: &scrubbed,
            lines: &lines,
            facts: &self.facts,
            messages: self.messages.as_ref(),
        };

        let mut diagnostics = Vec::new();
        for check in &self.checks {
            let found = check.run(&ctx);
            log::trace!("{}: {} diagnostic(s)", check.name(), found.len());
            diagnostics.extend(found);
        }
        diagnostics
    }
}
