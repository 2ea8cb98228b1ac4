//! Per-document diagnostic store keyed by URI

use crate::analyzer::Analyzer;
use crate::diagnostic::Diagnostic;
use crate::document::SourceDocument;
use std::collections::HashMap;

/// Latest diagnostics for each open document
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    entries: HashMap<String, Vec<Diagnostic>>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the diagnostics stored for `uri`
    pub fn set(&mut self, uri: impl Into<String>, diagnostics: Vec<Diagnostic>) {
        self.entries.insert(uri.into(), diagnostics);
    }

    /// Analyze `text` and store the result for `uri`
    pub fn analyze_into(&mut self, uri: impl Into<String>, text: &str, analyzer: &Analyzer) -> &[Diagnostic] {
        let uri = uri.into();
        let diagnostics = analyzer.analyze_document(&SourceDocument::new(text));
        log::debug!("{}: {} diagnostic(s)", uri, diagnostics.len());
        self.entries.insert(uri.clone(), diagnostics);
        self.get(&uri)
    }

    /// Diagnostics for `uri`; empty when the document is unknown
    pub fn get(&self, uri: &str) -> &[Diagnostic] {
        self.entries.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.entries.contains_key(uri)
    }

    /// Forget one document
    pub fn clear(&mut self, uri: &str) {
        self.entries.remove(uri);
    }

    /// Forget every document
    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// Number of documents tracked
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Documents and their diagnostics, sorted by URI
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Diagnostic])> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(uri, diagnostics)| (uri.as_str(), diagnostics.as_slice()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}
