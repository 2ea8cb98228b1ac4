//! Unused variable detection
//!
//! A coarse text heuristic: a declared name counts as used when it appears
//! as a whole word more often than it is declared. There is no scope
//! analysis, so shadowing and reuse of a name can hide unused bindings.

use super::{Check, CheckContext};
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::language::{word_pattern, LanguageFacts};
use regex::Regex;
use std::collections::HashMap;

pub struct UsageCheck;

/// What the tracker knows about one declared name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRecord {
    pub name: String,
    /// Byte offset of the identifier at each declaration site
    pub declarations: Vec<usize>,
    /// Whole-word occurrences anywhere in the text, declarations included
    pub occurrences: usize,
}

impl VariableRecord {
    pub fn is_used(&self) -> bool {
        self.occurrences > self.declarations.len()
    }
}

fn declaration_pattern(facts: &LanguageFacts) -> Result<Regex, regex::Error> {
    let keywords: Vec<String> = facts
        .declaration_keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect();
    Regex::new(&format!(
        r"\b(?:{})\s+([A-Za-z_][A-Za-z0-9_]*)\b",
        keywords.join("|")
    ))
}

/// Collect every declared name, ordered by first declaration
pub fn track_variables(text: &str, facts: &LanguageFacts) -> Vec<VariableRecord> {
    if facts.declaration_keywords.is_empty() {
        return Vec::new();
    }
    let pattern = match declaration_pattern(facts) {
        Ok(re) => re,
        Err(e) => {
            log::warn!("cannot match declaration keywords: {}", e);
            return Vec::new();
        }
    };

    let mut records: Vec<VariableRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for caps in pattern.captures_iter(text) {
        let Some(ident) = caps.get(1) else {
            continue;
        };
        let slot = *index.entry(ident.as_str().to_string()).or_insert_with(|| {
            records.push(VariableRecord {
                name: ident.as_str().to_string(),
                declarations: Vec::new(),
                occurrences: 0,
            });
            records.len() - 1
        });
        records[slot].declarations.push(ident.start());
    }

    if records.is_empty() {
        return records;
    }
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    let occurrences = match word_pattern(names.as_slice()) {
        Ok(re) => re,
        Err(e) => {
            log::warn!("cannot match declared names: {}", e);
            return Vec::new();
        }
    };
    for found in occurrences.find_iter(text) {
        if let Some(&slot) = index.get(found.as_str()) {
            records[slot].occurrences += 1;
        }
    }

    records
}

impl Check for UsageCheck {
    fn name(&self) -> &'static str {
        "usage"
    }

    fn codes(&self) -> &'static [DiagnosticCode] {
        &[DiagnosticCode::UnusedVariable]
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        let records = track_variables(ctx.document.text(), ctx.facts);
        let mut sites: Vec<(usize, &str)> = Vec::new();
        for record in records.iter().filter(|r| !r.is_used()) {
            sites.extend(record.declarations.iter().map(|&o| (o, record.name.as_str())));
        }
        sites.sort_by_key(|(offset, _)| *offset);

        sites
            .into_iter()
            .map(|(offset, name)| {
                ctx.diagnostic(
                    DiagnosticCode::UnusedVariable,
                    ctx.range_at(offset, name.chars().count()),
                    &[("name", name)],
                )
            })
            .collect()
    }
}
