//! Program wrapper validation
//!
//! A program is opened by exactly one `Focus` and closed by exactly one
//! `Relax`, in that order. Keywords are matched as whole words on scrubbed
//! text, so occurrences in comments or strings do not count.

use super::{Check, CheckContext};
use crate::diagnostic::{Diagnostic, DiagnosticCode, TextPosition, TextRange};
use crate::language::word_pattern;

pub struct StructureCheck;

/// Byte offsets of every whole-word occurrence of `keyword`
pub fn keyword_offsets(scrubbed: &str, keyword: &str) -> Vec<usize> {
    match word_pattern(&[keyword]) {
        Ok(re) => re.find_iter(scrubbed).map(|m| m.start()).collect(),
        Err(e) => {
            log::warn!("cannot match keyword {:?}: {}", keyword, e);
            Vec::new()
        }
    }
}

impl Check for StructureCheck {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn codes(&self) -> &'static [DiagnosticCode] {
        &[
            DiagnosticCode::NoOpenWrapper,
            DiagnosticCode::NoCloseWrapper,
            DiagnosticCode::DuplicateOpenWrapper,
            DiagnosticCode::DuplicateCloseWrapper,
            DiagnosticCode::WrapperOrderViolation,
        ]
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        let open = &ctx.facts.open_wrapper;
        let close = &ctx.facts.close_wrapper;
        let opens = keyword_offsets(ctx.scrubbed, open);
        let closes = keyword_offsets(ctx.scrubbed, close);
        let open_len = open.chars().count();
        let close_len = close.chars().count();

        let mut diagnostics = Vec::new();

        if opens.is_empty() {
            diagnostics.push(ctx.diagnostic(
                DiagnosticCode::NoOpenWrapper,
                TextRange::empty(TextPosition::new(0, 0)),
                &[],
            ));
        }

        if closes.is_empty() {
            let last = ctx.document.last_line();
            diagnostics.push(ctx.diagnostic(
                DiagnosticCode::NoCloseWrapper,
                TextRange::empty(TextPosition::new(last, 0)),
                &[],
            ));
        }

        for &offset in opens.iter().skip(1) {
            diagnostics.push(ctx.diagnostic(
                DiagnosticCode::DuplicateOpenWrapper,
                ctx.range_at(offset, open_len),
                &[("name", open.as_str())],
            ));
        }

        for &offset in closes.iter().skip(1) {
            diagnostics.push(ctx.diagnostic(
                DiagnosticCode::DuplicateCloseWrapper,
                ctx.range_at(offset, close_len),
                &[("name", close.as_str())],
            ));
        }

        if let (Some(&first_open), Some(&first_close)) = (opens.first(), closes.first()) {
            if first_open > first_close {
                diagnostics.push(ctx.diagnostic(
                    DiagnosticCode::WrapperOrderViolation,
                    ctx.range_at(first_open, open_len),
                    &[],
                ));
            }
        }

        diagnostics
    }
}
