//! Brace, parenthesis and bracket balance
//!
//! Single pass with a stack over scrubbed text. Every closer pops the stack
//! when it is non-empty; a popped opener of another kind is reported at the
//! closer and is not pushed back. Closers with nothing to pop are reported,
//! and frames left at the end are reported bottom of stack first.

use super::{Check, CheckContext};
use crate::diagnostic::{Diagnostic, DiagnosticCode};

pub struct BalanceCheck;

/// An opener waiting for its closer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BraceFrame {
    pub character: char,
    /// Byte offset in the document
    pub offset: usize,
}

fn closer_for(opener: char) -> Option<char> {
    match opener {
        '{' => Some('}'),
        '(' => Some(')'),
        '[' => Some(']'),
        _ => None,
    }
}

fn is_closer(c: char) -> bool {
    matches!(c, '}' | ')' | ']')
}

/// Every offending bracket in `scrubbed`, in report order
pub fn find_imbalances(scrubbed: &str) -> Vec<BraceFrame> {
    let mut stack: Vec<BraceFrame> = Vec::new();
    let mut offending = Vec::new();

    for (offset, character) in scrubbed.char_indices() {
        if closer_for(character).is_some() {
            stack.push(BraceFrame { character, offset });
        } else if is_closer(character) {
            match stack.pop() {
                Some(open) if closer_for(open.character) == Some(character) => {}
                _ => offending.push(BraceFrame { character, offset }),
            }
        }
    }

    offending.extend(stack);
    offending
}

impl Check for BalanceCheck {
    fn name(&self) -> &'static str {
        "balance"
    }

    fn codes(&self) -> &'static [DiagnosticCode] {
        &[DiagnosticCode::UnbalancedBrace]
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        let character = |frame: &BraceFrame| frame.character.to_string();
        find_imbalances(ctx.scrubbed)
            .iter()
            .map(|frame| {
                ctx.diagnostic(
                    DiagnosticCode::UnbalancedBrace,
                    ctx.range_at(frame.offset, 1),
                    &[("name", character(frame).as_str())],
                )
            })
            .collect()
    }
}
