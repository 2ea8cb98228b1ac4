//! Line-oriented reformatter
//!
//! Re-indents code lines by brace depth, puts single spaces around operators
//! and after commas and keywords, drops blanks before the terminator and
//! strips trailing whitespace. Runs of spaces are never collapsed. Comment
//! lines and lines inside multi-line literals pass through untouched, as do
//! the string and comment parts of code lines.
//! Formatting is idempotent: formatting formatted text changes nothing.

use crate::language::LanguageFacts;
use crate::lines::{LineModel, LineShape};
use crate::scrub::ScrubState;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Failed to read file: {0}")]
    ReadFile(#[from] std::io::Error),
}

/// Indent style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    #[default]
    Space,
    Tab,
}

/// Formatting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatConfig {
    /// Indent style (space or tab)
    #[serde(default)]
    pub indent_style: IndentStyle,

    /// Number of spaces/tabs per indent level
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,
}

fn default_indent_size() -> usize {
    4
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_style: IndentStyle::Space,
            indent_size: default_indent_size(),
        }
    }
}

impl FormatConfig {
    /// Get the indent string for one level
    pub fn indent_str(&self) -> String {
        match self.indent_style {
            IndentStyle::Space => " ".repeat(self.indent_size),
            IndentStyle::Tab => "\t".repeat(self.indent_size),
        }
    }
}

/// Operators spaced on both sides, longest first
const OPERATORS: [&str; 21] = [
    "==", "!=", ">=", "<=", "&&", "||", "+=", "-=", "*=", "/=", "%=", "=>", "->", "=", "<", ">",
    "+", "-", "*", "/", "%",
];

/// State carried from one line to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatterState {
    /// Depth of open `{` before the current line
    pub indent_level: usize,
    /// The previous line ended inside a block comment
    pub in_block_comment: bool,
}

impl FormatterState {
    /// The line is emitted as is
    fn is_verbatim(&self, line: &LineShape<'_>) -> bool {
        self.in_block_comment || line.starts_in == ScrubState::String || line.is_comment_line()
    }

    /// Advance past a line
    fn advance(&mut self, line: &LineShape<'_>) {
        let (closers, openers) = line.brace_delta();
        self.indent_level = self.indent_level.saturating_sub(closers) + openers;
        self.in_block_comment = line.ends_in == ScrubState::BlockComment;
    }
}

/// HypnoScript formatter
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: FormatConfig,
    facts: LanguageFacts,
}

impl Formatter {
    /// Create a new formatter with configuration
    pub fn new(config: FormatConfig) -> Self {
        Self {
            config,
            facts: LanguageFacts::default(),
        }
    }

    /// Use other language facts (keywords and terminator)
    pub fn with_facts(mut self, facts: LanguageFacts) -> Self {
        self.facts = facts;
        self
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Format source text
    pub fn format(&self, text: &str) -> String {
        let model = LineModel::new(text);
        let indent = self.config.indent_str();
        let mut state = FormatterState::default();
        let mut out: Vec<String> = Vec::with_capacity(model.len());

        for line in model.iter() {
            out.push(self.format_line(&line, &state, &indent));
            state.advance(&line);
        }

        out.join("\n")
    }

    /// Check whether formatting would change `text`
    pub fn needs_formatting(&self, text: &str) -> bool {
        self.format(text) != text
    }

    /// Format a file and return the formatted text
    pub fn format_file(&self, path: &Path) -> Result<String, FormatError> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.format(&content))
    }

    fn format_line(&self, line: &LineShape<'_>, state: &FormatterState, indent: &str) -> String {
        if state.is_verbatim(line) {
            return line.raw.to_string();
        }

        let cr = if line.has_carriage_return() { "\r" } else { "" };
        if line.is_blank() {
            return cr.to_string();
        }

        let content = line.content();
        let start = content.len() - content.trim_start().len();
        let body = if line.ends_in == ScrubState::String {
            &content[start..]
        } else {
            content.trim()
        };
        let body = match line.code.get(start..start + body.len()) {
            Some(code) => self.space_code(body, code),
            None => body.to_string(),
        };

        let dedent = line.leading_closers() + usize::from(self.starts_with_dedent_keyword(line));
        let level = state.indent_level.saturating_sub(dedent);

        format!("{}{}{}", indent.repeat(level), body, cr)
    }

    /// Normalize spacing in the code parts of `body`.
    ///
    /// `code` is the scrubbed form of `body`. Bytes where the two differ
    /// belong to a string or a comment and are copied unchanged. Spaces are
    /// only inserted where none exist, so a second pass finds nothing to do.
    fn space_code(&self, body: &str, code: &str) -> String {
        let raw = body.as_bytes();
        let masked = code.as_bytes();
        let is_code = |i: usize| raw[i] == masked[i] && !raw[i].is_ascii_whitespace();
        let needs_space_after = |i: usize| raw.get(i).is_some_and(|b| !b.is_ascii_whitespace());
        let terminator = u8::try_from(self.facts.terminator).ok();

        let mut out: Vec<u8> = Vec::with_capacity(raw.len() + 8);
        // Whether the last token ends an operand, which makes `+`/`-` binary
        let mut operand_before = false;
        let mut i = 0;

        while i < raw.len() {
            let b = raw[i];
            if !is_code(i) {
                out.push(b);
                if !b.is_ascii_whitespace() {
                    operand_before = true;
                }
                i += 1;
                continue;
            }

            if is_word_byte(b) {
                let start = i;
                while i < raw.len() && is_code(i) && is_word_byte(raw[i]) {
                    i += 1;
                }
                out.extend_from_slice(&raw[start..i]);
                let word = body.get(start..i).unwrap_or_default();
                let keyword = self.facts.is_keyword(word);
                if keyword && matches!(raw.get(i), Some(b'(' | b'{' | b'[' | b'"')) {
                    out.push(b' ');
                }
                let exponent = word.starts_with(|c: char| c.is_ascii_digit())
                    && word.ends_with(['e', 'E'])
                    && matches!(raw.get(i), Some(b'+' | b'-'));
                operand_before = !keyword && !exponent;
                continue;
            }

            if Some(b) == terminator {
                while out.last().is_some_and(|c| c.is_ascii_whitespace()) {
                    out.pop();
                }
                out.push(b);
                operand_before = false;
                i += 1;
                continue;
            }

            match b {
                b',' => {
                    out.push(b);
                    if needs_space_after(i + 1) {
                        out.push(b' ');
                    }
                    operand_before = false;
                    i += 1;
                    continue;
                }
                b'{' => {
                    if out.last().is_some_and(|c| !c.is_ascii_whitespace() && !matches!(c, b'(' | b'[' | b'{')) {
                        out.push(b' ');
                    }
                    out.push(b);
                    operand_before = false;
                    i += 1;
                    continue;
                }
                b'+' | b'-' if raw.get(i + 1) == Some(&b) => {
                    // Increment and decrement stay glued to their operand
                    out.extend_from_slice(&raw[i..i + 2]);
                    i += 2;
                    continue;
                }
                _ => {}
            }

            let operator = OPERATORS.iter().find(|op| {
                let end = i + op.len();
                raw[i..].starts_with(op.as_bytes()) && (i..end).all(is_code)
            });
            match operator {
                Some(op) if matches!(*op, "+" | "-") && !operand_before => {
                    out.push(b);
                    i += 1;
                }
                Some(op) => {
                    if out.last().is_some_and(|c| !c.is_ascii_whitespace()) {
                        out.push(b' ');
                    }
                    out.extend_from_slice(op.as_bytes());
                    i += op.len();
                    if needs_space_after(i) {
                        out.push(b' ');
                    }
                }
                None => {
                    out.push(b);
                    i += 1;
                    operand_before = matches!(b, b')' | b']');
                    continue;
                }
            }
            operand_before = false;
        }

        String::from_utf8(out).unwrap_or_else(|_| body.to_string())
    }

    fn starts_with_dedent_keyword(&self, line: &LineShape<'_>) -> bool {
        line.first_word()
            .is_some_and(|w| self.facts.is_dedent_keyword(w))
    }
}

/// Identifier bytes; non-ASCII bytes count so multi-byte names stay whole
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || !b.is_ascii()
}

/// Format with default settings
pub fn format(text: &str) -> String {
    Formatter::default().format(text)
}
