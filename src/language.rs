//! Keyword tables for HypnoScript
//!
//! Everything the analyzer, formatter and outline builder know about the
//! language lives here as plain data, so a configuration file can replace it.

use crate::messages::{MessageKey, MessageLookup};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// LSP-style symbol kind for outline entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Module,
    Namespace,
    Class,
    Method,
    Struct,
    Event,
}

impl SymbolKind {
    /// Numeric symbol kind used by LSP clients
    pub fn lsp_value(&self) -> u8 {
        match self {
            SymbolKind::Module => 2,
            SymbolKind::Namespace => 3,
            SymbolKind::Class => 5,
            SymbolKind::Method => 6,
            SymbolKind::Struct => 23,
            SymbolKind::Event => 24,
        }
    }
}

/// How a block construct relates to the constructs inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockScope {
    /// Its body is scanned as if it were top level
    Transparent,
    /// Its body is skipped
    #[default]
    Leaf,
    /// Nested constructs become its children
    Container,
}

/// A keyword that opens a named or anonymous block (`session Name { ... }`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockKeyword {
    pub keyword: String,
    pub kind: SymbolKind,
    /// Whether an identifier follows the keyword
    #[serde(default)]
    pub named: bool,
    #[serde(default)]
    pub scope: BlockScope,
}

impl BlockKeyword {
    pub fn new(keyword: &str, kind: SymbolKind, named: bool, scope: BlockScope) -> Self {
        Self {
            keyword: keyword.to_string(),
            kind,
            named,
            scope,
        }
    }
}

/// Language facts used by every component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageFacts {
    /// Keyword opening a program
    pub open_wrapper: String,
    /// Keyword closing a program
    pub close_wrapper: String,
    /// Keywords that start a statement needing a terminator
    pub statement_keywords: Vec<String>,
    /// Keywords that introduce a variable
    pub declaration_keywords: Vec<String>,
    /// Keywords that sit one level left of the current block (`} else {`)
    pub dedent_keywords: Vec<String>,
    /// Statement terminator
    pub terminator: char,
    /// Block constructs shown in the outline
    pub blocks: Vec<BlockKeyword>,
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for LanguageFacts {
    fn default() -> Self {
        Self {
            open_wrapper: "Focus".to_string(),
            close_wrapper: "Relax".to_string(),
            statement_keywords: strings(&[
                "induce",
                "implant",
                "embed",
                "freeze",
                "observe",
                "whisper",
                "command",
                "murmur",
                "drift",
                "pauseReality",
                "anchor",
                "oscillate",
                "awaken",
                "snap",
                "sink",
                "sinkTo",
            ]),
            declaration_keywords: strings(&["induce", "implant", "embed", "freeze", "sharedTrance"]),
            dedent_keywords: strings(&["else"]),
            terminator: ';',
            blocks: vec![
                BlockKeyword::new("Focus", SymbolKind::Module, false, BlockScope::Transparent),
                BlockKeyword::new("session", SymbolKind::Class, true, BlockScope::Container),
                BlockKeyword::new("tranceify", SymbolKind::Struct, true, BlockScope::Leaf),
                BlockKeyword::new("suggestion", SymbolKind::Method, true, BlockScope::Leaf),
                BlockKeyword::new("trigger", SymbolKind::Event, true, BlockScope::Leaf),
                BlockKeyword::new("deepFocus", SymbolKind::Namespace, false, BlockScope::Leaf),
            ],
        }
    }
}

impl LanguageFacts {
    /// Check whether `word` is a statement keyword
    pub fn is_statement_keyword(&self, word: &str) -> bool {
        self.statement_keywords.iter().any(|k| k == word)
    }

    /// Check whether `word` is a dedent keyword
    pub fn is_dedent_keyword(&self, word: &str) -> bool {
        self.dedent_keywords.iter().any(|k| k == word)
    }

    /// Any keyword the tables know, wrappers included
    pub fn is_keyword(&self, word: &str) -> bool {
        word == self.open_wrapper
            || word == self.close_wrapper
            || self.is_statement_keyword(word)
            || self.declaration_keywords.iter().any(|k| k == word)
            || self.is_dedent_keyword(word)
            || self.block(word).is_some()
    }

    /// Find the block construct for a keyword
    pub fn block(&self, keyword: &str) -> Option<&BlockKeyword> {
        self.blocks.iter().find(|b| b.keyword == keyword)
    }

    /// Render a message with the wrapper and terminator placeholders filled in
    pub fn render(
        &self,
        messages: &dyn MessageLookup,
        key: MessageKey,
        extra: &[(&str, &str)],
    ) -> String {
        let terminator = self.terminator.to_string();
        let mut args = vec![
            ("open", self.open_wrapper.as_str()),
            ("close", self.close_wrapper.as_str()),
            ("terminator", terminator.as_str()),
        ];
        args.extend_from_slice(extra);
        messages.render(key, &args)
    }

    /// Reject tables the analyzer cannot work with
    pub fn validate(&self) -> Result<(), String> {
        if !is_identifier(&self.open_wrapper) {
            return Err(format!("Invalid open wrapper keyword: {:?}", self.open_wrapper));
        }
        if !is_identifier(&self.close_wrapper) {
            return Err(format!("Invalid close wrapper keyword: {:?}", self.close_wrapper));
        }
        if self.open_wrapper == self.close_wrapper {
            return Err("Open and close wrapper keywords must differ".to_string());
        }
        let words = self
            .statement_keywords
            .iter()
            .chain(&self.declaration_keywords)
            .chain(&self.dedent_keywords)
            .chain(self.blocks.iter().map(|b| &b.keyword));
        for word in words {
            if !is_identifier(word) {
                return Err(format!("Invalid keyword: {:?}", word));
            }
        }
        if self.terminator.is_whitespace() || "{}()[]\"/".contains(self.terminator) {
            return Err(format!("Invalid terminator: {:?}", self.terminator));
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Word character for keyword boundaries
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Regex matching any of `words` as a whole word
pub fn word_pattern<S: AsRef<str>>(words: &[S]) -> Result<Regex, regex::Error> {
    let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w.as_ref())).collect();
    Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
}

/// Leading identifier of `text`, if it starts with one
pub fn leading_word(text: &str) -> Option<&str> {
    let end = text.find(|c: char| !is_word_char(c)).unwrap_or(text.len());
    let word = &text[..end];
    if is_identifier(word) {
        Some(word)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::DefaultMessages;

    #[test]
    fn test_default_facts() {
        let facts = LanguageFacts::default();
        assert_eq!(facts.open_wrapper, "Focus");
        assert_eq!(facts.close_wrapper, "Relax");
        assert_eq!(facts.terminator, ';');
        assert!(facts.is_statement_keyword("observe"));
        assert!(facts.is_statement_keyword("sinkTo"));
        assert!(!facts.is_statement_keyword("session"));
        assert!(facts.declaration_keywords.contains(&"sharedTrance".to_string()));
        assert!(facts.validate().is_ok());
    }

    #[test]
    fn test_block_lookup() {
        let facts = LanguageFacts::default();
        let session = facts.block("session").unwrap();
        assert_eq!(session.kind, SymbolKind::Class);
        assert_eq!(session.scope, BlockScope::Container);
        assert_eq!(facts.block("Focus").unwrap().scope, BlockScope::Transparent);
        assert!(facts.block("loop").is_none());
        assert!(facts.is_keyword("Relax"));
        assert!(facts.is_keyword("sharedTrance"));
        assert!(facts.is_keyword("tranceify"));
        assert!(!facts.is_keyword("loop"));
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        let mut facts = LanguageFacts::default();
        facts.close_wrapper = "Focus".to_string();
        assert!(facts.validate().is_err());

        let mut facts = LanguageFacts::default();
        facts.statement_keywords.push("two words".to_string());
        assert!(facts.validate().is_err());

        let facts = LanguageFacts {
            terminator: '{',
            ..LanguageFacts::default()
        };
        assert!(facts.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let facts: LanguageFacts = serde_yaml::from_str("openWrapper: Begin\nterminator: '.'\n").unwrap();
        assert_eq!(facts.open_wrapper, "Begin");
        assert_eq!(facts.close_wrapper, "Relax");
        assert_eq!(facts.terminator, '.');
        assert!(!facts.blocks.is_empty());
    }

    #[test]
    fn test_word_helpers() {
        assert!(is_identifier("_x9"));
        assert!(!is_identifier("9x"));
        assert!(!is_identifier(""));
        assert_eq!(leading_word("observe(x);"), Some("observe"));
        assert_eq!(leading_word("(x)"), None);
        assert_eq!(leading_word("deepFocus {"), Some("deepFocus"));
    }

    #[test]
    fn test_render_fills_shared_placeholders() {
        let facts = LanguageFacts::default();
        let text = facts.render(&DefaultMessages, MessageKey::WrapInFocusRelax, &[]);
        assert_eq!(text, "Wrap program in 'Focus { ... } Relax'");
        let text = facts.render(&DefaultMessages, MessageKey::RemoveDuplicate, &[("name", "Relax")]);
        assert_eq!(text, "Remove duplicate 'Relax'");
    }

    #[test]
    fn test_word_pattern() {
        let re = word_pattern(&["Focus"]).unwrap();
        assert_eq!(re.find_iter("Focus deepFocus Focused (Focus)").count(), 2);
    }

    #[test]
    fn test_symbol_kind_lsp_values() {
        assert_eq!(SymbolKind::Class.lsp_value(), 5);
        assert_eq!(SymbolKind::Event.lsp_value(), 24);
    }
}
