//! Human-readable message lookup
//!
//! Components that produce user-facing text take a [`MessageLookup`]
//! parameter instead of reading global locale state. [`DefaultMessages`]
//! carries the English texts; [`Catalog`] loads a translated JSON file and
//! falls back to the English text, then to the key itself.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Message catalog error
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Failed to read message catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse message catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Keys of every translatable text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKey {
    NoFocus,
    NoRelax,
    FocusOrder,
    MultipleFocus,
    MultipleRelax,
    MissingSemicolon,
    UnbalancedBraces,
    UnusedVariable,
    WrapInFocusRelax,
    AddSemicolon,
    RemoveUnusedVariable,
    RemoveDuplicate,
}

impl MessageKey {
    pub const ALL: [MessageKey; 12] = [
        MessageKey::NoFocus,
        MessageKey::NoRelax,
        MessageKey::FocusOrder,
        MessageKey::MultipleFocus,
        MessageKey::MultipleRelax,
        MessageKey::MissingSemicolon,
        MessageKey::UnbalancedBraces,
        MessageKey::UnusedVariable,
        MessageKey::WrapInFocusRelax,
        MessageKey::AddSemicolon,
        MessageKey::RemoveUnusedVariable,
        MessageKey::RemoveDuplicate,
    ];

    /// Key as it appears in catalog files
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::NoFocus => "error_no_focus",
            MessageKey::NoRelax => "error_no_relax",
            MessageKey::FocusOrder => "error_focus_order",
            MessageKey::MultipleFocus => "error_multiple_focus",
            MessageKey::MultipleRelax => "error_multiple_relax",
            MessageKey::MissingSemicolon => "error_missing_semicolon",
            MessageKey::UnbalancedBraces => "error_unbalanced_braces",
            MessageKey::UnusedVariable => "hint_unused_variable",
            MessageKey::WrapInFocusRelax => "codeaction_focus_wrapper",
            MessageKey::AddSemicolon => "codeaction_add_semicolon",
            MessageKey::RemoveUnusedVariable => "codeaction_remove_unused_variable",
            MessageKey::RemoveDuplicate => "codeaction_remove_duplicate",
        }
    }

    /// English template
    pub fn default_text(&self) -> &'static str {
        match self {
            MessageKey::NoFocus => "Program must start with a '{open}' block",
            MessageKey::NoRelax => "Program must end with '{close}'",
            MessageKey::FocusOrder => "'{open}' must come before '{close}'",
            MessageKey::MultipleFocus => "Only one '{open}' is allowed per program",
            MessageKey::MultipleRelax => "Only one '{close}' is allowed per program",
            MessageKey::MissingSemicolon => "Statement should end with '{terminator}'",
            MessageKey::UnbalancedBraces => "Unbalanced braces, parentheses or brackets",
            MessageKey::UnusedVariable => "Variable '{name}' is declared but never used",
            MessageKey::WrapInFocusRelax => "Wrap program in '{open} {{ ... }} {close}'",
            MessageKey::AddSemicolon => "Add missing '{terminator}'",
            MessageKey::RemoveUnusedVariable => "Remove unused variable '{name}'",
            MessageKey::RemoveDuplicate => "Remove duplicate '{name}'",
        }
    }
}

/// Source of message templates
pub trait MessageLookup: Send + Sync {
    /// Template for a key; may contain `{placeholder}` markers
    fn template(&self, key: MessageKey) -> String;

    /// Template with placeholders substituted
    fn render(&self, key: MessageKey, args: &[(&str, &str)]) -> String {
        render_template(&self.template(key), args)
    }
}

impl<F> MessageLookup for F
where
    F: Fn(MessageKey) -> String + Send + Sync,
{
    fn template(&self, key: MessageKey) -> String {
        self(key)
    }
}

/// Built-in English messages
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl MessageLookup for DefaultMessages {
    fn template(&self, key: MessageKey) -> String {
        key.default_text().to_string()
    }
}

/// Translated messages loaded from a flat JSON object (`{"error_no_focus": "..."}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(flatten)]
    entries: HashMap<String, String>,
}

impl Catalog {
    /// Parse a catalog from JSON text
    pub fn from_json(json: &str) -> Result<Self, MessageError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog file
    pub fn load(path: &Path) -> Result<Self, MessageError> {
        let content = std::fs::read_to_string(path).map_err(|e| MessageError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let catalog = Self::from_json(&content)?;
        log::debug!(
            "loaded {} message(s) from {}",
            catalog.entries.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys this catalog does not translate
    pub fn missing_keys(&self) -> Vec<MessageKey> {
        MessageKey::ALL
            .iter()
            .copied()
            .filter(|k| !self.entries.contains_key(k.as_str()))
            .collect()
    }
}

impl MessageLookup for Catalog {
    fn template(&self, key: MessageKey) -> String {
        match self.entries.get(key.as_str()) {
            Some(text) if !text.is_empty() => text.clone(),
            _ => key.default_text().to_string(),
        }
    }
}

/// Replace `{name}` markers; `{{` and `}}` produce literal braces.
/// Unknown markers are kept as written.
pub fn render_template(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('{') {
            if let Some(close) = tail.find('}') {
                let name = &tail[1..close];
                match args.iter().find(|(k, _)| *k == name) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&tail[..=close]),
                }
                rest = &tail[close + 1..];
                continue;
            }
        }
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}
