//! In-memory source document with offset/position mapping

use crate::diagnostic::TextPosition;

/// A read-only view of a document's text, split into `\n`-terminated lines.
///
/// Offsets are byte offsets into [`SourceDocument::text`]; columns in
/// [`TextPosition`] count characters from the start of the line. A trailing
/// `\r` is part of the line's content.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    text: String,
    /// Byte offset where each line starts
    line_starts: Vec<usize>,
}

impl SourceDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { text, line_starts }
    }

    /// Full text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of lines; an empty document has one (empty) line
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Index of the last line
    pub fn last_line(&self) -> usize {
        self.line_count() - 1
    }

    /// Line content without its `\n`
    pub fn line(&self, index: usize) -> Option<&str> {
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        Some(&self.text[start..end])
    }

    /// All lines in order
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.line_count()).filter_map(move |i| self.line(i))
    }

    /// Length of a line in characters (0 for out-of-range lines)
    pub fn line_len(&self, index: usize) -> usize {
        self.line(index).map(|l| l.chars().count()).unwrap_or(0)
    }

    /// Convert a byte offset to a line/column position.
    ///
    /// Offsets past the end clamp to the end of the document.
    pub fn position_at(&self, offset: usize) -> TextPosition {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        let start = self.line_starts[line];
        let column = self.text[start..floor_char_boundary(&self.text, offset)]
            .chars()
            .count();
        TextPosition::new(line, column)
    }

    /// Convert a position back to a byte offset, clamped to the line's content
    pub fn offset_at(&self, position: TextPosition) -> usize {
        if position.line >= self.line_count() {
            return self.text.len();
        }
        let start = self.line_starts[position.line];
        let line = self.line(position.line).unwrap_or("");
        let within = line
            .char_indices()
            .nth(position.column)
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        start + within
    }

    /// Position just past the last character of the document
    pub fn end_position(&self) -> TextPosition {
        TextPosition::new(self.last_line(), self.line_len(self.last_line()))
    }
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
