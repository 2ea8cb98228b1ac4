//! Document outline: symbols and folding ranges for block constructs
//!
//! Block keywords (`session Name {`, `deepFocus {`, ...) are recognised at the
//! start of a line's code. A block extends from its line to the `}` matching
//! its first `{`, found by brace matching over scrubbed text; an unmatched
//! block runs to the end of the document.

use crate::diagnostic::{TextPosition, TextRange};
use crate::document::SourceDocument;
use crate::language::{is_identifier, is_word_char, BlockKeyword, BlockScope, LanguageFacts, SymbolKind};
use crate::lines::{LineModel, LineShape};
use serde::{Deserialize, Serialize};

/// An outline entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSymbol {
    pub name: String,
    pub detail: String,
    pub kind: SymbolKind,
    /// Whole block, declaration line through closing brace line
    pub range: TextRange,
    /// The name (or keyword, for anonymous blocks)
    pub selection_range: TextRange,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentSymbol>,
}

/// A foldable line span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldingRange {
    pub start_line: usize,
    pub end_line: usize,
}

/// A recognised block header
struct BlockHeader<'f> {
    block: &'f BlockKeyword,
    name: String,
    /// Character column of the name (or keyword)
    name_column: usize,
    /// Character column just past the keyword
    after_keyword: usize,
}

fn match_header<'f>(line: &LineShape<'_>, facts: &'f LanguageFacts) -> Option<BlockHeader<'f>> {
    let word = line.first_word()?;
    let block = facts.block(word)?;
    let keyword_column = line.code.chars().take_while(|c| c.is_whitespace()).count();
    let after_keyword = keyword_column + word.chars().count();

    if !block.named {
        return Some(BlockHeader {
            block,
            name: word.to_string(),
            name_column: keyword_column,
            after_keyword,
        });
    }

    // `keyword <whitespace> identifier`
    let rest: String = line.code.chars().skip(after_keyword).collect();
    let gap = rest.chars().take_while(|c| c.is_whitespace()).count();
    if gap == 0 {
        return None;
    }
    let name: String = rest
        .chars()
        .skip(gap)
        .take_while(|c| is_word_char(*c))
        .collect();
    if !is_identifier(&name) {
        return None;
    }
    Some(BlockHeader {
        block,
        name,
        name_column: after_keyword + gap,
        after_keyword,
    })
}

/// Scans the scrubbed lines for block extents
struct BlockScanner<'a> {
    document: &'a SourceDocument,
    lines: &'a LineModel<'a>,
    facts: &'a LanguageFacts,
}

impl<'a> BlockScanner<'a> {
    /// First `{` at or after `(line, column)`, stopping at a terminator
    fn opening_brace(&self, line: usize, column: usize) -> Option<TextPosition> {
        for index in line..self.lines.len() {
            let shape = self.lines.get(index)?;
            let skip = if index == line { column } else { 0 };
            for (col, c) in shape.code.chars().enumerate().skip(skip) {
                if c == '{' {
                    return Some(TextPosition::new(index, col));
                }
                if c == self.facts.terminator {
                    return None;
                }
            }
        }
        None
    }

    /// Matching `}` for the brace at `open`, or the end of the document
    fn block_end(&self, open: TextPosition) -> TextPosition {
        let mut depth = 0usize;
        for index in open.line..self.lines.len() {
            let Some(shape) = self.lines.get(index) else {
                break;
            };
            let skip = if index == open.line { open.column } else { 0 };
            for (col, c) in shape.code.chars().enumerate().skip(skip) {
                match c {
                    '{' => depth += 1,
                    '}' => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            return TextPosition::new(index, col);
                        }
                    }
                    _ => {}
                }
            }
        }
        self.document.end_position()
    }

    /// Last line of the block declared on `line`
    fn end_line(&self, line: usize, header: &BlockHeader<'_>) -> usize {
        self.opening_brace(line, header.after_keyword)
            .map(|open| self.block_end(open).line)
            .unwrap_or(line)
    }

    fn symbol(&self, line: usize, header: &BlockHeader<'_>) -> (DocumentSymbol, usize) {
        let end_line = self.end_line(line, header);
        let range = TextRange::new(
            TextPosition::new(line, 0),
            TextPosition::new(end_line, self.document.line_len(end_line)),
        );
        let selection = TextRange::with_len(
            TextPosition::new(line, header.name_column),
            header.name.chars().count(),
        );
        let detail = if header.block.named {
            header.block.keyword.clone()
        } else {
            "block".to_string()
        };
        let symbol = DocumentSymbol {
            name: header.name.clone(),
            detail,
            kind: header.block.kind,
            range,
            selection_range: selection,
            children: Vec::new(),
        };
        (symbol, end_line)
    }

    /// Symbols declared in lines `from..to`
    fn symbols_in(&self, from: usize, to: usize, nested: bool) -> Vec<DocumentSymbol> {
        let mut symbols = Vec::new();
        let mut line = from;

        while line < to {
            let Some(shape) = self.lines.get(line) else {
                break;
            };
            let header = if shape.is_verbatim() {
                None
            } else {
                match_header(&shape, self.facts)
            };
            let Some(header) = header else {
                line += 1;
                continue;
            };

            match header.block.scope {
                BlockScope::Transparent if !nested => {
                    let (symbol, _) = self.symbol(line, &header);
                    symbols.push(symbol);
                    line += 1;
                }
                BlockScope::Container if !nested => {
                    let (mut symbol, end_line) = self.symbol(line, &header);
                    symbol.children = self.symbols_in(line + 1, end_line, true);
                    symbols.push(symbol);
                    line = end_line.max(line) + 1;
                }
                BlockScope::Transparent | BlockScope::Container => {
                    line += 1;
                }
                BlockScope::Leaf => {
                    let (symbol, end_line) = self.symbol(line, &header);
                    symbols.push(symbol);
                    line = end_line.max(line) + 1;
                }
            }
        }

        symbols
    }
}

/// Outline of a document
pub fn document_symbols(document: &SourceDocument, facts: &LanguageFacts) -> Vec<DocumentSymbol> {
    let lines = LineModel::new(document.text());
    let scanner = BlockScanner {
        document,
        lines: &lines,
        facts,
    };
    scanner.symbols_in(0, lines.len(), false)
}

/// One folding range per multi-line block construct, nested blocks included
pub fn folding_ranges(document: &SourceDocument, facts: &LanguageFacts) -> Vec<FoldingRange> {
    let lines = LineModel::new(document.text());
    let scanner = BlockScanner {
        document,
        lines: &lines,
        facts,
    };

    lines
        .iter()
        .filter(|shape| !shape.is_verbatim())
        .filter_map(|shape| {
            let header = match_header(&shape, facts)?;
            let open = scanner.opening_brace(shape.index, header.after_keyword)?;
            let end = scanner.block_end(open);
            (end.line > shape.index).then_some(FoldingRange {
                start_line: shape.index,
                end_line: end.line,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = "\
Focus {
    session Patient {
        expose name: string;
        suggestion greet() {
            observe \"} hi {\";
        }
        trigger onWake = suggestion() {
            awaken;
        }
    }

    // session Commented {
    tranceify Point {
        x: number;
    }

    deepFocus {
        observe 1;
    }
} Relax";

    fn symbols() -> Vec<DocumentSymbol> {
        document_symbols(&SourceDocument::new(PROGRAM), &LanguageFacts::default())
    }

    #[test]
    fn test_top_level_symbols() {
        let names: Vec<_> = symbols().iter().map(|s| (s.name.clone(), s.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("Focus".to_string(), SymbolKind::Module),
                ("Patient".to_string(), SymbolKind::Class),
                ("Point".to_string(), SymbolKind::Struct),
                ("deepFocus".to_string(), SymbolKind::Namespace),
            ]
        );
    }

    #[test]
    fn test_focus_spans_document() {
        let focus = &symbols()[0];
        assert_eq!(focus.range.start, TextPosition::new(0, 0));
        assert_eq!(focus.range.end, TextPosition::new(19, 7));
        assert_eq!(focus.detail, "block");
    }

    #[test]
    fn test_session_children() {
        let session = &symbols()[1];
        assert_eq!(session.range.start.line, 1);
        assert_eq!(session.range.end.line, 9);
        assert_eq!(
            session.selection_range,
            TextRange::new(TextPosition::new(1, 12), TextPosition::new(1, 19))
        );
        let children: Vec<_> = session
            .children
            .iter()
            .map(|c| (c.name.as_str(), c.kind, c.range.start.line, c.range.end.line))
            .collect();
        assert_eq!(
            children,
            vec![
                ("greet", SymbolKind::Method, 3, 5),
                ("onWake", SymbolKind::Event, 6, 8),
            ]
        );
    }

    #[test]
    fn test_folding_ranges_include_nested_blocks() {
        let ranges = folding_ranges(&SourceDocument::new(PROGRAM), &LanguageFacts::default());
        let spans: Vec<_> = ranges.iter().map(|r| (r.start_line, r.end_line)).collect();
        assert_eq!(spans, vec![(0, 19), (1, 9), (3, 5), (6, 8), (12, 14), (16, 18)]);
    }

    #[test]
    fn test_unclosed_block_runs_to_end() {
        let doc = SourceDocument::new("suggestion open() {\n    observe 1;\n");
        let symbols = document_symbols(&doc, &LanguageFacts::default());
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].range.end, TextPosition::new(2, 0));
    }

    #[test]
    fn test_single_line_block_does_not_fold() {
        let doc = SourceDocument::new("deepFocus { observe 1; }");
        assert!(folding_ranges(&doc, &LanguageFacts::default()).is_empty());
        assert_eq!(document_symbols(&doc, &LanguageFacts::default()).len(), 1);
    }

    #[test]
    fn test_named_block_requires_identifier() {
        let doc = SourceDocument::new("session {\n}\nsessions Foo {\n}");
        assert!(document_symbols(&doc, &LanguageFacts::default()).is_empty());
    }
}
