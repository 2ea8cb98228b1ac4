//! Comment and string-literal scrubbing
//!
//! Structural scans (brace matching, keyword search) must not see the inside
//! of string literals or comments. [`scrub`] returns a copy of the text where
//! every byte belonging to a literal or comment is replaced by a space, so
//! byte offsets and line breaks are identical to the original.

/// Filler written over scrubbed characters
pub const FILLER: u8 = b' ';

/// Scanner state at a given point of the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrubState {
    /// Ordinary code
    #[default]
    Code,
    /// Inside a double-quoted string literal
    String,
    /// Inside a `//` comment
    LineComment,
    /// Inside a `/* ... */` comment
    BlockComment,
}

/// One line of scrubbed text with the scanner state at both of its ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubbedLine {
    /// The line with literals and comments blanked, without its `\n`
    pub code: String,
    /// State before the first character of the line
    pub starts_in: ScrubState,
    /// State after the last character of the line, before the `\n`
    pub ends_in: ScrubState,
}

/// Replace string literals and comments with spaces.
///
/// The result has the same byte length and the same line breaks as `text`.
/// Unterminated literals and block comments extend to the end of the text.
pub fn scrub(text: &str) -> String {
    let (bytes, _) = scan(text);
    into_string(bytes)
}

/// Scrub `text` and split the result into lines, keeping the scanner state
/// at each line boundary.
pub fn scrub_lines(text: &str) -> Vec<ScrubbedLine> {
    let (bytes, states) = scan(text);
    let scrubbed = into_string(bytes);
    scrubbed
        .split('\n')
        .zip(states)
        .map(|(code, (starts_in, ends_in))| ScrubbedLine {
            code: code.to_string(),
            starts_in,
            ends_in,
        })
        .collect()
}

/// Walk the text once, returning the scrubbed bytes and the
/// `(start, end)` state of every line.
fn scan(text: &str) -> (Vec<u8>, Vec<(ScrubState, ScrubState)>) {
    let src = text.as_bytes();
    let mut out = src.to_vec();
    let mut lines = Vec::new();
    let mut state = ScrubState::Code;
    let mut line_start_state = state;
    let mut i = 0;

    while i < src.len() {
        let b = src[i];

        if b == b'\n' {
            lines.push((line_start_state, state));
            if state == ScrubState::LineComment {
                state = ScrubState::Code;
            }
            line_start_state = state;
            i += 1;
            continue;
        }

        match state {
            ScrubState::Code => match b {
                b'"' => {
                    state = ScrubState::String;
                    out[i] = FILLER;
                }
                b'/' if src.get(i + 1) == Some(&b'/') => {
                    state = ScrubState::LineComment;
                    out[i] = FILLER;
                    out[i + 1] = FILLER;
                    i += 1;
                }
                b'/' if src.get(i + 1) == Some(&b'*') => {
                    state = ScrubState::BlockComment;
                    out[i] = FILLER;
                    out[i + 1] = FILLER;
                    i += 1;
                }
                _ => {}
            },
            ScrubState::String => match b {
                b'\\' => {
                    blank(&mut out, i);
                    // The escaped character belongs to the literal unless it is a line break
                    if let Some(&next) = src.get(i + 1) {
                        if next != b'\n' {
                            blank(&mut out, i + 1);
                            i += 1;
                        }
                    }
                }
                b'"' => {
                    out[i] = FILLER;
                    state = ScrubState::Code;
                }
                _ => blank(&mut out, i),
            },
            ScrubState::LineComment => blank(&mut out, i),
            ScrubState::BlockComment => {
                if b == b'*' && src.get(i + 1) == Some(&b'/') {
                    out[i] = FILLER;
                    out[i + 1] = FILLER;
                    i += 1;
                    state = ScrubState::Code;
                } else {
                    blank(&mut out, i);
                }
            }
        }
        i += 1;
    }

    lines.push((line_start_state, state));
    (out, lines)
}

/// Blank one byte, leaving carriage returns in place
fn blank(out: &mut [u8], i: usize) {
    if out[i] != b'\r' {
        out[i] = FILLER;
    }
}

fn into_string(bytes: Vec<u8>) -> String {
    // Every multi-byte sequence is either kept whole (code) or fully blanked
    // (literals and comments), so the bytes stay valid UTF-8.
    String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
