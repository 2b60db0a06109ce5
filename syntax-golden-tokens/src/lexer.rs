//! Source text to a flat token stream.
//!
//! Segmentation follows Unicode word boundaries. String literals and
//! comments cut across those boundaries, so they are scanned directly
//! from the text and segmentation restarts after them.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::Serialize;
use syntax_golden::{ParseFailure, SourcePosition};
use unicode_segmentation::UnicodeSegmentation;

/// Multi-character operators, built up one punctuation segment at a time.
/// Every prefix of a longer operator must be present too.
static OPERATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "==", "===", "!=", "!==", "<=", ">=", "=>", "->", "&&", "||", "??", "?.", "++", "--",
        "+=", "-=", "*=", "/=", "%=", "**", "<<", ">>", ">>>", "::", "..", "...",
    ]
    .iter()
    .copied()
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Word,
    Number,
    String,
    Punct,
    Whitespace,
    Newline,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offsets into the source.
    pub start: usize,
    pub end: usize,
}

impl Token {
    fn new(kind: TokenKind, text: &str, start: usize) -> Self {
        Token {
            kind,
            text: text.to_string(),
            start,
            end: start + text.len(),
        }
    }
}

/// Byte offsets of line starts, for turning offsets into lines and columns.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(index, _)| index + 1),
        );
        LineIndex { starts }
    }

    /// 1-based line and column (in characters) of a byte offset.
    pub fn position(&self, source: &str, offset: usize) -> SourcePosition {
        let line = self.starts.partition_point(|start| *start <= offset);
        let line_start = self.starts[line - 1];
        SourcePosition {
            offset,
            line,
            column: source[line_start..offset].chars().count() + 1,
        }
    }
}

/// Split `source` into tokens, whitespace and comments included.
pub fn tokenize(source: &str, lines: &LineIndex) -> Result<Vec<Token>, ParseFailure> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut offset = 0;

    'scan: while offset < source.len() {
        for (index, segment) in source[offset..].split_word_bound_indices() {
            let start = offset + index;
            if let Some(token) = scan_delimited(source, start, lines)? {
                offset = token.end;
                tokens.push(token);
                continue 'scan;
            }
            push_segment(&mut tokens, segment, start);
        }
        break;
    }

    Ok(tokens)
}

/// A string literal or comment starting at `start`, if there is one.
fn scan_delimited(
    source: &str,
    start: usize,
    lines: &LineIndex,
) -> Result<Option<Token>, ParseFailure> {
    let rest = &source[start..];

    if rest.starts_with("//") {
        let len = rest.find(|c: char| c == '\n' || c == '\r').unwrap_or(rest.len());
        return Ok(Some(Token::new(TokenKind::Comment, &rest[..len], start)));
    }

    if rest.starts_with("/*") {
        return match rest[2..].find("*/") {
            Some(index) => Ok(Some(Token::new(TokenKind::Comment, &rest[..index + 4], start))),
            None => Err(ParseFailure::at(
                "unterminated block comment",
                lines.position(source, start),
            )),
        };
    }

    let quote = match rest.chars().next() {
        Some(c @ ('"' | '\'' | '`')) => c,
        _ => return Ok(None),
    };

    let mut escaped = false;
    for (index, c) in rest.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            // Only template literals may span lines.
            '\n' if quote != '`' => break,
            c if c == quote => {
                return Ok(Some(Token::new(
                    TokenKind::String,
                    &rest[..index + c.len_utf8()],
                    start,
                )))
            }
            _ => {}
        }
    }

    Err(ParseFailure::at(
        "unterminated string literal",
        lines.position(source, start),
    ))
}

fn classify(segment: &str) -> TokenKind {
    if segment.chars().all(|c| c == '\n' || c == '\r') {
        TokenKind::Newline
    } else if segment.chars().all(char::is_whitespace) {
        TokenKind::Whitespace
    } else if segment.starts_with(|c: char| c.is_ascii_digit()) {
        TokenKind::Number
    } else if segment.chars().any(|c| c.is_alphanumeric() || c == '_') {
        TokenKind::Word
    } else {
        TokenKind::Punct
    }
}

fn push_segment(tokens: &mut Vec<Token>, segment: &str, start: usize) {
    match classify(segment) {
        TokenKind::Punct => push_punct(tokens, segment, start),
        // Word boundaries keep `a.b` together; member access is split here.
        TokenKind::Word if segment.contains('.') => {
            let mut cursor = start;
            for (i, piece) in segment.split('.').enumerate() {
                if i > 0 {
                    push_punct(tokens, ".", cursor);
                    cursor += 1;
                }
                if !piece.is_empty() {
                    tokens.push(Token::new(classify(piece), piece, cursor));
                }
                cursor += piece.len();
            }
        }
        kind => tokens.push(Token::new(kind, segment, start)),
    }
}

fn push_punct(tokens: &mut Vec<Token>, segment: &str, start: usize) {
    if let Some(last) = tokens.last_mut() {
        if last.kind == TokenKind::Punct && last.end == start {
            let joined = format!("{}{}", last.text, segment);
            if OPERATORS.contains(joined.as_str()) {
                last.text = joined;
                last.end = start + segment.len();
                return;
            }
        }
    }
    tokens.push(Token::new(TokenKind::Punct, segment, start));
}
