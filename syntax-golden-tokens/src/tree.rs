//! Token stream to a tree of bracket groups.

use serde::Serialize;
use syntax_golden::ParseFailure;

use crate::lexer::{LineIndex, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Program,
    Group,
    Word,
    Number,
    String,
    Punct,
    Whitespace,
    Newline,
    Comment,
}

impl From<TokenKind> for NodeKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Word => NodeKind::Word,
            TokenKind::Number => NodeKind::Number,
            TokenKind::String => NodeKind::String,
            TokenKind::Punct => NodeKind::Punct,
            TokenKind::Whitespace => NodeKind::Whitespace,
            TokenKind::Newline => NodeKind::Newline,
            TokenKind::Comment => NodeKind::Comment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Delimiter {
    Paren,
    Bracket,
    Brace,
}

impl Delimiter {
    fn opened_by(text: &str) -> Option<Self> {
        match text {
            "(" => Some(Delimiter::Paren),
            "[" => Some(Delimiter::Bracket),
            "{" => Some(Delimiter::Brace),
            _ => None,
        }
    }

    fn closed_by(text: &str) -> Option<Self> {
        match text {
            ")" => Some(Delimiter::Paren),
            "]" => Some(Delimiter::Bracket),
            "}" => Some(Delimiter::Brace),
            _ => None,
        }
    }

    pub fn open(self) -> char {
        match self {
            Delimiter::Paren => '(',
            Delimiter::Bracket => '[',
            Delimiter::Brace => '{',
        }
    }

    pub fn close(self) -> char {
        match self {
            Delimiter::Paren => ')',
            Delimiter::Bracket => ']',
            Delimiter::Brace => '}',
        }
    }
}

/// Byte range of a node plus the 1-based line and column where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    fn new(source: &str, lines: &LineIndex, start: usize, end: usize) -> Self {
        let position = lines.position(source, start);
        Span {
            start,
            end,
            line: position.line,
            column: position.column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<Delimiter>,
    pub span: Span,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    fn leaf(source: &str, lines: &LineIndex, token: Token) -> Self {
        Node {
            kind: token.kind.into(),
            span: Span::new(source, lines, token.start, token.end),
            text: Some(token.text),
            delimiter: None,
            children: Vec::new(),
        }
    }
}

/// Which tokens end up in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    pub keep_whitespace: bool,
    pub keep_comments: bool,
}

impl TreeOptions {
    fn keeps(&self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::Whitespace => self.keep_whitespace,
            TokenKind::Comment => self.keep_comments,
            _ => true,
        }
    }
}

struct OpenGroup {
    delimiter: Delimiter,
    start: usize,
    children: Vec<Node>,
}

/// Nest `tokens` into groups under a `Program` root.
pub fn build_tree(
    source: &str,
    lines: &LineIndex,
    tokens: Vec<Token>,
    options: TreeOptions,
) -> Result<Node, ParseFailure> {
    let mut open: Vec<OpenGroup> = Vec::new();
    let mut top: Vec<Node> = Vec::new();

    for token in tokens {
        if !options.keeps(token.kind) {
            continue;
        }

        let node = if token.kind != TokenKind::Punct {
            Node::leaf(source, lines, token)
        } else if let Some(delimiter) = Delimiter::opened_by(&token.text) {
            open.push(OpenGroup {
                delimiter,
                start: token.start,
                children: Vec::new(),
            });
            continue;
        } else if let Some(delimiter) = Delimiter::closed_by(&token.text) {
            let position = lines.position(source, token.start);
            let group = open
                .pop()
                .ok_or_else(|| ParseFailure::at(format!("unexpected `{}`", token.text), position))?;
            if group.delimiter != delimiter {
                return Err(ParseFailure::at(
                    format!(
                        "mismatched `{}`, expected `{}`",
                        token.text,
                        group.delimiter.close()
                    ),
                    position,
                ));
            }
            Node {
                kind: NodeKind::Group,
                text: None,
                delimiter: Some(delimiter),
                span: Span::new(source, lines, group.start, token.end),
                children: group.children,
            }
        } else {
            Node::leaf(source, lines, token)
        };

        match open.last_mut() {
            Some(group) => group.children.push(node),
            None => top.push(node),
        }
    }

    if let Some(group) = open.last() {
        return Err(ParseFailure::at(
            format!("unclosed `{}`", group.delimiter.open()),
            lines.position(source, group.start),
        ));
    }

    Ok(Node {
        kind: NodeKind::Program,
        text: None,
        delimiter: None,
        span: Span::new(source, lines, 0, source.len()),
        children: top,
    })
}
