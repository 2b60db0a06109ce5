//! Token-tree parser for syntax-golden.
//!
//! Source text is split into words, numbers, string literals, punctuation,
//! line breaks and comments, and bracket pairs are nested into groups. The
//! result is a language-agnostic tree that is stable enough to snapshot:
//! it changes only when the text's token structure changes.
//!
//! ## Usage
//!
//! ```
//! use syntax_golden::SourceParser;
//! use syntax_golden_tokens::{NodeKind, TokenTreeParser};
//!
//! let tree = TokenTreeParser::new().parse("call(a, [b])").unwrap();
//! assert_eq!(tree.kind, NodeKind::Program);
//! assert_eq!(tree.children.len(), 2);
//! ```

mod lexer;
mod tree;

pub use lexer::{LineIndex, Token, TokenKind};
pub use tree::{Delimiter, Node, NodeKind, Span, TreeOptions};

use syntax_golden::{CapabilitySurface, ParseFailure, SourceParser};

/// Parses any text into a [`Node`] tree rooted at a `Program` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTreeParser {
    options: TreeOptions,
}

impl Default for TokenTreeParser {
    fn default() -> Self {
        TokenTreeParser {
            options: TreeOptions {
                keep_whitespace: false,
                keep_comments: true,
            },
        }
    }
}

impl TokenTreeParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_whitespace(mut self, keep: bool) -> Self {
        self.options.keep_whitespace = keep;
        self
    }

    pub fn with_comments(mut self, keep: bool) -> Self {
        self.options.keep_comments = keep;
        self
    }
}

impl CapabilitySurface for TokenTreeParser {
    fn surface_name(&self) -> &str {
        "Reflect"
    }

    fn capabilities(&self) -> &[&'static str] {
        &["parse"]
    }
}

impl SourceParser for TokenTreeParser {
    type Output = Node;

    fn parse(&self, source: &str) -> Result<Node, ParseFailure> {
        let lines = LineIndex::new(source);
        let tokens = lexer::tokenize(source, &lines)?;
        tree::build_tree(source, &lines, tokens, self.options)
    }
}
