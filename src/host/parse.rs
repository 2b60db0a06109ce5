//! Parse adapter.

use serde::Serialize;
use thiserror::Error;

use super::CapabilitySurface;

/// Location inside a source text. Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourcePosition {
    /// Byte offset from the start of the text.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

/// Rejection of a source text by a parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", describe_position(.position))]
pub struct ParseFailure {
    pub message: String,
    pub position: Option<SourcePosition>,
}

fn describe_position(position: &Option<SourcePosition>) -> String {
    match position {
        Some(position) => format!(" at line {}, column {}", position.line, position.column),
        None => String::new(),
    }
}

impl ParseFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    pub fn at(message: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            message: message.into(),
            position: Some(position),
        }
    }
}

/// Converts source text into a structured syntax representation.
///
/// The output only needs to be serializable; the harness turns it into
/// canonical JSON before comparing it with a recorded baseline.
pub trait SourceParser: CapabilitySurface {
    type Output: Serialize;

    fn parse(&self, source: &str) -> Result<Self::Output, ParseFailure>;
}
