//! Reader error types

use thiserror::Error;

use crate::lexer::{LexError, Location, TokenKind};

/// A reader error with the location where it occurred
#[derive(Debug, Clone, PartialEq)]
pub struct ReadError {
    /// The kind of error
    pub kind: ReadErrorKind,
    /// Line and column of the offending token
    pub location: Location,
}

impl ReadError {
    /// Create a new read error
    #[must_use]
    pub fn new(kind: ReadErrorKind, location: Location) -> Self {
        Self { kind, location }
    }
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.kind, self.location.line, self.location.column
        )
    }
}

impl std::error::Error for ReadError {}

/// The kind of read error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadErrorKind {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected end of file while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("unmatched delimiter {0}")]
    UnmatchedDelimiter(TokenKind),

    #[error("map literal must contain an even number of forms")]
    OddMapEntries,

    #[error("metadata must be a symbol, keyword, string or map")]
    InvalidMetadata,

    #[error("reader conditional must contain an even number of forms")]
    OddReaderConditional,

    #[error("splicing reader conditional used outside a collection")]
    TopLevelSplice,

    #[error("invalid escape sequence '\\{0}' in string")]
    InvalidEscape(char),

    #[error("namespaced map prefix must be followed by a map")]
    NamespacedMapWithoutMap,
}
