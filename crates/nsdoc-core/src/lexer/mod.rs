//! Lexer for Clojure source
//!
//! The lexer converts source code into a stream of tokens, handling:
//! - Delimiters and reader macros (`'`, `` ` ``, `~`, `^`, `@`)
//! - Dispatch macros (`#{`, `#(`, `#_`, `#'`, `#?`, tagged literals)
//! - Strings, regexes, characters, numbers, keywords and symbols
//! - Line comments, commas and shebang lines (skipped)

#![allow(clippy::cast_possible_truncation)] // We intentionally use u32 for spans; files > 4GB are unsupported

mod span;
mod token;

pub use span::{LineIndex, Location, Span};
pub use token::TokenKind;

use logos::Logos;
use thiserror::Error;

/// A token with its kind, span, and source text
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'source> {
    /// The kind of token
    pub kind: TokenKind,
    /// The span in the source code
    pub span: Span,
    /// The source text of the token
    pub lexeme: &'source str,
}

/// Lexer error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated regex literal")]
    UnterminatedRegex,
}

/// A lexer error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedError {
    pub error: LexError,
    pub span: Span,
}

impl std::fmt::Display for SpannedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.error, self.span)
    }
}

impl std::error::Error for SpannedError {}

/// The Clojure lexer
pub struct Lexer<'source> {
    source: &'source str,
    inner: logos::Lexer<'source, TokenKind>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source code
    #[must_use]
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
        }
    }

    /// Tokenize the entire source, stopping at the first error
    pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, SpannedError> {
        Lexer::new(source).collect()
    }

    fn classify_error(&self, start: usize) -> SpannedError {
        let rest = &self.source[start..];
        let error = if rest.starts_with('"') {
            LexError::UnterminatedString
        } else if rest.starts_with("#\"") {
            LexError::UnterminatedRegex
        } else {
            LexError::UnexpectedChar(rest.chars().next().unwrap_or('\0'))
        };
        let span = if matches!(
            error,
            LexError::UnterminatedString | LexError::UnterminatedRegex
        ) {
            Span::new(start as u32, self.source.len() as u32)
        } else {
            Span::from_range(self.inner.span())
        };
        SpannedError { error, span }
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Result<Token<'source>, SpannedError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let range = self.inner.span();
        Some(match result {
            Ok(kind) => Ok(Token {
                kind,
                span: Span::from_range(range),
                lexeme: self.inner.slice(),
            }),
            Err(()) => {
                let error = self.classify_error(range.start);
                // Nothing after an unterminated literal can be lexed reliably
                if matches!(
                    error.error,
                    LexError::UnterminatedString | LexError::UnterminatedRegex
                ) {
                    self.inner.bump(self.inner.remainder().len());
                }
                Err(error)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .expect("lexing failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_delimiters_and_symbols() {
        assert_eq!(
            kinds("(defn greet [name] {:a 1})"),
            vec![
                TokenKind::LParen,
                TokenKind::Symbol,
                TokenKind::Symbol,
                TokenKind::LBracket,
                TokenKind::Symbol,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::Keyword,
                TokenKind::Number,
                TokenKind::RBrace,
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_comments_and_commas_are_skipped() {
        let source = "; leading comment\n#!/usr/bin/env bb\n[a, b] ; trailing";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::LBracket,
                TokenKind::Symbol,
                TokenKind::Symbol,
                TokenKind::RBracket,
            ]
        );
    }

    #[test]
    fn test_dispatch_macros() {
        assert_eq!(
            kinds("#{} #(inc %) #_x #'foo #?(:clj 1) #?@(:clj [1]) #inst \"2020\" ##Inf"),
            vec![
                TokenKind::SetStart,
                TokenKind::RBrace,
                TokenKind::AnonFnStart,
                TokenKind::Symbol,
                TokenKind::Symbol,
                TokenKind::RParen,
                TokenKind::Discard,
                TokenKind::Symbol,
                TokenKind::VarQuote,
                TokenKind::Symbol,
                TokenKind::ReaderCond,
                TokenKind::LParen,
                TokenKind::Keyword,
                TokenKind::Number,
                TokenKind::RParen,
                TokenKind::ReaderCondSplice,
                TokenKind::LParen,
                TokenKind::Keyword,
                TokenKind::LBracket,
                TokenKind::Number,
                TokenKind::RBracket,
                TokenKind::RParen,
                TokenKind::Tagged,
                TokenKind::String,
                TokenKind::SymbolicValue,
            ]
        );
    }

    #[test]
    fn test_signed_numbers_versus_symbols() {
        assert_eq!(
            kinds("- -1 +2 -> 1/2 0xFF 1.5e-3 2r101 42N"),
            vec![
                TokenKind::Symbol,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Symbol,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_strings_and_chars() {
        let tokens = Lexer::tokenize(r#""a \"quoted\"
line" \newline \a #"\d+""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[1].kind, TokenKind::Char);
        assert_eq!(tokens[1].lexeme, "\\newline");
        assert_eq!(tokens[2].kind, TokenKind::Char);
        assert_eq!(tokens[3].kind, TokenKind::Regex);
    }

    #[test]
    fn test_symbol_characters() {
        let tokens = Lexer::tokenize("clojure.core/map-indexed ->x a' b# *ns* %1 &").unwrap();
        let lexemes: Vec<_> = tokens.iter().map(|t| t.lexeme).collect();
        assert_eq!(
            lexemes,
            vec!["clojure.core/map-indexed", "->x", "a'", "b#", "*ns*", "%1", "&"]
        );
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Symbol));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::tokenize("(def x \"oops)").unwrap_err();
        assert_eq!(err.error, LexError::UnterminatedString);
        assert_eq!(err.span.start, 7);
    }
}
