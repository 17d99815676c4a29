//! Token types for the Clojure lexer

use logos::Logos;

/// The kind of token produced by the lexer
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"([ \t\r\n\f,]+|;[^\n]*|#![^\n]*)")]
pub enum TokenKind {
    // ========== Delimiters ==========
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // ========== Reader macros ==========
    #[token("'")]
    Quote,
    #[token("`")]
    SyntaxQuote,
    #[token("~")]
    Unquote,
    #[token("~@")]
    UnquoteSplicing,
    #[token("@")]
    Deref,
    /// `^` or the legacy `#^`
    #[token("^")]
    #[token("#^")]
    Meta,

    // ========== Dispatch macros ==========
    /// `#{`
    #[token("#{")]
    SetStart,
    /// `#(`
    #[token("#(")]
    AnonFnStart,
    /// `#_`
    #[token("#_")]
    Discard,
    /// `#'`
    #[token("#'")]
    VarQuote,
    /// `#?`
    #[token("#?")]
    ReaderCond,
    /// `#?@`
    #[token("#?@")]
    ReaderCondSplice,
    /// `##Inf`, `##-Inf`, `##NaN`
    #[regex(r"##[A-Za-z-]+")]
    SymbolicValue,
    /// `#:ns{...}` or `#::{...}`
    #[regex(r#"#::?[^\s,;()\[\]{}"\\^@~`]*"#)]
    NamespacedMap,
    /// `#inst`, `#uuid`, `#my/tag`
    #[regex(r#"#[a-zA-Z][^\s,;()\[\]{}"\\^@~`]*"#)]
    Tagged,

    // ========== Literals ==========
    #[regex(r#""([^"\\]|\\(.|\n))*""#)]
    String,
    #[regex(r#"#"([^"\\]|\\(.|\n))*""#)]
    Regex,
    #[regex(r"\\(newline|space|tab|formfeed|backspace|return|u[0-9a-fA-F]{4}|o[0-7]{1,3}|\S)")]
    Char,
    /// Integers, floats, ratios, radix and suffixed numbers
    #[regex(r"[+-]?[0-9][0-9a-zA-Z.+/-]*", priority = 5)]
    Number,
    #[regex(r#":[^\s,;()\[\]{}"\\^@~`]+"#)]
    Keyword,
    /// Symbols, including `nil`, `true` and `false`
    #[regex(r#"[^\s,;()\[\]{}"\\^@~`0-9:#'][^\s,;()\[\]{}"\\^@~`]*"#, priority = 1)]
    Symbol,
}

impl TokenKind {
    /// Returns true for tokens that close a collection
    #[must_use]
    pub fn is_closing(self) -> bool {
        matches!(self, Self::RParen | Self::RBracket | Self::RBrace)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Quote => "quote",
            Self::SyntaxQuote => "syntax quote",
            Self::Unquote => "unquote",
            Self::UnquoteSplicing => "unquote-splicing",
            Self::Deref => "deref",
            Self::Meta => "metadata",
            Self::SetStart => "'#{'",
            Self::AnonFnStart => "'#('",
            Self::Discard => "'#_'",
            Self::VarQuote => "var quote",
            Self::ReaderCond => "reader conditional",
            Self::ReaderCondSplice => "splicing reader conditional",
            Self::SymbolicValue => "symbolic value",
            Self::NamespacedMap => "namespaced map",
            Self::Tagged => "tagged literal",
            Self::String => "string",
            Self::Regex => "regex",
            Self::Char => "character",
            Self::Number => "number",
            Self::Keyword => "keyword",
            Self::Symbol => "symbol",
        };
        f.write_str(text)
    }
}
