//! Forms produced by the reader

use std::fmt::{self, Write};

use crate::lexer::Span;

/// A form read from source, with its span and any reader metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    /// The kind of form
    pub kind: FormKind,
    /// Source span of the form, including any leading `^meta`
    pub span: Span,
    /// Metadata attached with `^`, as flat key/value pairs in reading order
    pub meta: Vec<(Form, Form)>,
}

/// The kind of a form
#[derive(Debug, Clone, PartialEq)]
pub enum FormKind {
    Nil,
    Bool(bool),
    /// Numeric literal, kept as written
    Number(String),
    /// String literal, unescaped
    Str(String),
    /// Character literal as written, without the backslash
    Char(String),
    /// Keyword name without the leading colon (`::x` is stored as `:x`)
    Keyword(String),
    Symbol(String),
    List(Vec<Form>),
    Vector(Vec<Form>),
    /// Map entries in source order
    Map(Vec<(Form, Form)>),
    Set(Vec<Form>),
    /// `'x`
    Quote(Box<Form>),
    /// `` `x ``
    SyntaxQuote(Box<Form>),
    /// `~x`
    Unquote(Box<Form>),
    /// `~@x`
    UnquoteSplicing(Box<Form>),
    /// `@x`
    Deref(Box<Form>),
    /// `#'x`
    Var(Box<Form>),
    /// `#(...)`
    AnonFn(Vec<Form>),
    /// `#"..."`, pattern as written
    Regex(String),
    /// `##Inf` and friends, without the `##`
    SymbolicValue(String),
    /// `#tag form`
    Tagged(String, Box<Form>),
}

impl Form {
    /// Create a form without metadata
    #[must_use]
    pub fn new(kind: FormKind, span: Span) -> Self {
        Self {
            kind,
            span,
            meta: Vec::new(),
        }
    }

    /// The symbol name, if this is a symbol
    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            FormKind::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// The keyword name, if this is a keyword
    pub fn as_keyword(&self) -> Option<&str> {
        match &self.kind {
            FormKind::Keyword(k) => Some(k),
            _ => None,
        }
    }

    /// The string contents, if this is a string literal
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            FormKind::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The elements of a list
    pub fn as_list(&self) -> Option<&[Form]> {
        match &self.kind {
            FormKind::List(items) => Some(items),
            _ => None,
        }
    }

    /// The elements of a vector
    pub fn as_vector(&self) -> Option<&[Form]> {
        match &self.kind {
            FormKind::Vector(items) => Some(items),
            _ => None,
        }
    }

    /// The entries of a map
    pub fn as_map(&self) -> Option<&[(Form, Form)]> {
        match &self.kind {
            FormKind::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Is this a list whose first element is the symbol `head`?
    pub fn is_call_to(&self, head: &str) -> bool {
        self.as_list()
            .and_then(<[Form]>::first)
            .and_then(Form::as_symbol)
            == Some(head)
    }

    /// Look up a keyword key in a map form
    pub fn map_get(&self, key: &str) -> Option<&Form> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_keyword() == Some(key))
            .map(|(_, v)| v)
    }

    /// Look up a keyword key in this form's metadata (later entries win)
    pub fn meta_get(&self, key: &str) -> Option<&Form> {
        self.meta
            .iter()
            .rev()
            .find(|(k, _)| k.as_keyword() == Some(key))
            .map(|(_, v)| v)
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Form], close: char) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_char(' ')?;
        }
        write!(f, "{item}")?;
    }
    f.write_char(close)
}

fn write_str_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

/// Prints the form as Clojure source, without metadata
impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FormKind::Nil => f.write_str("nil"),
            FormKind::Bool(b) => write!(f, "{b}"),
            FormKind::Number(n) => f.write_str(n),
            FormKind::Str(s) => write_str_literal(f, s),
            FormKind::Char(c) => write!(f, "\\{c}"),
            FormKind::Keyword(k) => write!(f, ":{k}"),
            FormKind::Symbol(s) => f.write_str(s),
            FormKind::List(items) => write_seq(f, "(", items, ')'),
            FormKind::Vector(items) => write_seq(f, "[", items, ']'),
            FormKind::Map(entries) => {
                f.write_char('{')?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k} {v}")?;
                }
                f.write_char('}')
            }
            FormKind::Set(items) => write_seq(f, "#{", items, '}'),
            FormKind::Quote(inner) => write!(f, "(quote {inner})"),
            FormKind::SyntaxQuote(inner) => write!(f, "`{inner}"),
            FormKind::Unquote(inner) => write!(f, "~{inner}"),
            FormKind::UnquoteSplicing(inner) => write!(f, "~@{inner}"),
            FormKind::Deref(inner) => write!(f, "(clojure.core/deref {inner})"),
            FormKind::Var(inner) => write!(f, "(var {inner})"),
            FormKind::AnonFn(items) => write_seq(f, "#(", items, ')'),
            FormKind::Regex(pattern) => write!(f, "#\"{pattern}\""),
            FormKind::SymbolicValue(v) => write!(f, "##{v}"),
            FormKind::Tagged(tag, inner) => write!(f, "#{tag} {inner}"),
        }
    }
}
