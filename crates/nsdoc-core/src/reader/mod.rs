//! Reader for Clojure source
//!
//! Turns the token stream into [`Form`]s. Reader conditionals are resolved
//! while reading against the configured feature set, `#_` forms are dropped
//! and `^meta` is attached to the form it precedes.

mod error;
mod form;

pub use error::{ReadError, ReadErrorKind};
pub use form::{Form, FormKind};

use crate::lexer::{Lexer, LineIndex, Location, Span, Token, TokenKind};

/// Feature used for reader conditionals when none is configured
pub const DEFAULT_FEATURE: &str = "clj";

/// Options controlling how source is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Features selected in reader conditionals, in addition to `:default`
    pub features: Vec<String>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            features: vec![DEFAULT_FEATURE.to_string()],
        }
    }
}

impl ReaderOptions {
    fn selects(&self, feature: &str) -> bool {
        feature == "default" || self.features.iter().any(|f| f == feature)
    }
}

/// Streaming reader over one source text
pub struct Reader<'source> {
    source: &'source str,
    lexer: Lexer<'source>,
    peeked: Option<Token<'source>>,
    line_index: LineIndex,
    options: ReaderOptions,
}

impl<'source> Reader<'source> {
    /// Create a reader for the given source
    #[must_use]
    pub fn new(source: &'source str, options: ReaderOptions) -> Self {
        Self {
            source,
            lexer: Lexer::new(source),
            peeked: None,
            line_index: LineIndex::new(source),
            options,
        }
    }

    /// Read every top-level form in `source`
    pub fn read_all(source: &str, options: ReaderOptions) -> Result<Vec<Form>, ReadError> {
        Reader::new(source, options).collect()
    }

    /// Line and column of a byte offset in the source being read
    #[must_use]
    pub fn location(&self, offset: u32) -> Location {
        self.line_index.location(self.source, offset)
    }

    /// Read the next top-level form, or `None` at end of input
    pub fn next_form(&mut self) -> Result<Option<Form>, ReadError> {
        loop {
            let Some(token) = self.next_token()? else {
                return Ok(None);
            };
            if token.kind.is_closing() {
                return Err(self.error(ReadErrorKind::UnmatchedDelimiter(token.kind), token.span));
            }
            let mut out = Vec::new();
            self.read_item(token, &mut out, false)?;
            if let Some(form) = out.pop() {
                return Ok(Some(form));
            }
        }
    }

    fn error(&self, kind: ReadErrorKind, span: Span) -> ReadError {
        ReadError::new(kind, self.location(span.start))
    }

    fn eof(&self, what: &'static str) -> ReadError {
        #[allow(clippy::cast_possible_truncation)]
        let end = self.source.len() as u32;
        self.error(ReadErrorKind::UnexpectedEof(what), Span::new(end, end))
    }

    fn next_token(&mut self) -> Result<Option<Token<'source>>, ReadError> {
        if let Some(token) = self.peeked.take() {
            return Ok(Some(token));
        }
        match self.lexer.next() {
            None => Ok(None),
            Some(Ok(token)) => Ok(Some(token)),
            Some(Err(e)) => Err(self.error(ReadErrorKind::Lex(e.error), e.span)),
        }
    }

    fn peek_kind(&mut self) -> Result<Option<TokenKind>, ReadError> {
        if self.peeked.is_none() {
            self.peeked = self.next_token()?;
        }
        Ok(self.peeked.as_ref().map(|t| t.kind))
    }

    /// Read exactly one form, skipping anything that reads as nothing
    fn read_one(&mut self, what: &'static str) -> Result<Form, ReadError> {
        loop {
            let token = self.next_token()?.ok_or_else(|| self.eof(what))?;
            if token.kind.is_closing() {
                return Err(self.error(ReadErrorKind::UnmatchedDelimiter(token.kind), token.span));
            }
            let mut out = Vec::new();
            self.read_item(token, &mut out, false)?;
            if let Some(form) = out.pop() {
                return Ok(form);
            }
        }
    }

    /// Read forms up to the `close` delimiter, returning them and the closing span
    fn read_seq(
        &mut self,
        close: TokenKind,
        what: &'static str,
    ) -> Result<(Vec<Form>, Span), ReadError> {
        let mut items = Vec::new();
        loop {
            let token = self.next_token()?.ok_or_else(|| self.eof(what))?;
            if token.kind == close {
                return Ok((items, token.span));
            }
            if token.kind.is_closing() {
                return Err(self.error(ReadErrorKind::UnmatchedDelimiter(token.kind), token.span));
            }
            self.read_item(token, &mut items, true)?;
        }
    }

    /// Read the item starting at `token` into `out`.
    ///
    /// An item reads as zero forms (`#_x`, a conditional with no matching
    /// branch), one form, or several (`#?@` inside a collection).
    fn read_item(
        &mut self,
        token: Token<'source>,
        out: &mut Vec<Form>,
        in_collection: bool,
    ) -> Result<(), ReadError> {
        let start = token.span;
        let lexeme = token.lexeme;
        let form = match token.kind {
            TokenKind::LParen => {
                let (items, end) = self.read_seq(TokenKind::RParen, "list")?;
                Form::new(FormKind::List(items), start.merge(end))
            }
            TokenKind::LBracket => {
                let (items, end) = self.read_seq(TokenKind::RBracket, "vector")?;
                Form::new(FormKind::Vector(items), start.merge(end))
            }
            TokenKind::LBrace => {
                let (items, end) = self.read_seq(TokenKind::RBrace, "map")?;
                let span = start.merge(end);
                Form::new(FormKind::Map(self.pair_up(items, span)?), span)
            }
            TokenKind::SetStart => {
                let (items, end) = self.read_seq(TokenKind::RBrace, "set")?;
                Form::new(FormKind::Set(items), start.merge(end))
            }
            TokenKind::AnonFnStart => {
                let (items, end) = self.read_seq(TokenKind::RParen, "function literal")?;
                Form::new(FormKind::AnonFn(items), start.merge(end))
            }
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                return Err(self.error(ReadErrorKind::UnmatchedDelimiter(token.kind), start));
            }
            TokenKind::Quote => self.wrap(start, "quoted form", FormKind::Quote)?,
            TokenKind::SyntaxQuote => self.wrap(start, "syntax-quoted form", FormKind::SyntaxQuote)?,
            TokenKind::Unquote => self.wrap(start, "unquoted form", FormKind::Unquote)?,
            TokenKind::UnquoteSplicing => {
                self.wrap(start, "unquoted form", FormKind::UnquoteSplicing)?
            }
            TokenKind::Deref => self.wrap(start, "dereferenced form", FormKind::Deref)?,
            TokenKind::VarQuote => self.wrap(start, "var-quoted form", FormKind::Var)?,
            TokenKind::Meta => self.read_meta(start)?,
            TokenKind::Discard => {
                self.read_one("discarded form")?;
                return Ok(());
            }
            TokenKind::ReaderCond | TokenKind::ReaderCondSplice => {
                return self.read_conditional(
                    token.kind == TokenKind::ReaderCondSplice,
                    start,
                    out,
                    in_collection,
                );
            }
            TokenKind::SymbolicValue => {
                Form::new(FormKind::SymbolicValue(lexeme[2..].to_string()), start)
            }
            TokenKind::NamespacedMap => self.read_namespaced_map(&lexeme[1..], start)?,
            TokenKind::Tagged => {
                let inner = self.read_one("tagged literal")?;
                let span = start.merge(inner.span);
                Form::new(FormKind::Tagged(lexeme[1..].to_string(), Box::new(inner)), span)
            }
            TokenKind::String => {
                let text = unescape(&lexeme[1..lexeme.len() - 1])
                    .map_err(|c| self.error(ReadErrorKind::InvalidEscape(c), start))?;
                Form::new(FormKind::Str(text), start)
            }
            TokenKind::Regex => Form::new(
                FormKind::Regex(lexeme[2..lexeme.len() - 1].to_string()),
                start,
            ),
            TokenKind::Char => Form::new(FormKind::Char(lexeme[1..].to_string()), start),
            TokenKind::Number => Form::new(FormKind::Number(lexeme.to_string()), start),
            TokenKind::Keyword => Form::new(FormKind::Keyword(lexeme[1..].to_string()), start),
            TokenKind::Symbol => {
                let kind = match lexeme {
                    "nil" => FormKind::Nil,
                    "true" => FormKind::Bool(true),
                    "false" => FormKind::Bool(false),
                    _ => FormKind::Symbol(lexeme.to_string()),
                };
                Form::new(kind, start)
            }
        };
        out.push(form);
        Ok(())
    }

    fn wrap(
        &mut self,
        start: Span,
        what: &'static str,
        make: fn(Box<Form>) -> FormKind,
    ) -> Result<Form, ReadError> {
        let inner = self.read_one(what)?;
        let span = start.merge(inner.span);
        Ok(Form::new(make(Box::new(inner)), span))
    }

    fn pair_up(&self, items: Vec<Form>, span: Span) -> Result<Vec<(Form, Form)>, ReadError> {
        if items.len() % 2 != 0 {
            return Err(self.error(ReadErrorKind::OddMapEntries, span));
        }
        let mut entries = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
            entries.push((k, v));
        }
        Ok(entries)
    }

    fn read_meta(&mut self, start: Span) -> Result<Form, ReadError> {
        let meta = self.read_one("metadata")?;
        let mut target = self.read_one("metadata target")?;
        let entries = match meta.kind {
            FormKind::Symbol(_) | FormKind::Str(_) => {
                let key = Form::new(FormKind::Keyword("tag".to_string()), meta.span);
                vec![(key, meta)]
            }
            FormKind::Keyword(_) => {
                let span = meta.span;
                vec![(meta, Form::new(FormKind::Bool(true), span))]
            }
            FormKind::Map(entries) => entries,
            _ => return Err(self.error(ReadErrorKind::InvalidMetadata, meta.span)),
        };
        // Outer metadata is appended so that it wins on lookup
        target.meta.extend(entries);
        target.span = start.merge(target.span);
        Ok(target)
    }

    fn read_conditional(
        &mut self,
        splicing: bool,
        start: Span,
        out: &mut Vec<Form>,
        in_collection: bool,
    ) -> Result<(), ReadError> {
        if self.peek_kind()? != Some(TokenKind::LParen) {
            return Err(self.error(ReadErrorKind::OddReaderConditional, start));
        }
        let Some(open) = self.next_token()? else {
            return Err(self.eof("reader conditional"));
        };
        let (items, end) = self.read_seq(TokenKind::RParen, "reader conditional")?;
        let span = open.span.merge(end);
        if items.len() % 2 != 0 {
            return Err(self.error(ReadErrorKind::OddReaderConditional, span));
        }
        if splicing && !in_collection {
            return Err(self.error(ReadErrorKind::TopLevelSplice, start));
        }

        let mut iter = items.into_iter();
        while let (Some(feature), Some(form)) = (iter.next(), iter.next()) {
            let selected = feature
                .as_keyword()
                .is_some_and(|name| self.options.selects(name));
            if !selected {
                continue;
            }
            if splicing {
                match form.kind {
                    FormKind::List(items) | FormKind::Vector(items) => out.extend(items),
                    _ => out.push(form),
                }
            } else {
                out.push(form);
            }
            return Ok(());
        }
        Ok(())
    }

    fn read_namespaced_map(&mut self, prefix: &str, start: Span) -> Result<Form, ReadError> {
        let map = self.read_one("namespaced map")?;
        let span = start.merge(map.span);
        let FormKind::Map(entries) = map.kind else {
            return Err(self.error(ReadErrorKind::NamespacedMapWithoutMap, span));
        };
        // `#::{...}` needs the current namespace, which the reader does not track
        let ns = prefix.trim_start_matches(':');
        let entries = entries
            .into_iter()
            .map(|(key, value)| match key.kind {
                FormKind::Keyword(name) if !ns.is_empty() && !name.contains('/') => {
                    let key = Form::new(FormKind::Keyword(format!("{ns}/{name}")), key.span);
                    (key, value)
                }
                _ => (key, value),
            })
            .collect();
        Ok(Form::new(FormKind::Map(entries), span))
    }
}

impl Iterator for Reader<'_> {
    type Item = Result<Form, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_form().transpose()
    }
}

/// Resolve the escape sequences of a string literal body
fn unescape(body: &str) -> Result<String, char> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let ch = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or('u')?;
                out.push(ch);
            }
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                let rest = chars.clone().take(2).take_while(|c| c.is_digit(8));
                let mut consumed = 0;
                for c in rest {
                    value = value * 8 + c.to_digit(8).unwrap_or(0);
                    consumed += 1;
                }
                for _ in 0..consumed {
                    chars.next();
                }
                out.push(char::from_u32(value).ok_or(d)?);
            }
            Some(other) => return Err(other),
            None => return Err('\\'),
        }
    }
    Ok(out)
}
