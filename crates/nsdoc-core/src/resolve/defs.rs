//! Interpretation of top-level definition forms
//!
//! Each recognized form yields the vars it would intern, with the metadata
//! the compiler would attach: the name's `^meta`, docstrings, attr-maps,
//! derived `arglists`, and the source location.

use crate::lexer::{LineIndex, Span};
use crate::meta::{MetaValue, SymbolMeta};
use crate::reader::{Form, FormKind};

/// Where the forms being interpreted come from
pub(super) struct DefContext<'a> {
    pub ns: &'a str,
    pub file: &'a str,
    pub source: &'a str,
    pub line_index: &'a LineIndex,
}

impl DefContext<'_> {
    /// Attach the keys every interned var carries
    fn finish(&self, name: &str, mut meta: SymbolMeta, span: Span) -> (String, SymbolMeta) {
        let location = self.line_index.location(self.source, span.start);
        meta.insert("name".into(), MetaValue::Symbol(name.to_string()));
        meta.insert("ns".into(), MetaValue::Namespace(self.ns.to_string()));
        meta.insert("file".into(), MetaValue::Text(self.file.to_string()));
        meta.insert("line".into(), MetaValue::Int(i64::from(location.line)));
        meta.insert("column".into(), MetaValue::Int(i64::from(location.column)));
        (name.to_string(), meta)
    }

    fn class_name(&self, name: &str) -> String {
        format!("{}.{}", self.ns.replace('-', "_"), name)
    }
}

/// The vars interned by one top-level form, in definition order
pub(super) fn interpret(form: &Form, cx: &DefContext<'_>) -> Vec<(String, SymbolMeta)> {
    let Some(items) = form.as_list() else {
        return Vec::new();
    };
    let Some(head) = items.first().and_then(Form::as_symbol) else {
        return Vec::new();
    };
    let head = head.strip_prefix("clojure.core/").unwrap_or(head);
    let args = &items[1..];

    match head {
        "def" => def_var(form, args, cx).into_iter().collect(),
        "defn" | "defn-" | "defmacro" => def_fn(form, head, args, cx).into_iter().collect(),
        "defmulti" => def_multi(form, args, cx).into_iter().collect(),
        "defonce" => def_var(form, &args[..args.len().min(2)], cx).into_iter().collect(),
        "declare" => declare(form, args, cx),
        "defprotocol" => def_protocol(form, args, cx),
        "defrecord" | "deftype" => def_type(form, head == "defrecord", args, cx),
        _ => Vec::new(),
    }
}

/// Convert a metadata entry's value the way evaluation would
fn meta_value(key: &str, value: &Form) -> MetaValue {
    match key {
        "inline" | "inline-arities" => MetaValue::Fn(value.clone()),
        "arglists" => arglists_value(value),
        _ => MetaValue::from_form(value),
    }
}

fn arglists_value(value: &Form) -> MetaValue {
    let inner = match &value.kind {
        FormKind::Quote(inner) => inner.as_ref(),
        _ => value,
    };
    match inner.as_list().or_else(|| inner.as_vector()) {
        Some(items) => MetaValue::Seq(items.iter().cloned().map(MetaValue::Code).collect()),
        None => MetaValue::from_form(inner),
    }
}

fn merge_entries(meta: &mut SymbolMeta, entries: &[(Form, Form)]) {
    for (key, value) in entries {
        if let Some(key) = key.as_keyword() {
            meta.insert(key.to_string(), meta_value(key, value));
        }
    }
}

/// Name symbol plus the metadata read onto it
fn named(form: Option<&Form>) -> Option<(&str, SymbolMeta)> {
    let form = form?;
    let name = form.as_symbol()?;
    let mut meta = SymbolMeta::new();
    merge_entries(&mut meta, &form.meta);
    Some((name, meta))
}

/// Consume a leading docstring
fn take_doc<'f>(meta: &mut SymbolMeta, rest: &'f [Form]) -> &'f [Form] {
    match rest.first().and_then(Form::as_str) {
        Some(doc) => {
            meta.insert("doc".into(), MetaValue::Text(doc.to_string()));
            &rest[1..]
        }
        None => rest,
    }
}

/// Consume a leading attr-map
fn take_attr_map<'f>(meta: &mut SymbolMeta, rest: &'f [Form]) -> &'f [Form] {
    match rest.first().and_then(Form::as_map) {
        Some(entries) => {
            merge_entries(meta, entries);
            &rest[1..]
        }
        None => rest,
    }
}

fn code_seq<'f>(forms: impl IntoIterator<Item = &'f Form>) -> MetaValue {
    MetaValue::Seq(forms.into_iter().cloned().map(MetaValue::Code).collect())
}

fn def_var(form: &Form, args: &[Form], cx: &DefContext<'_>) -> Option<(String, SymbolMeta)> {
    let (name, mut meta) = named(args.first())?;
    // (def name "doc" init)
    if args.len() == 3 {
        take_doc(&mut meta, &args[1..]);
    }
    Some(cx.finish(name, meta, form.span))
}

fn def_fn(
    form: &Form,
    head: &str,
    args: &[Form],
    cx: &DefContext<'_>,
) -> Option<(String, SymbolMeta)> {
    let (name, mut meta) = named(args.first())?;
    let rest = take_doc(&mut meta, &args[1..]);
    let rest = take_attr_map(&mut meta, rest);

    let signatures: Vec<&Form> = match rest.first() {
        Some(params) if params.as_vector().is_some() => vec![params],
        _ => {
            if let Some(entries) = rest.last().and_then(Form::as_map) {
                merge_entries(&mut meta, entries);
            }
            rest.iter()
                .filter_map(|arity| arity.as_list()?.first())
                .filter(|params| params.as_vector().is_some())
                .collect()
        }
    };
    meta.entry("arglists".into())
        .or_insert_with(|| code_seq(signatures));

    match head {
        "defn-" => {
            meta.insert("private".into(), MetaValue::Bool(true));
        }
        "defmacro" => {
            meta.insert("macro".into(), MetaValue::Bool(true));
        }
        _ => {}
    }
    Some(cx.finish(name, meta, form.span))
}

fn def_multi(form: &Form, args: &[Form], cx: &DefContext<'_>) -> Option<(String, SymbolMeta)> {
    let (name, mut meta) = named(args.first())?;
    let rest = take_doc(&mut meta, &args[1..]);
    take_attr_map(&mut meta, rest);
    Some(cx.finish(name, meta, form.span))
}

fn declare(form: &Form, args: &[Form], cx: &DefContext<'_>) -> Vec<(String, SymbolMeta)> {
    args.iter()
        .filter_map(|arg| named(Some(arg)))
        .map(|(name, mut meta)| {
            meta.insert("declared".into(), MetaValue::Bool(true));
            cx.finish(name, meta, form.span)
        })
        .collect()
}

fn def_protocol(form: &Form, args: &[Form], cx: &DefContext<'_>) -> Vec<(String, SymbolMeta)> {
    let Some((protocol, mut meta)) = named(args.first()) else {
        return Vec::new();
    };
    let mut rest = take_doc(&mut meta, &args[1..]);
    // Options such as `:extend-via-metadata true` precede the signatures
    while let [key, _, tail @ ..] = rest {
        if key.as_keyword().is_none() {
            break;
        }
        rest = tail;
    }

    let mut vars = vec![cx.finish(protocol, meta, form.span)];
    for signature in rest {
        let Some(items) = signature.as_list() else {
            continue;
        };
        let Some((method, mut meta)) = named(items.first()) else {
            continue;
        };
        let params = items[1..].iter().filter(|f| f.as_vector().is_some());
        meta.insert("arglists".into(), code_seq(params));
        if let Some(doc) = items[1..].iter().rev().find_map(Form::as_str) {
            meta.insert("doc".into(), MetaValue::Text(doc.to_string()));
        }
        meta.insert(
            "protocol".into(),
            MetaValue::Var {
                ns: cx.ns.to_string(),
                name: protocol.to_string(),
            },
        );
        vars.push(cx.finish(method, meta, signature.span));
    }
    vars
}

fn def_type(
    form: &Form,
    record: bool,
    args: &[Form],
    cx: &DefContext<'_>,
) -> Vec<(String, SymbolMeta)> {
    let (Some(name), Some(fields)) = (
        args.first().and_then(Form::as_symbol),
        args.get(1).filter(|f| f.as_vector().is_some()),
    ) else {
        return Vec::new();
    };
    let class = cx.class_name(name);

    let mut positional = SymbolMeta::new();
    positional.insert("arglists".into(), code_seq([fields]));
    positional.insert(
        "doc".into(),
        MetaValue::Text(format!("Positional factory function for class {class}.")),
    );
    let mut vars = vec![cx.finish(&format!("->{name}"), positional, form.span)];

    if record {
        let param = Form::new(FormKind::Symbol("m".into()), fields.span);
        let params = Form::new(FormKind::Vector(vec![param]), fields.span);
        let mut from_map = SymbolMeta::new();
        from_map.insert("arglists".into(), code_seq([&params]));
        from_map.insert(
            "doc".into(),
            MetaValue::Text(format!(
                "Factory function for class {class}, taking a map of keywords to field values."
            )),
        );
        vars.push(cx.finish(&format!("map->{name}"), from_map, form.span));
    }
    vars
}
