//! Normalization of raw var metadata into serializable records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::{MetaValue, SymbolMeta};

/// Keys that refer to runtime objects and never appear in a record
pub const DROPPED_KEYS: [&str; 3] = ["protocol", "inline", "inline-arities"];

/// Metadata of one var in serializable form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolRecord(SymbolMeta);

impl SymbolRecord {
    /// Look up a field
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    /// The var name
    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    /// The namespace name
    pub fn ns(&self) -> Option<&str> {
        self.text("ns")
    }

    /// The docstring
    pub fn doc(&self) -> Option<&str> {
        self.text("doc")
    }

    fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(MetaValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Printed argument lists
    pub fn arglists(&self) -> Vec<&str> {
        match self.0.get("arglists") {
            Some(MetaValue::Seq(items)) => items
                .iter()
                .filter_map(|item| match item {
                    MetaValue::Text(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The record as raw metadata
    pub fn as_meta(&self) -> &SymbolMeta {
        &self.0
    }
}

/// Normalize the raw metadata of one var.
///
/// Drops the runtime-object fields, turns `ns` and `name` into text,
/// prints a non-nil `tag`, and prints each argument list. Other fields pass
/// through as they are. Normalizing a record again yields the same record.
pub fn normalize(raw: &SymbolMeta) -> SymbolRecord {
    let mut fields = BTreeMap::new();
    for (key, value) in raw {
        if DROPPED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let value = match key.as_str() {
            "ns" | "name" => MetaValue::Text(value.to_text()),
            "tag" => match value {
                MetaValue::Nil => continue,
                tag => MetaValue::Text(tag.to_text()),
            },
            "arglists" => printed_arglists(value),
            _ => value.clone(),
        };
        fields.insert(key.clone(), value);
    }
    SymbolRecord(fields)
}

fn printed_arglists(value: &MetaValue) -> MetaValue {
    let printed: Vec<String> = match value {
        MetaValue::Nil => Vec::new(),
        MetaValue::Seq(items) => items.iter().map(MetaValue::to_text).collect(),
        MetaValue::Code(form) => match form.as_list().or_else(|| form.as_vector()) {
            Some(items) => items.iter().map(ToString::to_string).collect(),
            None => vec![form.to_string()],
        },
        other => vec![other.to_text()],
    };
    MetaValue::Seq(printed.into_iter().map(MetaValue::Text).collect())
}
