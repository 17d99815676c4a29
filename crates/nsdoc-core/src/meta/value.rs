//! Metadata values attached to vars

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::reader::{Form, FormKind};

/// Raw metadata of one var: attribute name (keyword without the colon) to value
pub type SymbolMeta = BTreeMap<String, MetaValue>;

/// A metadata value as seen by the loader
///
/// Most values are plain data. `Namespace`, `Var` and `Fn` stand for the
/// runtime objects a loaded namespace refers to; they have no serialized form.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Keyword name without the colon
    Keyword(String),
    Symbol(String),
    Seq(Vec<MetaValue>),
    Map(BTreeMap<String, MetaValue>),
    /// Unevaluated code, serialized as its printed form
    Code(Form),
    /// A namespace object
    Namespace(String),
    /// A reference to another var
    Var { ns: String, name: String },
    /// A compiled function
    Fn(Form),
}

impl MetaValue {
    /// Convert a literal form into metadata.
    ///
    /// Literals become data, vectors become sequences, maps with keyword or
    /// string keys become maps, a quoted symbol becomes a symbol, and
    /// everything else stays code.
    pub fn from_form(form: &Form) -> Self {
        match &form.kind {
            FormKind::Nil => Self::Nil,
            FormKind::Bool(b) => Self::Bool(*b),
            FormKind::Number(n) => parse_number(n).unwrap_or_else(|| Self::Code(form.clone())),
            FormKind::Str(s) => Self::Text(s.clone()),
            FormKind::Keyword(k) => Self::Keyword(k.clone()),
            FormKind::Symbol(s) => Self::Symbol(s.clone()),
            FormKind::Vector(items) => Self::Seq(items.iter().map(Self::from_form).collect()),
            FormKind::Map(entries) => {
                let mut map = BTreeMap::new();
                for (key, value) in entries {
                    let key = match &key.kind {
                        FormKind::Keyword(k) | FormKind::Str(k) => k.clone(),
                        _ => return Self::Code(form.clone()),
                    };
                    map.insert(key, Self::from_form(value));
                }
                Self::Map(map)
            }
            FormKind::Quote(inner) => match &inner.kind {
                FormKind::List(_) | FormKind::Vector(_) | FormKind::Map(_) | FormKind::Set(_) => {
                    Self::Code((**inner).clone())
                }
                _ => Self::from_form(inner),
            },
            _ => Self::Code(form.clone()),
        }
    }

    /// Returns true if the value (recursively) has a serialized form
    pub fn is_plain(&self) -> bool {
        match self {
            Self::Namespace(_) | Self::Var { .. } | Self::Fn(_) => false,
            Self::Seq(items) => items.iter().all(Self::is_plain),
            Self::Map(map) => map.values().all(Self::is_plain),
            _ => true,
        }
    }

    /// Printed textual form; text converts to itself
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) | Self::Symbol(s) | Self::Namespace(s) => s.clone(),
            _ => self.to_string(),
        }
    }
}

/// Integers and finite floats; anything else stays code
fn parse_number(text: &str) -> Option<MetaValue> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    // A leading zero makes an integer octal
    if digits.len() > 1 && digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit()) {
        let value = i64::from_str_radix(&digits[1..], 8).ok()?;
        return Some(MetaValue::Int(if negative { -value } else { value }));
    }
    if let Ok(i) = text.parse::<i64>() {
        return Some(MetaValue::Int(i));
    }
    if text.contains(['.', 'e', 'E']) && !text.ends_with('M') {
        return text
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .map(MetaValue::Float);
    }
    None
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Keyword(k) => write!(f, ":{k}"),
            Self::Symbol(s) => f.write_str(s),
            Self::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, ":{key} {value}")?;
                }
                f.write_str("}")
            }
            Self::Code(form) | Self::Fn(form) => write!(f, "{form}"),
            Self::Namespace(name) => write!(f, "#namespace[{name}]"),
            Self::Var { ns, name } => write!(f, "#'{ns}/{name}"),
        }
    }
}

impl Serialize for MetaValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Nil => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Text(s) | Self::Keyword(s) | Self::Symbol(s) => serializer.serialize_str(s),
            Self::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Self::Code(form) => serializer.collect_str(form),
            Self::Namespace(_) | Self::Var { .. } | Self::Fn(_) => Err(ser::Error::custom(
                format_args!("cannot serialize {self}"),
            )),
        }
    }
}

struct MetaValueVisitor;

impl<'de> Visitor<'de> for MetaValueVisitor {
    type Value = MetaValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a metadata value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<MetaValue, E> {
        Ok(MetaValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<MetaValue, E> {
        Ok(MetaValue::Int(v))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<MetaValue, E> {
        Ok(i64::try_from(v).map_or(MetaValue::Float(v as f64), MetaValue::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<MetaValue, E> {
        Ok(MetaValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<MetaValue, E> {
        Ok(MetaValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<MetaValue, E> {
        Ok(MetaValue::Text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<MetaValue, E> {
        Ok(MetaValue::Nil)
    }

    fn visit_none<E: de::Error>(self) -> Result<MetaValue, E> {
        Ok(MetaValue::Nil)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<MetaValue, D::Error> {
        MetaValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<MetaValue, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = access.next_element()? {
            items.push(item);
        }
        Ok(MetaValue::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<MetaValue, A::Error> {
        let mut map = BTreeMap::new();
        while let Some((key, value)) = access.next_entry::<String, MetaValue>()? {
            map.insert(key, value);
        }
        Ok(MetaValue::Map(map))
    }
}

/// Decodes plain data only; text comes back as [`MetaValue::Text`]
impl<'de> Deserialize<'de> for MetaValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MetaValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{Reader, ReaderOptions};

    fn form(source: &str) -> Form {
        Reader::read_all(source, ReaderOptions::default())
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_from_form_literals() {
        assert_eq!(MetaValue::from_form(&form("\"1.0\"")), MetaValue::Text("1.0".into()));
        assert_eq!(MetaValue::from_form(&form("42")), MetaValue::Int(42));
        assert_eq!(MetaValue::from_form(&form("1.5")), MetaValue::Float(1.5));
        assert_eq!(MetaValue::from_form(&form("'String")), MetaValue::Symbol("String".into()));
        assert!(matches!(MetaValue::from_form(&form("1/2")), MetaValue::Code(_)));
        assert!(matches!(MetaValue::from_form(&form("(fn [x] x)")), MetaValue::Code(_)));
    }

    #[test]
    fn test_from_form_numbers() {
        assert_eq!(MetaValue::from_form(&form("010")), MetaValue::Int(8));
        assert_eq!(MetaValue::from_form(&form("-017")), MetaValue::Int(-15));
        assert_eq!(MetaValue::from_form(&form("0")), MetaValue::Int(0));
        assert_eq!(MetaValue::from_form(&form("-3")), MetaValue::Int(-3));

        let overflow = MetaValue::from_form(&form("1e400"));
        assert!(matches!(overflow, MetaValue::Code(_)));
        assert_eq!(serde_json::to_string(&overflow).unwrap(), r#""1e400""#);
        assert!(matches!(MetaValue::from_form(&form("09")), MetaValue::Code(_)));
        assert!(matches!(MetaValue::from_form(&form("99999999999999999999")), MetaValue::Code(_)));
    }

    #[test]
    fn test_from_form_map() {
        let value = MetaValue::from_form(&form("{:name \"EPL\" :url \"http://x\" :distribution :repo}"));
        let MetaValue::Map(map) = value else {
            panic!("expected a map");
        };
        assert_eq!(map["name"], MetaValue::Text("EPL".into()));
        assert_eq!(map["distribution"], MetaValue::Keyword("repo".into()));
    }

    #[test]
    fn test_serialize_plain_values() {
        let value = MetaValue::Seq(vec![
            MetaValue::Keyword("a".into()),
            MetaValue::Code(form("[x & more]")),
            MetaValue::Nil,
        ]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"["a","[x & more]",null]"#);
    }

    #[test]
    fn test_runtime_objects_do_not_serialize() {
        assert!(serde_json::to_string(&MetaValue::Namespace("demo.core".into())).is_err());
        let var = MetaValue::Var {
            ns: "demo.core".into(),
            name: "Greeter".into(),
        };
        assert!(!var.is_plain());
        assert!(serde_json::to_string(&MetaValue::Seq(vec![var])).is_err());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(MetaValue::Text("[x]".into()).to_text(), "[x]");
        assert_eq!(MetaValue::Symbol("String".into()).to_text(), "String");
        assert_eq!(MetaValue::Code(form("[a {:keys [b]}]")).to_text(), "[a {:keys [b]}]");
        assert_eq!(MetaValue::Namespace("demo.core".into()).to_text(), "demo.core");
    }

    #[test]
    fn test_deserialize() {
        let value: MetaValue = serde_json::from_str(r#"{"a":[1,2.5,"x",null,true]}"#).unwrap();
        let MetaValue::Map(map) = value else {
            panic!("expected a map");
        };
        assert_eq!(
            map["a"],
            MetaValue::Seq(vec![
                MetaValue::Int(1),
                MetaValue::Float(2.5),
                MetaValue::Text("x".into()),
                MetaValue::Nil,
                MetaValue::Bool(true),
            ])
        );
    }
}
