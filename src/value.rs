//! In-memory field values.
//!
//! Every field holds a [`Value`]. Stored JSON is converted into a `Value`
//! before a handler sees it, and free-text input from the CLI arrives as
//! [`Value::Str`], so handlers only ever deal with this one type.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A configuration value.
///
/// `Tuple` is kept distinct from `List` in memory so that tuple-typed fields
/// display as tuples, but both are stored as JSON arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Build a tuple from anything convertible to values.
    pub fn tuple<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Build a map from `(key, value)` pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Short name of the value's shape, used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "map",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list or tuple.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Render the value in the literal syntax accepted by
    /// [`literal::parse`](crate::literal::parse). Strings are quoted.
    pub fn literal(&self) -> String {
        let mut out = String::new();
        write_literal(self, &mut out);
        out
    }

    /// Convert a stored JSON value. `null` has no counterpart and yields `None`.
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        Some(match json {
            serde_json::Value::Null => return None,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64()?),
            },
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => Value::List(
                items
                    .iter()
                    .map(Value::from_json)
                    .collect::<Option<Vec<_>>>()?,
            ),
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| Some((k.clone(), Value::from_json(v)?)))
                    .collect::<Option<BTreeMap<_, _>>>()?,
            ),
        })
    }

    /// Convert to the stored JSON form.
    ///
    /// Fails on non-finite floats, which JSON cannot represent.
    pub fn to_json(&self) -> Result<serde_json::Value, String> {
        check_representable(self)?;
        serde_json::to_value(self).map_err(|e| e.to_string())
    }
}

/// Fails on the first non-finite float, however deeply nested.
pub(crate) fn check_representable(value: &Value) -> Result<(), String> {
    match value {
        Value::Float(f) if !f.is_finite() => Err(format!("{f} has no JSON representation")),
        Value::List(items) | Value::Tuple(items) => {
            items.iter().try_for_each(check_representable)
        }
        Value::Map(map) => map.values().try_for_each(check_representable),
        _ => Ok(()),
    }
}

fn write_literal(value: &Value, out: &mut String) {
    match value {
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::Str(s) => write_quoted(s, out),
        Value::List(items) => {
            out.push('[');
            write_items(items, out);
            out.push(']');
        }
        Value::Tuple(items) => {
            out.push('(');
            write_items(items, out);
            if items.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        Value::Map(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_quoted(k, out);
                out.push_str(": ");
                write_literal(v, out);
            }
            out.push('}');
        }
    }
}

fn write_items(items: &[Value], out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_literal(item, out);
    }
}

fn write_quoted(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Floats always carry a decimal point so they re-parse as floats.
fn format_float(f: f64) -> String {
    let s = f.to_string();
    if f.is_finite() && !s.contains(['.', 'e', 'E']) {
        format!("{s}.0")
    } else {
        s
    }
}

impl fmt::Display for Value {
    /// Strings display bare; everything else uses the literal form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            other => write!(f, "{}", other.literal()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) | Value::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(v: BTreeMap<String, V>) -> Self {
        Value::Map(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn literal_quotes_strings() {
        assert_eq!(Value::from("a \"b\"").literal(), r#""a \"b\"""#);
    }

    #[test]
    fn literal_single_tuple_has_trailing_comma() {
        assert_eq!(Value::tuple([1]).literal(), "(1,)");
        assert_eq!(Value::tuple([1, 2]).literal(), "(1, 2)");
    }

    #[test]
    fn literal_float_keeps_decimal_point() {
        assert_eq!(Value::Float(2.0).literal(), "2.0");
        assert_eq!(Value::Float(0.5).literal(), "0.5");
    }

    #[test]
    fn literal_nested_containers() {
        let v = Value::map([("a", Value::from(vec![1, 2])), ("b", Value::from(true))]);
        assert_eq!(v.literal(), r#"{"a": [1, 2], "b": true}"#);
    }

    #[test]
    fn display_strings_bare() {
        assert_eq!(Value::from("John").to_string(), "John");
        assert_eq!(Value::from(vec!["x"]).to_string(), r#"["x"]"#);
    }

    #[test]
    fn to_json_stores_tuples_as_arrays() {
        let v = Value::tuple([230, 120, 32]);
        assert_eq!(v.to_json().unwrap(), json!([230, 120, 32]));
    }

    #[test]
    fn to_json_rejects_non_finite_floats() {
        assert!(Value::Float(f64::NAN).to_json().is_err());
        assert!(Value::from(vec![Value::Float(f64::INFINITY)]).to_json().is_err());
    }

    #[test]
    fn from_json_maps_shapes() {
        let v = Value::from_json(&json!({"n": 1, "f": 1.5, "l": ["a"]})).unwrap();
        let map = v.as_map().unwrap();
        assert_eq!(map["n"], Value::Int(1));
        assert_eq!(map["f"], Value::Float(1.5));
        assert_eq!(map["l"], Value::from(vec!["a"]));
    }

    #[test]
    fn from_json_rejects_null() {
        assert_eq!(Value::from_json(&json!(null)), None);
        assert_eq!(Value::from_json(&json!([1, null])), None);
    }

    #[test]
    fn as_float_widens_integers() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
    }
}
