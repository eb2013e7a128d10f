//! Type handlers: the load/save/validate contract bound to each field.
//!
//! Every field carries exactly one [`TypeHandler`], chosen when its
//! declaration is processed:
//!
//! - an explicit override from [`Declaration::typed`](crate::Declaration::typed)
//!   is bound as given;
//! - otherwise the default's shape picks a built-in: `bool`, `int`, `float`,
//!   and `str` map to [`BoolHandler`], [`IntHandler`], [`FloatHandler`], and
//!   [`StrHandler`]; lists, tuples, and maps get a [`LiteralHandler`].
//!
//! `load` receives both stored values (already converted from JSON) and raw
//! CLI text (as [`Value::Str`]), so every handler must accept both forms.
//! `save` must return something JSON can hold; a non-finite float is caught
//! when the tree is written.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::literal;
use crate::value::{Value, check_representable};

/// A handler refused an input. Normalized to
/// [`ConfigError::InvalidValue`](crate::ConfigError::InvalidValue) by the
/// field layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Rejection(pub String);

impl Rejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Rejection(reason.into())
    }
}

/// Conversion and validation for one field type.
pub trait TypeHandler: fmt::Debug + Send + Sync {
    /// Type name shown in listings and prompts.
    fn name(&self) -> &str;

    /// Convert a stored value or free text into the in-memory value.
    fn load(&self, raw: &Value) -> Result<Value, Rejection>;

    /// Convert the in-memory value into its stored form.
    fn save(&self, value: &Value) -> Value {
        value.clone()
    }

    /// Check an in-memory value. Runs after every successful `load`.
    fn is_valid(&self, value: &Value) -> bool;

    /// Text offered as the current value in prompts. `load` must accept it.
    fn display(&self, value: &Value) -> String {
        self.save(value).to_string()
    }
}

pub type SharedHandler = Arc<dyn TypeHandler>;

/// Pick the built-in handler for an undeclared field type.
pub fn infer(default: &Value) -> SharedHandler {
    match default {
        Value::Bool(_) => Arc::new(BoolHandler),
        Value::Int(_) => Arc::new(IntHandler::new()),
        Value::Float(_) => Arc::new(FloatHandler),
        Value::Str(_) => Arc::new(StrHandler),
        Value::List(_) => Arc::new(LiteralHandler::new(Container::List)),
        Value::Tuple(_) => Arc::new(LiteralHandler::new(Container::Tuple)),
        Value::Map(_) => Arc::new(LiteralHandler::new(Container::Map)),
    }
}

fn wrong_shape(expected: &str, raw: &Value) -> Rejection {
    Rejection::new(format!("expected {expected}, got {} {raw}", raw.kind()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolHandler;

impl TypeHandler for BoolHandler {
    fn name(&self) -> &str {
        "bool"
    }

    fn load(&self, raw: &Value) -> Result<Value, Rejection> {
        match raw {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::Int(0) => Ok(Value::Bool(false)),
            Value::Int(1) => Ok(Value::Bool(true)),
            Value::Str(s) => match s.trim().to_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "f" | "no" | "n" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(Rejection::new(format!("'{s}' is not a valid boolean"))),
            },
            other => Err(wrong_shape("a boolean", other)),
        }
    }

    fn is_valid(&self, value: &Value) -> bool {
        matches!(value, Value::Bool(_))
    }
}

/// Integers, optionally bounded (inclusive).
///
/// ```ignore
/// Declaration::new().field("age", 42).typed("age", IntHandler::new().min(0))
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IntHandler {
    min: Option<i64>,
    max: Option<i64>,
}

impl IntHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }
}

impl TypeHandler for IntHandler {
    fn name(&self) -> &str {
        "int"
    }

    fn load(&self, raw: &Value) -> Result<Value, Rejection> {
        match raw {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| Rejection::new(format!("'{s}' is not a valid integer"))),
            other => Err(wrong_shape("an integer", other)),
        }
    }

    fn is_valid(&self, value: &Value) -> bool {
        match value {
            Value::Int(i) => {
                self.min.is_none_or(|min| *i >= min) && self.max.is_none_or(|max| *i <= max)
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatHandler;

impl TypeHandler for FloatHandler {
    fn name(&self) -> &str {
        "float"
    }

    fn load(&self, raw: &Value) -> Result<Value, Rejection> {
        match raw {
            Value::Float(f) => Ok(Value::Float(*f)),
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| Rejection::new(format!("'{s}' is not a valid number"))),
            other => Err(wrong_shape("a number", other)),
        }
    }

    fn is_valid(&self, value: &Value) -> bool {
        matches!(value, Value::Float(f) if f.is_finite())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StrHandler;

impl TypeHandler for StrHandler {
    fn name(&self) -> &str {
        "str"
    }

    fn load(&self, raw: &Value) -> Result<Value, Rejection> {
        match raw {
            Value::Str(s) => Ok(Value::Str(s.clone())),
            other => Err(wrong_shape("text", other)),
        }
    }

    fn is_valid(&self, value: &Value) -> bool {
        matches!(value, Value::Str(_))
    }
}

/// A filesystem path. Stored as text; only the displayed type differs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathHandler;

impl TypeHandler for PathHandler {
    fn name(&self) -> &str {
        "path"
    }

    fn load(&self, raw: &Value) -> Result<Value, Rejection> {
        StrHandler.load(raw)
    }

    fn is_valid(&self, value: &Value) -> bool {
        matches!(value, Value::Str(_))
    }
}

/// An RGB color: `#rgb` or `#rrggbb` as text, `(r, g, b)` in memory,
/// `#rrggbb` on disk.
///
/// Short form digits are scaled by 16, so `#f80` loads as `(240, 128, 0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorHandler;

impl ColorHandler {
    fn parse_hex(text: &str) -> Result<Value, Rejection> {
        let invalid = || Rejection::new(format!("'{text}' is not a color like #rgb or #rrggbb"));
        let digits = text.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let (width, factor) = match digits.len() {
            3 => (1, 16),
            6 => (2, 1),
            _ => return Err(invalid()),
        };
        let channels = (0..3)
            .map(|i| {
                i64::from_str_radix(&digits[i * width..(i + 1) * width], 16)
                    .map(|c| Value::Int(c * factor))
                    .map_err(|_| invalid())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Tuple(channels))
    }
}

impl TypeHandler for ColorHandler {
    fn name(&self) -> &str {
        "color"
    }

    fn load(&self, raw: &Value) -> Result<Value, Rejection> {
        match raw {
            Value::Str(s) => Self::parse_hex(s),
            Value::List(items) | Value::Tuple(items) => Ok(Value::Tuple(items.clone())),
            other => Err(wrong_shape("a color", other)),
        }
    }

    fn save(&self, value: &Value) -> Value {
        match value.as_seq() {
            Some([Value::Int(r), Value::Int(g), Value::Int(b)]) => {
                Value::Str(format!("#{r:02x}{g:02x}{b:02x}"))
            }
            _ => value.clone(),
        }
    }

    fn is_valid(&self, value: &Value) -> bool {
        value.as_seq().is_some_and(|items| {
            items.len() == 3
                && items
                    .iter()
                    .all(|c| matches!(c, Value::Int(c) if (0..256).contains(c)))
        })
    }
}

/// Container shape bound to a [`LiteralHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    List,
    Tuple,
    Map,
}

impl Container {
    pub fn name(self) -> &'static str {
        match self {
            Container::List => "list",
            Container::Tuple => "tuple",
            Container::Map => "map",
        }
    }
}

/// Lists, tuples, and maps edited as literal text.
///
/// Text is parsed with the restricted grammar in [`literal`]. Lists and
/// tuples convert into each other, since JSON stores both as arrays.
#[derive(Debug, Clone, Copy)]
pub struct LiteralHandler {
    kind: Container,
}

impl LiteralHandler {
    pub fn new(kind: Container) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> Container {
        self.kind
    }

    fn coerce(&self, value: Value) -> Result<Value, Rejection> {
        match (self.kind, value) {
            (Container::List, Value::List(items) | Value::Tuple(items)) => Ok(Value::List(items)),
            (Container::Tuple, Value::List(items) | Value::Tuple(items)) => {
                Ok(Value::Tuple(items))
            }
            (Container::Map, Value::Map(map)) => Ok(Value::Map(map)),
            (kind, other) => Err(Rejection::new(format!(
                "does not evaluate to a {}, got {} {}",
                kind.name(),
                other.kind(),
                other.literal()
            ))),
        }
    }
}

impl TypeHandler for LiteralHandler {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn load(&self, raw: &Value) -> Result<Value, Rejection> {
        match raw {
            Value::Str(text) => {
                let parsed = literal::parse(text).map_err(|e| Rejection::new(e.to_string()))?;
                self.coerce(parsed)
            }
            other => self.coerce(other.clone()),
        }
    }

    fn is_valid(&self, value: &Value) -> bool {
        matches!(
            (self.kind, value),
            (Container::List, Value::List(_))
                | (Container::Tuple, Value::Tuple(_))
                | (Container::Map, Value::Map(_))
        ) && check_representable(value).is_ok()
    }
}
