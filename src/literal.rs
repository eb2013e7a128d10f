//! Restricted literal parser for container-typed fields.
//!
//! Users edit lists, tuples, and maps as text. Only plain data is accepted:
//!
//! ```text
//! value  = string | number | bool | list | tuple | map
//! list   = "[" [ value { "," value } [","] ] "]"
//! tuple  = "(" ")" | "(" value "," ")" | "(" value { "," value } [","] ")"
//! map    = "{" [ string ":" value { "," string ":" value } [","] ] "}"
//! bool   = "true" | "false" | "True" | "False"
//! string = '"' ... '"' | "'" ... "'"      (backslash escapes: \" \' \\ \n \t \r)
//! ```
//!
//! There are no identifiers, calls, or operators, so nothing the user types
//! can execute. `(x)` without a comma is a parenthesized value, not a tuple.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::value::Value;

/// Deepest container nesting accepted, matching serde_json's limit.
const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at offset {offset}")]
pub struct LiteralError {
    pub message: String,
    pub offset: usize,
}

/// Parse a complete literal. Trailing input other than whitespace is an error.
pub fn parse(text: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser {
        chars: text.char_indices().collect(),
        pos: 0,
        len: text.len(),
        depth: 0,
    };
    let value = parser.value()?;
    parser.skip_ws();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected '{c}' after value")));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
    len: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map(|(i, _)| *i).unwrap_or(self.len)
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            message: message.into(),
            offset: self.offset(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, want: char) -> Result<(), LiteralError> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == want => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{want}', found '{c}'"))),
            None => Err(self.error(format!("expected '{want}', found end of input"))),
        }
    }

    /// Consume `close` if it is the next non-blank character.
    fn eat_close(&mut self, close: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(close) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("expected a value, found end of input")),
            Some(open @ ('[' | '(' | '{')) => {
                if self.depth == MAX_DEPTH {
                    return Err(self.error("nesting too deep"));
                }
                self.pos += 1;
                self.depth += 1;
                let value = match open {
                    '[' => self.items(']').map(Value::List),
                    '(' => self.tuple_or_group(),
                    _ => self.map(),
                };
                self.depth -= 1;
                value
            }
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                Ok(Value::Str(self.string(q)?))
            }
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.word(),
            Some(c) => Err(self.error(format!("unexpected '{c}'"))),
        }
    }

    /// Comma-separated values up to `close`, trailing comma allowed.
    fn items(&mut self, close: char) -> Result<Vec<Value>, LiteralError> {
        let mut items = Vec::new();
        loop {
            if self.eat_close(close) {
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == close => {}
                Some(c) => return Err(self.error(format!("expected ',' or '{close}', found '{c}'"))),
                None => return Err(self.error(format!("unclosed '{close}'"))),
            }
        }
    }

    fn tuple_or_group(&mut self) -> Result<Value, LiteralError> {
        if self.eat_close(')') {
            return Ok(Value::Tuple(Vec::new()));
        }
        let first = self.value()?;
        self.skip_ws();
        match self.peek() {
            Some(')') => {
                self.pos += 1;
                Ok(first)
            }
            Some(',') => {
                self.pos += 1;
                let mut items = vec![first];
                items.extend(self.items(')')?);
                Ok(Value::Tuple(items))
            }
            Some(c) => Err(self.error(format!("expected ',' or ')', found '{c}'"))),
            None => Err(self.error("unclosed ')'")),
        }
    }

    fn map(&mut self) -> Result<Value, LiteralError> {
        let mut map = BTreeMap::new();
        loop {
            if self.eat_close('}') {
                return Ok(Value::Map(map));
            }
            self.skip_ws();
            let key = match self.peek() {
                Some(q @ ('"' | '\'')) => {
                    self.pos += 1;
                    self.string(q)?
                }
                _ => return Err(self.error("map keys must be quoted strings")),
            };
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {}
                Some(c) => return Err(self.error(format!("expected ',' or '}}', found '{c}'"))),
                None => return Err(self.error("unclosed '}'")),
            }
        }
    }

    /// The opening quote has already been consumed.
    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(c @ ('\\' | '"' | '\'')) => out.push(c),
                    Some(c) => return Err(self.error(format!("unknown escape '\\{c}'"))),
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_') {
                text.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        let digits = text.replace('_', "");
        let only_numeric = digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
        if only_numeric {
            if let Ok(i) = digits.parse::<i64>() {
                return Ok(Value::Int(i));
            }
            if let Ok(f) = digits.parse::<f64>() {
                if f.is_finite() {
                    return Ok(Value::Float(f));
                }
                self.pos = start;
                return Err(self.error(format!("'{text}' is out of range")));
            }
        }
        self.pos = start;
        Err(self.error(format!("invalid number '{text}'")))
    }

    fn word(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        match word.as_str() {
            "true" | "True" => Ok(Value::Bool(true)),
            "false" | "False" => Ok(Value::Bool(false)),
            _ => {
                self.pos = start;
                Err(self.error(format!("'{word}' is not a literal")))
            }
        }
    }
}
