//! Rendering of tree snapshots for `--show`.

use serde_json::Value as Json;

/// Turns a stored-form snapshot into text for the terminal.
pub trait Render {
    fn render(&self, snapshot: &Json) -> String;
}

/// Pretty JSON, no styling.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainRender;

impl Render for PlainRender {
    fn render(&self, snapshot: &Json) -> String {
        format!("{snapshot:#}")
    }
}

/// Pretty JSON with keys, strings, numbers and booleans highlighted.
#[cfg(feature = "color")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorRender;

#[cfg(feature = "color")]
impl Render for ColorRender {
    fn render(&self, snapshot: &Json) -> String {
        let mut out = String::new();
        color::write_value(&mut out, snapshot, 0);
        out
    }
}

#[cfg(feature = "color")]
mod color {
    use colored::Colorize;
    use serde_json::Value as Json;

    const INDENT: &str = "  ";

    pub(super) fn write_value(out: &mut String, value: &Json, depth: usize) {
        match value {
            Json::Null => out.push_str(&"null".dimmed().to_string()),
            Json::Bool(b) => out.push_str(&b.to_string().magenta().to_string()),
            Json::Number(n) => out.push_str(&n.to_string().yellow().to_string()),
            Json::String(_) => out.push_str(&value.to_string().green().to_string()),
            Json::Array(items) if items.is_empty() => out.push_str("[]"),
            Json::Array(items) => {
                out.push_str("[\n");
                for (i, item) in items.iter().enumerate() {
                    out.push_str(&INDENT.repeat(depth + 1));
                    write_value(out, item, depth + 1);
                    separator(out, i + 1 < items.len());
                }
                out.push_str(&INDENT.repeat(depth));
                out.push(']');
            }
            Json::Object(map) if map.is_empty() => out.push_str("{}"),
            Json::Object(map) => {
                out.push_str("{\n");
                for (i, (key, item)) in map.iter().enumerate() {
                    out.push_str(&INDENT.repeat(depth + 1));
                    let quoted = Json::String(key.clone()).to_string();
                    out.push_str(&quoted.bold().cyan().to_string());
                    out.push_str(": ");
                    write_value(out, item, depth + 1);
                    separator(out, i + 1 < map.len());
                }
                out.push_str(&INDENT.repeat(depth));
                out.push('}');
            }
        }
    }

    fn separator(out: &mut String, more: bool) {
        if more {
            out.push(',');
        }
        out.push('\n');
    }
}
