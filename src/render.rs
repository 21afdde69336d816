//! Bounded textual rendering of runtime [`Value`]s.
//!
//! Dispatches by exact type first (so a value's own quoting/delimiter
//! rules apply exactly once), then falls back to structural category for
//! `Value::Object`. Truncation and cycle detection are enforced by the
//! renderer itself, not left to formatters.

use crate::value::{RenderFormat, StructuralCategory, Value};

pub fn render(value: &Value, format: &RenderFormat) -> String {
    let mut renderer = Renderer {
        format,
        path: Vec::new(),
    };
    let mut out = renderer.render(value);
    truncate(&mut out, format);
    out
}

struct Renderer<'a> {
    format: &'a RenderFormat,
    path: Vec<usize>,
}

impl<'a> Renderer<'a> {
    fn render(&mut self, value: &Value) -> String {
        if let Some(id) = value.identity() {
            if self.path.contains(&id) {
                return self
                    .format
                    .circular_ref_marker
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "...".to_string());
            }
            self.path.push(id);
            let rendered = self.render_dispatch(value);
            self.path.pop();
            return rendered;
        }
        self.render_dispatch(value)
    }

    fn render_dispatch(&mut self, value: &Value) -> String {
        match value {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(n) => {
                if self.format.hex {
                    format!("{:#x}", n)
                } else {
                    n.to_string()
                }
            }
            Value::Float(f) => format!("{}", f),
            Value::Str(s) => quote_str(s),
            Value::Bytes(b) => quote_bytes(b),
            Value::Tuple(items) => self.render_tuple(items),
            Value::List(items) => self.render_seq(items, "[", "]"),
            Value::Set(items) => {
                if items.is_empty() {
                    "set()".to_string()
                } else {
                    self.render_seq(items, "{", "}")
                }
            }
            Value::Dict(pairs) => self.render_dict(pairs),
            Value::Exception { type_name, message } => {
                if message.is_empty() {
                    type_name.clone()
                } else {
                    format!("{}: {}", type_name, message)
                }
            }
            Value::Object(obj) => match obj.native_repr() {
                Ok(repr) => repr,
                Err(_) => match obj.length() {
                    Some(len) => format!("<{}, len() = {}>", obj.type_name(), len),
                    None => format!("<{} object>", obj.type_name()),
                },
            },
        }
    }

    fn render_tuple(&mut self, items: &[Value]) -> String {
        let rendered: Vec<String> = items.iter().map(|v| self.render(v)).collect();
        match rendered.len() {
            0 => "()".to_string(),
            1 => format!("({},)", rendered[0]),
            _ => format!("({})", rendered.join(", ")),
        }
    }

    fn render_seq(&mut self, items: &[Value], open: &str, close: &str) -> String {
        let rendered: Vec<String> = items.iter().map(|v| self.render(v)).collect();
        format!("{}{}{}", open, rendered.join(", "), close)
    }

    fn render_dict(&mut self, pairs: &[(Value, Value)]) -> String {
        if pairs.is_empty() {
            return "{}".to_string();
        }
        let mut rendered: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (self.render(k), self.render(v)))
            .collect();
        // Sort by rendered key for deterministic output; a key whose
        // rendering isn't meaningfully orderable just keeps insertion
        // order relative to its equals, which `sort_by` already gives us.
        rendered.sort_by(|a, b| a.0.cmp(&b.0));
        let body: Vec<String> = rendered
            .into_iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        format!("{{{}}}", body.join(", "))
    }
}

fn quote_str(s: &str) -> String {
    if s.contains('\'') && !s.contains('"') {
        format!("\"{}\"", s)
    } else {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

fn quote_bytes(b: &[u8]) -> String {
    let mut body = String::new();
    for &byte in b {
        match byte {
            b'\\' => body.push_str("\\\\"),
            b'\'' => body.push_str("\\'"),
            0x20..=0x7e => body.push(byte as char),
            _ => body.push_str(&format!("\\x{:02x}", byte)),
        }
    }
    format!("b'{}'", body)
}

/// Bound `out` to `format.max_length` characters, replacing any cut
/// content with the truncation marker. The marker itself counts against
/// the budget so the result never exceeds `max_length`.
fn truncate(out: &mut String, format: &RenderFormat) {
    let char_count = out.chars().count();
    if char_count <= format.max_length {
        return;
    }
    let marker = format.truncation_marker;
    let keep = format.max_length.saturating_sub(marker.len());
    let mut truncated: String = out.chars().take(keep).collect();
    truncated.push_str(marker);
    *out = truncated;
}
