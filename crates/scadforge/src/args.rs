//! Deterministic argument rendering for the emitted language.
//!
//! A [`Args`] value is an ordered list of `key=value` pairs; rendering it
//! always yields the same text for the same input. Rules: numbers render
//! bare with locale-free formatting, vectors as bracketed comma lists,
//! strings double-quoted, `$`-prefixed resolution hints verbatim, and
//! absent optional fields are omitted entirely (never `null`).

use scadforge_ir::{Vec2, Vec3};

/// A renderable argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Bare number.
    Num(f64),
    /// `true` / `false`.
    Bool(bool),
    /// Double-quoted string.
    Str(String),
    /// `[x, y]`.
    List2(Vec2),
    /// `[x, y, z]`.
    List3(Vec3),
    /// `[[x, y], ...]`.
    Points2(Vec<Vec2>),
    /// `[[x, y, z], ...]`.
    Points3(Vec<Vec3>),
    /// `[[a, b, c], ...]` triangle index lists.
    Faces(Vec<[u32; 3]>),
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Num(v)
    }
}

impl From<u32> for ArgValue {
    fn from(v: u32) -> Self {
        ArgValue::Num(v as f64)
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

impl From<Vec2> for ArgValue {
    fn from(v: Vec2) -> Self {
        ArgValue::List2(v)
    }
}

impl From<Vec3> for ArgValue {
    fn from(v: Vec3) -> Self {
        ArgValue::List3(v)
    }
}

impl ArgValue {
    fn render(&self) -> String {
        match self {
            ArgValue::Num(v) => fmt_num(*v),
            ArgValue::Bool(v) => v.to_string(),
            ArgValue::Str(v) => quote(v),
            ArgValue::List2(v) => fmt_vec2(*v),
            ArgValue::List3(v) => fmt_vec3(*v),
            ArgValue::Points2(pts) => {
                bracketed(pts.iter().map(|p| fmt_vec2(*p)))
            }
            ArgValue::Points3(pts) => {
                bracketed(pts.iter().map(|p| fmt_vec3(*p)))
            }
            ArgValue::Faces(faces) => bracketed(
                faces
                    .iter()
                    .map(|f| format!("[{}, {}, {}]", f[0], f[1], f[2])),
            ),
        }
    }
}

/// Ordered `key=value` argument list with stable rendering.
#[derive(Debug, Clone, Default)]
pub struct Args {
    items: Vec<(&'static str, ArgValue)>,
}

impl Args {
    /// Empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument.
    pub fn arg(mut self, key: &'static str, value: impl Into<ArgValue>) -> Self {
        self.items.push((key, value.into()));
        self
    }

    /// Append an argument if the value is present; `None` is omitted.
    pub fn opt(mut self, key: &'static str, value: Option<impl Into<ArgValue>>) -> Self {
        if let Some(v) = value {
            self.items.push((key, v.into()));
        }
        self
    }

    /// Render as `key=value, key=value, ...` in insertion order.
    pub fn render(&self) -> String {
        self.items
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.render()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Format a number bare, shortest round-trip form, no locale separators.
pub fn fmt_num(v: f64) -> String {
    v.to_string()
}

/// Format a 2-vector as `[x, y]`.
pub fn fmt_vec2(v: Vec2) -> String {
    format!("[{}, {}]", fmt_num(v.x), fmt_num(v.y))
}

/// Format a 3-vector as `[x, y, z]`.
pub fn fmt_vec3(v: Vec3) -> String {
    format!("[{}, {}, {}]", fmt_num(v.x), fmt_num(v.y), fmt_num(v.z))
}

/// Double-quote a string, escaping backslashes and quotes.
pub fn quote(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn bracketed(items: impl Iterator<Item = String>) -> String {
    format!("[{}]", items.collect::<Vec<_>>().join(", "))
}
