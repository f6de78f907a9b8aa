//! Values bound to handler slots.

use std::env;
use std::fmt;

/// A value bound to one handler slot, or declared as a slot default.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Flag presence, or a boolean default.
    Bool(bool),
    /// Option value coerced with `int`.
    Int(i64),
    /// Option value coerced with `float`.
    Float(f64),
    /// Uncoerced option value or positional argument.
    Str(String),
    /// The (suffix, value) pairs a prefix slot accumulated, in the order
    /// they appeared on the command line.
    Pairs(Vec<(String, Option<String>)>),
    /// Explicit "no value" default. Renders as nothing in usage text.
    None,
}

impl Value {
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
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_pairs(&self) -> Option<&[(String, Option<String>)]> {
        match self {
            Value::Pairs(pairs) => Some(pairs),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Pairs(pairs) => {
                for (i, (name, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match value {
                        Some(v) => write!(f, "{name}={v}")?,
                        None => f.write_str(name)?,
                    }
                }
                Ok(())
            }
            Value::None => Ok(()),
        }
    }
}

/// Expands `$VAR` / `${VAR}` from the environment, then a leading `~`, the
/// way values of `path`-coerced options are bound. Unknown variables and
/// `~user` forms are left as written.
pub(crate) fn expand_path(raw: &str) -> String {
    expand_home(&expand_env(raw))
}

fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(at) = rest.find('$') {
        out.push_str(&rest[..at]);
        let tail = &rest[at + 1..];
        if let Some(body) = tail.strip_prefix('{') {
            let Some(end) = body.find('}') else {
                out.push('$');
                rest = tail;
                continue;
            };
            let name = &body[..end];
            match env::var(name) {
                Ok(value) => out.push_str(&value),
                Err(_) => {
                    out.push('$');
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
            rest = &body[end + 1..];
            continue;
        }
        let len = tail
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .map(char::len_utf8)
            .sum::<usize>();
        if len == 0 {
            out.push('$');
            rest = tail;
            continue;
        }
        let name = &tail[..len];
        match env::var(name) {
            Ok(value) => out.push_str(&value),
            Err(_) => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &tail[len..];
    }
    out.push_str(rest);
    out
}

fn expand_home(input: &str) -> String {
    if let Some(rest) = input.strip_prefix('~') {
        if rest.is_empty() || rest.starts_with('/') {
            if let Some(home) = dirs::home_dir() {
                return format!("{}{rest}", home.display());
            }
        }
    }
    input.to_string()
}
