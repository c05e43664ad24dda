//! Raw and typed configuration values.
//!
//! Every value a source can hand the engine, and every type a setting can
//! declare, is one of a closed set of variants. Adapters convert their
//! native representations (TOML scalars, command-line text, typed Rust
//! values) into [`Value`] before submitting them.

use std::fmt;
use std::time::Duration;

/// A configuration value.
///
/// Carries both raw source values (often `String`) and the coerced values
/// stored on settings. Lists are untyped on the way in; the coercion engine
/// narrows their elements to the setting's declared element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    Duration(Duration),
    List(Vec<Value>),
}

/// The declared type of a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    String,
    Int,
    Bool,
    Duration,
    List(Box<Kind>),
}

impl Value {
    /// Returns `true` if the value already has the given kind.
    ///
    /// An empty list matches every list kind; a non-empty list matches when
    /// all of its elements match the element kind.
    pub fn matches(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Value::String(_), Kind::String)
            | (Value::Int(_), Kind::Int)
            | (Value::Bool(_), Kind::Bool)
            | (Value::Duration(_), Kind::Duration) => true,
            (Value::List(items), Kind::List(elem)) => items.iter().all(|v| v.matches(elem)),
            _ => false,
        }
    }

    /// A short noun for this value's shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
            Value::Duration(_) => "duration",
            Value::List(_) => "list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl Kind {
    /// The well-typed zero value of this kind.
    ///
    /// Settings constructed without an explicit default start at this value,
    /// so a setting's current value is never "unset".
    pub fn zero(&self) -> Value {
        match self {
            Kind::String => Value::String(String::new()),
            Kind::Int => Value::Int(0),
            Kind::Bool => Value::Bool(false),
            Kind::Duration => Value::Duration(Duration::ZERO),
            Kind::List(_) => Value::List(Vec::new()),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::String => write!(f, "string"),
            Kind::Int => write!(f, "integer"),
            Kind::Bool => write!(f, "boolean"),
            Kind::Duration => write!(f, "duration"),
            Kind::List(elem) => write!(f, "list of {elem}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Duration(d) => write!(f, "{}", format_duration(*d)),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

/// Formats a duration in the compound unit syntax the coercion engine
/// parses, e.g. `2h30m`, `150ms`.
fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < 1_000_000_000 {
        return if nanos % 1_000_000 == 0 {
            format!("{}ms", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            format!("{}us", nanos / 1_000)
        } else {
            format!("{nanos}ns")
        };
    }

    let mut out = String::new();
    let total_secs = nanos / 1_000_000_000;
    let (h, m, s) = (total_secs / 3600, total_secs % 3600 / 60, total_secs % 60);
    if h > 0 {
        out.push_str(&format!("{h}h"));
    }
    if m > 0 {
        out.push_str(&format!("{m}m"));
    }
    let sub_ms = nanos % 1_000_000_000 / 1_000_000;
    if sub_ms > 0 {
        out.push_str(&format!("{s}.{sub_ms:03}s"));
    } else if s > 0 || out.is_empty() {
        out.push_str(&format!("{s}s"));
    }
    out
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
