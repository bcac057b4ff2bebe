use std::collections::BTreeMap;
use std::fmt;

use crate::model::Model;

// ── Value ─────────────────────────────────────────────────────────────────

/// A dynamically typed attribute value.
///
/// Plain containers (`Array`, `Object`) are owned graphs living inside a model
/// attribute. A `Model` variant is a shared handle to another attribute store,
/// so writes through it go via [`Model::set`] and raise that model's change
/// notification.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    Model(Model),
}

impl Value {
    pub fn empty_object() -> Self {
        Value::Object(BTreeMap::new())
    }

    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn array<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Array(items.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Host-language truthiness: `null`, `false`, `0`, `NaN` and `""` are
    /// falsy, every container is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Model(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Value::Model(m) => Some(m),
            _ => None,
        }
    }

    /// Plain property read. A model answers through [`Model::get`]; reading a
    /// key from anything that is not an object yields `Null`.
    pub fn get_key(&self, key: &str) -> Value {
        match self {
            Value::Model(m) => m.get(key),
            Value::Object(map) => map.get(key).cloned().unwrap_or_default(),
            _ => Value::Null,
        }
    }

    /// Numeric coercion used by [`loose_eq`](Self::loose_eq).
    fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::Str(s) => {
                let t = s.trim();
                if t.is_empty() { 0.0 } else { t.parse().unwrap_or(f64::NAN) }
            }
            Value::Array(_) | Value::Object(_) | Value::Model(_) => f64::NAN,
        }
    }

    /// Loose equality between an element reading and a model value.
    ///
    /// Element reads are mostly strings while model attributes may be numbers
    /// or booleans, so `"5"` equals `5` and `"1"` equals `true`. `Null` only
    /// equals `Null`.
    ///
    /// A string equals a container when it is the container's JSON text, the
    /// same text [`to_display`](Self::to_display) writes into an element. An
    /// element showing an array therefore compares equal to it, where a
    /// comma-joined reading (`"a,b"`) does not.
    pub fn loose_eq(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Null, _) | (_, Null) => false,
            (Str(a), Str(b)) => a == b,
            (Number(a), Number(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Bool(_), _) | (_, Bool(_)) | (Number(_), Str(_)) | (Str(_), Number(_)) => {
                self.to_number() == other.to_number()
            }
            (Str(s), container) | (container, Str(s)) => *s == container.to_display(),
            _ => self == other,
        }
    }

    /// Text shown by an element displaying this value. `Null` renders empty.
    pub fn to_display(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

// ── Equality ──────────────────────────────────────────────────────────────

impl PartialEq for Value {
    /// Structural for plain data, identity for models.
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Number(a), Number(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            (Model(a), Model(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

// ── Display ───────────────────────────────────────────────────────────────

/// Largest magnitude below which every integral `f64` is exact.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// JSON form of a container. Models contribute a snapshot of their
/// attributes; numbers that JSON cannot carry (`NaN`, infinities) become
/// `null`.
fn to_json(v: &Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match v {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => Json::from(*n as i64),
        Value::Number(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::Str(s) => Json::String(s.clone()),
        Value::Array(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Object(map) => map_to_json(map),
        Value::Model(m) => map_to_json(&m.attributes()),
    }
}

fn map_to_json(map: &BTreeMap<String, Value>) -> serde_json::Value {
    serde_json::Value::Object(map.iter().map(|(k, v)| (k.clone(), to_json(v))).collect())
}

/// Scalars print the way an element shows them (strings raw); containers
/// print as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Str(s) => f.write_str(s),
            container => write!(f, "{}", to_json(container)),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────

impl From<&str> for Value {
    fn from(v: &str) -> Self { Value::Str(v.to_string()) }
}
impl From<String> for Value {
    fn from(v: String) -> Self { Value::Str(v) }
}
impl From<bool> for Value {
    fn from(v: bool) -> Self { Value::Bool(v) }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self { Value::Number(v) }
}
impl From<i32> for Value {
    fn from(v: i32) -> Self { Value::Number(f64::from(v)) }
}
impl From<u32> for Value {
    fn from(v: u32) -> Self { Value::Number(f64::from(v)) }
}
impl From<i64> for Value {
    fn from(v: i64) -> Self { Value::Number(v as f64) }
}
impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self { Value::Array(v) }
}
impl From<Model> for Value {
    fn from(v: Model) -> Self { Value::Model(v) }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map_or(Value::Null, Into::into) }
}
