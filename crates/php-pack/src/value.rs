//! [`PhpValue`] — the value type encoded and decoded by this crate.

use std::fmt;

/// An array key. PHP arrays are keyed by integers or strings; no other key
/// type exists on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhpKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for PhpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhpKey::Int(n) => write!(f, "{n}"),
            PhpKey::Str(s) => f.write_str(s),
        }
    }
}

/// An object: an ordered property map tagged with a class name.
///
/// Objects decode into this generic record; no class hydration happens.
#[derive(Debug, Clone, PartialEq)]
pub struct PhpObject {
    pub class: String,
    pub props: Vec<(PhpKey, PhpValue)>,
}

impl PhpObject {
    pub fn new(class: impl Into<String>, props: Vec<(PhpKey, PhpValue)>) -> Self {
        Self {
            class: class.into(),
            props,
        }
    }
}

/// A value in the PHP `serialize()` data model.
///
/// `Array` and `Dict` are wire-compatible: both encode under the `a:` tag.
/// The decoder rebuilds an `Array` only when the keys are exactly the
/// integers `0..n-1` in order, otherwise a `Dict`. A `Dict` with sequential
/// integer keys is therefore indistinguishable from an `Array` on the wire;
/// this ambiguity is part of the format.
#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    Null,
    Bool(bool),
    /// Integer. The canonical encoding covers the 32-bit signed range;
    /// values outside it encode as floats.
    Int(i64),
    /// Floating-point number, including NaN and ±infinity.
    Float(f64),
    /// Unicode text. Length prefixes on the wire count UTF-8 bytes.
    Str(String),
    /// Raw binary. The wire format is strictly UTF-8 text, so binary data
    /// has no representation; encoding this variant fails with
    /// [`PhpEncodeError::UnsupportedType`](crate::PhpEncodeError::UnsupportedType).
    Bytes(Vec<u8>),
    /// Ordered sequence, indexed `0..n-1`.
    Array(Vec<PhpValue>),
    /// Ordered key/value map; insertion order is preserved.
    Dict(Vec<(PhpKey, PhpValue)>),
    /// A `Dict` tagged with a class name.
    Object(PhpObject),
}

impl From<serde_json::Value> for PhpValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => PhpValue::Null,
            serde_json::Value::Bool(b) => PhpValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PhpValue::Int(i)
                } else {
                    PhpValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => PhpValue::Str(s),
            serde_json::Value::Array(arr) => {
                PhpValue::Array(arr.into_iter().map(PhpValue::from).collect())
            }
            serde_json::Value::Object(obj) => PhpValue::Dict(
                obj.into_iter()
                    .map(|(k, v)| (PhpKey::Str(k), PhpValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<PhpValue> for serde_json::Value {
    fn from(v: PhpValue) -> Self {
        match v {
            PhpValue::Null => serde_json::Value::Null,
            PhpValue::Bool(b) => serde_json::Value::Bool(b),
            PhpValue::Int(i) => serde_json::Value::from(i),
            // Non-finite floats become null; JSON cannot carry them.
            PhpValue::Float(f) => serde_json::Value::from(f),
            PhpValue::Str(s) => serde_json::Value::String(s),
            PhpValue::Bytes(_) => serde_json::Value::Null,
            PhpValue::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            PhpValue::Dict(pairs) => {
                let mut map = serde_json::Map::new();
                for (k, v) in pairs {
                    map.insert(k.to_string(), serde_json::Value::from(v));
                }
                serde_json::Value::Object(map)
            }
            PhpValue::Object(obj) => {
                let mut props = serde_json::Map::new();
                for (k, v) in obj.props {
                    props.insert(k.to_string(), serde_json::Value::from(v));
                }
                let mut outer = serde_json::Map::new();
                outer.insert(obj.class, serde_json::Value::Object(props));
                serde_json::Value::Object(outer)
            }
        }
    }
}
