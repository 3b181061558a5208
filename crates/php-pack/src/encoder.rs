//! `PhpEncoder` — PHP `serialize()` format encoder.
//!
//! Wire format:
//! - Null:   `N;`
//! - Bool:   `b:0;` / `b:1;`
//! - Int:    `i:<decimal>;`                 (32-bit signed range)
//! - Float:  `d:<repr>;`                    (`NAN`, `INF`, `-INF` literals)
//! - String: `s:<utf8-byte-length>:"<raw>";`
//! - Array:  `a:<count>:{<key><value>…}`
//! - Object: `o:<len>:"<class>":<count>:{<key><value>…}`
//!
//! Strings are emitted raw, without escaping; the byte-length prefix is what
//! delimits them.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::PhpEncodeError;
use crate::value::{PhpKey, PhpObject, PhpValue};

/// Encodes [`PhpValue`] trees into the PHP `serialize()` text format.
pub struct PhpEncoder {
    out: String,
    class_names: HashMap<String, String>,
}

impl Default for PhpEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PhpEncoder {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            class_names: HashMap::new(),
        }
    }

    /// An encoder that rewrites object class names through `class_names`
    /// while encoding; unmapped names are emitted verbatim.
    pub fn with_class_names(class_names: HashMap<String, String>) -> Self {
        Self {
            out: String::new(),
            class_names,
        }
    }

    pub fn encode(&mut self, value: &PhpValue) -> Result<String, PhpEncodeError> {
        self.out.clear();
        self.write_any(value)?;
        Ok(std::mem::take(&mut self.out))
    }

    fn write_any(&mut self, value: &PhpValue) -> Result<(), PhpEncodeError> {
        match value {
            PhpValue::Null => {
                self.out.push_str("N;");
                Ok(())
            }
            PhpValue::Bool(b) => {
                self.out.push_str(if *b { "b:1;" } else { "b:0;" });
                Ok(())
            }
            PhpValue::Int(n) => {
                // Only the 32-bit signed range has a canonical integer
                // encoding; everything else goes out as a float.
                if i32::try_from(*n).is_ok() {
                    let _ = write!(self.out, "i:{n};");
                } else {
                    self.write_float(*n as f64);
                }
                Ok(())
            }
            PhpValue::Float(f) => {
                self.write_float(*f);
                Ok(())
            }
            PhpValue::Str(s) => {
                self.write_str(s);
                Ok(())
            }
            PhpValue::Bytes(_) => Err(PhpEncodeError::UnsupportedType),
            PhpValue::Array(items) => self.write_arr(items),
            PhpValue::Dict(pairs) => self.write_dict(pairs),
            PhpValue::Object(obj) => self.write_obj(obj),
        }
    }

    fn write_float(&mut self, f: f64) {
        if f.is_nan() {
            self.out.push_str("d:NAN;");
        } else if f == f64::INFINITY {
            self.out.push_str("d:INF;");
        } else if f == f64::NEG_INFINITY {
            self.out.push_str("d:-INF;");
        } else {
            let _ = write!(self.out, "d:{f};");
        }
    }

    fn write_str(&mut self, s: &str) {
        let _ = write!(self.out, "s:{}:\"{s}\";", s.len());
    }

    fn write_key(&mut self, key: &PhpKey) {
        match key {
            // Keys are integers on the wire regardless of range.
            PhpKey::Int(n) => {
                let _ = write!(self.out, "i:{n};");
            }
            PhpKey::Str(s) => self.write_str(s),
        }
    }

    fn write_arr(&mut self, items: &[PhpValue]) -> Result<(), PhpEncodeError> {
        let _ = write!(self.out, "a:{}:{{", items.len());
        for (i, item) in items.iter().enumerate() {
            let _ = write!(self.out, "i:{i};");
            self.write_any(item)?;
        }
        self.out.push('}');
        Ok(())
    }

    fn write_dict(&mut self, pairs: &[(PhpKey, PhpValue)]) -> Result<(), PhpEncodeError> {
        let _ = write!(self.out, "a:{}:{{", pairs.len());
        for (key, value) in pairs {
            self.write_key(key);
            self.write_any(value)?;
        }
        self.out.push('}');
        Ok(())
    }

    fn write_obj(&mut self, obj: &PhpObject) -> Result<(), PhpEncodeError> {
        let class = self
            .class_names
            .get(&obj.class)
            .map(String::as_str)
            .unwrap_or(obj.class.as_str());
        let _ = write!(
            self.out,
            "o:{}:\"{class}\":{}:{{",
            class.len(),
            obj.props.len()
        );
        for (key, value) in &obj.props {
            self.write_key(key);
            self.write_any(value)?;
        }
        self.out.push('}');
        Ok(())
    }
}

/// Serializes a value into the PHP `serialize()` text format.
pub fn serialize(value: &PhpValue) -> Result<String, PhpEncodeError> {
    PhpEncoder::new().encode(value)
}

/// Serializes with object class names rewritten through `class_names`.
pub fn serialize_with_class_names(
    value: &PhpValue,
    class_names: &HashMap<String, String>,
) -> Result<String, PhpEncodeError> {
    PhpEncoder::with_class_names(class_names.clone()).encode(value)
}
