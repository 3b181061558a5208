//! `PhpDecoder` — PHP `serialize()` format decoder.
//!
//! Recursive descent over an explicit cursor. Each read leaves the cursor
//! exactly past the consumed token, which is what makes recursive decoding
//! of aggregates line up, and what lets the session codec decode one value
//! out of the middle of a larger buffer.

use crate::error::PhpDecodeError;
use crate::utf8::take_utf8;
use crate::value::{PhpKey, PhpObject, PhpValue};

/// Marker PHP prefixes onto protected property names (`"\0*\0name"`).
const PROTECTED_MARKER: &str = "\u{0}*\u{0}";

/// Cursor threaded through every read. One per top-level decode call; never
/// shared or reused across calls.
pub(crate) struct Cur<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) pos: usize,
}

impl<'a> Cur<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn peek(&self) -> Result<u8, PhpDecodeError> {
        if self.pos >= self.data.len() {
            return Err(PhpDecodeError::EndOfInput(self.pos));
        }
        Ok(self.data[self.pos])
    }

    /// Advances `n` bytes; landing exactly on the end is fine, running past
    /// it is not.
    fn skip(&mut self, n: usize) -> Result<(), PhpDecodeError> {
        if self.pos + n > self.data.len() {
            return Err(PhpDecodeError::EndOfInput(self.pos));
        }
        self.pos += n;
        Ok(())
    }

    /// Slice up to the next `stop` byte; the cursor lands just past it.
    fn read_until(&mut self, stop: u8) -> Result<&'a [u8], PhpDecodeError> {
        match self.data[self.pos..].iter().position(|&b| b == stop) {
            Some(rel) => {
                let res = &self.data[self.pos..self.pos + rel];
                self.pos += rel + 1;
                Ok(res)
            }
            None => Err(PhpDecodeError::DelimiterNotFound(stop as char, self.pos)),
        }
    }

    /// Consumes `byte_len` bytes of UTF-8 text, whole characters at a time.
    /// A length that splits a character consumes the whole character.
    fn read_utf8(&mut self, byte_len: usize) -> Result<&'a str, PhpDecodeError> {
        let start = self.pos;
        let end = take_utf8(self.data, start, byte_len)
            .ok_or(PhpDecodeError::EndOfInput(start))?;
        let s = std::str::from_utf8(&self.data[start..end])
            .map_err(|_| PhpDecodeError::InvalidUtf8(start))?;
        self.pos = end;
        Ok(s)
    }
}

/// Stateless decoder for the PHP `serialize()` text format.
///
/// Type tags are matched case-insensitively, so output of PHP itself
/// (`N;`, `O:8:"stdClass":…`) decodes as well as this crate's lowercase
/// encoding.
#[derive(Default)]
pub struct PhpDecoder;

impl PhpDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decodes one value from `data`.
    ///
    /// Trailing bytes after the value are ignored, as PHP's own
    /// `unserialize()` ignores them; use
    /// [`decode_session`](crate::decode_session) for buffers that hold more
    /// than one value.
    pub fn decode(&self, data: &[u8]) -> Result<PhpValue, PhpDecodeError> {
        let mut c = Cur::new(data);
        self.read_any(&mut c)
    }

    /// Convenience: decode from a string slice.
    pub fn decode_str(&self, s: &str) -> Result<PhpValue, PhpDecodeError> {
        self.decode(s.as_bytes())
    }

    pub(crate) fn read_any(&self, c: &mut Cur) -> Result<PhpValue, PhpDecodeError> {
        let at = c.pos;
        let tag = c.peek()?;
        c.skip(2)?; // tag byte plus its separator
        match tag.to_ascii_lowercase() {
            b'i' => self.read_int(c),
            b'b' => self.read_bool(c),
            b'd' => self.read_float(c),
            b'n' => Ok(PhpValue::Null),
            b's' => Ok(PhpValue::Str(self.read_str(c)?.to_string())),
            b'a' => self.read_arr(c),
            b'o' => self.read_obj(c),
            other => Err(PhpDecodeError::UnknownTag(other as char, at)),
        }
    }

    // ---------------------------------------------------------------- scalars

    fn read_int(&self, c: &mut Cur) -> Result<PhpValue, PhpDecodeError> {
        let at = c.pos;
        let digits = c.read_until(b';')?;
        let n: i64 = std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(PhpDecodeError::InvalidInt(at))?;
        Ok(PhpValue::Int(n))
    }

    fn read_bool(&self, c: &mut Cur) -> Result<PhpValue, PhpDecodeError> {
        // Only a literal `0` is false; anything else, including an empty
        // payload, is true. Compatibility quirk, kept on purpose.
        let payload = c.read_until(b';')?;
        Ok(PhpValue::Bool(payload != b"0"))
    }

    fn read_float(&self, c: &mut Cur) -> Result<PhpValue, PhpDecodeError> {
        let at = c.pos;
        let payload = c.read_until(b';')?;
        let f = match payload {
            b"NAN" => f64::NAN,
            b"INF" => f64::INFINITY,
            b"-INF" => f64::NEG_INFINITY,
            other => std::str::from_utf8(other)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or(PhpDecodeError::InvalidFloat(at))?,
        };
        Ok(PhpValue::Float(f))
    }

    // ---------------------------------------------------------------- strings

    /// Reads a length-prefixed string: digits up to `:`, an opening quote,
    /// `byte_len` bytes of text, then a two-byte skip. The same routine
    /// reads value strings (closing `";`) and object class names (closing
    /// `":`).
    fn read_str<'a>(&self, c: &mut Cur<'a>) -> Result<&'a str, PhpDecodeError> {
        let byte_len = self.read_len(c)?;
        c.skip(1)?; // opening quote
        let s = c.read_utf8(byte_len)?;
        c.skip(2)?;
        Ok(s)
    }

    fn read_len(&self, c: &mut Cur) -> Result<usize, PhpDecodeError> {
        let at = c.pos;
        let digits = c.read_until(b':')?;
        std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(PhpDecodeError::InvalidLength(at))
    }

    // ---------------------------------------------------------------- aggregates

    /// Keys come off the wire as full values, narrowed to [`PhpKey`].
    fn read_key(&self, c: &mut Cur, strip_marker: bool) -> Result<PhpKey, PhpDecodeError> {
        let at = c.pos;
        match self.read_any(c)? {
            PhpValue::Int(n) => Ok(PhpKey::Int(n)),
            PhpValue::Str(s) => {
                let s = if strip_marker {
                    s.replacen(PROTECTED_MARKER, "", 1)
                } else {
                    s
                };
                Ok(PhpKey::Str(s))
            }
            _ => Err(PhpDecodeError::InvalidKey(at)),
        }
    }

    fn read_arr(&self, c: &mut Cur) -> Result<PhpValue, PhpDecodeError> {
        let count = self.read_len(c)?;
        c.skip(1)?; // `{`
        let mut pairs: Vec<(PhpKey, PhpValue)> = Vec::new();
        let mut is_list = true;
        for i in 0..count {
            let key = self.read_key(c, false)?;
            let value = self.read_any(c)?;
            is_list = is_list && matches!(&key, PhpKey::Int(k) if *k == i as i64);
            pairs.push((key, value));
        }
        c.skip(1)?; // `}`
        if is_list {
            Ok(PhpValue::Array(pairs.into_iter().map(|(_, v)| v).collect()))
        } else {
            Ok(PhpValue::Dict(pairs))
        }
    }

    fn read_obj(&self, c: &mut Cur) -> Result<PhpValue, PhpDecodeError> {
        let class = self.read_str(c)?.to_string();
        let count = self.read_len(c)?;
        c.skip(1)?; // `{`
        let mut props = Vec::new();
        for _ in 0..count {
            let key = self.read_key(c, true)?;
            let value = self.read_any(c)?;
            props.push((key, value));
        }
        c.skip(1)?; // `}`
        Ok(PhpValue::Object(PhpObject { class, props }))
    }
}

/// Decodes one value from PHP `serialize()` output.
pub fn unserialize(input: &str) -> Result<PhpValue, PhpDecodeError> {
    PhpDecoder::new().decode_str(input)
}
