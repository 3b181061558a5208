//! PHP session store codec (the flat `session_encode()` format).
//!
//! Entries are `<key>|<serialized-value>` concatenated with no separator
//! between entries; the boundary is recoverable only because every embedded
//! value is self-delimiting.

use crate::decoder::{Cur, PhpDecoder};
use crate::encoder::PhpEncoder;
use crate::error::{PhpDecodeError, PhpEncodeError};
use crate::value::PhpValue;

/// Encodes ordered key/value pairs into the session format.
///
/// Keys containing `|` cannot be represented and are silently skipped.
/// Compatibility quirk, not an error.
pub fn encode_session(pairs: &[(String, PhpValue)]) -> Result<String, PhpEncodeError> {
    let mut enc = PhpEncoder::new();
    let mut out = String::new();
    for (key, value) in pairs {
        if key.contains('|') {
            continue;
        }
        out.push_str(key);
        out.push('|');
        out.push_str(&enc.encode(value)?);
    }
    Ok(out)
}

/// Decodes a session store into ordered key/value pairs.
///
/// One cursor is shared across the whole input: each decoded value leaves it
/// positioned at the start of the next key. Trailing input with no further
/// `|` in it is ignored.
pub fn decode_session(input: &str) -> Result<Vec<(String, PhpValue)>, PhpDecodeError> {
    let dec = PhpDecoder::new();
    let data = input.as_bytes();
    let mut c = Cur::new(data);
    let mut pairs = Vec::new();
    while c.pos < data.len() {
        let Some(rel) = data[c.pos..].iter().position(|&b| b == b'|') else {
            break;
        };
        let key = std::str::from_utf8(&data[c.pos..c.pos + rel])
            .map_err(|_| PhpDecodeError::InvalidUtf8(c.pos))?
            .to_string();
        c.pos += rel + 1;
        let value = dec.read_any(&mut c)?;
        pairs.push((key, value));
    }
    Ok(pairs)
}
