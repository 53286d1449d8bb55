//! Numeric decoding: fixed-width integers, floats, decimal text, and
//! variable-length two's-complement longs

use std::num::IntErrorKind;
use std::str::FromStr;

use num_bigint::BigInt;

use crate::error::{Result, UnpickleError};
use crate::value::Value;

/// Decode a 2-byte little-endian unsigned integer.
pub fn u16_le(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}

/// Decode a 4-byte little-endian unsigned integer.
pub fn u32_le(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes)
}

/// Decode a 4-byte little-endian signed integer.
pub fn i32_le(bytes: [u8; 4]) -> i32 {
    i32::from_le_bytes(bytes)
}

/// Decode an 8-byte little-endian unsigned integer.
pub fn u64_le(bytes: [u8; 8]) -> u64 {
    u64::from_le_bytes(bytes)
}

/// Decode an 8-byte big-endian IEEE-754 double.
pub fn f64_be(bytes: [u8; 8]) -> f64 {
    f64::from_be_bytes(bytes)
}

/// Convert a wire length to `usize`, rejecting negative values.
pub fn signed_len(len: i32, what: &'static str) -> Result<usize> {
    usize::try_from(len)
        .map_err(|_| UnpickleError::malformed(what, format!("negative byte count {len}")))
}

/// Convert an 8-byte wire length to `usize`, rejecting lengths the
/// platform cannot address.
pub fn wide_len(len: u64, what: &'static str) -> Result<usize> {
    usize::try_from(len)
        .ok()
        .filter(|&n| isize::try_from(n).is_ok())
        .ok_or_else(|| {
            UnpickleError::malformed(what, format!("length {len} exceeds the maximum size"))
        })
}

/// Decode a little-endian two's-complement integer of any length.
///
/// Up to eight bytes are sign-extended in an `i64`. Longer sequences go
/// through a big integer and are narrowed back to `Int` when they fit.
/// An empty sequence is zero.
pub fn decode_long(bytes: &[u8]) -> Value {
    let Some(&last) = bytes.last() else {
        return Value::Int(0);
    };
    if bytes.len() > 8 {
        return Value::from_bigint(BigInt::from_signed_bytes_le(bytes));
    }

    let fill = if last & 0x80 != 0 { 0xff } else { 0x00 };
    let mut buf = [fill; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    Value::Int(i64::from_le_bytes(buf))
}

/// Parse a decimal integer, promoting to a big integer on overflow.
pub fn parse_int(text: &[u8], what: &'static str) -> Result<Value> {
    let text = ascii(text, what)?;
    match i64::from_str(text) {
        Ok(n) => Ok(Value::Int(n)),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            BigInt::from_str(text)
                .map(Value::from_bigint)
                .map_err(|e| UnpickleError::malformed(what, format!("{text:?}: {e}")))
        }
        Err(e) => Err(UnpickleError::malformed(what, format!("{text:?}: {e}"))),
    }
}

/// Parse a legacy long literal: decimal digits with an optional trailing `L`.
pub fn parse_long(text: &[u8]) -> Result<Value> {
    let digits = text.strip_suffix(b"L").unwrap_or(text);
    if digits.is_empty() {
        return Err(UnpickleError::malformed("long", "empty literal"));
    }
    parse_int(digits, "long")
}

/// Parse a decimal float literal.
pub fn parse_float(text: &[u8]) -> Result<f64> {
    let text = ascii(text, "float")?;
    f64::from_str(text).map_err(|e| UnpickleError::malformed("float", format!("{text:?}: {e}")))
}

/// Parse a decimal memo index.
pub fn parse_memo_index(text: &[u8]) -> Result<u32> {
    let text = ascii(text, "memo index")?;
    u32::from_str(text)
        .map_err(|e| UnpickleError::malformed("memo index", format!("{text:?}: {e}")))
}

fn ascii<'t>(text: &'t [u8], what: &'static str) -> Result<&'t str> {
    std::str::from_utf8(text).map_err(|_| UnpickleError::malformed(what, "non-ASCII digits"))
}
