//! Scalar, text and byte literal opcodes

use super::{Step, Unpickler};
use crate::error::{Result, UnpickleError};
use crate::numeric;
use crate::value::{Text, Value};

fn push(u: &mut Unpickler<'_>, value: Value) -> Result<Step> {
    u.push(value);
    Ok(Step::Continue)
}

// ═══════════════════════════════════════════════════════════════════════
// Scalars
// ═══════════════════════════════════════════════════════════════════════

pub(super) fn none(u: &mut Unpickler<'_>) -> Result<Step> {
    push(u, Value::None)
}

pub(super) fn new_true(u: &mut Unpickler<'_>) -> Result<Step> {
    push(u, Value::Bool(true))
}

pub(super) fn new_false(u: &mut Unpickler<'_>) -> Result<Step> {
    push(u, Value::Bool(false))
}

/// Decimal text integer; `01` and `00` are the protocol 0 booleans.
pub(super) fn int(u: &mut Unpickler<'_>) -> Result<Step> {
    let value = match u.cursor.read_line()? {
        b"01" => Value::Bool(true),
        b"00" => Value::Bool(false),
        digits => numeric::parse_int(digits, "int")?,
    };
    push(u, value)
}

pub(super) fn bin_int(u: &mut Unpickler<'_>) -> Result<Step> {
    let n = numeric::i32_le(u.cursor.read_array()?);
    push(u, Value::Int(i64::from(n)))
}

pub(super) fn bin_int1(u: &mut Unpickler<'_>) -> Result<Step> {
    let n = u.cursor.read_byte()?;
    push(u, Value::Int(i64::from(n)))
}

pub(super) fn bin_int2(u: &mut Unpickler<'_>) -> Result<Step> {
    let n = numeric::u16_le(u.cursor.read_array()?);
    push(u, Value::Int(i64::from(n)))
}

pub(super) fn long(u: &mut Unpickler<'_>) -> Result<Step> {
    let value = numeric::parse_long(u.cursor.read_line()?)?;
    push(u, value)
}

pub(super) fn long1(u: &mut Unpickler<'_>) -> Result<Step> {
    let len = u.cursor.read_byte()?;
    let bytes = u.cursor.read(usize::from(len))?;
    push(u, numeric::decode_long(bytes))
}

pub(super) fn long4(u: &mut Unpickler<'_>) -> Result<Step> {
    let len = numeric::i32_le(u.cursor.read_array()?);
    let len = numeric::signed_len(len, "LONG4 length")?;
    let bytes = u.cursor.read(len)?;
    push(u, numeric::decode_long(bytes))
}

pub(super) fn float(u: &mut Unpickler<'_>) -> Result<Step> {
    let f = numeric::parse_float(u.cursor.read_line()?)?;
    push(u, Value::Float(f))
}

pub(super) fn bin_float(u: &mut Unpickler<'_>) -> Result<Step> {
    let f = numeric::f64_be(u.cursor.read_array()?);
    push(u, Value::Float(f))
}

// ═══════════════════════════════════════════════════════════════════════
// Text
// ═══════════════════════════════════════════════════════════════════════

/// Quoted string line. The quotes are stripped; escapes are kept as-is.
pub(super) fn string(u: &mut Unpickler<'_>) -> Result<Step> {
    let line = u.cursor.read_line()?;
    let inner = match line {
        [open @ (b'\'' | b'"'), inner @ .., close] if open == close => inner,
        _ => {
            return Err(UnpickleError::malformed(
                "string",
                "the STRING opcode argument must be quoted",
            ))
        }
    };
    push(u, Value::Text(Text::from_legacy(inner)))
}

pub(super) fn bin_string(u: &mut Unpickler<'_>) -> Result<Step> {
    let len = numeric::i32_le(u.cursor.read_array()?);
    let len = numeric::signed_len(len, "BINSTRING length")?;
    let bytes = u.cursor.read(len)?;
    push(u, Value::Text(Text::from_legacy(bytes)))
}

pub(super) fn short_bin_string(u: &mut Unpickler<'_>) -> Result<Step> {
    let len = u.cursor.read_byte()?;
    let bytes = u.cursor.read(usize::from(len))?;
    push(u, Value::Text(Text::from_legacy(bytes)))
}

/// Raw-unicode-escape line, taken byte for byte.
pub(super) fn unicode(u: &mut Unpickler<'_>) -> Result<Step> {
    let line = u.cursor.read_line()?;
    push(u, Value::Text(Text::from_latin1(line)))
}

pub(super) fn bin_unicode(u: &mut Unpickler<'_>) -> Result<Step> {
    let len = numeric::u32_le(u.cursor.read_array()?);
    let bytes = u.cursor.read(len as usize)?;
    push(u, Value::Text(Text::from_utf8_lossy(bytes)))
}

pub(super) fn short_bin_unicode(u: &mut Unpickler<'_>) -> Result<Step> {
    let len = u.cursor.read_byte()?;
    let bytes = u.cursor.read(usize::from(len))?;
    push(u, Value::Text(Text::from_utf8_lossy(bytes)))
}

pub(super) fn bin_unicode8(u: &mut Unpickler<'_>) -> Result<Step> {
    let len = numeric::u64_le(u.cursor.read_array()?);
    let len = numeric::wide_len(len, "BINUNICODE8 length")?;
    let bytes = u.cursor.read(len)?;
    push(u, Value::Text(Text::from_utf8_lossy(bytes)))
}

// ═══════════════════════════════════════════════════════════════════════
// Bytes
// ═══════════════════════════════════════════════════════════════════════

pub(super) fn bin_bytes(u: &mut Unpickler<'_>) -> Result<Step> {
    let len = numeric::u32_le(u.cursor.read_array()?);
    let bytes = u.cursor.read(len as usize)?;
    push(u, Value::bytes(bytes))
}

pub(super) fn short_bin_bytes(u: &mut Unpickler<'_>) -> Result<Step> {
    let len = u.cursor.read_byte()?;
    let bytes = u.cursor.read(usize::from(len))?;
    push(u, Value::bytes(bytes))
}

pub(super) fn bin_bytes8(u: &mut Unpickler<'_>) -> Result<Step> {
    let len = numeric::u64_le(u.cursor.read_array()?);
    let len = numeric::wide_len(len, "BINBYTES8 length")?;
    let bytes = u.cursor.read(len)?;
    push(u, Value::bytes(bytes))
}

pub(super) fn byte_array8(u: &mut Unpickler<'_>) -> Result<Step> {
    let len = numeric::u64_le(u.cursor.read_array()?);
    let len = numeric::wide_len(len, "BYTEARRAY8 length")?;
    let bytes = u.cursor.read(len)?;
    push(u, Value::byte_array(bytes))
}
