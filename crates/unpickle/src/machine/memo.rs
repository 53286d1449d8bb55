//! Memo opcodes
//!
//! `PUT` stores the top of the stack without popping it; `GET` pushes a
//! handle to the stored value. Neither copies: both sides alias.

use super::{Step, Unpickler};
use crate::error::{Result, UnpickleError};
use crate::numeric;

pub(super) fn get(u: &mut Unpickler<'_>) -> Result<Step> {
    let index = numeric::parse_memo_index(u.cursor.read_line()?)?;
    u.memo_get(index)?;
    Ok(Step::Continue)
}

pub(super) fn bin_get(u: &mut Unpickler<'_>) -> Result<Step> {
    let index = u.cursor.read_byte()?;
    u.memo_get(u32::from(index))?;
    Ok(Step::Continue)
}

pub(super) fn long_bin_get(u: &mut Unpickler<'_>) -> Result<Step> {
    let index = numeric::u32_le(u.cursor.read_array()?);
    u.memo_get(index)?;
    Ok(Step::Continue)
}

pub(super) fn put(u: &mut Unpickler<'_>) -> Result<Step> {
    let index = numeric::parse_memo_index(u.cursor.read_line()?)?;
    u.memo_put(index, "PUT")?;
    Ok(Step::Continue)
}

pub(super) fn bin_put(u: &mut Unpickler<'_>) -> Result<Step> {
    let index = u.cursor.read_byte()?;
    u.memo_put(u32::from(index), "BINPUT")?;
    Ok(Step::Continue)
}

pub(super) fn long_bin_put(u: &mut Unpickler<'_>) -> Result<Step> {
    let index = numeric::u32_le(u.cursor.read_array()?);
    u.memo_put(index, "LONG_BINPUT")?;
    Ok(Step::Continue)
}

/// Store the top of the stack under the next sequential index.
pub(super) fn memoize(u: &mut Unpickler<'_>) -> Result<Step> {
    let index = u32::try_from(u.memo_len())
        .map_err(|_| UnpickleError::Unsupported("memo exceeds 2^32 entries".to_string()))?;
    u.memo_put(index, "MEMOIZE")?;
    Ok(Step::Continue)
}

#[cfg(test)]
mod tests {
    use crate::{loads, UnpickleError, Value};

    #[test]
    fn test_put_does_not_pop() {
        assert_eq!(loads(b"K\x07p0\n.").unwrap(), Value::Int(7));
    }

    #[test]
    fn test_put_on_empty_stack() {
        assert!(matches!(
            loads(b"q\x00N."),
            Err(UnpickleError::StackUnderflow("BINPUT"))
        ));
    }

    #[test]
    fn test_memoize_uses_memo_size() {
        // Two values memoized as 0 and 1, then fetched back in reverse
        let value = loads(b"\x80\x04K\x01\x94K\x02\x94h\x01h\x00\x86.").unwrap();
        assert_eq!(value, Value::tuple(vec![Value::Int(2), Value::Int(1)]));
    }

    #[test]
    fn test_get_line_must_be_decimal() {
        assert!(matches!(
            loads(b"N\x94gx\n."),
            Err(UnpickleError::MalformedLiteral { .. })
        ));
    }
}
