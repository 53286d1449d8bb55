//! Stack control, protocol and framing opcodes

use tracing::debug;

use super::{Step, Unpickler};
use crate::error::{Result, UnpickleError};
use crate::numeric;
use crate::opcode::HIGHEST_PROTOCOL;

pub(super) fn mark(u: &mut Unpickler<'_>) -> Result<Step> {
    u.push_mark();
    Ok(Step::Continue)
}

pub(super) fn stop(u: &mut Unpickler<'_>) -> Result<Step> {
    u.pop("STOP").map(Step::Stop)
}

/// Pop the top item; with an empty stack, discard the last marked segment.
pub(super) fn pop(u: &mut Unpickler<'_>) -> Result<Step> {
    if u.stack.pop().is_none() {
        u.pop_mark("POP")?;
    }
    Ok(Step::Continue)
}

pub(super) fn pop_mark(u: &mut Unpickler<'_>) -> Result<Step> {
    u.pop_mark("POP_MARK")?;
    Ok(Step::Continue)
}

pub(super) fn dup(u: &mut Unpickler<'_>) -> Result<Step> {
    let top = u.top("DUP")?.clone();
    u.push(top);
    Ok(Step::Continue)
}

pub(super) fn proto(u: &mut Unpickler<'_>) -> Result<Step> {
    let version = u.cursor.read_byte()?;
    if version > HIGHEST_PROTOCOL {
        return Err(UnpickleError::UnsupportedProtocol(version));
    }
    debug!(version, "protocol");
    u.protocol = version;
    Ok(Step::Continue)
}

pub(super) fn frame(u: &mut Unpickler<'_>) -> Result<Step> {
    let len = numeric::u64_le(u.cursor.read_array()?);
    let len = numeric::wide_len(len, "frame length")?;
    debug!(len, "entering frame");
    u.cursor.begin_frame(len)?;
    Ok(Step::Continue)
}
