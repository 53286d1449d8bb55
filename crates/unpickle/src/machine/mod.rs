//! The pickle stack machine
//!
//! One [`Unpickler`] decodes one input. It reads an opcode byte, looks the
//! handler up in a 256-entry dispatch table and runs it, until `STOP`
//! hands back the root value. Any error aborts the whole decode.

mod container;
mod control;
mod literal;
mod memo;
mod object;

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::context::{DecodeOptions, MemoPolicy};
use crate::cursor::Cursor;
use crate::error::{Result, UnpickleError};
use crate::hooks::Hooks;
use crate::opcode::Opcode;
use crate::value::{self, Value};

/// What the decode loop does after a handler returns.
#[derive(Debug)]
pub(crate) enum Step {
    /// Read the next opcode
    Continue,

    /// Decoding finished with this root value
    Stop(Value),
}

/// An opcode handler.
type Handler = fn(&mut Unpickler<'_>) -> Result<Step>;

// ═══════════════════════════════════════════════════════════════════════
// Dispatch Table
// ═══════════════════════════════════════════════════════════════════════

static DISPATCH: [Option<Handler>; 256] = build_dispatch();

/// Opcode names by byte, for logging.
static NAMES: [&str; 256] = build_names();

const fn build_dispatch() -> [Option<Handler>; 256] {
    let mut table: [Option<Handler>; 256] = [None; 256];
    let mut i = 0;
    while i < Opcode::ALL.len() {
        let op = Opcode::ALL[i];
        table[op as usize] = Some(handler_for(op));
        i += 1;
    }
    table
}

const fn build_names() -> [&'static str; 256] {
    let mut names = ["?"; 256];
    let mut i = 0;
    while i < Opcode::ALL.len() {
        let op = Opcode::ALL[i];
        names[op as usize] = op.name();
        i += 1;
    }
    names
}

const fn handler_for(op: Opcode) -> Handler {
    match op {
        // Stack control and framing
        Opcode::Mark => control::mark,
        Opcode::Stop => control::stop,
        Opcode::Pop => control::pop,
        Opcode::PopMark => control::pop_mark,
        Opcode::Dup => control::dup,
        Opcode::Proto => control::proto,
        Opcode::Frame => control::frame,

        // Scalars
        Opcode::None => literal::none,
        Opcode::NewTrue => literal::new_true,
        Opcode::NewFalse => literal::new_false,
        Opcode::Int => literal::int,
        Opcode::BinInt => literal::bin_int,
        Opcode::BinInt1 => literal::bin_int1,
        Opcode::BinInt2 => literal::bin_int2,
        Opcode::Long => literal::long,
        Opcode::Long1 => literal::long1,
        Opcode::Long4 => literal::long4,
        Opcode::Float => literal::float,
        Opcode::BinFloat => literal::bin_float,

        // Text and bytes
        Opcode::String => literal::string,
        Opcode::BinString => literal::bin_string,
        Opcode::ShortBinString => literal::short_bin_string,
        Opcode::Unicode => literal::unicode,
        Opcode::BinUnicode => literal::bin_unicode,
        Opcode::ShortBinUnicode => literal::short_bin_unicode,
        Opcode::BinUnicode8 => literal::bin_unicode8,
        Opcode::BinBytes => literal::bin_bytes,
        Opcode::ShortBinBytes => literal::short_bin_bytes,
        Opcode::BinBytes8 => literal::bin_bytes8,
        Opcode::ByteArray8 => literal::byte_array8,

        // Containers
        Opcode::EmptyTuple => container::empty_tuple,
        Opcode::EmptyList => container::empty_list,
        Opcode::EmptyDict => container::empty_dict,
        Opcode::EmptySet => container::empty_set,
        Opcode::Tuple => container::tuple,
        Opcode::Tuple1 => container::tuple1,
        Opcode::Tuple2 => container::tuple2,
        Opcode::Tuple3 => container::tuple3,
        Opcode::List => container::list,
        Opcode::Dict => container::dict,
        Opcode::FrozenSet => container::frozen_set,
        Opcode::Append => container::append,
        Opcode::Appends => container::appends,
        Opcode::SetItem => container::set_item,
        Opcode::SetItems => container::set_items,
        Opcode::AddItems => container::add_items,

        // Memo
        Opcode::Get => memo::get,
        Opcode::BinGet => memo::bin_get,
        Opcode::LongBinGet => memo::long_bin_get,
        Opcode::Put => memo::put,
        Opcode::BinPut => memo::bin_put,
        Opcode::LongBinPut => memo::long_bin_put,
        Opcode::Memoize => memo::memoize,

        // Classes, construction and external references
        Opcode::Global => object::global,
        Opcode::StackGlobal => object::stack_global,
        Opcode::Inst => object::inst,
        Opcode::Obj => object::obj,
        Opcode::Reduce => object::reduce,
        Opcode::NewObj => object::new_obj,
        Opcode::NewObjEx => object::new_obj_ex,
        Opcode::Build => object::build,
        Opcode::PersId => object::pers_id,
        Opcode::BinPersId => object::bin_pers_id,
        Opcode::Ext1 => object::ext1,
        Opcode::Ext2 => object::ext2,
        Opcode::Ext4 => object::ext4,
        Opcode::NextBuffer => object::next_buffer,
        Opcode::ReadOnlyBuffer => object::read_only_buffer,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Unpickler
// ═══════════════════════════════════════════════════════════════════════

/// A single-use pickle decoder.
///
/// # Example
///
/// ```
/// use unpickle::{Unpickler, Value};
///
/// // PROTO 2, BININT1 42, STOP
/// let value = Unpickler::new(b"\x80\x02K*.").load().unwrap();
/// assert_eq!(value, Value::Int(42));
/// ```
pub struct Unpickler<'a> {
    cursor: Cursor<'a>,
    stack: Vec<Value>,
    marks: Vec<Vec<Value>>,
    memo: HashMap<u32, Value>,
    hooks: Hooks,
    options: DecodeOptions,
    protocol: u8,
}

impl<'a> Unpickler<'a> {
    /// Create a decoder over `data` with no hooks and default options.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
            stack: Vec::new(),
            marks: Vec::new(),
            memo: HashMap::new(),
            hooks: Hooks::default(),
            options: DecodeOptions::default(),
            protocol: 0,
        }
    }

    /// Use these hooks for this decode.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Use these options for this decode.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Decode the input and return the root value.
    pub fn load(mut self) -> Result<Value> {
        loop {
            let byte = self.cursor.read_byte()?;
            let handler = DISPATCH[usize::from(byte)].ok_or(UnpickleError::UnknownOpcode(byte))?;
            trace!(
                opcode = NAMES[usize::from(byte)],
                stack = self.stack.len(),
                "dispatch"
            );

            if let Step::Stop(root) = handler(&mut self)? {
                if value::nesting_exceeds(&root, self.options.max_depth) {
                    value::release([root]);
                    return Err(UnpickleError::DepthLimit(self.options.max_depth));
                }
                debug!(
                    protocol = self.protocol,
                    memo = self.memo.len(),
                    trailing = self.cursor.remaining(),
                    "decode complete"
                );
                return Ok(root);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Operand Stack
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub(crate) fn pop(&mut self, context: &'static str) -> Result<Value> {
        self.stack.pop().ok_or(UnpickleError::StackUnderflow(context))
    }

    pub(crate) fn top(&self, context: &'static str) -> Result<&Value> {
        self.stack.last().ok_or(UnpickleError::StackUnderflow(context))
    }

    /// Pop the top `n` items, oldest first.
    pub(crate) fn pop_n(&mut self, n: usize, context: &'static str) -> Result<Vec<Value>> {
        let at = self
            .stack
            .len()
            .checked_sub(n)
            .ok_or(UnpickleError::StackUnderflow(context))?;
        Ok(self.stack.split_off(at))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Mark Stack
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn push_mark(&mut self) {
        let saved = std::mem::take(&mut self.stack);
        self.marks.push(saved);
    }

    /// Take everything pushed since the last mark and restore the stack
    /// that was active when the mark was set.
    pub(crate) fn pop_mark(&mut self, context: &'static str) -> Result<Vec<Value>> {
        let saved = self
            .marks
            .pop()
            .ok_or(UnpickleError::MarkStackUnderflow(context))?;
        Ok(std::mem::replace(&mut self.stack, saved))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Memo
    // ═══════════════════════════════════════════════════════════════════

    /// Store the top of the stack (without popping it) under `index`.
    pub(crate) fn memo_put(&mut self, index: u32, context: &'static str) -> Result<()> {
        let value = self.top(context)?.clone();
        self.memo.insert(index, value);
        Ok(())
    }

    /// Push the value stored under `index`.
    pub(crate) fn memo_get(&mut self, index: u32) -> Result<()> {
        let value = match self.memo.get(&index) {
            Some(value) => value.clone(),
            None => match self.options.memo_policy {
                MemoPolicy::Strict => return Err(UnpickleError::MissingMemo(index)),
                MemoPolicy::Lenient => {
                    warn!(index, "memo index not stored; pushing None");
                    Value::None
                }
            },
        };
        self.push(value);
        Ok(())
    }

    pub(crate) fn memo_len(&self) -> usize {
        self.memo.len()
    }
}

impl Drop for Unpickler<'_> {
    fn drop(&mut self) {
        // Nesting is unbounded until STOP checks it
        let stack = std::mem::take(&mut self.stack);
        let marks = std::mem::take(&mut self.marks);
        let memo = std::mem::take(&mut self.memo);
        value::release(
            stack
                .into_iter()
                .chain(marks.into_iter().flatten())
                .chain(memo.into_values()),
        );
    }
}

impl std::fmt::Debug for Unpickler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unpickler")
            .field("protocol", &self.protocol)
            .field("stack", &self.stack.len())
            .field("marks", &self.marks.len())
            .field("memo", &self.memo.len())
            .field("hooks", &self.hooks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_opcode_has_a_handler() {
        for op in Opcode::ALL {
            assert!(DISPATCH[op.byte() as usize].is_some(), "{} unhandled", op);
        }
        let assigned = DISPATCH.iter().filter(|h| h.is_some()).count();
        assert_eq!(assigned, Opcode::ALL.len());
    }

    #[test]
    fn test_name_table_matches_opcodes() {
        for op in Opcode::ALL {
            assert_eq!(NAMES[op.byte() as usize], op.name());
        }
        assert_eq!(NAMES[0x00], "?");
        assert_eq!(NAMES[0xff], "?");
    }

    #[test]
    fn test_unknown_opcode() {
        let err = Unpickler::new(b"\xff").load().unwrap_err();
        assert!(matches!(err, UnpickleError::UnknownOpcode(0xff)));
    }

    #[test]
    fn test_empty_input_is_truncated() {
        let err = Unpickler::new(b"").load().unwrap_err();
        assert!(matches!(err, UnpickleError::Truncated { .. }));
    }

    #[test]
    fn test_missing_stop() {
        let err = Unpickler::new(b"N").load().unwrap_err();
        assert!(matches!(err, UnpickleError::Truncated { .. }));
    }

    #[test]
    fn test_pop_mark_restores_outer_stack() {
        let mut u = Unpickler::new(b"");
        u.push(Value::Int(1));
        u.push_mark();
        u.push(Value::Int(2));
        u.push(Value::Int(3));
        assert_eq!(u.pop_mark("test").unwrap(), vec![Value::Int(2), Value::Int(3)]);
        assert_eq!(u.pop("test").unwrap(), Value::Int(1));
        assert!(matches!(
            u.pop_mark("test"),
            Err(UnpickleError::MarkStackUnderflow("test"))
        ));
    }

    #[test]
    fn test_pop_n() {
        let mut u = Unpickler::new(b"");
        u.push(Value::Int(1));
        u.push(Value::Int(2));
        assert!(u.pop_n(3, "test").is_err());
        assert_eq!(u.pop_n(2, "test").unwrap(), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_memo_policy() {
        let mut strict = Unpickler::new(b"");
        assert!(matches!(strict.memo_get(4), Err(UnpickleError::MissingMemo(4))));

        let mut lenient = Unpickler::new(b"")
            .with_options(DecodeOptions::new().with_memo_policy(MemoPolicy::Lenient));
        lenient.memo_get(4).unwrap();
        assert_eq!(lenient.pop("test").unwrap(), Value::None);
    }

    #[test]
    fn test_root_nesting_limit() {
        // [[[]]]: three nested lists
        let data = b"]]]aa.";
        let shallow = DecodeOptions::new().with_max_depth(2);
        assert!(matches!(
            Unpickler::new(data).with_options(shallow).load(),
            Err(UnpickleError::DepthLimit(2))
        ));
        let exact = DecodeOptions::new().with_max_depth(3);
        assert!(Unpickler::new(data).with_options(exact).load().is_ok());
    }
}
