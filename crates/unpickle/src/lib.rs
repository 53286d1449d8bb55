//! # Unpickle
//!
//! A decode-only interpreter for the pickle bytecode format.
//!
//! Unpickle runs the opcode stream of protocols 0 through 5 on a small
//! stack machine and produces an in-memory [`Value`] graph, which can be
//! written back out as JSON. It never executes code named by the stream:
//! class references resolve only to built-in behaviours, to generic
//! classes, or to whatever the embedder registers through [`Hooks`].
//!
//! ## Architecture
//!
//! - **Cursor**: exact-length, single-byte and line reads, bounded by frames
//! - **Numeric**: fixed-width and two's-complement integer decoding
//! - **Value**: the decoded object model, with aliasable containers
//! - **Machine**: the opcode dispatch table and stack machine
//! - **Construct**: class resolution and the call / new / build protocol
//! - **JSON**: the compact JSON emitter
//!
//! ## Example
//!
//! ```
//! use unpickle::{loads, Value};
//!
//! // pickle.dumps({"a": 1}, protocol=2)
//! let value = loads(b"\x80\x02}q\x00X\x01\x00\x00\x00aq\x01K\x01s.").unwrap();
//! assert_eq!(value.get(&Value::text("a")), Some(Value::Int(1)));
//! assert_eq!(value.to_json().unwrap(), r#"{"a":1}"#);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod construct;
pub mod context;
pub mod cursor;
pub mod error;
pub mod hooks;
pub mod json;
pub mod machine;
pub mod numeric;
pub mod opcode;
pub mod value;

// Re-export main types
pub use context::{DecodeOptions, JsonOptions, MemoPolicy, NonFiniteFloats};
pub use error::{HookError, Result, UnpickleError};
pub use hooks::Hooks;
pub use machine::Unpickler;
pub use opcode::{Opcode, HIGHEST_PROTOCOL};
pub use value::{Class, ClassKind, Dict, HashableValue, Instance, Set, Shared, Text, Value};

/// Unpickle version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Decode a pickle with no hooks and default options.
///
/// Only the built-in classes (`collections.OrderedDict` and the base
/// `object`) resolve; any other class reference fails.
pub fn loads(data: &[u8]) -> Result<Value> {
    Unpickler::new(data).load()
}

/// Decode a pickle with the given hooks and emit the result as JSON.
///
/// # Example
///
/// ```
/// use unpickle::{pickle_to_json, Hooks};
///
/// let json = pickle_to_json(b"\x80\x04\x95\x06\x00\x00\x00\x00\x00\x00\x00J\xd4\x11\x01\x00.", Hooks::new()).unwrap();
/// assert_eq!(json, "70100");
/// ```
pub fn pickle_to_json(data: &[u8], hooks: Hooks) -> Result<String> {
    let value = Unpickler::new(data).with_hooks(hooks).load()?;
    json::to_string(&value)
}
