//! Error types for pickle decoding and JSON emission

use thiserror::Error;

use crate::value::Value;

/// Error type returned by external hooks.
///
/// Any error type can be boxed into this, including `anyhow::Error`.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for decoding and emitting.
///
/// Every variant is fatal to the decode in progress; there is no partial
/// result.
#[derive(Error, Debug)]
pub enum UnpickleError {
    /// Fewer bytes remain (in the input or the active frame) than a read needs
    #[error("unexpected end of input: needed {needed} byte(s), {available} available")]
    Truncated {
        /// Bytes the operation required
        needed: usize,
        /// Bytes that were left
        available: usize,
    },

    /// A line read found no terminating line feed
    #[error("unexpected end of input: unterminated line")]
    UnterminatedLine,

    /// The opcode byte has no handler
    #[error("unknown opcode: 0x{0:02x}")]
    UnknownOpcode(u8),

    /// A numeric, quoted, or length argument could not be interpreted
    #[error("malformed {what}: {detail}")]
    MalformedLiteral {
        /// What was being parsed
        what: &'static str,
        /// Why it failed
        detail: String,
    },

    /// Pop or peek on an empty operand stack
    #[error("stack underflow in {0}")]
    StackUnderflow(&'static str),

    /// Pop on an empty mark stack
    #[error("mark stack underflow in {0}")]
    MarkStackUnderflow(&'static str),

    /// An operand has the wrong kind for the opcode consuming it
    #[error("{context}: expected {expected}, got {got}")]
    TypeMismatch {
        /// Opcode or operation name
        context: &'static str,
        /// Expected kind
        expected: &'static str,
        /// Actual kind
        got: String,
    },

    /// Protocol number above the highest supported version
    #[error("unsupported pickle protocol: {0}")]
    UnsupportedProtocol(u8),

    /// The stream uses a feature this decoder (or its hooks) cannot handle
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A frame began before the previous one was consumed
    #[error("beginning of a new frame before end of current frame")]
    NestedFrame,

    /// A memo index was read before anything was stored under it
    #[error("memo index {0} has not been stored")]
    MissingMemo(u32),

    /// A value cannot be represented as JSON
    #[error("cannot serialize {0} to JSON")]
    Unserializable(String),

    /// Nesting exceeded the configured depth limit
    #[error("nesting depth limit of {0} exceeded")]
    DepthLimit(usize),

    /// An external hook failed
    #[error("{hook} hook failed: {source}")]
    Hook {
        /// Which hook failed
        hook: &'static str,
        /// The hook's error
        #[source]
        source: HookError,
    },

    /// Writing JSON output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UnpickleError {
    /// Build a type mismatch error for a value.
    pub fn type_mismatch(context: &'static str, expected: &'static str, got: &Value) -> Self {
        UnpickleError::TypeMismatch {
            context,
            expected,
            got: type_name(got).to_string(),
        }
    }

    /// Build a malformed-literal error.
    pub fn malformed(what: &'static str, detail: impl Into<String>) -> Self {
        UnpickleError::MalformedLiteral {
            what,
            detail: detail.into(),
        }
    }
}

/// Result type alias for decoding operations
pub type Result<T> = std::result::Result<T, UnpickleError>;

/// Get a human-readable kind name for a value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::None => "None",
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::BigInt(_) => "bigint",
        Value::Float(_) => "float",
        Value::Text(_) => "str",
        Value::Bytes(_) => "bytes",
        Value::ByteArray(_) => "bytearray",
        Value::List(_) => "list",
        Value::Tuple(_) => "tuple",
        Value::Dict(_) => "dict",
        Value::OrderedDict(_) => "OrderedDict",
        Value::Set(_) => "set",
        Value::FrozenSet(_) => "frozenset",
        Value::ClassRef(_) => "class",
        Value::Instance(_) => "instance",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_message() {
        let err = UnpickleError::Truncated {
            needed: 4,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "unexpected end of input: needed 4 byte(s), 1 available"
        );
    }

    #[test]
    fn test_unknown_opcode_message() {
        assert_eq!(
            UnpickleError::UnknownOpcode(0xff).to_string(),
            "unknown opcode: 0xff"
        );
    }

    #[test]
    fn test_type_mismatch_names_value_kind() {
        let err = UnpickleError::type_mismatch("REDUCE", "tuple", &Value::Int(1));
        assert_eq!(err.to_string(), "REDUCE: expected tuple, got int");
    }

    #[test]
    fn test_hook_error_keeps_source() {
        let err = UnpickleError::Hook {
            hook: "find_class",
            source: "no such module".into(),
        };
        assert_eq!(err.to_string(), "find_class hook failed: no such module");
        assert!(std::error::Error::source(&err).is_some());
    }
}
