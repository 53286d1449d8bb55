//! Decoding and emission configuration

/// How a memo lookup of a never-stored index is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoPolicy {
    /// Fail the decode with [`UnpickleError::MissingMemo`](crate::UnpickleError::MissingMemo)
    #[default]
    Strict,

    /// Push `None` and keep going, matching permissive legacy decoders
    Lenient,
}

/// Configuration for a single decode.
///
/// # Example
///
/// ```
/// use unpickle::{DecodeOptions, MemoPolicy, Unpickler, Value};
///
/// // BINGET 7 on an empty memo, then STOP
/// let opts = DecodeOptions::new().with_memo_policy(MemoPolicy::Lenient);
/// let value = Unpickler::new(b"h\x07.").with_options(opts).load().unwrap();
/// assert_eq!(value, Value::None);
/// ```
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Behaviour of memo reads for missing indices
    pub memo_policy: MemoPolicy,

    /// Maximum container nesting of the decoded root
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            memo_policy: MemoPolicy::Strict,
            max_depth: 1000,
        }
    }
}

impl DecodeOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the memo policy.
    pub fn with_memo_policy(mut self, policy: MemoPolicy) -> Self {
        self.memo_policy = policy;
        self
    }
}

/// What the JSON emitter does with NaN and infinities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonFiniteFloats {
    /// Fail with [`UnpickleError::Unserializable`](crate::UnpickleError::Unserializable)
    #[default]
    Error,

    /// Emit `null`
    Null,

    /// Emit `NaN`, `Infinity`, `-Infinity` (not strict JSON)
    Literal,
}

/// Configuration for the JSON emitter.
#[derive(Debug, Clone)]
pub struct JsonOptions {
    /// Maximum container nesting (guards self-referencing graphs)
    pub max_depth: usize,

    /// Handling of non-finite floats
    pub non_finite: NonFiniteFloats,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            non_finite: NonFiniteFloats::Error,
        }
    }
}

impl JsonOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options with a custom depth limit.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Default::default()
        }
    }

    /// Set the non-finite float handling.
    pub fn with_non_finite(mut self, non_finite: NonFiniteFloats) -> Self {
        self.non_finite = non_finite;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(DecodeOptions::new().memo_policy, MemoPolicy::Strict);
        assert_eq!(DecodeOptions::new().max_depth, 1000);
        let json = JsonOptions::new();
        assert_eq!(json.max_depth, 1000);
        assert_eq!(json.non_finite, NonFiniteFloats::Error);
    }

    #[test]
    fn test_builders() {
        let opts = DecodeOptions::new().with_memo_policy(MemoPolicy::Lenient);
        assert_eq!(opts.memo_policy, MemoPolicy::Lenient);
        assert_eq!(opts.with_max_depth(4).max_depth, 4);

        let json = JsonOptions::with_max_depth(8).with_non_finite(NonFiniteFloats::Null);
        assert_eq!(json.max_depth, 8);
        assert_eq!(json.non_finite, NonFiniteFloats::Null);
    }
}
