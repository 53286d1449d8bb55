//! Embedder-supplied hooks
//!
//! The decoder never resolves classes, persistent ids, extension codes or
//! out-of-band buffers on its own. Each of these is an optional closure
//! registered on [`Hooks`]; a stream that needs a missing hook fails with
//! [`UnpickleError::Unsupported`](crate::UnpickleError::Unsupported).

use std::fmt;

use crate::error::HookError;
use crate::value::{Class, Value};

/// Resolves a `(module, name)` pair to a class or a plain value
pub type FindClassFn = Box<dyn FnMut(&str, &str) -> Result<Value, HookError>>;

/// Resolves a persistent id to a value
pub type PersistentLoadFn = Box<dyn FnMut(Value) -> Result<Value, HookError>>;

/// Resolves an extension registry code to a value
pub type ExtensionFn = Box<dyn FnMut(u32) -> Result<Value, HookError>>;

/// Supplies the next out-of-band buffer
pub type NextBufferFn = Box<dyn FnMut() -> Result<Value, HookError>>;

/// Converts a buffer to its read-only form
pub type MakeReadOnlyFn = Box<dyn FnMut(Value) -> Result<Value, HookError>>;

/// The set of hooks available to one decode.
///
/// # Example
///
/// ```
/// use unpickle::{Hooks, Unpickler, Value};
///
/// let hooks = Hooks::new().with_persistent_load(|id| {
///     Ok(Value::text(format!("ref:{}", id)))
/// });
/// let value = Unpickler::new(b"Pabc\n.").with_hooks(hooks).load().unwrap();
/// assert_eq!(value, Value::text("ref:abc"));
/// ```
#[derive(Default)]
pub struct Hooks {
    pub(crate) find_class: Option<FindClassFn>,
    pub(crate) persistent_load: Option<PersistentLoadFn>,
    pub(crate) extension: Option<ExtensionFn>,
    pub(crate) next_buffer: Option<NextBufferFn>,
    pub(crate) make_read_only: Option<MakeReadOnlyFn>,
}

impl Hooks {
    /// Create an empty hook set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the class resolution hook.
    ///
    /// Called once per `GLOBAL`, `STACK_GLOBAL` or `INST` naming anything
    /// other than the built-in `collections.OrderedDict` and base `object`.
    pub fn with_find_class<F>(mut self, f: F) -> Self
    where
        F: FnMut(&str, &str) -> Result<Value, HookError> + 'static,
    {
        self.find_class = Some(Box::new(f));
        self
    }

    /// Set the persistent id hook, used by `PERSID` and `BINPERSID`
    pub fn with_persistent_load<F>(mut self, f: F) -> Self
    where
        F: FnMut(Value) -> Result<Value, HookError> + 'static,
    {
        self.persistent_load = Some(Box::new(f));
        self
    }

    /// Set the extension registry hook, used by `EXT1`, `EXT2` and `EXT4`
    pub fn with_extension<F>(mut self, f: F) -> Self
    where
        F: FnMut(u32) -> Result<Value, HookError> + 'static,
    {
        self.extension = Some(Box::new(f));
        self
    }

    /// Set the out-of-band buffer supplier, used by `NEXT_BUFFER`
    pub fn with_next_buffer<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> Result<Value, HookError> + 'static,
    {
        self.next_buffer = Some(Box::new(f));
        self
    }

    /// Set the read-only conversion, used by `READONLY_BUFFER`.
    ///
    /// Without it that opcode leaves the top value unchanged.
    pub fn with_make_read_only<F>(mut self, f: F) -> Self
    where
        F: FnMut(Value) -> Result<Value, HookError> + 'static,
    {
        self.make_read_only = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("find_class", &self.find_class.is_some())
            .field("persistent_load", &self.persistent_load.is_some())
            .field("extension", &self.extension.is_some())
            .field("next_buffer", &self.next_buffer.is_some())
            .field("make_read_only", &self.make_read_only.is_some())
            .finish()
    }
}

/// A hook set that resolves every class without running any code.
///
/// `copy_reg._reconstructor` (and its Python 3 spelling
/// `copyreg._reconstructor`) maps to the reconstruction helper; every
/// other name maps to a generic class whose instances keep their
/// constructor arguments.
pub fn generic_classes() -> Hooks {
    Hooks::new().with_find_class(|module, name| {
        let class = match (module, name) {
            ("copy_reg" | "copyreg", "_reconstructor") => Class::reconstructor(),
            _ => Class::generic(module, name),
        };
        Ok(Value::class(class))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ClassKind;

    #[test]
    fn test_empty_hooks() {
        let hooks = Hooks::new();
        assert!(hooks.find_class.is_none());
        assert!(hooks.make_read_only.is_none());
    }

    #[test]
    fn test_generic_classes() {
        let mut hooks = generic_classes();
        let find = hooks.find_class.as_mut().unwrap();

        let foo = find("__main__", "Foo").unwrap();
        let class = foo.as_class().unwrap();
        assert_eq!(class.qualified_name(), "__main__.Foo");
        assert!(matches!(class.kind(), ClassKind::Generic));

        let rec = find("copyreg", "_reconstructor").unwrap();
        assert!(matches!(rec.as_class().unwrap().kind(), ClassKind::Reconstructor));
    }

    #[test]
    fn test_debug_lists_present_hooks() {
        let hooks = Hooks::new().with_next_buffer(|| Ok(Value::None));
        let text = format!("{:?}", hooks);
        assert!(text.contains("next_buffer: true"));
        assert!(text.contains("find_class: false"));
    }
}
