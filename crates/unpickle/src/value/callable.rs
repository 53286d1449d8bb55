//! Class handles and generic instances

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::Value;
use crate::error::HookError;

/// Type alias for native constructor functions supplied by the embedder
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, HookError>>;

/// Type alias for state setters applied by `BUILD`
pub type SetStateFn = Rc<dyn Fn(&Instance, Value) -> Result<(), HookError>>;

/// How a class behaves when the stream calls or instantiates it.
#[derive(Clone)]
pub enum ClassKind {
    /// No native mapping; calling it produces an [`Instance`]
    Generic,

    /// `collections.OrderedDict`
    OrderedDict,

    /// The base `object` class used by the legacy reconstruction protocol
    Object,

    /// `copy_reg._reconstructor(cls, base, state)`
    Reconstructor,

    /// A native constructor registered by the embedder
    Native(NativeFn),
}

impl fmt::Debug for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassKind::Generic => write!(f, "Generic"),
            ClassKind::OrderedDict => write!(f, "OrderedDict"),
            ClassKind::Object => write!(f, "Object"),
            ClassKind::Reconstructor => write!(f, "Reconstructor"),
            ClassKind::Native(_) => write!(f, "Native"),
        }
    }
}

/// A module-qualified class or callable resolved from the stream.
#[derive(Clone)]
pub struct Class {
    module: String,
    name: String,
    kind: ClassKind,
    set_state: Option<SetStateFn>,
}

impl Class {
    /// Create a class with no native mapping.
    pub fn generic(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(module, name, ClassKind::Generic)
    }

    /// The `collections.OrderedDict` class.
    pub fn ordered_dict() -> Self {
        Self::with_kind("collections", "OrderedDict", ClassKind::OrderedDict)
    }

    /// The base `object` class.
    pub fn object() -> Self {
        Self::with_kind("__builtin__", "object", ClassKind::Object)
    }

    /// The `copy_reg._reconstructor` helper.
    pub fn reconstructor() -> Self {
        Self::with_kind("copy_reg", "_reconstructor", ClassKind::Reconstructor)
    }

    /// A class whose construction runs a native function.
    ///
    /// # Example
    ///
    /// ```
    /// use unpickle::{Class, Value};
    ///
    /// let class = Class::native("decimal", "Decimal", |args| {
    ///     Ok(args.first().cloned().unwrap_or(Value::None))
    /// });
    /// assert_eq!(class.qualified_name(), "decimal.Decimal");
    /// ```
    pub fn native<F>(module: impl Into<String>, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, HookError> + 'static,
    {
        Self::with_kind(module, name, ClassKind::Native(Rc::new(func)))
    }

    fn with_kind(module: impl Into<String>, name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            kind,
            set_state: None,
        }
    }

    /// Attach a state setter used by `BUILD` on this class's instances.
    pub fn with_set_state<F>(mut self, func: F) -> Self
    where
        F: Fn(&Instance, Value) -> Result<(), HookError> + 'static,
    {
        self.set_state = Some(Rc::new(func));
        self
    }

    /// The module name
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The qualified name within the module
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `module.name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }

    /// The construction behaviour
    pub fn kind(&self) -> &ClassKind {
        &self.kind
    }

    /// The state setter, if the class has one
    pub fn set_state(&self) -> Option<&SetStateFn> {
        self.set_state.as_ref()
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("module", &self.module)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("set_state", &self.set_state.is_some())
            .finish()
    }
}

/// An object built from a class with no native mapping.
///
/// Keeps the class and the raw constructor arguments, plus any attributes
/// applied afterwards by `BUILD`. Instances cannot be emitted as JSON.
pub struct Instance {
    class: Rc<Class>,
    args: Vec<Value>,
    attrs: RefCell<IndexMap<Rc<str>, Value>>,
}

impl Instance {
    /// Create an instance of `class` constructed with `args`.
    pub fn new(class: Rc<Class>, args: Vec<Value>) -> Self {
        Self {
            class,
            args,
            attrs: RefCell::new(IndexMap::new()),
        }
    }

    /// The class this instance was built from
    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    /// The raw constructor arguments
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Get an attribute by name
    pub fn attr(&self, name: &str) -> Option<Value> {
        self.attrs.borrow().get(name).cloned()
    }

    /// Set an attribute, replacing any previous value in place
    pub fn set_attr(&self, name: impl Into<Rc<str>>, value: Value) {
        self.attrs.borrow_mut().insert(name.into(), value);
    }

    /// All attributes in assignment order
    pub fn attrs(&self) -> Ref<'_, IndexMap<Rc<str>, Value>> {
        self.attrs.borrow()
    }

    pub(crate) fn try_attrs(&self) -> Option<Ref<'_, IndexMap<Rc<str>, Value>>> {
        self.attrs.try_borrow().ok()
    }

    /// Move the arguments and attribute values out.
    pub(crate) fn drain_into(&mut self, out: &mut Vec<Value>) {
        out.append(&mut self.args);
        out.extend(self.attrs.get_mut().drain(..).map(|(_, value)| value));
    }
}
