//! Object model for decoded pickle values

mod callable;
mod compare;
mod compound;
mod display;
mod hashable;
mod impls;
mod refs;
mod text;
mod walk;

pub use callable::{Class, ClassKind, Instance, NativeFn, SetStateFn};
pub use compound::{Dict, Set};
pub use hashable::HashableValue;
pub use refs::Shared;
pub use text::Text;

pub(crate) use walk::{nesting_exceeds, release};

use std::rc::Rc;

use num_bigint::BigInt;

/// A decoded value.
///
/// Values are organized into three tiers:
/// - Tier 1: Inline scalars (no allocation)
/// - Tier 2: Immutable heap payloads (`Rc`-wrapped, cheap to clone)
/// - Tier 3: Mutable containers (`Rc<RefCell<_>>`-wrapped, aliased by the memo)
///
/// Cloning a `Value` never copies container contents: the clone refers to
/// the same underlying object, which is how the memo expresses shared
/// substructure.
#[derive(Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Tier 1: Inline Scalars
    // ═══════════════════════════════════════════════════════════════════
    /// The absence value `None`
    None,

    /// Boolean
    Bool(bool),

    /// Integer that fits in 64 bits
    Int(i64),

    /// IEEE-754 double
    Float(f64),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 2: Immutable Heap Payloads
    // ═══════════════════════════════════════════════════════════════════
    /// Integer outside the 64-bit range (never holds a value that fits in `Int`)
    BigInt(Rc<BigInt>),

    /// Unicode text
    Text(Text),

    /// Immutable byte string
    Bytes(Rc<[u8]>),

    /// Fixed-length sequence; usable as positional constructor arguments
    Tuple(Rc<[Value]>),

    /// Immutable set, built once from a fixed item list
    FrozenSet(Rc<Set>),

    /// Handle naming a module-qualified class or callable
    ClassRef(Rc<Class>),

    /// Generic object built from a class with no native mapping
    Instance(Rc<Instance>),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 3: Mutable Containers
    // ═══════════════════════════════════════════════════════════════════
    /// Mutable byte array
    ByteArray(Shared<Vec<u8>>),

    /// Growable sequence
    List(Shared<Vec<Value>>),

    /// Insertion-ordered mapping
    Dict(Shared<Dict>),

    /// Insertion-ordered mapping built through `collections.OrderedDict`
    OrderedDict(Shared<Dict>),

    /// Mutable set
    Set(Shared<Set>),
}
