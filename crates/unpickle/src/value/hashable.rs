//! Hashable wrapper for Value to enable use as dict keys and set members

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::compare::MAX_COMPARE_DEPTH;
use super::Value;

/// A wrapper for Value that implements Hash and Eq.
///
/// Equality is structural (it delegates to `Value`'s `PartialEq`). Mutable
/// containers hash by kind only: an aliased list can be mutated after it
/// has been used as a key, and its hash must not change when that happens.
/// Instances hash by identity.
#[derive(Debug, Clone)]
pub struct HashableValue(pub Value);

impl Hash for HashableValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(&self.0, state, 0);
    }
}

pub(crate) fn hash_value<H: Hasher>(value: &Value, state: &mut H, depth: usize) {
    // Hash the discriminant first
    std::mem::discriminant(value).hash(state);
    // Deeper levels only refine the hash; equality still decides
    if depth >= MAX_COMPARE_DEPTH {
        return;
    }

    match value {
        Value::None => {}
        Value::Bool(b) => b.hash(state),
        Value::Int(n) => n.hash(state),
        Value::BigInt(n) => n.hash(state),
        // 0.0 == -0.0, so they must hash alike
        Value::Float(f) if *f == 0.0 => 0u64.hash(state),
        Value::Float(f) => f.to_bits().hash(state),
        Value::Text(t) => t.hash(state),
        Value::Bytes(b) => b.hash(state),
        Value::Tuple(items) => {
            items.len().hash(state);
            for item in items.iter() {
                hash_value(item, state, depth + 1);
            }
        }
        // Set equality ignores order, so only the size is hashed
        Value::FrozenSet(set) => set.len().hash(state),
        Value::ClassRef(class) => {
            class.module().hash(state);
            class.name().hash(state);
        }
        Value::Instance(inst) => (Rc::as_ptr(inst) as usize).hash(state),
        Value::ByteArray(_)
        | Value::List(_)
        | Value::Dict(_)
        | Value::OrderedDict(_)
        | Value::Set(_) => {}
    }
}

impl PartialEq for HashableValue {
    fn eq(&self, other: &Self) -> bool {
        // Delegate to Value's PartialEq
        self.0 == other.0
    }
}

impl Eq for HashableValue {}
