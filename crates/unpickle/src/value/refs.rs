//! Shared handles and identity checks

use std::cell::RefCell;
use std::rc::Rc;

use super::Value;

/// A shared, mutable container handle.
///
/// The operand stack, the memo and parent containers may all hold a
/// `Shared` to the same object; mutation through any of them is visible
/// through all of them.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wrap a container in a fresh shared handle.
pub(crate) fn shared<T>(inner: T) -> Shared<T> {
    Rc::new(RefCell::new(inner))
}

impl Value {
    /// Check whether two values are the same underlying object.
    ///
    /// Scalars are never the same object; heap values are when they share
    /// an allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::BigInt(a), Value::BigInt(b)) => Rc::ptr_eq(a, b),
            (Value::Text(a), Value::Text(b)) => a.ptr_eq(b),
            (Value::Bytes(a), Value::Bytes(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
            (Value::FrozenSet(a), Value::FrozenSet(b)) => Rc::ptr_eq(a, b),
            (Value::ClassRef(a), Value::ClassRef(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::ByteArray(a), Value::ByteArray(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::OrderedDict(a), Value::OrderedDict(b)) => Rc::ptr_eq(a, b),
            (Value::Set(a), Value::Set(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Check whether this value is a mutable container.
    pub fn is_mutable(&self) -> bool {
        matches!(
            self,
            Value::ByteArray(_)
                | Value::List(_)
                | Value::Dict(_)
                | Value::OrderedDict(_)
                | Value::Set(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_aliases() {
        let list = Value::list(vec![Value::Int(1)]);
        let alias = list.clone();
        assert!(list.ptr_eq(&alias));

        if let Value::List(items) = &alias {
            items.borrow_mut().push(Value::Int(2));
        }
        assert_eq!(list.len(), Some(2));
    }

    #[test]
    fn test_equal_but_distinct() {
        let a = Value::list(vec![Value::Int(1)]);
        let b = Value::list(vec![Value::Int(1)]);
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_scalars_are_never_same_object() {
        assert!(!Value::Int(1).ptr_eq(&Value::Int(1)));
        assert!(!Value::None.ptr_eq(&Value::None));
    }

    #[test]
    fn test_is_mutable() {
        assert!(Value::list(vec![]).is_mutable());
        assert!(Value::byte_array(vec![1]).is_mutable());
        assert!(!Value::tuple(vec![]).is_mutable());
        assert!(!Value::text("x").is_mutable());
    }
}
