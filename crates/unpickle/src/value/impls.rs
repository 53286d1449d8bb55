//! Value trait implementations: constructors, predicates, extractors, From traits, PartialEq

use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use super::compare::Comparison;
use super::refs::shared;
use super::*;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Create a text value
    pub fn text(s: impl Into<Text>) -> Self {
        Value::Text(s.into())
    }

    /// Create an immutable byte string value
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(b.into().into())
    }

    /// Create a mutable byte array value
    pub fn byte_array(b: impl Into<Vec<u8>>) -> Self {
        Value::ByteArray(shared(b.into()))
    }

    /// Create a list value
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(shared(items))
    }

    /// Create a tuple value
    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(items.into())
    }

    /// Create a dict value
    pub fn dict(dict: Dict) -> Self {
        Value::Dict(shared(dict))
    }

    /// Create an ordered dict value
    pub fn ordered_dict(dict: Dict) -> Self {
        Value::OrderedDict(shared(dict))
    }

    /// Create a mutable set value
    pub fn set(set: Set) -> Self {
        Value::Set(shared(set))
    }

    /// Create a frozen set value
    pub fn frozen_set(items: Vec<Value>) -> Self {
        Value::FrozenSet(Rc::new(items.into_iter().collect()))
    }

    /// Create a class reference
    pub fn class(class: Class) -> Self {
        Value::ClassRef(Rc::new(class))
    }

    /// Create an instance value
    pub fn instance(instance: Instance) -> Self {
        Value::Instance(Rc::new(instance))
    }

    /// Create an integer value, using `Int` whenever it fits in 64 bits
    pub fn from_bigint(n: BigInt) -> Self {
        match n.to_i64() {
            Some(small) => Value::Int(small),
            None => Value::BigInt(Rc::new(n)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════
    /// Check if value is None
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Check if value is any integer
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_))
    }

    /// Check if value is a mapping
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Dict(_) | Value::OrderedDict(_))
    }

    /// Check if value is a sequence
    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::List(_) | Value::Tuple(_))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════
    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract a big integer
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(n) => Some(n),
            _ => None,
        }
    }

    /// Extract as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    /// Extract a copy of byte or byte array contents
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Value::Bytes(b) => Some(b.to_vec()),
            Value::ByteArray(b) => Some(b.borrow().clone()),
            _ => None,
        }
    }

    /// Extract tuple items
    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Extract the class of a class reference
    pub fn as_class(&self) -> Option<&Rc<Class>> {
        match self {
            Value::ClassRef(class) => Some(class),
            _ => None,
        }
    }

    /// Extract an instance
    pub fn as_instance(&self) -> Option<&Rc<Instance>> {
        match self {
            Value::Instance(inst) => Some(inst),
            _ => None,
        }
    }

    /// Number of items in a container or bytes in a byte string
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Text(t) => Some(t.as_str().chars().count()),
            Value::Bytes(b) => Some(b.len()),
            Value::ByteArray(b) => Some(b.borrow().len()),
            Value::List(items) => Some(items.borrow().len()),
            Value::Tuple(items) => Some(items.len()),
            Value::Dict(d) | Value::OrderedDict(d) => Some(d.borrow().len()),
            Value::Set(s) => Some(s.borrow().len()),
            Value::FrozenSet(s) => Some(s.len()),
            _ => None,
        }
    }

    /// Look up a key in a dict or ordered dict
    pub fn get(&self, key: &Value) -> Option<Value> {
        match self {
            Value::Dict(d) | Value::OrderedDict(d) => d.borrow().get(key).cloned(),
            _ => None,
        }
    }

    /// Get an item of a list or tuple by position
    pub fn item(&self, index: usize) -> Option<Value> {
        match self {
            Value::List(items) => items.borrow().get(index).cloned(),
            Value::Tuple(items) => items.get(index).cloned(),
            _ => None,
        }
    }

    /// Check membership in a set or frozen set
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Value::Set(s) => s.borrow().contains(value),
            Value::FrozenSet(s) => s.contains(value),
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Value {
    /// Structural equality; mutable containers reached again through
    /// themselves compare equal, and instances compare by identity.
    fn eq(&self, other: &Self) -> bool {
        Comparison::default().values(self, other)
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Trait Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::from_bigint(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::text(s)
    }
}

impl From<Text> for Value {
    fn from(t: Text) -> Self {
        Value::Text(t)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl From<Dict> for Value {
    fn from(dict: Dict) -> Self {
        Value::dict(dict)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::None, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bigint_normalizes() {
        assert_eq!(Value::from_bigint(BigInt::from(5)), Value::Int(5));
        let big = BigInt::from(i64::MAX) + 1;
        assert!(matches!(Value::from_bigint(big), Value::BigInt(_)));
        let small = BigInt::from(i64::MIN);
        assert_eq!(Value::from_bigint(small), Value::Int(i64::MIN));
    }

    #[test]
    fn test_kinds_do_not_mix() {
        assert_ne!(Value::Int(1), Value::Bool(true));
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::list(vec![]), Value::tuple(vec![]));
        assert_ne!(Value::dict(Dict::new()), Value::ordered_dict(Dict::new()));
    }

    #[test]
    fn test_ordered_dict_equality_is_ordered() {
        let a = Value::ordered_dict(Dict::new().with_entry("a", 1).with_entry("b", 2));
        let b = Value::ordered_dict(Dict::new().with_entry("b", 2).with_entry("a", 1));
        assert_ne!(a, b);
    }

    #[test]
    fn test_extractors() {
        assert_eq!(Value::Int(3).as_i64(), Some(3));
        assert_eq!(Value::text("x").as_str(), Some("x"));
        assert_eq!(Value::bytes(b"ab".to_vec()).to_bytes(), Some(b"ab".to_vec()));
        assert_eq!(Value::byte_array(b"ab".to_vec()).len(), Some(2));
        assert_eq!(Value::None.len(), None);
    }

    #[test]
    fn test_container_access() {
        let d = Value::dict(Dict::new().with_entry("a", 1));
        assert_eq!(d.get(&Value::text("a")), Some(Value::Int(1)));
        assert_eq!(d.get(&Value::text("b")), None);

        let t = Value::tuple(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(t.item(1), Some(Value::Int(2)));
        assert_eq!(t.item(2), None);

        let fs = Value::frozen_set(vec![Value::Int(1), Value::Int(1)]);
        assert_eq!(fs.len(), Some(1));
        assert!(fs.contains(&Value::Int(1)));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::None);
        assert_eq!(Value::from(Some(7i64)), Value::Int(7));
    }
}
