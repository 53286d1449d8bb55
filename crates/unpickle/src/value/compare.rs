//! Structural equality over graphs that may be cyclic or deeply nested

use std::cell::{Cell, RefCell};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::Equivalent;

use super::hashable::hash_value;
use super::{Dict, HashableValue, Set, Value};

/// Nesting past which immutable payloads stop hashing and containers
/// compare by identity alone.
pub(crate) const MAX_COMPARE_DEPTH: usize = 512;

type Pair = (*const (), *const ());

/// State for one top-level comparison.
///
/// Nested dict and set lookups run through [`GuardedKey`], so the pairs in
/// progress are shared by every comparison the top-level one triggers.
#[derive(Default)]
pub(crate) struct Comparison {
    /// Mutable container pairs currently being compared
    active: RefCell<Vec<Pair>>,
    depth: Cell<usize>,
}

impl Comparison {
    pub(crate) fn values(&self, a: &Value, b: &Value) -> bool {
        if a.ptr_eq(b) {
            return true;
        }

        match (a, b) {
            (Value::None, Value::None) => true,

            // Scalars
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,

            // Immutable payloads
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => self.nested(None, |c| c.sequences(a, b)),
            (Value::FrozenSet(a), Value::FrozenSet(b)) => self.nested(None, |c| c.sets(a, b)),

            // Classes by qualified name, instances by identity
            (Value::ClassRef(a), Value::ClassRef(b)) => {
                a.module() == b.module() && a.name() == b.name()
            }
            (Value::Instance(_), Value::Instance(_)) => false,

            // Mutable containers: a container currently borrowed mutably
            // compares unequal to anything but itself
            (Value::ByteArray(a), Value::ByteArray(b)) => {
                matches!((a.try_borrow(), b.try_borrow()), (Ok(a), Ok(b)) if *a == *b)
            }
            (Value::List(a), Value::List(b)) => self.nested(Some(pair(a, b)), |c| {
                matches!((a.try_borrow(), b.try_borrow()), (Ok(a), Ok(b)) if c.sequences(&a, &b))
            }),
            (Value::Dict(a), Value::Dict(b)) => self.nested(Some(pair(a, b)), |c| {
                matches!((a.try_borrow(), b.try_borrow()), (Ok(a), Ok(b)) if c.dicts(&a, &b))
            }),
            (Value::OrderedDict(a), Value::OrderedDict(b)) => self.nested(Some(pair(a, b)), |c| {
                matches!((a.try_borrow(), b.try_borrow()), (Ok(a), Ok(b)) if c.dicts_ordered(&a, &b))
            }),
            (Value::Set(a), Value::Set(b)) => self.nested(Some(pair(a, b)), |c| {
                matches!((a.try_borrow(), b.try_borrow()), (Ok(a), Ok(b)) if c.sets(&a, &b))
            }),

            // Different kinds are never equal
            _ => false,
        }
    }

    /// Run `compare` one level down.
    ///
    /// A pair met again while it is still being compared is taken as
    /// equal: any difference shows up elsewhere in the traversal.
    fn nested(&self, pair: Option<Pair>, compare: impl FnOnce(&Self) -> bool) -> bool {
        if let Some(pair) = pair {
            if self.active.borrow().contains(&pair) {
                return true;
            }
        }
        let depth = self.depth.get();
        if depth >= MAX_COMPARE_DEPTH {
            return false;
        }

        self.depth.set(depth + 1);
        if let Some(pair) = pair {
            self.active.borrow_mut().push(pair);
        }
        let equal = compare(self);
        if pair.is_some() {
            self.active.borrow_mut().pop();
        }
        self.depth.set(depth);
        equal
    }

    fn sequences(&self, a: &[Value], b: &[Value]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.values(x, y))
    }

    pub(crate) fn dicts(&self, a: &Dict, b: &Dict) -> bool {
        a.len() == b.len()
            && a.iter().all(|(k, v)| {
                b.get_guarded(&GuardedKey { value: k, cmp: self })
                    .is_some_and(|w| self.values(v, w))
            })
    }

    pub(crate) fn dicts_ordered(&self, a: &Dict, b: &Dict) -> bool {
        a.len() == b.len()
            && a.iter()
                .zip(b.iter())
                .all(|((ka, va), (kb, vb))| self.values(ka, kb) && self.values(va, vb))
    }

    pub(crate) fn sets(&self, a: &Set, b: &Set) -> bool {
        a.len() == b.len()
            && a.iter()
                .all(|v| b.contains_guarded(&GuardedKey { value: v, cmp: self }))
    }
}

fn pair<T>(a: &Rc<T>, b: &Rc<T>) -> Pair {
    (Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

/// A lookup key that compares against stored keys within an ongoing
/// [`Comparison`].
pub(crate) struct GuardedKey<'a> {
    pub(crate) value: &'a Value,
    pub(crate) cmp: &'a Comparison,
}

impl Hash for GuardedKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must match HashableValue's hash
        hash_value(self.value, state, 0);
    }
}

impl Equivalent<HashableValue> for GuardedKey<'_> {
    fn equivalent(&self, key: &HashableValue) -> bool {
        self.cmp.values(self.value, &key.0)
    }
}
