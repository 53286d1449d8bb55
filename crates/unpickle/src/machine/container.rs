//! Container building and mutation opcodes

use super::{Step, Unpickler};
use crate::error::{Result, UnpickleError};
use crate::value::{Dict, Set, Value};

// ═══════════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════════

pub(super) fn empty_tuple(u: &mut Unpickler<'_>) -> Result<Step> {
    u.push(Value::tuple(Vec::new()));
    Ok(Step::Continue)
}

pub(super) fn empty_list(u: &mut Unpickler<'_>) -> Result<Step> {
    u.push(Value::list(Vec::new()));
    Ok(Step::Continue)
}

pub(super) fn empty_dict(u: &mut Unpickler<'_>) -> Result<Step> {
    u.push(Value::dict(Dict::new()));
    Ok(Step::Continue)
}

pub(super) fn empty_set(u: &mut Unpickler<'_>) -> Result<Step> {
    u.push(Value::set(Set::new()));
    Ok(Step::Continue)
}

pub(super) fn tuple(u: &mut Unpickler<'_>) -> Result<Step> {
    let items = u.pop_mark("TUPLE")?;
    u.push(Value::tuple(items));
    Ok(Step::Continue)
}

fn tuple_n(u: &mut Unpickler<'_>, n: usize, context: &'static str) -> Result<Step> {
    let items = u.pop_n(n, context)?;
    u.push(Value::tuple(items));
    Ok(Step::Continue)
}

pub(super) fn tuple1(u: &mut Unpickler<'_>) -> Result<Step> {
    tuple_n(u, 1, "TUPLE1")
}

pub(super) fn tuple2(u: &mut Unpickler<'_>) -> Result<Step> {
    tuple_n(u, 2, "TUPLE2")
}

pub(super) fn tuple3(u: &mut Unpickler<'_>) -> Result<Step> {
    tuple_n(u, 3, "TUPLE3")
}

pub(super) fn list(u: &mut Unpickler<'_>) -> Result<Step> {
    let items = u.pop_mark("LIST")?;
    u.push(Value::list(items));
    Ok(Step::Continue)
}

pub(super) fn dict(u: &mut Unpickler<'_>) -> Result<Step> {
    let items = u.pop_mark("DICT")?;
    let pairs = pairs("DICT", items)?;
    let mut dict = Dict::with_capacity(pairs.len());
    dict.extend(pairs);
    u.push(Value::dict(dict));
    Ok(Step::Continue)
}

pub(super) fn frozen_set(u: &mut Unpickler<'_>) -> Result<Step> {
    let items = u.pop_mark("FROZENSET")?;
    u.push(Value::frozen_set(items));
    Ok(Step::Continue)
}

/// Split `k1, v1, k2, v2, ...` into pairs.
fn pairs(context: &'static str, items: Vec<Value>) -> Result<Vec<(Value, Value)>> {
    if items.len() % 2 != 0 {
        return Err(UnpickleError::TypeMismatch {
            context,
            expected: "key/value pairs",
            got: format!("{} items", items.len()),
        });
    }
    let mut out = Vec::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        out.push((key, value));
    }
    Ok(out)
}

// ═══════════════════════════════════════════════════════════════════════
// Mutation
// ═══════════════════════════════════════════════════════════════════════

fn extend_list(target: &Value, items: Vec<Value>, context: &'static str) -> Result<()> {
    match target {
        Value::List(list) => {
            list.borrow_mut().extend(items);
            Ok(())
        }
        other => Err(UnpickleError::type_mismatch(context, "list", other)),
    }
}

fn update_dict(target: &Value, pairs: Vec<(Value, Value)>, context: &'static str) -> Result<()> {
    match target {
        Value::Dict(dict) | Value::OrderedDict(dict) => {
            dict.borrow_mut().extend(pairs);
            Ok(())
        }
        other => Err(UnpickleError::type_mismatch(context, "dict", other)),
    }
}

pub(super) fn append(u: &mut Unpickler<'_>) -> Result<Step> {
    let item = u.pop("APPEND")?;
    extend_list(u.top("APPEND")?, vec![item], "APPEND")?;
    Ok(Step::Continue)
}

pub(super) fn appends(u: &mut Unpickler<'_>) -> Result<Step> {
    let items = u.pop_mark("APPENDS")?;
    extend_list(u.top("APPENDS")?, items, "APPENDS")?;
    Ok(Step::Continue)
}

pub(super) fn set_item(u: &mut Unpickler<'_>) -> Result<Step> {
    let value = u.pop("SETITEM")?;
    let key = u.pop("SETITEM")?;
    update_dict(u.top("SETITEM")?, vec![(key, value)], "SETITEM")?;
    Ok(Step::Continue)
}

pub(super) fn set_items(u: &mut Unpickler<'_>) -> Result<Step> {
    let items = u.pop_mark("SETITEMS")?;
    let pairs = pairs("SETITEMS", items)?;
    update_dict(u.top("SETITEMS")?, pairs, "SETITEMS")?;
    Ok(Step::Continue)
}

pub(super) fn add_items(u: &mut Unpickler<'_>) -> Result<Step> {
    let items = u.pop_mark("ADDITEMS")?;
    match u.top("ADDITEMS")? {
        Value::Set(set) => set.borrow_mut().extend(items),
        other => return Err(UnpickleError::type_mismatch("ADDITEMS", "set", other)),
    }
    Ok(Step::Continue)
}

#[cfg(test)]
mod tests {
    use crate::{loads, Dict, UnpickleError, Value};

    #[test]
    fn test_dict_from_mark() {
        let value = loads(b"(Vb\nK\x02Va\nK\x01d.").unwrap();
        let expected = Dict::new().with_entry("b", 2).with_entry("a", 1);
        match &value {
            Value::Dict(d) => assert!(d.borrow().eq_ordered(&expected)),
            other => panic!("expected dict, got {:?}", other),
        }
    }

    #[test]
    fn test_dict_odd_items() {
        assert!(matches!(
            loads(b"(K\x01d."),
            Err(UnpickleError::TypeMismatch { context: "DICT", .. })
        ));
    }

    #[test]
    fn test_set_item_on_non_dict() {
        assert!(matches!(
            loads(b"]K\x01K\x02s."),
            Err(UnpickleError::TypeMismatch { context: "SETITEM", .. })
        ));
    }

    #[test]
    fn test_set_items_overwrite_keeps_position() {
        let value = loads(b"}(Va\nK\x01Vb\nK\x02Va\nK\x03u.").unwrap();
        match &value {
            Value::Dict(d) => {
                let d = d.borrow();
                assert_eq!(d.len(), 2);
                assert_eq!(d.get_index(0), Some((&Value::text("a"), &Value::Int(3))));
            }
            other => panic!("expected dict, got {:?}", other),
        }
    }

    #[test]
    fn test_appends_on_tuple_fails() {
        assert!(loads(b")(K\x01e.").is_err());
    }

    #[test]
    fn test_tuple3_underflow() {
        assert!(matches!(
            loads(b"K\x01K\x02\x87."),
            Err(UnpickleError::StackUnderflow("TUPLE3"))
        ));
    }

    #[test]
    fn test_add_items_dedups() {
        let value = loads(b"\x8f(K\x01K\x01K\x02\x90.").unwrap();
        assert_eq!(value.len(), Some(2));
    }

    #[test]
    fn test_self_append() {
        // EMPTY_LIST, DUP, APPEND: the list contains itself
        let value = loads(b"]2a.").unwrap();
        let inner = value.item(0).unwrap();
        assert!(inner.ptr_eq(&value));
    }
}
