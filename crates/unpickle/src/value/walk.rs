//! Non-recursive traversals: nesting depth and teardown
//!
//! The compiler-generated drop of a `Value` recurses once per nesting
//! level, so a long enough chain of containers overflows the stack. The
//! functions here keep their own work lists instead.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::Value;

/// Address of a value that can hold other values.
fn node_addr(value: &Value) -> Option<*const ()> {
    match value {
        Value::Tuple(rc) => Some(Rc::as_ptr(rc) as *const Value as *const ()),
        Value::FrozenSet(rc) => Some(Rc::as_ptr(rc) as *const ()),
        Value::Instance(rc) => Some(Rc::as_ptr(rc) as *const ()),
        Value::List(rc) => Some(Rc::as_ptr(rc) as *const ()),
        Value::Dict(rc) | Value::OrderedDict(rc) => Some(Rc::as_ptr(rc) as *const ()),
        Value::Set(rc) => Some(Rc::as_ptr(rc) as *const ()),
        _ => None,
    }
}

/// Handles to the values directly inside `value`.
fn children(value: &Value) -> Vec<Value> {
    match value {
        Value::Tuple(items) => items.to_vec(),
        Value::FrozenSet(set) => set.iter().cloned().collect(),
        Value::Instance(inst) => {
            let mut out = inst.args().to_vec();
            out.extend(inst.attrs().values().cloned());
            out
        }
        Value::List(items) => items.try_borrow().map(|v| v.clone()).unwrap_or_default(),
        Value::Dict(d) | Value::OrderedDict(d) => d
            .try_borrow()
            .map(|d| d.iter().flat_map(|(k, v)| [k.clone(), v.clone()]).collect())
            .unwrap_or_default(),
        Value::Set(set) => set
            .try_borrow()
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

struct Frame {
    addr: *const (),
    pending: Vec<Value>,
    height: usize,
}

/// Check whether containers nest more than `limit` levels deep under
/// `root`.
///
/// A container counts one level; scalars count none. Edges back into a
/// container that is still open (reference cycles) are not followed, and
/// each shared container is measured once.
pub(crate) fn nesting_exceeds(root: &Value, limit: usize) -> bool {
    let Some(addr) = node_addr(root) else {
        return false;
    };
    if limit == 0 {
        return true;
    }

    let mut measured: HashMap<*const (), usize> = HashMap::new();
    let mut open: HashSet<*const ()> = HashSet::from([addr]);
    let mut path = vec![Frame {
        addr,
        pending: children(root),
        height: 0,
    }];

    while let Some(top) = path.last_mut() {
        let Some(child) = top.pending.pop() else {
            let Some(done) = path.pop() else {
                break;
            };
            let height = done.height + 1;
            if height > limit {
                return true;
            }
            open.remove(&done.addr);
            measured.insert(done.addr, height);
            if let Some(parent) = path.last_mut() {
                parent.height = parent.height.max(height);
            }
            continue;
        };

        let Some(addr) = node_addr(&child) else {
            continue;
        };
        if let Some(&height) = measured.get(&addr) {
            top.height = top.height.max(height);
            continue;
        }
        if open.contains(&addr) {
            continue;
        }
        if path.len() >= limit {
            return true;
        }
        open.insert(addr);
        path.push(Frame {
            addr,
            pending: children(&child),
            height: 0,
        });
    }
    false
}

/// Drop `values` without recursing through containers they own outright.
///
/// A container still shared with another handle is only released, so
/// nothing reachable from elsewhere is touched.
pub(crate) fn release(values: impl IntoIterator<Item = Value>) {
    let mut pending: Vec<Value> = values.into_iter().collect();
    while let Some(mut value) = pending.pop() {
        take_children(&mut value, &mut pending);
    }
}

fn take_children(value: &mut Value, out: &mut Vec<Value>) {
    match value {
        Value::Tuple(items) => {
            if let Some(items) = Rc::get_mut(items) {
                out.extend(items.iter_mut().map(|v| std::mem::replace(v, Value::None)));
            }
        }
        Value::FrozenSet(set) => {
            if let Some(set) = Rc::get_mut(set) {
                set.drain_into(out);
            }
        }
        Value::Instance(inst) => {
            if let Some(inst) = Rc::get_mut(inst) {
                inst.drain_into(out);
            }
        }
        Value::List(items) => {
            if let Some(items) = Rc::get_mut(items) {
                out.append(items.get_mut());
            }
        }
        Value::Dict(d) | Value::OrderedDict(d) => {
            if let Some(d) = Rc::get_mut(d) {
                d.get_mut().drain_into(out);
            }
        }
        Value::Set(set) => {
            if let Some(set) = Rc::get_mut(set) {
                set.get_mut().drain_into(out);
            }
        }
        _ => {}
    }
}
