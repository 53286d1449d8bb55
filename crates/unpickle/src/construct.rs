//! Object construction protocol
//!
//! Class resolution plus the call / new / build operations used by the
//! `GLOBAL`, `INST`, `OBJ`, `REDUCE`, `NEWOBJ`, `NEWOBJ_EX` and `BUILD`
//! opcodes. Nothing here runs foreign code: a class either maps to one of
//! the built-in behaviours, to a native function the embedder registered,
//! or to a generic class whose instances just record their arguments.

use std::rc::Rc;

use tracing::debug;

use crate::error::{type_name, Result, UnpickleError};
use crate::hooks::Hooks;
use crate::value::{Class, ClassKind, Dict, Instance, Value};

// ═══════════════════════════════════════════════════════════════════════
// Class Resolution
// ═══════════════════════════════════════════════════════════════════════

/// Resolve a `(module, name)` pair.
///
/// `collections.OrderedDict` and the base `object` class are built in.
/// Every other pair goes to the `find_class` hook, exactly once.
pub fn resolve_class(hooks: &mut Hooks, module: &str, name: &str) -> Result<Value> {
    match (module, name) {
        ("collections", "OrderedDict") => return Ok(Value::class(Class::ordered_dict())),
        ("__builtin__" | "builtins", "object") => return Ok(Value::class(Class::object())),
        _ => {}
    }

    let find_class = hooks.find_class.as_mut().ok_or_else(|| {
        UnpickleError::Unsupported(format!("can't unpickle type {}.{}", module, name))
    })?;

    debug!(module, name, "resolving class through hook");
    find_class(module, name).map_err(|source| UnpickleError::Hook {
        hook: "find_class",
        source,
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════════

fn expect_class<'v>(context: &'static str, callee: &'v Value) -> Result<&'v Rc<Class>> {
    callee
        .as_class()
        .ok_or_else(|| UnpickleError::type_mismatch(context, "class", callee))
}

fn run_native(class: &Class, func: &crate::value::NativeFn, args: &[Value]) -> Result<Value> {
    debug!(class = %class.qualified_name(), args = args.len(), "calling native constructor");
    func(args).map_err(|source| UnpickleError::Hook {
        hook: "native constructor",
        source,
    })
}

/// Call a class or callable with positional arguments, as `REDUCE` does.
pub fn call(context: &'static str, callee: &Value, args: Vec<Value>) -> Result<Value> {
    let class = expect_class(context, callee)?;
    match class.kind() {
        ClassKind::Generic => Ok(Value::instance(Instance::new(class.clone(), args))),
        ClassKind::OrderedDict => {
            if args.is_empty() {
                Ok(Value::ordered_dict(Dict::new()))
            } else {
                Err(UnpickleError::Unsupported(format!(
                    "collections.OrderedDict called with {} argument(s)",
                    args.len()
                )))
            }
        }
        ClassKind::Object => Err(UnpickleError::Unsupported(format!(
            "{} is not callable",
            class.qualified_name()
        ))),
        ClassKind::Reconstructor => {
            // _reconstructor(cls, base, state) -> base.__new__(cls)
            if args.len() < 2 {
                return Err(UnpickleError::TypeMismatch {
                    context,
                    expected: "(class, base, state) arguments",
                    got: format!("{} argument(s)", args.len()),
                });
            }
            let mut args = args;
            args.truncate(2);
            let base = args.pop().unwrap_or(Value::None);
            new(context, &base, args)
        }
        ClassKind::Native(func) => run_native(class, func, &args),
    }
}

/// Create a new object of a class, as `NEWOBJ` does.
pub fn new(context: &'static str, class: &Value, args: Vec<Value>) -> Result<Value> {
    let class = expect_class(context, class)?;
    match class.kind() {
        ClassKind::Generic => Ok(Value::instance(Instance::new(class.clone(), args))),
        ClassKind::OrderedDict => Ok(Value::ordered_dict(Dict::new())),
        ClassKind::Object => {
            // object.__new__(cls) creates a bare instance of cls
            let target = args.into_iter().next().ok_or(UnpickleError::TypeMismatch {
                context,
                expected: "class argument",
                got: "no arguments".to_string(),
            })?;
            new(context, &target, Vec::new())
        }
        ClassKind::Reconstructor => Err(UnpickleError::TypeMismatch {
            context,
            expected: "class",
            got: class.qualified_name(),
        }),
        ClassKind::Native(func) => run_native(class, func, &args),
    }
}

/// Instantiate a class with marked arguments, as `INST` and `OBJ` do.
///
/// Generic and base-object classes are created with `new`; everything
/// else is called.
pub fn instantiate(context: &'static str, class: &Value, args: Vec<Value>) -> Result<Value> {
    match class.as_class().map(|c| c.kind()) {
        Some(ClassKind::Generic | ClassKind::Object) => new(context, class, args),
        _ => call(context, class, args),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// State Restoration
// ═══════════════════════════════════════════════════════════════════════

/// Apply `BUILD` state to an object.
///
/// A state setter registered on the instance's class takes precedence.
/// Without one, `None` is a no-op, a mapping updates the instance's
/// attributes, and a 2-tuple is treated as (state, slot state), each of
/// which may be `None` or a mapping. Any other state is unsupported.
pub fn build(target: &Value, state: Value) -> Result<()> {
    let inst = match target {
        Value::Instance(inst) => inst,
        _ if state.is_none() => return Ok(()),
        _ => {
            return Err(UnpickleError::Unsupported(format!(
                "BUILD on {} with {} state",
                type_name(target),
                type_name(&state)
            )))
        }
    };

    if let Some(set_state) = inst.class().set_state() {
        return set_state(inst, state).map_err(|source| UnpickleError::Hook {
            hook: "set_state",
            source,
        });
    }

    match &state {
        Value::Tuple(parts) if parts.len() == 2 => {
            apply_attrs(inst, &parts[0])?;
            apply_attrs(inst, &parts[1])
        }
        _ => apply_attrs(inst, &state),
    }
}

fn apply_attrs(inst: &Instance, state: &Value) -> Result<()> {
    let entries: Vec<(Value, Value)> = match state {
        Value::None => return Ok(()),
        Value::Dict(d) | Value::OrderedDict(d) => d
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        other => {
            return Err(UnpickleError::Unsupported(format!(
                "BUILD with {} state",
                type_name(other)
            )))
        }
    };

    for (key, value) in entries {
        let name = key
            .as_str()
            .ok_or_else(|| UnpickleError::type_mismatch("BUILD", "str attribute name", &key))?;
        inst.set_attr(name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foo() -> Value {
        Value::class(Class::generic("__main__", "Foo"))
    }

    #[test]
    fn test_builtins_skip_hook() {
        let mut hooks = Hooks::new();
        let od = resolve_class(&mut hooks, "collections", "OrderedDict").unwrap();
        assert!(matches!(od.as_class().unwrap().kind(), ClassKind::OrderedDict));
        let obj = resolve_class(&mut hooks, "builtins", "object").unwrap();
        assert!(matches!(obj.as_class().unwrap().kind(), ClassKind::Object));
    }

    #[test]
    fn test_unresolved_without_hook() {
        let err = resolve_class(&mut Hooks::new(), "os", "system").unwrap_err();
        assert_eq!(err.to_string(), "unsupported: can't unpickle type os.system");
    }

    #[test]
    fn test_reconstructor_creates_bare_instance() {
        let rec = Value::class(Class::reconstructor());
        let args = vec![foo(), Value::class(Class::object()), Value::None];
        let result = call("REDUCE", &rec, args).unwrap();
        let inst = result.as_instance().unwrap();
        assert_eq!(inst.class().qualified_name(), "__main__.Foo");
        assert!(inst.args().is_empty());
    }

    #[test]
    fn test_reconstructor_needs_two_args() {
        let rec = Value::class(Class::reconstructor());
        let err = call("REDUCE", &rec, vec![foo()]).unwrap_err();
        assert!(matches!(err, UnpickleError::TypeMismatch { .. }));
    }

    #[test]
    fn test_ordered_dict_rejects_args() {
        let od = Value::class(Class::ordered_dict());
        assert!(call("REDUCE", &od, vec![Value::Int(1)]).is_err());
        assert_eq!(
            new("NEWOBJ", &od, vec![Value::Int(1)]).unwrap(),
            Value::ordered_dict(Dict::new())
        );
    }

    #[test]
    fn test_calling_non_class() {
        let err = call("REDUCE", &Value::Int(3), vec![]).unwrap_err();
        assert_eq!(err.to_string(), "REDUCE: expected class, got int");
    }

    #[test]
    fn test_native_class() {
        let sum = Value::class(Class::native("m", "sum", |args| {
            Ok(Value::Int(args.iter().filter_map(Value::as_i64).sum()))
        }));
        assert_eq!(
            call("REDUCE", &sum, vec![Value::Int(2), Value::Int(3)]).unwrap(),
            Value::Int(5)
        );
    }

    #[test]
    fn test_build_dict_and_slots() {
        let obj = new("NEWOBJ", &foo(), vec![]).unwrap();
        let state = Value::tuple(vec![
            Value::dict(Dict::new().with_entry("a", 1)),
            Value::dict(Dict::new().with_entry("b", 2)),
        ]);
        build(&obj, state).unwrap();
        let inst = obj.as_instance().unwrap();
        assert_eq!(inst.attr("a"), Some(Value::Int(1)));
        assert_eq!(inst.attr("b"), Some(Value::Int(2)));
    }

    #[test]
    fn test_build_rejects_other_state() {
        let obj = new("NEWOBJ", &foo(), vec![]).unwrap();
        assert!(build(&obj, Value::Int(1)).is_err());
        assert!(build(&obj, Value::None).is_ok());
        assert!(build(&Value::list(vec![]), Value::Int(1)).is_err());
    }

    #[test]
    fn test_build_uses_set_state() {
        let class = Class::generic("m", "Point").with_set_state(|inst, state| {
            inst.set_attr("state", state);
            Ok(())
        });
        let obj = new("NEWOBJ", &Value::class(class), vec![]).unwrap();
        build(&obj, Value::Int(7)).unwrap();
        assert_eq!(obj.as_instance().unwrap().attr("state"), Some(Value::Int(7)));
    }
}
