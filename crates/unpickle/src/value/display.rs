//! Display and Debug implementations for Value

use std::fmt;

use super::*;

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut seen = Vec::new();
        write_repr(self, f, &mut seen)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut seen = vec![self as *const Instance as *const ()];
        write_instance(self, f, &mut seen)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Display is more user-friendly, Debug is more detailed
        match self {
            Value::Text(t) => write!(f, "{}", t), // No quotes for Display
            _ => fmt::Debug::fmt(self, f),
        }
    }
}

/// Address of a value that can reach itself, used to cut reference cycles.
fn container_addr(value: &Value) -> Option<*const ()> {
    match value {
        Value::Instance(rc) => Some(Rc::as_ptr(rc) as *const ()),
        Value::List(rc) => Some(Rc::as_ptr(rc) as *const ()),
        Value::Dict(rc) | Value::OrderedDict(rc) => Some(Rc::as_ptr(rc) as *const ()),
        Value::Set(rc) => Some(Rc::as_ptr(rc) as *const ()),
        _ => None,
    }
}

fn write_repr(value: &Value, f: &mut fmt::Formatter<'_>, seen: &mut Vec<*const ()>) -> fmt::Result {
    // A container reached again through itself prints as `...`
    let addr = container_addr(value);
    if let Some(addr) = addr {
        if seen.contains(&addr) {
            return write!(f, "...");
        }
        seen.push(addr);
    }

    let result = match value {
        Value::None => write!(f, "None"),
        Value::Bool(true) => write!(f, "True"),
        Value::Bool(false) => write!(f, "False"),
        Value::Int(n) => write!(f, "{}", n),
        Value::BigInt(n) => write!(f, "{}", n),
        Value::Float(x) => write!(f, "{:?}", x),

        Value::Text(t) => write!(f, "{:?}", t),
        Value::Bytes(b) => write_bytes(f, "b'", b, "'"),
        Value::ByteArray(b) => match b.try_borrow() {
            Ok(b) => write_bytes(f, "bytearray(b'", &b, "')"),
            Err(_) => write!(f, "bytearray(<borrowed>)"),
        },

        Value::Tuple(items) => {
            write!(f, "(")?;
            write_items(f, items.iter(), seen)?;
            if items.len() == 1 {
                write!(f, ",")?; // Single-element tuple needs trailing comma
            }
            write!(f, ")")
        }

        Value::List(items) => match items.try_borrow() {
            Ok(items) => {
                write!(f, "[")?;
                write_items(f, items.iter(), seen)?;
                write!(f, "]")
            }
            Err(_) => write!(f, "[<borrowed>]"),
        },

        Value::Dict(d) => match d.try_borrow() {
            Ok(d) => write_entries(f, &d, seen),
            Err(_) => write!(f, "{{<borrowed>}}"),
        },

        Value::OrderedDict(d) => match d.try_borrow() {
            Ok(d) => {
                write!(f, "OrderedDict(")?;
                write_entries(f, &d, seen)?;
                write!(f, ")")
            }
            Err(_) => write!(f, "OrderedDict(<borrowed>)"),
        },

        Value::Set(s) => match s.try_borrow() {
            Ok(s) if s.is_empty() => write!(f, "set()"),
            Ok(s) => {
                write!(f, "{{")?;
                write_items(f, s.iter(), seen)?;
                write!(f, "}}")
            }
            Err(_) => write!(f, "set(<borrowed>)"),
        },

        Value::FrozenSet(s) => {
            write!(f, "frozenset({{")?;
            write_items(f, s.iter(), seen)?;
            write!(f, "}})")
        }

        Value::ClassRef(class) => write!(f, "<class {}>", class.qualified_name()),
        Value::Instance(inst) => write_instance(inst, f, seen),
    };

    if addr.is_some() {
        seen.pop();
    }
    result
}

fn write_items<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
    seen: &mut Vec<*const ()>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_repr(item, f, seen)?;
    }
    Ok(())
}

fn write_instance(inst: &Instance, f: &mut fmt::Formatter<'_>, seen: &mut Vec<*const ()>) -> fmt::Result {
    write!(f, "<{} instance", inst.class().qualified_name())?;
    if !inst.args().is_empty() {
        write!(f, " args=[")?;
        write_items(f, inst.args().iter(), seen)?;
        write!(f, "]")?;
    }
    let attrs = match inst.try_attrs() {
        Some(attrs) => attrs,
        None => return write!(f, " attrs=<borrowed>>"),
    };
    if !attrs.is_empty() {
        write!(f, " attrs={{")?;
        for (i, (k, v)) in attrs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: ", k)?;
            write_repr(v, f, seen)?;
        }
        write!(f, "}}")?;
    }
    write!(f, ">")
}

fn write_entries(f: &mut fmt::Formatter<'_>, dict: &Dict, seen: &mut Vec<*const ()>) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (k, v)) in dict.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_repr(k, f, seen)?;
        write!(f, ": ")?;
        write_repr(v, f, seen)?;
    }
    write!(f, "}}")
}

fn write_bytes(f: &mut fmt::Formatter<'_>, open: &str, bytes: &[u8], close: &str) -> fmt::Result {
    write!(f, "{}", open)?;
    for &b in bytes {
        match b {
            b'\\' => write!(f, "\\\\")?,
            b'\'' => write!(f, "\\'")?,
            b'\n' => write!(f, "\\n")?,
            b'\r' => write!(f, "\\r")?,
            b'\t' => write!(f, "\\t")?,
            0x20..=0x7e => write!(f, "{}", b as char)?,
            _ => write!(f, "\\x{:02x}", b)?,
        }
    }
    write!(f, "{}", close)
}
