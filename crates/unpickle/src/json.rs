//! JSON emitter
//!
//! Writes a decoded [`Value`] as compact JSON text. Mappings keep their
//! insertion order, sets and tuples become arrays, byte strings become
//! standard Base64 strings. Instances and class references have no JSON
//! form and fail the emit.

use std::io;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::context::{JsonOptions, NonFiniteFloats};
use crate::error::{type_name, Result, UnpickleError};
use crate::value::{Dict, Text, Value};

/// Emit `value` as JSON with default options.
///
/// # Example
///
/// ```
/// use unpickle::{json, Dict, Value};
///
/// let value = Value::dict(Dict::new().with_entry("a", vec![Value::Int(1), Value::None]));
/// assert_eq!(json::to_string(&value).unwrap(), r#"{"a":[1,null]}"#);
/// ```
pub fn to_string(value: &Value) -> Result<String> {
    to_string_with(value, &JsonOptions::default())
}

/// Emit `value` as JSON with the given options.
pub fn to_string_with(value: &Value, options: &JsonOptions) -> Result<String> {
    let mut emitter = Emitter {
        out: String::new(),
        options,
        depth: 0,
    };
    emitter.value(value)?;
    Ok(emitter.out)
}

/// Emit `value` as JSON into a writer.
pub fn write<W: io::Write>(writer: &mut W, value: &Value, options: &JsonOptions) -> Result<()> {
    let text = to_string_with(value, options)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

impl Value {
    /// Emit this value as JSON with default options.
    pub fn to_json(&self) -> Result<String> {
        to_string(self)
    }
}

struct Emitter<'o> {
    out: String,
    options: &'o JsonOptions,
    depth: usize,
}

impl Emitter<'_> {
    fn value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::None => self.out.push_str("null"),
            Value::Bool(true) => self.out.push_str("true"),
            Value::Bool(false) => self.out.push_str("false"),
            Value::Int(n) => self.out.push_str(&n.to_string()),
            Value::BigInt(n) => self.out.push_str(&n.to_string()),
            Value::Float(f) => self.float(*f)?,
            Value::Text(t) => self.text(t),
            Value::Bytes(b) => self.base64(b),
            Value::ByteArray(b) => {
                let b = b.borrow();
                self.base64(&b);
            }
            Value::Tuple(items) => self.array(items.iter())?,
            Value::List(items) => {
                let items = items.borrow();
                self.array(items.iter())?;
            }
            Value::Set(set) => {
                let set = set.borrow();
                self.array(set.iter())?;
            }
            Value::FrozenSet(set) => self.array(set.iter())?,
            Value::Dict(dict) | Value::OrderedDict(dict) => {
                let dict = dict.borrow();
                self.object(&dict)?;
            }
            Value::ClassRef(class) => {
                return Err(UnpickleError::Unserializable(format!(
                    "class {}",
                    class.qualified_name()
                )))
            }
            Value::Instance(inst) => {
                return Err(UnpickleError::Unserializable(format!(
                    "instance of {}",
                    inst.class().qualified_name()
                )))
            }
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(UnpickleError::DepthLimit(self.options.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    fn array<'v>(&mut self, items: impl Iterator<Item = &'v Value>) -> Result<()> {
        self.enter()?;
        self.out.push('[');
        for (i, item) in items.enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.value(item)?;
        }
        self.out.push(']');
        self.depth -= 1;
        Ok(())
    }

    fn object(&mut self, dict: &Dict) -> Result<()> {
        self.enter()?;
        self.out.push('{');
        for (i, (key, value)) in dict.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.key(key)?;
            self.out.push(':');
            self.value(value)?;
        }
        self.out.push('}');
        self.depth -= 1;
        Ok(())
    }

    /// Object keys must be strings; scalar keys are written in their
    /// JSON spelling inside quotes.
    fn key(&mut self, key: &Value) -> Result<()> {
        match key {
            Value::Text(t) => self.text(t),
            Value::None | Value::Bool(_) | Value::Int(_) | Value::BigInt(_) | Value::Float(_) => {
                self.out.push('"');
                self.value(key)?;
                self.out.push('"');
            }
            other => {
                return Err(UnpickleError::Unserializable(format!(
                    "{} as an object key",
                    type_name(other)
                )))
            }
        }
        Ok(())
    }

    fn float(&mut self, f: f64) -> Result<()> {
        if f.is_finite() {
            // Shortest representation that round-trips
            self.out.push_str(&format!("{:?}", f));
            return Ok(());
        }
        match self.options.non_finite {
            NonFiniteFloats::Error => {
                return Err(UnpickleError::Unserializable(format!("float {}", f)))
            }
            NonFiniteFloats::Null => self.out.push_str("null"),
            NonFiniteFloats::Literal if f.is_nan() => self.out.push_str("NaN"),
            NonFiniteFloats::Literal if f > 0.0 => self.out.push_str("Infinity"),
            NonFiniteFloats::Literal => self.out.push_str("-Infinity"),
        }
        Ok(())
    }

    fn base64(&mut self, bytes: &[u8]) {
        self.out.push('"');
        STANDARD.encode_string(bytes, &mut self.out);
        self.out.push('"');
    }

    fn text(&mut self, text: &Text) {
        self.out.push('"');
        if text.needs_escape() {
            escape_into(&mut self.out, text.as_str());
        } else {
            self.out.push_str(text.as_str());
        }
        self.out.push('"');
    }
}

const HEX: &[u8; 16] = b"0123456789abcdef";

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => {
                let b = c as usize;
                out.push_str("\\u00");
                out.push(char::from(HEX[b >> 4]));
                out.push(char::from(HEX[b & 0xf]));
            }
            c => out.push(c),
        }
    }
}
