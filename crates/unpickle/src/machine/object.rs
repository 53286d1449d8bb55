//! Class resolution, object construction and external reference opcodes

use tracing::debug;

use super::{Step, Unpickler};
use crate::construct;
use crate::error::{Result, UnpickleError};
use crate::numeric;
use crate::value::{Text, Value};

fn missing_hook(what: &str, hook: &str) -> UnpickleError {
    UnpickleError::Unsupported(format!("{} encountered but no {} hook was given", what, hook))
}

fn hook_failed(hook: &'static str) -> impl FnOnce(crate::error::HookError) -> UnpickleError {
    move |source| UnpickleError::Hook { hook, source }
}

// ═══════════════════════════════════════════════════════════════════════
// Class Resolution
// ═══════════════════════════════════════════════════════════════════════

/// Read the `module\nname\n` pair used by `GLOBAL` and `INST`.
fn read_class_name(u: &mut Unpickler<'_>) -> Result<(Text, Text)> {
    let module = Text::from_legacy(u.cursor.read_line()?);
    let name = Text::from_legacy(u.cursor.read_line()?);
    Ok((module, name))
}

fn resolve(u: &mut Unpickler<'_>, module: &Text, name: &Text) -> Result<Value> {
    let class = construct::resolve_class(&mut u.hooks, module.as_str(), name.as_str())?;
    debug!(module = %module, name = %name, "class resolved");
    Ok(class)
}

pub(super) fn global(u: &mut Unpickler<'_>) -> Result<Step> {
    let (module, name) = read_class_name(u)?;
    let class = resolve(u, &module, &name)?;
    u.push(class);
    Ok(Step::Continue)
}

pub(super) fn stack_global(u: &mut Unpickler<'_>) -> Result<Step> {
    let name = u.pop("STACK_GLOBAL")?;
    let module = u.pop("STACK_GLOBAL")?;
    let (Value::Text(module), Value::Text(name)) = (&module, &name) else {
        let bad = if module.as_str().is_none() { &module } else { &name };
        return Err(UnpickleError::type_mismatch("STACK_GLOBAL", "str", bad));
    };
    let class = resolve(u, module, name)?;
    u.push(class);
    Ok(Step::Continue)
}

// ═══════════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════════

pub(super) fn inst(u: &mut Unpickler<'_>) -> Result<Step> {
    let (module, name) = read_class_name(u)?;
    let class = resolve(u, &module, &name)?;
    let args = u.pop_mark("INST")?;
    let obj = construct::instantiate("INST", &class, args)?;
    u.push(obj);
    Ok(Step::Continue)
}

pub(super) fn obj(u: &mut Unpickler<'_>) -> Result<Step> {
    let mut items = u.pop_mark("OBJ")?.into_iter();
    let class = items.next().ok_or(UnpickleError::StackUnderflow("OBJ"))?;
    let obj = construct::instantiate("OBJ", &class, items.collect())?;
    u.push(obj);
    Ok(Step::Continue)
}

fn pop_args(u: &mut Unpickler<'_>, context: &'static str) -> Result<Vec<Value>> {
    match u.pop(context)? {
        Value::Tuple(args) => Ok(args.to_vec()),
        other => Err(UnpickleError::type_mismatch(context, "tuple", &other)),
    }
}

pub(super) fn reduce(u: &mut Unpickler<'_>) -> Result<Step> {
    let args = pop_args(u, "REDUCE")?;
    let callable = u.pop("REDUCE")?;
    let obj = construct::call("REDUCE", &callable, args)?;
    u.push(obj);
    Ok(Step::Continue)
}

pub(super) fn new_obj(u: &mut Unpickler<'_>) -> Result<Step> {
    let args = pop_args(u, "NEWOBJ")?;
    let class = u.pop("NEWOBJ")?;
    let obj = construct::new("NEWOBJ", &class, args)?;
    u.push(obj);
    Ok(Step::Continue)
}

/// Like `NEWOBJ`, with the keyword mapping passed as a final positional argument.
pub(super) fn new_obj_ex(u: &mut Unpickler<'_>) -> Result<Step> {
    let kwargs = u.pop("NEWOBJ_EX")?;
    let mut args = pop_args(u, "NEWOBJ_EX")?;
    let class = u.pop("NEWOBJ_EX")?;
    args.push(kwargs);
    let obj = construct::new("NEWOBJ_EX", &class, args)?;
    u.push(obj);
    Ok(Step::Continue)
}

pub(super) fn build(u: &mut Unpickler<'_>) -> Result<Step> {
    let state = u.pop("BUILD")?;
    construct::build(u.top("BUILD")?, state)?;
    Ok(Step::Continue)
}

// ═══════════════════════════════════════════════════════════════════════
// External References
// ═══════════════════════════════════════════════════════════════════════

fn persistent_load(u: &mut Unpickler<'_>, pid: Value) -> Result<Step> {
    let load = u
        .hooks
        .persistent_load
        .as_mut()
        .ok_or_else(|| missing_hook("persistent id", "persistent_load"))?;
    let value = load(pid).map_err(hook_failed("persistent_load"))?;
    u.push(value);
    Ok(Step::Continue)
}

pub(super) fn pers_id(u: &mut Unpickler<'_>) -> Result<Step> {
    if u.hooks.persistent_load.is_none() {
        return Err(missing_hook("persistent id", "persistent_load"));
    }
    let pid = Value::Text(Text::from_legacy(u.cursor.read_line()?));
    persistent_load(u, pid)
}

pub(super) fn bin_pers_id(u: &mut Unpickler<'_>) -> Result<Step> {
    if u.hooks.persistent_load.is_none() {
        return Err(missing_hook("persistent id", "persistent_load"));
    }
    let pid = u.pop("BINPERSID")?;
    persistent_load(u, pid)
}

fn extension(u: &mut Unpickler<'_>, width: usize) -> Result<Step> {
    let lookup = u
        .hooks
        .extension
        .as_mut()
        .ok_or_else(|| missing_hook("extension code", "extension"))?;
    let code = match width {
        1 => u32::from(u.cursor.read_byte()?),
        2 => u32::from(numeric::u16_le(u.cursor.read_array()?)),
        _ => numeric::u32_le(u.cursor.read_array()?),
    };
    debug!(code, "resolving extension code");
    let value = lookup(code).map_err(hook_failed("extension"))?;
    u.push(value);
    Ok(Step::Continue)
}

pub(super) fn ext1(u: &mut Unpickler<'_>) -> Result<Step> {
    extension(u, 1)
}

pub(super) fn ext2(u: &mut Unpickler<'_>) -> Result<Step> {
    extension(u, 2)
}

pub(super) fn ext4(u: &mut Unpickler<'_>) -> Result<Step> {
    extension(u, 4)
}

pub(super) fn next_buffer(u: &mut Unpickler<'_>) -> Result<Step> {
    let supply = u
        .hooks
        .next_buffer
        .as_mut()
        .ok_or_else(|| missing_hook("out-of-band buffer", "next_buffer"))?;
    let buffer = supply().map_err(hook_failed("next_buffer"))?;
    u.push(buffer);
    Ok(Step::Continue)
}

/// Replace the top buffer with its read-only form; a no-op without a hook.
pub(super) fn read_only_buffer(u: &mut Unpickler<'_>) -> Result<Step> {
    if u.hooks.make_read_only.is_none() {
        return Ok(Step::Continue);
    }
    let buffer = u.pop("READONLY_BUFFER")?;
    if let Some(convert) = u.hooks.make_read_only.as_mut() {
        let converted = convert(buffer).map_err(hook_failed("make_read_only"))?;
        u.push(converted);
    }
    Ok(Step::Continue)
}
