//! The built-in prelude, expressed entirely as native functions.
//!
//! Prototype methods are installed when a [`Realm`] is built. Global
//! constructors are bound by [`install_globals`] only when the prelude is
//! enabled; `undefined`, `NaN` and `Infinity` are always bound.

use std::rc::Rc;

use crate::env::Scope;
use crate::error::EvalResult;
use crate::interpreter::Interpreter;
use crate::realm::Realm;
use crate::value::{self, NativeFunction, Object, ObjectKind, Value};

/// Error constructors, all sharing `Error.prototype`.
const ERROR_NAMES: [&str; 5] = ["Error", "TypeError", "ReferenceError", "SyntaxError", "RangeError"];

/// Wrap a host callback as a function object.
pub(crate) fn native(
    realm: &Realm,
    name: &str,
    call: impl Fn(&mut Interpreter, Value, Vec<Value>) -> EvalResult<Value> + 'static,
) -> Rc<Object> {
    let kind = ObjectKind::Native(NativeFunction {
        name: name.into(),
        call: Rc::new(call),
    });
    Rc::new(Object::new(kind, Some(realm.function_prototype.clone())))
}

fn method(
    realm: &Realm,
    target: &Rc<Object>,
    name: &str,
    call: impl Fn(&mut Interpreter, Value, Vec<Value>) -> EvalResult<Value> + 'static,
) {
    target.define(name, Value::Object(native(realm, name, call)));
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

// ══════════════════════════════════════════════════════════════════════════════
// Globals
// ══════════════════════════════════════════════════════════════════════════════

pub(crate) fn install_constants(global: &Scope) {
    global.set_var("undefined", Value::Undefined);
    global.set_var("NaN", Value::Number(f64::NAN));
    global.set_var("Infinity", Value::Number(f64::INFINITY));
}

pub(crate) fn install_globals(interp: &Interpreter) {
    let realm = interp.realm().clone();
    let global = interp.global_scope();

    let object = native(&realm, "Object", |interp, _this, args| match arg(&args, 0) {
        value @ Value::Object(_) => Ok(value),
        _ => Ok(Value::Object(interp.realm().plain_object())),
    });
    object.define("prototype", Value::Object(realm.object_prototype.clone()));
    global.set_var("Object", Value::Object(object));

    let array = native(&realm, "Array", |interp, _this, args| {
        if let [Value::Number(n)] = args[..] {
            let len = value::array_length(n)
                .map_err(|e| interp.throw_error("RangeError", e.to_string()))?;
            return Ok(interp.realm().array(vec![Value::Undefined; len]));
        }
        Ok(interp.realm().array(args))
    });
    array.define("prototype", Value::Object(realm.array_prototype.clone()));
    method(&realm, &array, "isArray", |_, _, args| {
        let is_array = matches!(arg(&args, 0), Value::Object(obj) if obj.elements().is_some());
        Ok(Value::Bool(is_array))
    });
    global.set_var("Array", Value::Object(array));

    let string = native(&realm, "String", |interp, _this, args| match args.first() {
        None => Ok(Value::string("")),
        Some(value) => Ok(Value::string(interp.to_js_string(value)?)),
    });
    string.define("prototype", Value::Object(realm.string_prototype.clone()));
    global.set_var("String", Value::Object(string));

    let number = native(&realm, "Number", |interp, _this, args| match args.first() {
        None => Ok(Value::Number(0.0)),
        Some(value) => Ok(Value::Number(interp.to_number(value)?)),
    });
    number.define("prototype", Value::Object(realm.number_prototype.clone()));
    install_number_statics(&realm, &number);
    global.set_var("Number", Value::Object(number));

    let boolean = native(&realm, "Boolean", |_, _, args| {
        Ok(Value::Bool(arg(&args, 0).to_boolean()))
    });
    boolean.define("prototype", Value::Object(realm.boolean_prototype.clone()));
    global.set_var("Boolean", Value::Object(boolean));

    for name in ERROR_NAMES {
        let ctor = native(&realm, name, move |interp, _this, args| {
            let message = match args.first() {
                None | Some(Value::Undefined) => String::new(),
                Some(value) => interp.to_js_string(value)?,
            };
            Ok(interp.realm().error(name, message))
        });
        ctor.define("prototype", Value::Object(realm.error_prototype.clone()));
        global.set_var(name, Value::Object(ctor));
    }
}

fn install_number_statics(realm: &Realm, number: &Rc<Object>) {
    method(realm, number, "isNaN", |_, _, args| {
        Ok(Value::Bool(matches!(arg(&args, 0), Value::Number(n) if n.is_nan())))
    });
    method(realm, number, "isFinite", |_, _, args| {
        Ok(Value::Bool(matches!(arg(&args, 0), Value::Number(n) if n.is_finite())))
    });
    method(realm, number, "isInteger", |_, _, args| {
        let is_integer = matches!(arg(&args, 0), Value::Number(n) if n.is_finite() && n.fract() == 0.0);
        Ok(Value::Bool(is_integer))
    });
    method(realm, number, "parseFloat", |interp, _, args| {
        let text = interp.to_js_string(&arg(&args, 0))?;
        Ok(Value::Number(parse_float(&text)))
    });
    method(realm, number, "parseInt", |interp, _, args| {
        let text = interp.to_js_string(&arg(&args, 0))?;
        let radix = match arg(&args, 1) {
            Value::Undefined => 0,
            other => value::to_int32(interp.to_number(&other)?),
        };
        Ok(Value::Number(parse_int(&text, radix)))
    });
}

/// Longest decimal prefix of `text`, or `NaN`.
fn parse_float(text: &str) -> f64 {
    let text = text.trim_start();
    for infinity in ["Infinity", "+Infinity", "-Infinity"] {
        if text.starts_with(infinity) {
            return if infinity.starts_with('-') {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };
        }
    }
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
    }
    if end == digits_start || &text[digits_start..end] == "." {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        if bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
                exp_end += 1;
            }
            end = exp_end;
        }
    }
    text[..end].parse().unwrap_or(f64::NAN)
}

/// Integer prefix of `text` in `radix` (0 means 10, or 16 with a `0x` prefix).
fn parse_int(text: &str, radix: i32) -> f64 {
    let mut text = text.trim_start();
    let mut sign = 1.0;
    if let Some(rest) = text.strip_prefix('-') {
        sign = -1.0;
        text = rest;
    } else if let Some(rest) = text.strip_prefix('+') {
        text = rest;
    }
    let mut radix = radix as u32;
    if radix == 0 || radix == 16 {
        if let Some(rest) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            text = rest;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    let mut result = None;
    for c in text.chars() {
        let Some(digit) = c.to_digit(radix) else { break };
        result = Some(result.unwrap_or(0.0) * f64::from(radix) + f64::from(digit));
    }
    result.map_or(f64::NAN, |n| sign * n)
}

// ══════════════════════════════════════════════════════════════════════════════
// Prototype methods
// ══════════════════════════════════════════════════════════════════════════════

pub(crate) fn install_prototype_methods(realm: &Realm) {
    install_object_methods(realm);
    install_function_methods(realm);
    install_array_methods(realm);
    install_string_methods(realm);
    install_primitive_methods(realm);
    install_error_methods(realm);
}

fn install_object_methods(realm: &Realm) {
    let proto = &realm.object_prototype;
    method(realm, proto, "hasOwnProperty", |interp, this, args| {
        let key = interp.to_property_key(&arg(&args, 0))?;
        let has = match &this {
            Value::Object(obj) => obj.has_own(&key),
            Value::String(s) => {
                key == "length" || value::array_index(&key).is_some_and(|i| i < s.encode_utf16().count())
            }
            _ => false,
        };
        Ok(Value::Bool(has))
    });
    method(realm, proto, "toString", |_, this, _| {
        let tag = match &this {
            Value::Undefined => "Undefined",
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Object(obj) => obj.class_name(),
        };
        Ok(Value::string(format!("[object {tag}]")))
    });
    method(realm, proto, "valueOf", |_, this, _| Ok(this));
}

fn install_function_methods(realm: &Realm) {
    method(realm, &realm.function_prototype, "toString", |_, this, _| {
        let rendered = match this.as_object().map(|obj| obj.kind()) {
            Some(ObjectKind::Native(native)) => {
                format!("function {}() {{ [native code] }}", native.name)
            }
            Some(ObjectKind::Function(closure)) => {
                let name = closure.function.name.as_ref().map_or("", |n| n.name.as_str());
                let params: Vec<&str> = closure.function.params.iter().map(|p| p.name.as_str()).collect();
                format!(
                    "function {name}({}) {}",
                    params.join(", "),
                    closure.function.body.tokens.source_text()
                )
            }
            _ => this.to_string(),
        };
        Ok(Value::string(rendered))
    });
}

// ── Array.prototype ───────────────────────────────────────────────────────

fn this_array(interp: &Interpreter, this: &Value, name: &str) -> EvalResult<Rc<Object>> {
    match this {
        Value::Object(obj) if obj.elements().is_some() => Ok(obj.clone()),
        _ => Err(interp.throw_error(
            "TypeError",
            format!("Array.prototype.{name} called on a non-array"),
        )),
    }
}

/// A copy of the elements, so callbacks may mutate the array freely.
fn elements_of(array: &Object) -> Vec<Value> {
    array.elements().map(|items| items.borrow().clone()).unwrap_or_default()
}

/// Resolve a possibly negative relative index against `len`.
fn relative_index(n: f64, len: usize) -> usize {
    if n.is_nan() {
        return 0;
    }
    let len = len as f64;
    let index = if n < 0.0 {
        (len + n.trunc()).max(0.0)
    } else {
        n.trunc().min(len)
    };
    index as usize
}

fn slice_bounds(interp: &mut Interpreter, args: &[Value], len: usize) -> EvalResult<(usize, usize)> {
    let start = match arg(args, 0) {
        Value::Undefined => 0,
        other => relative_index(interp.to_number(&other)?, len),
    };
    let end = match arg(args, 1) {
        Value::Undefined => len,
        other => relative_index(interp.to_number(&other)?, len),
    };
    Ok((start, end.max(start)))
}

fn join(interp: &mut Interpreter, items: Vec<Value>, separator: &str) -> EvalResult<String> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        parts.push(match item {
            Value::Undefined | Value::Null => String::new(),
            other => interp.to_js_string(&other)?,
        });
    }
    Ok(parts.join(separator))
}

/// Join an array's elements, rendering an array that contains itself
/// (directly or through nesting) as `""` at the point of recursion.
fn join_array(interp: &mut Interpreter, array: &Rc<Object>, separator: &str) -> EvalResult<String> {
    if interp.join_stack.iter().any(|seen| Rc::ptr_eq(seen, array)) {
        return Ok(String::new());
    }
    interp.join_stack.push(array.clone());
    let joined = join(interp, elements_of(array), separator);
    interp.join_stack.pop();
    joined
}

fn install_array_methods(realm: &Realm) {
    let proto = &realm.array_prototype;
    method(realm, proto, "push", |interp, this, args| {
        let array = this_array(interp, &this, "push")?;
        let len = match array.elements() {
            Some(items) => {
                let mut items = items.borrow_mut();
                if items.len() + args.len() > value::MAX_ARRAY_LENGTH {
                    drop(items);
                    return Err(interp.throw_error("RangeError", value::InvalidArrayLength.to_string()));
                }
                items.extend(args);
                items.len()
            }
            None => 0,
        };
        Ok(Value::Number(len as f64))
    });
    method(realm, proto, "pop", |interp, this, _| {
        let array = this_array(interp, &this, "pop")?;
        let popped = array.elements().and_then(|items| items.borrow_mut().pop());
        Ok(popped.unwrap_or_default())
    });
    method(realm, proto, "join", |interp, this, args| {
        let array = this_array(interp, &this, "join")?;
        let separator = match arg(&args, 0) {
            Value::Undefined => ",".to_string(),
            other => interp.to_js_string(&other)?,
        };
        let joined = join_array(interp, &array, &separator)?;
        Ok(Value::string(joined))
    });
    method(realm, proto, "toString", |interp, this, _| {
        let array = this_array(interp, &this, "toString")?;
        let joined = join_array(interp, &array, ",")?;
        Ok(Value::string(joined))
    });
    method(realm, proto, "indexOf", |interp, this, args| {
        let array = this_array(interp, &this, "indexOf")?;
        let needle = arg(&args, 0);
        let position = elements_of(&array)
            .iter()
            .position(|item| value::strict_equals(item, &needle));
        Ok(Value::Number(position.map_or(-1.0, |i| i as f64)))
    });
    method(realm, proto, "includes", |interp, this, args| {
        let array = this_array(interp, &this, "includes")?;
        let needle = arg(&args, 0);
        let found = elements_of(&array)
            .iter()
            .any(|item| value::same_value_zero(item, &needle));
        Ok(Value::Bool(found))
    });
    method(realm, proto, "slice", |interp, this, args| {
        let array = this_array(interp, &this, "slice")?;
        let items = elements_of(&array);
        let (start, end) = slice_bounds(interp, &args, items.len())?;
        Ok(interp.realm().array(items[start..end].to_vec()))
    });
    method(realm, proto, "map", |interp, this, args| {
        let array = this_array(interp, &this, "map")?;
        let callback = arg(&args, 0);
        let items = elements_of(&array);
        let mut mapped = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let call_args = vec![item, Value::Number(i as f64), this.clone()];
            mapped.push(interp.call_function(&callback, Value::Undefined, call_args)?);
        }
        Ok(interp.realm().array(mapped))
    });
    method(realm, proto, "forEach", |interp, this, args| {
        let array = this_array(interp, &this, "forEach")?;
        let callback = arg(&args, 0);
        for (i, item) in elements_of(&array).into_iter().enumerate() {
            let call_args = vec![item, Value::Number(i as f64), this.clone()];
            interp.call_function(&callback, Value::Undefined, call_args)?;
        }
        Ok(Value::Undefined)
    });
}

// ── String.prototype ──────────────────────────────────────────────────────

/// The receiver as UTF-16 code units.
fn this_units(interp: &mut Interpreter, this: &Value) -> EvalResult<Vec<u16>> {
    let text = match this {
        Value::String(s) => s.to_string(),
        other => interp.to_js_string(other)?,
    };
    Ok(text.encode_utf16().collect())
}

fn install_string_methods(realm: &Realm) {
    let proto = &realm.string_prototype;
    method(realm, proto, "charAt", |interp, this, args| {
        let units = this_units(interp, &this)?;
        let index = match arg(&args, 0) {
            Value::Undefined => 0.0,
            other => interp.to_number(&other)?.trunc(),
        };
        let ch = if index >= 0.0 && (index as usize) < units.len() {
            String::from_utf16_lossy(&units[index as usize..index as usize + 1])
        } else {
            String::new()
        };
        Ok(Value::string(ch))
    });
    method(realm, proto, "indexOf", |interp, this, args| {
        let units = this_units(interp, &this)?;
        let needle: Vec<u16> = interp.to_js_string(&arg(&args, 0))?.encode_utf16().collect();
        let from = match arg(&args, 1) {
            Value::Undefined => 0,
            other => relative_index(interp.to_number(&other)?.max(0.0), units.len()),
        };
        let position = (from..=units.len().saturating_sub(needle.len()))
            .find(|&i| units.len() >= needle.len() && units[i..i + needle.len()] == needle[..]);
        Ok(Value::Number(position.map_or(-1.0, |i| i as f64)))
    });
    method(realm, proto, "slice", |interp, this, args| {
        let units = this_units(interp, &this)?;
        let (start, end) = slice_bounds(interp, &args, units.len())?;
        Ok(Value::string(String::from_utf16_lossy(&units[start..end])))
    });
    method(realm, proto, "toUpperCase", |interp, this, _| {
        let text = String::from_utf16_lossy(&this_units(interp, &this)?);
        Ok(Value::string(text.to_uppercase()))
    });
    method(realm, proto, "toLowerCase", |interp, this, _| {
        let text = String::from_utf16_lossy(&this_units(interp, &this)?);
        Ok(Value::string(text.to_lowercase()))
    });
    method(realm, proto, "toString", |interp, this, _| {
        let text = String::from_utf16_lossy(&this_units(interp, &this)?);
        Ok(Value::string(text))
    });
}

// ── Number / Boolean / Error ──────────────────────────────────────────────

fn install_primitive_methods(realm: &Realm) {
    for proto in [&realm.number_prototype, &realm.boolean_prototype] {
        method(realm, proto, "toString", |interp, this, _| {
            Ok(Value::string(interp.to_js_string(&this)?))
        });
        method(realm, proto, "valueOf", |_, this, _| Ok(this));
    }
}

fn install_error_methods(realm: &Realm) {
    method(realm, &realm.error_prototype, "toString", |interp, this, _| {
        let Value::Object(obj) = &this else {
            return Err(interp.throw_error(
                "TypeError",
                "Error.prototype.toString called on a non-object",
            ));
        };
        let name = match obj.get("name") {
            Value::Undefined => "Error".to_string(),
            other => interp.to_js_string(&other)?,
        };
        let message = match obj.get("message") {
            Value::Undefined => String::new(),
            other => interp.to_js_string(&other)?,
        };
        let rendered = if message.is_empty() {
            name
        } else {
            format!("{name}: {message}")
        };
        Ok(Value::string(rendered))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_float_prefixes() {
        assert_eq!(parse_float("3.25abc"), 3.25);
        assert_eq!(parse_float("  -12"), -12.0);
        assert_eq!(parse_float("1e3x"), 1000.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("Infinityx"), f64::INFINITY);
        assert!(parse_float("abc").is_nan());
        assert!(parse_float(".").is_nan());
    }

    #[test]
    fn test_parse_int_radix() {
        assert_eq!(parse_int("42px", 0), 42.0);
        assert_eq!(parse_int("0x1f", 0), 31.0);
        assert_eq!(parse_int("ff", 16), 255.0);
        assert_eq!(parse_int("101", 2), 5.0);
        assert_eq!(parse_int("-7.9", 10), -7.0);
        assert!(parse_int("z", 10).is_nan());
        assert!(parse_int("1", 99).is_nan());
    }

    #[test]
    fn test_relative_index() {
        assert_eq!(relative_index(-1.0, 5), 4);
        assert_eq!(relative_index(-10.0, 5), 0);
        assert_eq!(relative_index(10.0, 5), 5);
        assert_eq!(relative_index(f64::NAN, 5), 0);
        assert_eq!(relative_index(2.7, 5), 2);
    }
}
