//! Runtime values and the object model.
//!
//! Primitives are stored inline; everything else is an [`Object`] behind an
//! `Rc`. Object identity is pointer identity, and objects link to a shared
//! prototype that lives in the interpreter's [`Realm`](crate::Realm).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use rill_types::ast::Function;
use rill_types::number::format_number;

use crate::env::Scope;
use crate::error::EvalResult;
use crate::interpreter::Interpreter;

/// Host callback behind every built-in: `(interpreter, this, arguments)`.
pub type NativeFn = Rc<dyn Fn(&mut Interpreter, Value, Vec<Value>) -> EvalResult<Value>>;

/// A runtime value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Object(Rc<Object>),
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_object(&self) -> Option<&Rc<Object>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The underlying object when this value can be called.
    pub fn as_callable(&self) -> Option<Rc<Object>> {
        self.as_object().filter(|obj| obj.is_callable()).cloned()
    }

    /// `toBoolean`. Total.
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// `toNumber` for primitives; `None` for objects, which must be reduced
    /// to a primitive first.
    pub fn primitive_number(&self) -> Option<f64> {
        match self {
            Value::Undefined => Some(f64::NAN),
            Value::Null => Some(0.0),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Some(*n),
            Value::String(s) => Some(string_to_number(s)),
            Value::Object(_) => None,
        }
    }

    /// `toString` for primitives; `None` for objects.
    pub fn primitive_string(&self) -> Option<String> {
        match self {
            Value::Undefined => Some("undefined".to_string()),
            Value::Null => Some("null".to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(format_number(*n)),
            Value::String(s) => Some(s.to_string()),
            Value::Object(_) => None,
        }
    }

    /// The `typeof` result.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(obj) if obj.is_callable() => "function",
            Value::Object(_) => "object",
        }
    }

    fn write_display(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s.as_ref()),
            Value::Object(obj) => match obj.kind() {
                ObjectKind::Array(items) => {
                    if depth > 2 {
                        return f.write_str("[Array]");
                    }
                    f.write_str("[")?;
                    for (i, item) in items.borrow().iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        item.write_display(f, depth + 1)?;
                    }
                    f.write_str("]")
                }
                ObjectKind::Function(_) | ObjectKind::Native(_) => {
                    write!(f, "[Function: {}]", obj.function_name().unwrap_or("anonymous"))
                }
                ObjectKind::Error => f.write_str(&obj.error_summary()),
                ObjectKind::Plain => f.write_str("[object Object]"),
            },
            primitive => f.write_str(&primitive.primitive_string().unwrap_or_default()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_display(f, 0)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_display(f, 0)
    }
}

/// Same-value comparison: like `===` except `NaN` equals itself.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => strict_equals(self, other),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Objects
// ══════════════════════════════════════════════════════════════════════════════

/// A heap object: own properties, a prototype link, and a kind.
pub struct Object {
    properties: RefCell<BTreeMap<String, Value>>,
    prototype: Option<Rc<Object>>,
    kind: ObjectKind,
}

pub enum ObjectKind {
    Plain,
    /// Dense elements; `length` and index keys are synthesized from them.
    Array(RefCell<Vec<Value>>),
    Function(Closure),
    Native(NativeFunction),
    Error,
}

/// An interpreted function together with the scope it was created in.
pub struct Closure {
    pub function: Rc<Function>,
    pub scope: Rc<Scope>,
}

pub struct NativeFunction {
    pub name: Rc<str>,
    pub call: NativeFn,
}

impl Object {
    pub fn new(kind: ObjectKind, prototype: Option<Rc<Object>>) -> Self {
        Self {
            properties: RefCell::new(BTreeMap::new()),
            prototype,
            kind,
        }
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn prototype(&self) -> Option<&Rc<Object>> {
        self.prototype.as_ref()
    }

    pub fn elements(&self) -> Option<&RefCell<Vec<Value>>> {
        match &self.kind {
            ObjectKind::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ObjectKind::Function(_) | ObjectKind::Native(_))
    }

    /// Declared name of a function object.
    pub fn function_name(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::Function(closure) => closure.function.name.as_ref().map(|n| n.name.as_str()),
            ObjectKind::Native(native) => Some(&native.name),
            _ => None,
        }
    }

    /// `Object`, `Array`, `Function` or `Error`.
    pub fn class_name(&self) -> &'static str {
        match self.kind {
            ObjectKind::Plain => "Object",
            ObjectKind::Array(_) => "Array",
            ObjectKind::Function(_) | ObjectKind::Native(_) => "Function",
            ObjectKind::Error => "Error",
        }
    }

    /// Own property lookup, including synthesized array keys.
    pub fn get_own(&self, key: &str) -> Option<Value> {
        if let ObjectKind::Array(items) = &self.kind {
            let items = items.borrow();
            if key == "length" {
                return Some(Value::Number(items.len() as f64));
            }
            if let Some(index) = array_index(key) {
                return items.get(index).cloned();
            }
        }
        self.properties.borrow().get(key).cloned()
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.get_own(key).is_some()
    }

    /// Property lookup through the prototype chain.
    pub fn get(&self, key: &str) -> Value {
        if let Some(value) = self.get_own(key) {
            return value;
        }
        if self.elements().is_some() && array_index(key).is_some() {
            return Value::Undefined;
        }
        match &self.prototype {
            Some(proto) => proto.get(key),
            None => Value::Undefined,
        }
    }

    /// Write to the receiver's own properties.
    ///
    /// On arrays, an index at or past `length` grows the elements with
    /// `undefined`, and assigning `length` truncates or extends them. Both
    /// fail for lengths past [`MAX_ARRAY_LENGTH`].
    pub fn set(&self, key: &str, value: Value) -> Result<(), InvalidArrayLength> {
        if let ObjectKind::Array(items) = &self.kind {
            if key == "length" {
                let len = value.primitive_number().map_or(Err(InvalidArrayLength), array_length)?;
                items.borrow_mut().resize(len, Value::Undefined);
                return Ok(());
            }
            if let Some(index) = array_index(key) {
                if index >= MAX_ARRAY_LENGTH {
                    return Err(InvalidArrayLength);
                }
                let mut items = items.borrow_mut();
                if index >= items.len() {
                    items.resize(index + 1, Value::Undefined);
                }
                items[index] = value;
                return Ok(());
            }
        }
        self.define(key, value);
        Ok(())
    }

    /// Insert an own property as is, without array element handling.
    pub fn define(&self, key: &str, value: Value) {
        self.properties.borrow_mut().insert(key.to_string(), value);
    }

    /// Own property names in key order (array indices first).
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = match &self.kind {
            ObjectKind::Array(items) => (0..items.borrow().len()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        };
        keys.extend(self.properties.borrow().keys().cloned());
        keys
    }

    /// `name: message` (or just `name`) from an error-like object's properties.
    pub fn error_summary(&self) -> String {
        let name = match self.get("name") {
            Value::Undefined => "Error".to_string(),
            other => other.primitive_string().unwrap_or_else(|| "Error".to_string()),
        };
        let message = match self.get("message") {
            Value::Undefined => String::new(),
            other => other.primitive_string().unwrap_or_default(),
        };
        if message.is_empty() {
            name
        } else {
            format!("{name}: {message}")
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[object {}]", self.class_name())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Primitive operations
// ══════════════════════════════════════════════════════════════════════════════

/// `===`: identical variant and value. `NaN` is never equal to itself and
/// `+0` equals `-0`; objects compare by identity.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// Strict equality that also treats `NaN` as equal to itself (`includes`).
pub fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => strict_equals(a, b),
    }
}

/// String-to-number coercion: surrounding whitespace is ignored, the empty
/// string is `0`, and radix prefixes and `Infinity` are recognized.
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits
            .chars()
            .try_fold(0.0_f64, |acc, c| {
                c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
            })
            .unwrap_or(f64::NAN);
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust accepts `inf`/`nan` spellings the language does not.
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Largest number of elements an array may hold.
pub const MAX_ARRAY_LENGTH: usize = 1 << 22;

/// An array length that is negative, fractional, or past [`MAX_ARRAY_LENGTH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid array length")]
pub struct InvalidArrayLength;

/// Validate a requested array length.
pub fn array_length(n: f64) -> Result<usize, InvalidArrayLength> {
    if n >= 0.0 && n.fract() == 0.0 && n <= MAX_ARRAY_LENGTH as f64 {
        Ok(n as usize)
    } else {
        Err(InvalidArrayLength)
    }
}

/// Truncate to a signed 32-bit integer (modulo 2^32).
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// Truncate to an unsigned 32-bit integer (modulo 2^32).
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// Parse a canonical array index key (`"0"`, `"12"`, never `"012"`).
pub fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse::<u32>().ok().filter(|&i| i < u32::MAX).map(|i| i as usize)
}
