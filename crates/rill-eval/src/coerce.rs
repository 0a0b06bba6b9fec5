//! Type coercions and binary operators.
//!
//! Conversions that may reach an object go through `toString` on the
//! object's prototype chain, which can run user code; hence they live on the
//! interpreter rather than on [`Value`].

use std::cmp::Ordering;

use rill_types::ast::BinOp;
use rill_types::number::format_number;

use crate::error::EvalResult;
use crate::interpreter::Interpreter;
use crate::value::{self, Value};

impl Interpreter {
    /// Reduce an object to a primitive by calling its `toString`.
    pub fn to_primitive(&mut self, value: &Value) -> EvalResult<Value> {
        if !value.is_object() {
            return Ok(value.clone());
        }
        let method = self.get_property(value, "toString");
        if method.as_callable().is_some() {
            let result = self.call_function(&method, value.clone(), Vec::new())?;
            if !result.is_object() {
                return Ok(result);
            }
        }
        Err(self.throw_error("TypeError", "Cannot convert object to primitive value"))
    }

    pub fn to_number(&mut self, value: &Value) -> EvalResult<f64> {
        if let Some(n) = value.primitive_number() {
            return Ok(n);
        }
        let primitive = self.to_primitive(value)?;
        Ok(primitive.primitive_number().unwrap_or(f64::NAN))
    }

    pub fn to_js_string(&mut self, value: &Value) -> EvalResult<String> {
        if let Some(s) = value.primitive_string() {
            return Ok(s);
        }
        let primitive = self.to_primitive(value)?;
        Ok(primitive.primitive_string().unwrap_or_default())
    }

    /// The string key a computed member access uses.
    pub fn to_property_key(&mut self, value: &Value) -> EvalResult<String> {
        match value {
            Value::String(s) => Ok(s.to_string()),
            Value::Number(n) => Ok(format_number(*n)),
            other => self.to_js_string(other),
        }
    }

    /// `==`: same-variant pairs compare strictly; mixed pairs are reduced
    /// step by step until they share a variant or cannot.
    pub fn loose_equals(&mut self, a: &Value, b: &Value) -> EvalResult<bool> {
        if std::mem::discriminant(a) == std::mem::discriminant(b) {
            return Ok(value::strict_equals(a, b));
        }
        match (a, b) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => Ok(true),
            (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
                Ok(*n == value::string_to_number(s))
            }
            (Value::Bool(flag), other) | (other, Value::Bool(flag)) => {
                let n = Value::Number(if *flag { 1.0 } else { 0.0 });
                self.loose_equals(&n, other)
            }
            (Value::Object(_), Value::Number(_) | Value::String(_)) => {
                let primitive = self.to_primitive(a)?;
                self.loose_equals(&primitive, b)
            }
            (Value::Number(_) | Value::String(_), Value::Object(_)) => {
                let primitive = self.to_primitive(b)?;
                self.loose_equals(a, &primitive)
            }
            _ => Ok(false),
        }
    }

    /// Apply a non-short-circuiting binary operator.
    pub(crate) fn binary(&mut self, op: BinOp, left: &Value, right: &Value) -> EvalResult<Value> {
        let value = match op {
            BinOp::Add => return self.add(left, right),
            BinOp::Sub => Value::Number(self.to_number(left)? - self.to_number(right)?),
            BinOp::Mul => Value::Number(self.to_number(left)? * self.to_number(right)?),
            BinOp::Div => Value::Number(self.to_number(left)? / self.to_number(right)?),
            BinOp::Rem => Value::Number(self.to_number(left)? % self.to_number(right)?),
            BinOp::Exp => Value::Number(power(self.to_number(left)?, self.to_number(right)?)),

            BinOp::Eq => Value::Bool(self.loose_equals(left, right)?),
            BinOp::NotEq => Value::Bool(!self.loose_equals(left, right)?),
            BinOp::StrictEq => Value::Bool(value::strict_equals(left, right)),
            BinOp::StrictNotEq => Value::Bool(!value::strict_equals(left, right)),

            BinOp::Less => Value::Bool(self.compare(left, right)? == Some(Ordering::Less)),
            BinOp::LessEq => Value::Bool(matches!(
                self.compare(left, right)?,
                Some(Ordering::Less | Ordering::Equal)
            )),
            BinOp::Greater => Value::Bool(self.compare(left, right)? == Some(Ordering::Greater)),
            BinOp::GreaterEq => Value::Bool(matches!(
                self.compare(left, right)?,
                Some(Ordering::Greater | Ordering::Equal)
            )),

            BinOp::BitAnd => self.int32_op(left, right, |a, b| a & b)?,
            BinOp::BitOr => self.int32_op(left, right, |a, b| a | b)?,
            BinOp::BitXor => self.int32_op(left, right, |a, b| a ^ b)?,
            BinOp::Shl => self.int32_op(left, right, |a, b| a.wrapping_shl(b as u32 & 31))?,
            BinOp::Shr => self.int32_op(left, right, |a, b| a >> (b as u32 & 31))?,
            BinOp::UShr => {
                let a = value::to_uint32(self.to_number(left)?);
                let b = value::to_uint32(self.to_number(right)?);
                Value::Number(f64::from(a >> (b & 31)))
            }
        };
        Ok(value)
    }

    /// `+`: string concatenation when either primitive operand is a string.
    fn add(&mut self, left: &Value, right: &Value) -> EvalResult<Value> {
        let left = self.to_primitive(left)?;
        let right = self.to_primitive(right)?;
        if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
            let mut joined = left.primitive_string().unwrap_or_default();
            joined.push_str(&right.primitive_string().unwrap_or_default());
            return Ok(Value::string(joined));
        }
        let sum = left.primitive_number().unwrap_or(f64::NAN) + right.primitive_number().unwrap_or(f64::NAN);
        Ok(Value::Number(sum))
    }

    /// Relational ordering; `None` when either side is `NaN`.
    fn compare(&mut self, left: &Value, right: &Value) -> EvalResult<Option<Ordering>> {
        let left = self.to_primitive(left)?;
        let right = self.to_primitive(right)?;
        if let (Value::String(a), Value::String(b)) = (&left, &right) {
            return Ok(Some(a.encode_utf16().cmp(b.encode_utf16())));
        }
        let a = left.primitive_number().unwrap_or(f64::NAN);
        let b = right.primitive_number().unwrap_or(f64::NAN);
        Ok(a.partial_cmp(&b))
    }

    fn int32_op(&mut self, left: &Value, right: &Value, op: impl Fn(i32, i32) -> i32) -> EvalResult<Value> {
        let a = value::to_int32(self.to_number(left)?);
        let b = value::to_int32(self.to_number(right)?);
        Ok(Value::Number(f64::from(op(a, b))))
    }
}

/// `**` with the language's edge cases: a `NaN` exponent is always `NaN`,
/// and `(±1) ** ±Infinity` is `NaN` rather than `1`.
fn power(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interp() -> Interpreter {
        Interpreter::new()
    }

    fn s(text: &str) -> Value {
        Value::string(text)
    }

    #[test]
    fn test_loose_equality_ladder() {
        let mut i = interp();
        assert!(i.loose_equals(&Value::Null, &Value::Undefined).unwrap());
        assert!(i.loose_equals(&Value::Number(1.0), &s("1")).unwrap());
        assert!(i.loose_equals(&s(" 2 "), &Value::Number(2.0)).unwrap());
        assert!(i.loose_equals(&Value::Bool(true), &s("1")).unwrap());
        assert!(i.loose_equals(&Value::Number(0.0), &Value::Bool(false)).unwrap());
        assert!(!i.loose_equals(&Value::Null, &Value::Number(0.0)).unwrap());
        assert!(!i.loose_equals(&Value::Undefined, &Value::Bool(false)).unwrap());
        assert!(!i.loose_equals(&Value::Number(f64::NAN), &Value::Number(f64::NAN)).unwrap());
    }

    #[test]
    fn test_loose_equality_reduces_arrays() {
        let mut i = interp();
        let arr = i.realm().array(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert!(i.loose_equals(&arr, &s("1,2")).unwrap());
        let single = i.realm().array(vec![Value::Number(7.0)]);
        assert!(i.loose_equals(&single, &Value::Number(7.0)).unwrap());
    }

    #[test]
    fn test_add_concatenates_with_strings() {
        let mut i = interp();
        assert_eq!(i.binary(BinOp::Add, &Value::Number(1.0), &s("2")).unwrap(), s("12"));
        assert_eq!(i.binary(BinOp::Add, &s("a"), &Value::Null).unwrap(), s("anull"));
        assert_eq!(
            i.binary(BinOp::Add, &Value::Bool(true), &Value::Number(1.0)).unwrap(),
            Value::Number(2.0)
        );
        let arr = i.realm().array(vec![Value::Number(1.0)]);
        assert_eq!(i.binary(BinOp::Add, &arr, &Value::Number(1.0)).unwrap(), s("11"));
    }

    #[test]
    fn test_arithmetic_ieee() {
        let mut i = interp();
        let div = i.binary(BinOp::Div, &Value::Number(1.0), &Value::Number(0.0)).unwrap();
        assert_eq!(div, Value::Number(f64::INFINITY));
        let neg = i.binary(BinOp::Div, &Value::Number(-1.0), &Value::Number(0.0)).unwrap();
        assert_eq!(neg, Value::Number(f64::NEG_INFINITY));
        let rem = i.binary(BinOp::Rem, &Value::Number(-7.0), &Value::Number(3.0)).unwrap();
        assert_eq!(rem, Value::Number(-1.0));
        let nan = i.binary(BinOp::Sub, &s("x"), &Value::Number(1.0)).unwrap();
        assert_eq!(nan, Value::Number(f64::NAN));
    }

    #[test]
    fn test_bitwise_truncates_to_int32() {
        let mut i = interp();
        let n = |v: f64| Value::Number(v);
        assert_eq!(i.binary(BinOp::BitOr, &n(5.7), &n(0.0)).unwrap(), n(5.0));
        assert_eq!(i.binary(BinOp::Shl, &n(1.0), &n(31.0)).unwrap(), n(-2147483648.0));
        assert_eq!(i.binary(BinOp::Shr, &n(-8.0), &n(1.0)).unwrap(), n(-4.0));
        assert_eq!(i.binary(BinOp::UShr, &n(-1.0), &n(0.0)).unwrap(), n(4294967295.0));
        assert_eq!(i.binary(BinOp::Shl, &n(1.0), &n(33.0)).unwrap(), n(2.0));
    }

    #[test]
    fn test_relational() {
        let mut i = interp();
        assert_eq!(i.binary(BinOp::Less, &s("a"), &s("b")).unwrap(), Value::Bool(true));
        assert_eq!(i.binary(BinOp::Less, &s("10"), &s("9")).unwrap(), Value::Bool(true));
        assert_eq!(i.binary(BinOp::Less, &s("10"), &Value::Number(9.0)).unwrap(), Value::Bool(false));
        let nan = Value::Number(f64::NAN);
        assert_eq!(i.binary(BinOp::LessEq, &nan, &nan).unwrap(), Value::Bool(false));
        assert_eq!(i.binary(BinOp::GreaterEq, &nan, &nan).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_power_edge_cases() {
        assert_eq!(power(2.0, 10.0), 1024.0);
        assert!(power(1.0, f64::NAN).is_nan());
        assert!(power(-1.0, f64::INFINITY).is_nan());
        assert_eq!(power(5.0, 0.0), 1.0);
    }

    #[test]
    fn test_to_string_of_objects() {
        let mut i = interp();
        let arr = i.realm().array(vec![Value::Number(1.0), Value::Undefined, s("x")]);
        assert_eq!(i.to_js_string(&arr).unwrap(), "1,,x");
        let obj = Value::Object(i.realm().plain_object());
        assert_eq!(i.to_js_string(&obj).unwrap(), "[object Object]");
        assert_eq!(i.to_property_key(&Value::Number(1.5)).unwrap(), "1.5");
    }
}
