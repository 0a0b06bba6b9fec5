//! Expression evaluation.

use std::rc::Rc;

use rill_types::ast::*;

use crate::env::Scope;
use crate::error::EvalResult;
use crate::interpreter::Interpreter;
use crate::value::{array_index, Object, ObjectKind, Value};

/// A resolved assignment target.
enum Place {
    Name(String),
    Property { base: Value, key: String },
}

impl Interpreter {
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::String(s) => Ok(Value::string(s.as_str())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item)?);
                }
                Ok(self.realm().array(values))
            }
            ExprKind::Object(properties) => {
                let object = self.realm().plain_object();
                for property in properties {
                    let value = self.eval_expr(&property.value)?;
                    object.define(&property.key, value);
                }
                Ok(Value::Object(object))
            }
            ExprKind::Function(function) => self.eval_function_expr(function),

            ExprKind::Identifier(name) => self.lookup(name),
            ExprKind::This => Ok(self.env.this_value()),

            ExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                self.binary(*op, &left, &right)
            }
            ExprKind::Logical { op, left, right } => {
                let left = self.eval_expr(left)?;
                let short_circuit = match op {
                    LogicalOp::And => !left.to_boolean(),
                    LogicalOp::Or => left.to_boolean(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.eval_expr(right)
                }
            }
            ExprKind::Coalesce { left, right } => {
                let left = self.eval_expr(left)?;
                if left.is_nullish() {
                    self.eval_expr(right)
                } else {
                    Ok(left)
                }
            }
            ExprKind::Unary { op, operand } => self.eval_unary(*op, operand),
            ExprKind::Update { op, prefix, target } => {
                let place = self.resolve_place(target)?;
                let old = self.read_place(&place)?;
                let old = self.to_number(&old)?;
                let new = match op {
                    UpdateOp::Increment => old + 1.0,
                    UpdateOp::Decrement => old - 1.0,
                };
                self.write_place(place, Value::Number(new))?;
                Ok(Value::Number(if *prefix { new } else { old }))
            }
            ExprKind::Assign { target, value } => {
                let place = self.resolve_place(target)?;
                let value = self.eval_expr(value)?;
                self.write_place(place, value.clone())?;
                Ok(value)
            }
            ExprKind::CompoundAssign { op, target, value } => {
                let place = self.resolve_place(target)?;
                let current = self.read_place(&place)?;
                let rhs = self.eval_expr(value)?;
                let result = self.binary(*op, &current, &rhs)?;
                self.write_place(place, result.clone())?;
                Ok(result)
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval_expr(test)?.to_boolean() {
                    self.eval_expr(consequent)
                } else {
                    self.eval_expr(alternate)
                }
            }

            ExprKind::Member { object, property } => {
                let (base, key) = self.member_base(object, property, "read")?;
                Ok(self.get_property(&base, &key))
            }
            ExprKind::Call { callee, args } => self.eval_call(expr, callee, args),
            ExprKind::New { callee, args } => self.eval_new(expr, callee, args),
        }
    }

    fn lookup(&self, name: &str) -> EvalResult<Value> {
        self.env.get(name).map_err(|e| self.scope_error(e))
    }

    /// A named function expression sees its own name in a scope of its own.
    fn eval_function_expr(&mut self, function: &Rc<Function>) -> EvalResult<Value> {
        let Some(name) = &function.name else {
            return Ok(self.make_function(function, self.env.clone()));
        };
        let scope = Scope::block(&self.env);
        let value = self.make_function(function, scope.clone());
        scope
            .declare_local(&name.name, value.clone(), DeclKind::Var)
            .map_err(|e| self.scope_error(e))?;
        Ok(value)
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> EvalResult<Value> {
        if op == UnaryOp::Typeof {
            // An unbound name is "undefined" here rather than an error.
            if let ExprKind::Identifier(name) = &operand.kind {
                let value = self.env.lookup(name).unwrap_or_default();
                return Ok(Value::string(value.type_of()));
            }
            let value = self.eval_expr(operand)?;
            return Ok(Value::string(value.type_of()));
        }
        let value = self.eval_expr(operand)?;
        let result = match op {
            UnaryOp::Not => Value::Bool(!value.to_boolean()),
            UnaryOp::Neg => Value::Number(-self.to_number(&value)?),
            UnaryOp::Plus => Value::Number(self.to_number(&value)?),
            UnaryOp::BitNot => Value::Number(f64::from(!crate::value::to_int32(self.to_number(&value)?))),
            UnaryOp::Typeof => Value::string(value.type_of()),
        };
        Ok(result)
    }

    // ── Properties ────────────────────────────────────────────────────────

    /// Read a property of any value. Primitives consult their prototype;
    /// strings also expose `length` and indexed UTF-16 units.
    pub fn get_property(&self, base: &Value, key: &str) -> Value {
        match base {
            Value::Object(object) => object.get(key),
            Value::String(s) => {
                if key == "length" {
                    return Value::Number(s.encode_utf16().count() as f64);
                }
                if let Some(index) = array_index(key) {
                    return match s.encode_utf16().nth(index) {
                        Some(unit) => Value::string(String::from_utf16_lossy(&[unit])),
                        None => Value::Undefined,
                    };
                }
                self.realm().string_prototype.get(key)
            }
            Value::Number(_) => self.realm().number_prototype.get(key),
            Value::Bool(_) => self.realm().boolean_prototype.get(key),
            Value::Undefined | Value::Null => Value::Undefined,
        }
    }

    /// Write a property. Writes to primitives are silently dropped; an
    /// invalid array length throws a `RangeError`.
    pub fn set_property(&mut self, base: &Value, key: &str, value: Value) -> EvalResult<()> {
        let Value::Object(object) = base else {
            return Ok(());
        };
        let value = if key == "length" && object.elements().is_some() && matches!(value, Value::Object(_)) {
            Value::Number(self.to_number(&value)?)
        } else {
            value
        };
        object
            .set(key, value)
            .map_err(|e| self.throw_error("RangeError", e.to_string()))
    }

    fn property_key(&mut self, property: &Property) -> EvalResult<String> {
        match property {
            Property::Named(ident) => Ok(ident.name.clone()),
            Property::Computed(expr) => {
                let key = self.eval_expr(expr)?;
                self.to_property_key(&key)
            }
        }
    }

    /// Evaluate the base and key of a member expression, rejecting a
    /// `null`/`undefined` base with a `TypeError` naming the base expression.
    fn member_base(&mut self, object: &Expr, property: &Property, action: &str) -> EvalResult<(Value, String)> {
        let base = self.eval_expr(object)?;
        let key = self.property_key(property)?;
        if base.is_nullish() {
            return Err(self.throw_error(
                "TypeError",
                format!(
                    "Cannot {action} property '{key}' of {base} (at '{}')",
                    object.source_text()
                ),
            ));
        }
        Ok((base, key))
    }

    // ── Assignment Targets ────────────────────────────────────────────────

    fn resolve_place(&mut self, target: &AssignTarget) -> EvalResult<Place> {
        match target {
            AssignTarget::Identifier(ident) => Ok(Place::Name(ident.name.clone())),
            AssignTarget::Member { object, property } => {
                let (base, key) = self.member_base(object, property, "set")?;
                Ok(Place::Property { base, key })
            }
        }
    }

    fn read_place(&mut self, place: &Place) -> EvalResult<Value> {
        match place {
            Place::Name(name) => self.lookup(name),
            Place::Property { base, key } => Ok(self.get_property(base, key)),
        }
    }

    fn write_place(&mut self, place: Place, value: Value) -> EvalResult<()> {
        match place {
            Place::Name(name) => self.env.assign(&name, value).map_err(|e| self.scope_error(e)),
            Place::Property { base, key } => self.set_property(&base, &key, value),
        }
    }

    // ── Calls ─────────────────────────────────────────────────────────────

    fn eval_args(&mut self, args: &[Expr]) -> EvalResult<Vec<Value>> {
        args.iter().map(|arg| self.eval_expr(arg)).collect()
    }

    /// A call through a member expression binds `this` to the base object.
    fn eval_call(&mut self, call: &Expr, callee: &Expr, args: &[Expr]) -> EvalResult<Value> {
        let (function, this) = match &callee.kind {
            ExprKind::Member { object, property } => {
                let (base, key) = self.member_base(object, property, "read")?;
                (self.get_property(&base, &key), base)
            }
            _ => (self.eval_expr(callee)?, Value::Undefined),
        };
        let args = self.eval_args(args)?;
        let Some(function) = function.as_callable() else {
            return Err(self.throw_error(
                "TypeError",
                format!("{} is not a function", callee.source_text()),
            ));
        };
        let name = function.function_name().unwrap_or("anonymous").to_string();
        let frame = self.frame_at(name, call.span);
        self.invoke(&function, this, args, frame)
    }

    /// `new`: interpreted constructors get a fresh object linked to their
    /// `prototype` property as `this`, and yield it unless they return an
    /// object. Natives are called with `this` undefined.
    fn eval_new(&mut self, new: &Expr, callee: &Expr, args: &[Expr]) -> EvalResult<Value> {
        let constructor = self.eval_expr(callee)?;
        let args = self.eval_args(args)?;
        let Some(constructor) = constructor.as_callable() else {
            return Err(self.throw_error(
                "TypeError",
                format!("{} is not a constructor", callee.source_text()),
            ));
        };
        let name = format!("{} (constructor)", constructor.function_name().unwrap_or("anonymous"));
        let frame = self.frame_at(name, new.span);

        if !matches!(constructor.kind(), ObjectKind::Function(_)) {
            return self.invoke(&constructor, Value::Undefined, args, frame);
        }
        let prototype = match constructor.get("prototype") {
            Value::Object(prototype) => prototype,
            _ => self.realm().object_prototype.clone(),
        };
        let instance = Value::Object(Rc::new(Object::new(ObjectKind::Plain, Some(prototype))));
        let result = self.invoke(&constructor, instance.clone(), args, frame)?;
        Ok(if result.is_object() { result } else { instance })
    }
}
