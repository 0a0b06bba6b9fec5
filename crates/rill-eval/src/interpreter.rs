//! Interpreter state, the public entry points, hoisting and calls.

use std::rc::Rc;

use rill_types::ast::{Block, DeclKind, Function, Stmt, StmtKind};
use rill_types::Span;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::builtins;
use crate::env::{Scope, ScopeError};
use crate::error::{EvalError, EvalResult, StackFrame, Thrown};
use crate::realm::Realm;
use crate::value::{Closure, Object, ObjectKind, Value};

/// Interpreter construction options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterOptions {
    /// Bind the built-in library globals.
    pub prelude: bool,
    /// Calls nested deeper than this throw a `RangeError`. Unbounded when `None`.
    pub max_call_depth: Option<usize>,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            prelude: true,
            max_call_depth: None,
        }
    }
}

/// How a statement finished.
#[derive(Debug, Clone)]
pub enum Completion {
    /// Fell through; carries the statement's value, if it produces one.
    Normal(Option<Value>),
    Break,
    Continue,
    Return(Value),
}

impl Completion {
    pub(crate) fn undefined() -> Self {
        Completion::Normal(Some(Value::Undefined))
    }
}

/// The tree-walking interpreter.
///
/// Holds the persistent global scope, so successive [`interpret`] calls
/// share bindings.
///
/// [`interpret`]: Interpreter::interpret
pub struct Interpreter {
    realm: Rc<Realm>,
    global: Rc<Scope>,
    /// The scope statements currently execute in.
    pub(crate) env: Rc<Scope>,
    call_stack: Vec<StackFrame>,
    /// Arrays currently being joined; a nested visit renders as `""`.
    pub(crate) join_stack: Vec<Rc<Object>>,
    options: InterpreterOptions,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_options(InterpreterOptions::default())
    }

    pub fn with_options(options: InterpreterOptions) -> Self {
        let global = Scope::global();
        builtins::install_constants(&global);
        let interp = Self {
            realm: Rc::new(Realm::new()),
            env: global.clone(),
            global,
            call_stack: Vec::new(),
            join_stack: Vec::new(),
            options,
        };
        if interp.options.prelude {
            builtins::install_globals(&interp);
        }
        interp
    }

    /// Run a program and return the value of the last executed statement.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn interpret(&mut self, program: &Block) -> EvalResult<Value> {
        self.env = self.global.clone();
        self.call_stack.clear();
        self.join_stack.clear();
        self.hoist(&program.statements)?;
        let completion = self.exec_statements(&program.statements)?;
        let value = self.expect_normal(completion, "program")?;
        debug!(statements = program.statements.len(), "interpret complete");
        Ok(value)
    }

    // ── Host Surface ──────────────────────────────────────────────────────

    pub fn realm(&self) -> &Rc<Realm> {
        &self.realm
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.options
    }

    pub(crate) fn global_scope(&self) -> &Rc<Scope> {
        &self.global
    }

    /// Read `name` from the current scope chain; `undefined` when unbound.
    pub fn get_value(&self, name: &str) -> Value {
        self.env.lookup(name).unwrap_or_default()
    }

    /// Read a global binding, failing with a `ReferenceError`.
    pub fn get_global_value(&self, name: &str) -> EvalResult<Value> {
        self.global.get(name).map_err(|e| self.scope_error(e))
    }

    /// Names bound in the global scope, sorted.
    pub fn global_names(&self) -> Vec<String> {
        self.global.names()
    }

    /// Active frames, outermost first.
    pub fn call_stack(&self) -> &[StackFrame] {
        &self.call_stack
    }

    /// Bind a host function as a global `var`, replacing any existing binding.
    pub fn define_native(
        &mut self,
        name: &str,
        call: impl Fn(&mut Interpreter, Value, Vec<Value>) -> EvalResult<Value> + 'static,
    ) {
        let function = builtins::native(&self.realm, name, call);
        self.global.set_var(name, Value::Object(function));
    }

    /// Call any callable value. Used by natives that take callbacks.
    pub fn call_function(&mut self, callee: &Value, this: Value, args: Vec<Value>) -> EvalResult<Value> {
        let Some(function) = callee.as_callable() else {
            return Err(self.throw_error("TypeError", format!("{callee} is not a function")));
        };
        let (line, column) = self
            .call_stack
            .last()
            .map_or((0, 0), |frame| (frame.line, frame.column));
        let name = function.function_name().unwrap_or("anonymous").to_string();
        self.invoke(&function, this, args, StackFrame::new(name, line, column))
    }

    // ── Errors ────────────────────────────────────────────────────────────

    /// Throw `value` with a snapshot of the current call stack.
    pub fn throw_value(&self, value: Value) -> EvalError {
        EvalError::Thrown(Thrown {
            value,
            stack: self.call_stack.iter().rev().cloned().collect(),
        })
    }

    /// Throw a new error object, e.g. `throw_error("TypeError", "...")`.
    pub fn throw_error(&self, name: &str, message: impl Into<String>) -> EvalError {
        self.throw_value(self.realm.error(name, message))
    }

    pub(crate) fn scope_error(&self, error: ScopeError) -> EvalError {
        self.throw_error(error.error_name(), error.to_string())
    }

    /// Unwrap a fall-through completion; `break`, `continue` and `return`
    /// reaching `boundary` are engine invariant violations.
    pub(crate) fn expect_normal(&self, completion: Completion, boundary: &str) -> EvalResult<Value> {
        let signal = match completion {
            Completion::Normal(value) => return Ok(value.unwrap_or_default()),
            Completion::Break => "break",
            Completion::Continue => "continue",
            Completion::Return(_) => "return",
        };
        Err(EvalError::Internal(format!("illegal {signal} escaped the {boundary}")))
    }

    // ── Scopes ────────────────────────────────────────────────────────────

    /// Run `f` with `scope` as the current scope, restoring the previous one
    /// afterwards on every path.
    pub(crate) fn with_scope<T>(&mut self, scope: Rc<Scope>, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.env, scope);
        let result = f(self);
        self.env = saved;
        result
    }

    // ── Hoisting ──────────────────────────────────────────────────────────

    /// Pre-bind function declarations and `var` names of one function body
    /// (or the program) in the current var scope. Does not descend into
    /// nested functions.
    pub(crate) fn hoist(&mut self, statements: &[Stmt]) -> EvalResult<()> {
        statements.iter().try_for_each(|stmt| self.hoist_stmt(stmt))
    }

    fn hoist_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match &stmt.kind {
            StmtKind::FunctionDecl { name, function } => {
                trace!(name = %name.name, "hoist function");
                let value = self.make_function(function, self.env.clone());
                self.env
                    .declare(&name.name, value, DeclKind::Var)
                    .map_err(|e| self.scope_error(e))
            }
            StmtKind::VarDecl(decl) if decl.kind == DeclKind::Var => {
                for declarator in &decl.declarators {
                    let name = &declarator.name.name;
                    if !self.env.var_scope_has(name) {
                        trace!(name = %name, "hoist var");
                        self.env
                            .declare(name, Value::Undefined, DeclKind::Var)
                            .map_err(|e| self.scope_error(e))?;
                    }
                }
                Ok(())
            }
            StmtKind::Block(block) => self.hoist(&block.statements),
            StmtKind::If {
                consequent,
                alternate,
                ..
            } => {
                self.hoist_stmt(consequent)?;
                match alternate {
                    Some(alternate) => self.hoist_stmt(alternate),
                    None => Ok(()),
                }
            }
            StmtKind::While { body, .. } => self.hoist_stmt(body),
            StmtKind::For { init, body, .. } => {
                if let Some(init) = init {
                    self.hoist_stmt(init)?;
                }
                self.hoist_stmt(body)
            }
            StmtKind::Switch { cases, .. } => cases.iter().try_for_each(|case| self.hoist(&case.body)),
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.hoist(&block.statements)?;
                if let Some(handler) = handler {
                    self.hoist(&handler.body.statements)?;
                }
                match finalizer {
                    Some(finalizer) => self.hoist(&finalizer.statements),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    // ── Functions & Calls ─────────────────────────────────────────────────

    /// Create a function object closing over `scope`.
    pub(crate) fn make_function(&self, function: &Rc<Function>, scope: Rc<Scope>) -> Value {
        let closure = Closure {
            function: function.clone(),
            scope,
        };
        let object = Object::new(
            ObjectKind::Function(closure),
            Some(self.realm.function_prototype.clone()),
        );
        object.define("prototype", Value::Object(self.realm.plain_object()));
        Value::Object(Rc::new(object))
    }

    pub(crate) fn frame_at(&self, name: impl Into<String>, span: Span) -> StackFrame {
        StackFrame::new(name, span.line, span.column)
    }

    /// Enter `function` with a new frame. The frame is popped on every exit
    /// path, including a throw.
    pub(crate) fn invoke(
        &mut self,
        function: &Rc<Object>,
        this: Value,
        args: Vec<Value>,
        frame: StackFrame,
    ) -> EvalResult<Value> {
        if let Some(limit) = self.options.max_call_depth {
            if self.call_stack.len() >= limit {
                return Err(self.throw_error("RangeError", "Maximum call stack size exceeded"));
            }
        }
        trace!(name = %frame.name, depth = self.call_stack.len() + 1, "call");
        self.call_stack.push(frame);
        let result = match function.kind() {
            ObjectKind::Function(closure) => self.call_closure(closure, this, args),
            ObjectKind::Native(native) => {
                let call = native.call.clone();
                call(self, this, args)
            }
            _ => Err(EvalError::Internal("invoked a non-callable object".to_string())),
        };
        self.call_stack.pop();
        result
    }

    fn call_closure(&mut self, closure: &Closure, this: Value, args: Vec<Value>) -> EvalResult<Value> {
        let scope = Scope::function(&closure.scope, this);
        let mut args = args.into_iter();
        for param in &closure.function.params {
            scope
                .declare_local(&param.name, args.next().unwrap_or_default(), DeclKind::Var)
                .map_err(|e| self.scope_error(e))?;
        }
        let function = closure.function.clone();
        let completion = self.with_scope(scope, |interp| {
            interp.hoist(&function.body.statements)?;
            interp.exec_statements(&function.body.statements)
        })?;
        match completion {
            Completion::Return(value) => Ok(value),
            Completion::Normal(_) => Ok(Value::Undefined),
            other => self.expect_normal(other, "function body"),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_always_bound() {
        let interp = Interpreter::with_options(InterpreterOptions {
            prelude: false,
            max_call_depth: None,
        });
        assert_eq!(interp.global_names(), vec!["Infinity", "NaN", "undefined"]);
        assert!(matches!(interp.get_value("NaN"), Value::Number(n) if n.is_nan()));
        assert_eq!(interp.get_value("Object"), Value::Undefined);
    }

    #[test]
    fn test_prelude_binds_constructors() {
        let interp = Interpreter::new();
        for name in ["Object", "Array", "String", "Number", "Boolean", "Error", "TypeError"] {
            assert!(interp.get_value(name).as_callable().is_some(), "{name}");
        }
    }

    #[test]
    fn test_get_global_value_missing_is_reference_error() {
        let interp = Interpreter::new();
        let err = interp.get_global_value("nope").unwrap_err();
        let thrown = err.thrown().unwrap();
        assert_eq!(thrown.error_name().as_deref(), Some("ReferenceError"));
        assert_eq!(thrown.message(), "ReferenceError: nope is not defined");
    }

    #[test]
    fn test_define_native_and_call() {
        let mut interp = Interpreter::new();
        interp.define_native("double", |interp, _this, args| {
            let n = interp.to_number(&args.first().cloned().unwrap_or_default())?;
            Ok(Value::Number(n * 2.0))
        });
        let double = interp.get_value("double");
        let result = interp
            .call_function(&double, Value::Undefined, vec![Value::Number(21.0)])
            .unwrap();
        assert_eq!(result, Value::Number(42.0));
        assert!(interp.call_stack().is_empty());
    }

    #[test]
    fn test_call_non_function_is_type_error() {
        let mut interp = Interpreter::new();
        let err = interp
            .call_function(&Value::Number(1.0), Value::Undefined, vec![])
            .unwrap_err();
        assert_eq!(err.thrown().unwrap().message(), "TypeError: 1 is not a function");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: InterpreterOptions = serde_json::from_str(r#"{"max_call_depth": 10}"#).unwrap();
        assert!(options.prelude);
        assert_eq!(options.max_call_depth, Some(10));
    }
}
