//! Rill tree-walking interpreter.
//!
//! Executes a parsed program directly from the AST: value model, scope
//! chain, hoisting, control flow, exceptions, and a small built-in prelude
//! attached through native functions.

mod builtins;
mod coerce;
pub mod env;
pub mod error;
mod eval_expr;
mod exec;
mod interpreter;
pub mod realm;
pub mod value;

pub use error::{EvalError, EvalResult, StackFrame, Thrown};
pub use interpreter::{Completion, Interpreter, InterpreterOptions};
pub use realm::Realm;
pub use value::{NativeFn, Object, ObjectKind, Value};
