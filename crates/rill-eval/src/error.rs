//! Runtime error types for the Rill interpreter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{ObjectKind, Value};

/// One entry of the diagnostic call stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Function name, `anonymous`, or `<Name> (constructor)` for `new`.
    pub name: String,
    /// Call-site position.
    pub line: u32,
    pub column: u32,
}

impl StackFrame {
    pub fn new(name: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            name: name.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {} [{}:{}]", self.name, self.line, self.column)
    }
}

/// A value thrown through the language's `throw`/`catch` machinery.
#[derive(Debug, Clone)]
pub struct Thrown {
    pub value: Value,
    /// Call stack at the throw point, innermost frame first.
    pub stack: Vec<StackFrame>,
}

impl Thrown {
    /// The thrown value as a diagnostic string, without running user code.
    pub fn message(&self) -> String {
        match &self.value {
            Value::String(s) => s.to_string(),
            Value::Object(obj) if matches!(obj.kind(), ObjectKind::Error) => obj.error_summary(),
            other => other.to_string(),
        }
    }

    /// The `name` property when the thrown value is an error object.
    pub fn error_name(&self) -> Option<String> {
        match &self.value {
            Value::Object(obj) if matches!(obj.kind(), ObjectKind::Error) => {
                obj.get("name").primitive_string()
            }
            _ => None,
        }
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())?;
        for frame in &self.stack {
            write!(f, "\n    {frame}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Thrown {}

/// Evaluation error: a language-level exception or a broken engine invariant.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EvalError {
    /// Catchable by `try`/`catch`.
    #[error("{0}")]
    Thrown(#[from] Thrown),
    /// A `break`, `continue` or `return` escaped every construct that could
    /// consume it. Never visible to user code.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EvalError {
    pub fn thrown(&self) -> Option<&Thrown> {
        match self {
            EvalError::Thrown(thrown) => Some(thrown),
            EvalError::Internal(_) => None,
        }
    }
}

/// Result alias for interpreter operations.
pub type EvalResult<T> = Result<T, EvalError>;
