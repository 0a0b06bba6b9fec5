//! Lexical scope chain.
//!
//! Each scope is heap-allocated and holds a strong link to its parent, so a
//! closure keeps its defining scope alive for as long as the closure lives.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use rill_types::ast::DeclKind;

use crate::value::Value;

/// Binding failures, each mapped onto a language-level error by the
/// interpreter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("{0} is not defined")]
    NotDefined(String),
    #[error("Identifier '{0}' has already been declared")]
    AlreadyDeclared(String),
    #[error("Assignment to constant variable.")]
    ConstAssignment,
}

impl ScopeError {
    /// Name of the error constructor this failure is reported as.
    pub fn error_name(&self) -> &'static str {
        match self {
            ScopeError::NotDefined(_) => "ReferenceError",
            ScopeError::AlreadyDeclared(_) => "SyntaxError",
            ScopeError::ConstAssignment => "TypeError",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub kind: DeclKind,
}

/// One level of the scope chain.
#[derive(Debug)]
pub struct Scope {
    bindings: RefCell<BTreeMap<String, Binding>>,
    parent: Option<Rc<Scope>>,
    /// Function bodies and the program root; `var` declarations land here.
    is_var_scope: bool,
    /// The receiver, set on function scopes.
    this_value: Option<Value>,
}

impl Scope {
    /// The program's root scope.
    pub fn global() -> Rc<Scope> {
        Rc::new(Scope {
            bindings: RefCell::new(BTreeMap::new()),
            parent: None,
            is_var_scope: true,
            this_value: None,
        })
    }

    /// A block scope nested in `parent`.
    pub fn block(parent: &Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            bindings: RefCell::new(BTreeMap::new()),
            parent: Some(parent.clone()),
            is_var_scope: false,
            this_value: None,
        })
    }

    /// A function-body scope with its own receiver.
    pub fn function(parent: &Rc<Scope>, this_value: Value) -> Rc<Scope> {
        Rc::new(Scope {
            bindings: RefCell::new(BTreeMap::new()),
            parent: Some(parent.clone()),
            is_var_scope: true,
            this_value: Some(this_value),
        })
    }

    /// Nearest enclosing var-scope boundary (possibly `self`).
    fn var_scope(&self) -> &Scope {
        let mut scope = self;
        while !scope.is_var_scope {
            match &scope.parent {
                Some(parent) => scope = parent,
                None => break,
            }
        }
        scope
    }

    fn root(&self) -> &Scope {
        let mut scope = self;
        while let Some(parent) = &scope.parent {
            scope = parent;
        }
        scope
    }

    /// Declare a binding. `var` targets the nearest var scope; `let` and
    /// `const` target this scope. Redeclaration is only legal var-over-var.
    pub fn declare(&self, name: &str, value: Value, kind: DeclKind) -> Result<(), ScopeError> {
        let target = match kind {
            DeclKind::Var => self.var_scope(),
            DeclKind::Let | DeclKind::Const => self,
        };
        target.declare_local(name, value, kind)
    }

    /// Declare a binding in exactly this scope.
    pub fn declare_local(&self, name: &str, value: Value, kind: DeclKind) -> Result<(), ScopeError> {
        let mut bindings = self.bindings.borrow_mut();
        if let Some(existing) = bindings.get(name) {
            if existing.kind != DeclKind::Var || kind != DeclKind::Var {
                return Err(ScopeError::AlreadyDeclared(name.to_string()));
            }
        }
        bindings.insert(name.to_string(), Binding { value, kind });
        Ok(())
    }

    /// Bind a `var` in the nearest var scope, replacing any existing binding.
    pub fn set_var(&self, name: &str, value: Value) {
        self.var_scope().bindings.borrow_mut().insert(
            name.to_string(),
            Binding {
                value,
                kind: DeclKind::Var,
            },
        );
    }

    /// Whether the nearest var scope already binds `name`.
    pub fn var_scope_has(&self, name: &str) -> bool {
        self.var_scope().bindings.borrow().contains_key(name)
    }

    /// Assign to the innermost binding of `name`. A name bound nowhere in the
    /// chain becomes a new global `var`.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), ScopeError> {
        let mut scope = self;
        loop {
            if let Some(binding) = scope.bindings.borrow_mut().get_mut(name) {
                if binding.kind == DeclKind::Const {
                    return Err(ScopeError::ConstAssignment);
                }
                binding.value = value;
                return Ok(());
            }
            match &scope.parent {
                Some(parent) => scope = parent,
                None => break,
            }
        }
        self.root().set_var(name, value);
        Ok(())
    }

    /// Look up `name` through the chain.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut scope = self;
        loop {
            if let Some(binding) = scope.bindings.borrow().get(name) {
                return Some(binding.value.clone());
            }
            scope = scope.parent.as_deref()?;
        }
    }

    /// Like [`lookup`](Self::lookup), failing with a reference error.
    pub fn get(&self, name: &str) -> Result<Value, ScopeError> {
        self.lookup(name)
            .ok_or_else(|| ScopeError::NotDefined(name.to_string()))
    }

    pub fn get_local(&self, name: &str) -> Option<Binding> {
        self.bindings.borrow().get(name).cloned()
    }

    /// Replace the value of a binding in this scope, ignoring its kind.
    pub fn overwrite_local(&self, name: &str, value: Value) {
        if let Some(binding) = self.bindings.borrow_mut().get_mut(name) {
            binding.value = value;
        }
    }

    /// `this` of the innermost function scope; `undefined` at the top level.
    pub fn this_value(&self) -> Value {
        let mut scope = self;
        loop {
            if let Some(this) = &scope.this_value {
                return this.clone();
            }
            match &scope.parent {
                Some(parent) => scope = parent,
                None => return Value::Undefined,
            }
        }
    }

    /// Names bound directly in this scope.
    pub fn names(&self) -> Vec<String> {
        self.bindings.borrow().keys().cloned().collect()
    }
}
