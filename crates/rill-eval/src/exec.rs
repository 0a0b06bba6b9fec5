//! Statement execution.

use rill_types::ast::*;

use crate::env::Scope;
use crate::error::{EvalError, EvalResult};
use crate::interpreter::{Completion, Interpreter};
use crate::value::{self, Value};

impl Interpreter {
    /// Execute statements in order in the current scope. The result carries
    /// the value of the last statement that produced one.
    pub(crate) fn exec_statements(&mut self, statements: &[Stmt]) -> EvalResult<Completion> {
        let mut last = None;
        for stmt in statements {
            match self.exec_stmt(stmt)? {
                Completion::Normal(Some(value)) => last = Some(value),
                Completion::Normal(None) => {}
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal(last))
    }

    /// Execute a block in a fresh child scope.
    pub(crate) fn exec_block(&mut self, block: &Block) -> EvalResult<Completion> {
        let scope = Scope::block(&self.env);
        self.with_scope(scope, |interp| interp.exec_statements(&block.statements))
    }

    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<Completion> {
        match &stmt.kind {
            StmtKind::Expression(expr) => Ok(Completion::Normal(Some(self.eval_expr(expr)?))),
            StmtKind::VarDecl(decl) => {
                self.exec_var_decl(decl)?;
                Ok(Completion::undefined())
            }
            StmtKind::FunctionDecl { name, function } => {
                let value = self.make_function(function, self.env.clone());
                self.env
                    .declare(&name.name, value, DeclKind::Var)
                    .map_err(|e| self.scope_error(e))?;
                Ok(Completion::undefined())
            }
            StmtKind::Block(block) => self.exec_block(block),
            StmtKind::If {
                condition,
                consequent,
                alternate,
            } => {
                if self.eval_expr(condition)?.to_boolean() {
                    self.exec_stmt(consequent)
                } else if let Some(alternate) = alternate {
                    self.exec_stmt(alternate)
                } else {
                    Ok(Completion::undefined())
                }
            }
            StmtKind::While { condition, body } => self.exec_while(condition, body),
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                let scope = Scope::block(&self.env);
                self.with_scope(scope, |interp| {
                    interp.exec_for(init.as_deref(), condition.as_ref(), update.as_ref(), body)
                })
            }
            StmtKind::Switch {
                discriminant,
                cases,
            } => self.exec_switch(discriminant, cases),
            StmtKind::Break => Ok(Completion::Break),
            StmtKind::Continue => Ok(Completion::Continue),
            StmtKind::Throw(expr) => {
                let value = self.eval_expr(expr)?;
                Err(self.throw_value(value))
            }
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => self.exec_try(block, handler.as_ref(), finalizer.as_ref()),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Undefined,
                };
                Ok(Completion::Return(value))
            }
            StmtKind::Empty => Ok(Completion::Normal(None)),
        }
    }

    // ── Declarations ──────────────────────────────────────────────────────

    fn exec_var_decl(&mut self, decl: &VarDecl) -> EvalResult<()> {
        for declarator in &decl.declarators {
            let name = &declarator.name.name;
            match (decl.kind, &declarator.init) {
                (DeclKind::Var, Some(init)) => {
                    let value = self.eval_expr(init)?;
                    self.env.assign(name, value).map_err(|e| self.scope_error(e))?;
                }
                (DeclKind::Var, None) => {
                    if !self.env.var_scope_has(name) {
                        self.env
                            .declare(name, Value::Undefined, DeclKind::Var)
                            .map_err(|e| self.scope_error(e))?;
                    }
                }
                (DeclKind::Const, None) => {
                    return Err(self.throw_error("SyntaxError", "Missing initializer in const declaration"));
                }
                (kind, init) => {
                    let value = match init {
                        Some(init) => self.eval_expr(init)?,
                        None => Value::Undefined,
                    };
                    self.env.declare(name, value, kind).map_err(|e| self.scope_error(e))?;
                }
            }
        }
        Ok(())
    }

    // ── Loops ─────────────────────────────────────────────────────────────

    fn exec_while(&mut self, condition: &Expr, body: &Stmt) -> EvalResult<Completion> {
        while self.eval_expr(condition)?.to_boolean() {
            match self.exec_stmt(body)? {
                Completion::Break => break,
                Completion::Return(value) => return Ok(Completion::Return(value)),
                Completion::Continue | Completion::Normal(_) => {}
            }
        }
        Ok(Completion::undefined())
    }

    /// Runs inside the loop-control scope. With a `let`/`const` initializer
    /// every iteration gets its own copy of the loop variables, which is
    /// written back before the update clause runs.
    fn exec_for(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
    ) -> EvalResult<Completion> {
        let mut per_iteration: Vec<String> = Vec::new();
        if let Some(init) = init {
            if let StmtKind::VarDecl(decl) = &init.kind {
                if decl.kind != DeclKind::Var {
                    per_iteration = decl.declarators.iter().map(|d| d.name.name.clone()).collect();
                }
            }
            self.exec_stmt(init)?;
        }

        loop {
            if let Some(condition) = condition {
                if !self.eval_expr(condition)?.to_boolean() {
                    break;
                }
            }

            let completion = if per_iteration.is_empty() {
                self.exec_stmt(body)?
            } else {
                self.exec_iteration(&per_iteration, body)?
            };
            match completion {
                Completion::Break => break,
                Completion::Return(value) => return Ok(Completion::Return(value)),
                Completion::Continue | Completion::Normal(_) => {}
            }

            if let Some(update) = update {
                self.eval_expr(update)?;
            }
        }
        Ok(Completion::undefined())
    }

    fn exec_iteration(&mut self, names: &[String], body: &Stmt) -> EvalResult<Completion> {
        let loop_scope = self.env.clone();
        let iteration = Scope::block(&loop_scope);
        for name in names {
            if let Some(binding) = loop_scope.get_local(name) {
                iteration
                    .declare_local(name, binding.value, binding.kind)
                    .map_err(|e| self.scope_error(e))?;
            }
        }
        let completion = self.with_scope(iteration.clone(), |interp| interp.exec_stmt(body));
        for name in names {
            if let Some(binding) = iteration.get_local(name) {
                loop_scope.overwrite_local(name, binding.value);
            }
        }
        completion
    }

    // ── Switch ────────────────────────────────────────────────────────────

    /// Arms are scanned in order with strict equality; `default` matches
    /// when reached. Execution falls through until `break`.
    fn exec_switch(&mut self, discriminant: &Expr, cases: &[SwitchCase]) -> EvalResult<Completion> {
        let discriminant = self.eval_expr(discriminant)?;
        let scope = Scope::block(&self.env);
        self.with_scope(scope, |interp| {
            let mut matched = false;
            for case in cases {
                if !matched {
                    matched = match &case.test {
                        None => true,
                        Some(test) => value::strict_equals(&interp.eval_expr(test)?, &discriminant),
                    };
                }
                if matched {
                    match interp.exec_statements(&case.body)? {
                        Completion::Normal(_) => {}
                        Completion::Break => break,
                        abrupt => return Ok(abrupt),
                    }
                }
            }
            Ok(Completion::undefined())
        })
    }

    // ── Exceptions ────────────────────────────────────────────────────────

    /// `try`/`catch`/`finally`. A `finally` that completes normally restores
    /// whatever was pending; any abrupt `finally` (throw included) replaces it.
    fn exec_try(
        &mut self,
        block: &Block,
        handler: Option<&CatchClause>,
        finalizer: Option<&Block>,
    ) -> EvalResult<Completion> {
        let outcome = match (self.exec_block(block), handler) {
            (Err(EvalError::Thrown(thrown)), Some(handler)) => self.exec_catch(handler, thrown.value),
            (outcome, _) => outcome,
        };
        let Some(finalizer) = finalizer else {
            return outcome;
        };
        match self.exec_block(finalizer)? {
            Completion::Normal(_) => outcome,
            abrupt => Ok(abrupt),
        }
    }

    fn exec_catch(&mut self, handler: &CatchClause, thrown: Value) -> EvalResult<Completion> {
        let scope = Scope::block(&self.env);
        if let Some(param) = &handler.param {
            scope
                .declare_local(&param.name, thrown, DeclKind::Var)
                .map_err(|e| self.scope_error(e))?;
        }
        self.with_scope(scope, |interp| interp.exec_block(&handler.body))
    }
}
