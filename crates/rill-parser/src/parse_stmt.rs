//! Statement parsing.
//!
//! Keyword-led statements dispatch to a dedicated parser; anything else is
//! an expression statement. Semicolons are optional everywhere.

use std::rc::Rc;

use rill_types::ast::*;
use rill_types::{ErrorCode, TokenKind};

use crate::parser::{PResult, Parser};

impl<'src> Parser<'src> {
    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> PResult<Stmt> {
        match self.peek_kind() {
            TokenKind::Var | TokenKind::Let | TokenKind::Const => self.parse_var_statement(),
            TokenKind::Function => self.parse_function_declaration(),
            TokenKind::LBrace => {
                let start = self.mark();
                let block = self.parse_block()?;
                Ok(Stmt::new(
                    StmtKind::Block(block),
                    self.span_from(start),
                    self.slice_from(start),
                ))
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Break => self.parse_jump(StmtKind::Break),
            TokenKind::Continue => self.parse_jump(StmtKind::Continue),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Semicolon => {
                let start = self.mark();
                self.advance();
                Ok(Stmt::new(StmtKind::Empty, self.span_from(start), self.slice_from(start)))
            }
            _ => {
                let start = self.mark();
                let expr = self.parse_expression()?;
                self.eat_semicolon();
                Ok(Stmt::new(
                    StmtKind::Expression(expr),
                    self.span_from(start),
                    self.slice_from(start),
                ))
            }
        }
    }

    /// Parse a block of statements: `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> PResult<Block> {
        let start = self.mark();
        self.expect(&TokenKind::LBrace, "Expected '{' to start block")?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            statements.push(self.parse_statement()?);
        }
        self.expect(&TokenKind::RBrace, "Expected '}' after block")?;
        Ok(Block {
            statements,
            span: self.span_from(start),
            tokens: self.slice_from(start),
        })
    }

    // ── Declarations ──────────────────────────────────────────────────────────

    /// `var|let|const name [= init] {, name [= init]} [;]`
    fn parse_var_statement(&mut self) -> PResult<Stmt> {
        let start = self.mark();
        let decl = self.parse_var_decl()?;
        self.eat_semicolon();
        Ok(Stmt::new(
            StmtKind::VarDecl(decl),
            self.span_from(start),
            self.slice_from(start),
        ))
    }

    /// The declaration itself, without the trailing semicolon (shared with
    /// `for` initializers).
    fn parse_var_decl(&mut self) -> PResult<VarDecl> {
        let kind = match self.advance().kind {
            TokenKind::Let => DeclKind::Let,
            TokenKind::Const => DeclKind::Const,
            _ => DeclKind::Var,
        };
        let mut declarators = Vec::new();
        loop {
            let name = self.expect_identifier("Expected identifier")?;
            let init = if self.eat(&TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarators.push(Declarator { name, init });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(VarDecl { kind, declarators })
    }

    /// `function name(params) { body }`
    fn parse_function_declaration(&mut self) -> PResult<Stmt> {
        let start = self.mark();
        self.advance(); // eat `function`
        let name = self.expect_identifier("Expected function name")?;
        let (params, body) = self.parse_function_rest()?;
        let function = Rc::new(Function {
            name: Some(name.clone()),
            params,
            body,
        });
        Ok(Stmt::new(
            StmtKind::FunctionDecl { name, function },
            self.span_from(start),
            self.slice_from(start),
        ))
    }

    /// `(a, b, c) { body }`, shared by declarations and function expressions.
    pub(crate) fn parse_function_rest(&mut self) -> PResult<(Vec<Ident>, Block)> {
        self.expect(&TokenKind::LParen, "Expected '(' after function name")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier("Expected parameter name")?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "Expected ')' after parameters")?;
        let body = self.parse_block()?;
        Ok((params, body))
    }

    // ── Control Flow ──────────────────────────────────────────────────────────

    /// `if (cond) stmt [else stmt]`
    fn parse_if(&mut self) -> PResult<Stmt> {
        let start = self.mark();
        self.advance(); // eat `if`
        self.expect(&TokenKind::LParen, "Expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "Expected ')' after if condition")?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::new(
            StmtKind::If {
                condition,
                consequent,
                alternate,
            },
            self.span_from(start),
            self.slice_from(start),
        ))
    }

    /// `while (cond) stmt`
    fn parse_while(&mut self) -> PResult<Stmt> {
        let start = self.mark();
        self.advance(); // eat `while`
        self.expect(&TokenKind::LParen, "Expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "Expected ')' after while condition")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::new(
            StmtKind::While { condition, body },
            self.span_from(start),
            self.slice_from(start),
        ))
    }

    /// `for ([init]; [cond]; [update]) stmt`
    fn parse_for(&mut self) -> PResult<Stmt> {
        let start = self.mark();
        self.advance(); // eat `for`
        self.expect(&TokenKind::LParen, "Expected '(' after 'for'")?;

        let init = if self.eat(&TokenKind::Semicolon) {
            None
        } else {
            let init_start = self.mark();
            let kind = match self.peek_kind() {
                TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                    StmtKind::VarDecl(self.parse_var_decl()?)
                }
                _ => StmtKind::Expression(self.parse_expression()?),
            };
            let init = Stmt::new(kind, self.span_from(init_start), self.slice_from(init_start));
            self.expect(&TokenKind::Semicolon, "Expected ';' after for loop init")?;
            Some(Box::new(init))
        };

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::Semicolon, "Expected ';' after for loop condition")?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::RParen, "Expected ')' after for clauses")?;

        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::new(
            StmtKind::For {
                init,
                condition,
                update,
                body,
            },
            self.span_from(start),
            self.slice_from(start),
        ))
    }

    /// `switch (expr) { case a: ... default: ... }`
    fn parse_switch(&mut self) -> PResult<Stmt> {
        let start = self.mark();
        self.advance(); // eat `switch`
        self.expect(&TokenKind::LParen, "Expected '(' after 'switch'")?;
        let discriminant = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "Expected ')' after switch discriminant")?;
        self.expect(&TokenKind::LBrace, "Expected '{' before switch body")?;

        let mut cases = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let test = if self.eat(&TokenKind::Case) {
                Some(self.parse_expression()?)
            } else if self.eat(&TokenKind::Default) {
                None
            } else {
                return Err(self.error_at_current(
                    ErrorCode::INVALID_SWITCH_CASE,
                    "Expected 'case' or 'default' in switch statement",
                ));
            };
            self.expect(&TokenKind::Colon, "Expected ':' after case")?;

            let mut body = Vec::new();
            while !matches!(
                self.peek_kind(),
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
            ) {
                body.push(self.parse_statement()?);
            }
            cases.push(SwitchCase { test, body });
        }
        self.expect(&TokenKind::RBrace, "Expected '}' after switch body")?;

        Ok(Stmt::new(
            StmtKind::Switch {
                discriminant,
                cases,
            },
            self.span_from(start),
            self.slice_from(start),
        ))
    }

    /// `break;` / `continue;`
    fn parse_jump(&mut self, kind: StmtKind) -> PResult<Stmt> {
        let start = self.mark();
        self.advance();
        self.eat_semicolon();
        Ok(Stmt::new(kind, self.span_from(start), self.slice_from(start)))
    }

    /// `throw expr;`
    fn parse_throw(&mut self) -> PResult<Stmt> {
        let start = self.mark();
        self.advance(); // eat `throw`
        let argument = self.parse_expression()?;
        self.eat_semicolon();
        Ok(Stmt::new(
            StmtKind::Throw(argument),
            self.span_from(start),
            self.slice_from(start),
        ))
    }

    /// `try { } [catch [(param)] { }] [finally { }]`
    fn parse_try(&mut self) -> PResult<Stmt> {
        let start = self.mark();
        self.advance(); // eat `try`
        let block = self.parse_block()?;

        let handler = if self.eat(&TokenKind::Catch) {
            let mut param = None;
            if self.eat(&TokenKind::LParen) {
                if !self.check(&TokenKind::RParen) {
                    param = Some(self.expect_identifier("Expected catch parameter name")?);
                }
                self.expect(&TokenKind::RParen, "Expected ')' after catch parameter")?;
            }
            let body = self.parse_block()?;
            Some(CatchClause { param, body })
        } else {
            None
        };

        let finalizer = if self.eat(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.error_at_current(
                ErrorCode::MISSING_CATCH_OR_FINALLY,
                "Missing catch or finally after try",
            ));
        }

        Ok(Stmt::new(
            StmtKind::Try {
                block,
                handler,
                finalizer,
            },
            self.span_from(start),
            self.slice_from(start),
        ))
    }

    /// `return [expr];`
    ///
    /// The value is omitted when `;`, `}` or end of input follows.
    fn parse_return(&mut self) -> PResult<Stmt> {
        let start = self.mark();
        self.advance(); // eat `return`
        let value = match self.peek_kind() {
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => None,
            _ => Some(self.parse_expression()?),
        };
        self.eat_semicolon();
        Ok(Stmt::new(
            StmtKind::Return(value),
            self.span_from(start),
            self.slice_from(start),
        ))
    }
}
