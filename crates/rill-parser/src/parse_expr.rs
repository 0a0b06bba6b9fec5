//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 1. `=` and compound assignment (right-assoc)
//! 2. `?:` (right-assoc)
//! 3. `??`
//! 4. `||`
//! 5. `&&`
//! 6. `|`
//! 7. `^`
//! 8. `&`
//! 9. `==`, `!=`, `===`, `!==`
//! 10. `<`, `<=`, `>`, `>=`
//! 11. `<<`, `>>`, `>>>`
//! 12. `+`, `-`
//! 13. `*`, `/`, `%`
//! 14. `**` (right-assoc)
//! 15. prefix `++ -- ! - + ~ typeof`
//! 16. postfix `++ --`, calls
//! 17. `.` / `[]` member access, `new`
//! 18. primary

use std::rc::Rc;

use rill_types::ast::*;
use rill_types::number::{format_number, literal_value};
use rill_types::{ErrorCode, TokenKind};

use crate::parser::{PResult, Parser};

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> PResult<Expr> {
        self.parse_assignment()
    }

    fn node(&self, kind: ExprKind, start: usize) -> Expr {
        Expr::new(kind, self.span_from(start), self.slice_from(start))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Assignment & Conditional
    // ══════════════════════════════════════════════════════════════════════════

    /// `Assignment = Conditional [ ("=" | "+=" | ...) Assignment ]`
    pub(crate) fn parse_assignment(&mut self) -> PResult<Expr> {
        let start = self.mark();
        let left = self.parse_conditional()?;

        let compound = match self.peek_kind() {
            TokenKind::Eq => None,
            TokenKind::PlusEq => Some(BinOp::Add),
            TokenKind::MinusEq => Some(BinOp::Sub),
            TokenKind::StarEq => Some(BinOp::Mul),
            TokenKind::SlashEq => Some(BinOp::Div),
            TokenKind::PercentEq => Some(BinOp::Rem),
            _ => return Ok(left),
        };

        let Some(target) = into_target(left) else {
            return Err(self.error_at_current(
                ErrorCode::INVALID_ASSIGNMENT_TARGET,
                "Invalid assignment target",
            ));
        };
        self.advance(); // eat the operator
        let value = Box::new(self.parse_assignment()?);

        let kind = match compound {
            None => ExprKind::Assign { target, value },
            Some(op) => ExprKind::CompoundAssign { op, target, value },
        };
        Ok(self.node(kind, start))
    }

    /// `Conditional = Coalesce [ "?" Assignment ":" Assignment ]`
    fn parse_conditional(&mut self) -> PResult<Expr> {
        let start = self.mark();
        let test = self.parse_coalesce()?;
        if !self.eat(&TokenKind::Question) {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect(&TokenKind::Colon, "Expected ':' in conditional expression")?;
        let alternate = self.parse_assignment()?;
        Ok(self.node(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            start,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Binary Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `Coalesce = LogicalOr { "??" LogicalOr }`
    fn parse_coalesce(&mut self) -> PResult<Expr> {
        let start = self.mark();
        let mut left = self.parse_logical_or()?;
        while self.eat(&TokenKind::QuestionQuestion) {
            let right = self.parse_logical_or()?;
            left = self.node(
                ExprKind::Coalesce {
                    left: Box::new(left),
                    right: Box::new(right),
                },
                start,
            );
        }
        Ok(left)
    }

    /// `LogicalOr = LogicalAnd { "||" LogicalAnd }`
    fn parse_logical_or(&mut self) -> PResult<Expr> {
        let start = self.mark();
        let mut left = self.parse_logical_and()?;
        while self.eat(&TokenKind::PipePipe) {
            let right = self.parse_logical_and()?;
            left = self.logical(LogicalOp::Or, left, right, start);
        }
        Ok(left)
    }

    /// `LogicalAnd = BitOr { "&&" BitOr }`
    fn parse_logical_and(&mut self) -> PResult<Expr> {
        let start = self.mark();
        let mut left = self.parse_bit_or()?;
        while self.eat(&TokenKind::AmpAmp) {
            let right = self.parse_bit_or()?;
            left = self.logical(LogicalOp::And, left, right, start);
        }
        Ok(left)
    }

    fn logical(&self, op: LogicalOp, left: Expr, right: Expr, start: usize) -> Expr {
        self.node(
            ExprKind::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            start,
        )
    }

    fn parse_bit_or(&mut self) -> PResult<Expr> {
        self.parse_left_assoc(Self::parse_bit_xor, |k| match k {
            TokenKind::Pipe => Some(BinOp::BitOr),
            _ => None,
        })
    }

    fn parse_bit_xor(&mut self) -> PResult<Expr> {
        self.parse_left_assoc(Self::parse_bit_and, |k| match k {
            TokenKind::Caret => Some(BinOp::BitXor),
            _ => None,
        })
    }

    fn parse_bit_and(&mut self) -> PResult<Expr> {
        self.parse_left_assoc(Self::parse_equality, |k| match k {
            TokenKind::Amp => Some(BinOp::BitAnd),
            _ => None,
        })
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        self.parse_left_assoc(Self::parse_relational, |k| match k {
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::BangEq => Some(BinOp::NotEq),
            TokenKind::EqEqEq => Some(BinOp::StrictEq),
            TokenKind::BangEqEq => Some(BinOp::StrictNotEq),
            _ => None,
        })
    }

    fn parse_relational(&mut self) -> PResult<Expr> {
        self.parse_left_assoc(Self::parse_shift, |k| match k {
            TokenKind::Less => Some(BinOp::Less),
            TokenKind::LessEq => Some(BinOp::LessEq),
            TokenKind::Greater => Some(BinOp::Greater),
            TokenKind::GreaterEq => Some(BinOp::GreaterEq),
            _ => None,
        })
    }

    fn parse_shift(&mut self) -> PResult<Expr> {
        self.parse_left_assoc(Self::parse_additive, |k| match k {
            TokenKind::LessLess => Some(BinOp::Shl),
            TokenKind::GreaterGreater => Some(BinOp::Shr),
            TokenKind::GreaterGreaterGreater => Some(BinOp::UShr),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        self.parse_left_assoc(Self::parse_multiplicative, |k| match k {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        self.parse_left_assoc(Self::parse_exponent, |k| match k {
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::Percent => Some(BinOp::Rem),
            _ => None,
        })
    }

    /// One left-associative level: `Next { op Next }`.
    fn parse_left_assoc(
        &mut self,
        next: fn(&mut Self) -> PResult<Expr>,
        op_for: fn(&TokenKind) -> Option<BinOp>,
    ) -> PResult<Expr> {
        let start = self.mark();
        let mut left = next(self)?;
        while let Some(op) = op_for(self.peek_kind()) {
            self.advance();
            let right = next(self)?;
            left = self.node(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                start,
            );
        }
        Ok(left)
    }

    /// `Exponent = Unary [ "**" Exponent ]` (right-associative)
    fn parse_exponent(&mut self) -> PResult<Expr> {
        let start = self.mark();
        let base = self.parse_unary()?;
        if !self.eat(&TokenKind::StarStar) {
            return Ok(base);
        }
        let exponent = self.parse_exponent()?;
        Ok(self.node(
            ExprKind::Binary {
                op: BinOp::Exp,
                left: Box::new(base),
                right: Box::new(exponent),
            },
            start,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Unary & Postfix
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_unary(&mut self) -> PResult<Expr> {
        let start = self.mark();
        let op = match self.peek_kind() {
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = update_op(self.peek_kind());
                self.advance();
                let operand = self.parse_unary()?;
                let Some(target) = into_target(operand) else {
                    return Err(self.error_at_current(
                        ErrorCode::INVALID_UPDATE_TARGET,
                        "Invalid left-hand side expression in prefix operation",
                    ));
                };
                return Ok(self.node(
                    ExprKind::Update {
                        op,
                        prefix: true,
                        target,
                    },
                    start,
                ));
            }
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::Typeof => UnaryOp::Typeof,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(self.node(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            start,
        ))
    }

    /// `Postfix = Call [ "++" | "--" ]`
    fn parse_postfix(&mut self) -> PResult<Expr> {
        let start = self.mark();
        let expr = self.parse_call()?;
        if !matches!(self.peek_kind(), TokenKind::PlusPlus | TokenKind::MinusMinus) {
            return Ok(expr);
        }
        let op = update_op(self.peek_kind());
        let Some(target) = into_target(expr) else {
            return Err(self.error_at_current(
                ErrorCode::INVALID_UPDATE_TARGET,
                "Invalid left-hand side expression in postfix operation",
            ));
        };
        self.advance();
        Ok(self.node(
            ExprKind::Update {
                op,
                prefix: false,
                target,
            },
            start,
        ))
    }

    /// `Call = Member { "(" Args ")" | "." Name | "[" Expr "]" }`
    fn parse_call(&mut self) -> PResult<Expr> {
        let start = self.mark();
        let mut expr = self.parse_member()?;
        loop {
            if self.check(&TokenKind::LParen) {
                let args = self.parse_arguments()?;
                expr = self.node(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    start,
                );
            } else if let Some(property) = self.parse_member_suffix()? {
                expr = self.node(
                    ExprKind::Member {
                        object: Box::new(expr),
                        property,
                    },
                    start,
                );
            } else {
                return Ok(expr);
            }
        }
    }

    /// `"(" [ Assignment { "," Assignment } ] ")"`
    fn parse_arguments(&mut self) -> PResult<Vec<Expr>> {
        self.expect(&TokenKind::LParen, "Expected '('")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_assignment()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "Expected ')' after arguments")?;
        Ok(args)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Member Access & new
    // ══════════════════════════════════════════════════════════════════════════

    /// `Member = ( "new" Member [ Args ] | Primary ) { "." Name | "[" Expr "]" }`
    fn parse_member(&mut self) -> PResult<Expr> {
        let start = self.mark();
        let mut expr = if self.eat(&TokenKind::New) {
            let callee = self.parse_member()?;
            let args = if self.check(&TokenKind::LParen) {
                self.parse_arguments()?
            } else {
                Vec::new()
            };
            self.node(
                ExprKind::New {
                    callee: Box::new(callee),
                    args,
                },
                start,
            )
        } else {
            self.parse_primary()?
        };

        while let Some(property) = self.parse_member_suffix()? {
            expr = self.node(
                ExprKind::Member {
                    object: Box::new(expr),
                    property,
                },
                start,
            );
        }
        Ok(expr)
    }

    /// `.name` or `[expr]`, if present.
    fn parse_member_suffix(&mut self) -> PResult<Option<Property>> {
        if self.eat(&TokenKind::Dot) {
            let name = self.expect_property_name("Expected property name after '.'")?;
            Ok(Some(Property::Named(name)))
        } else if self.eat(&TokenKind::LBracket) {
            let index = self.parse_expression()?;
            self.expect(&TokenKind::RBracket, "Expected ']' after computed property")?;
            Ok(Some(Property::Computed(Box::new(index))))
        } else {
            Ok(None)
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> PResult<Expr> {
        let start = self.mark();
        let token = self.peek().clone();
        let kind = match &token.kind {
            TokenKind::Number
            | TokenKind::HexNumber
            | TokenKind::OctalNumber
            | TokenKind::BinaryNumber => {
                let Some(value) = literal_value(&token.kind, &token.text) else {
                    return Err(self.unexpected());
                };
                self.advance();
                ExprKind::Number(value)
            }
            TokenKind::String(value) => {
                self.advance();
                ExprKind::String(value.clone())
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::This => {
                self.advance();
                ExprKind::This
            }
            TokenKind::Identifier(name) => {
                self.advance();
                ExprKind::Identifier(name.clone())
            }
            TokenKind::Function => {
                self.advance();
                let name = match self.peek_kind() {
                    TokenKind::Identifier(_) => Some(self.expect_identifier("Expected function name")?),
                    _ => None,
                };
                let (params, body) = self.parse_function_rest()?;
                ExprKind::Function(Rc::new(Function { name, params, body }))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "Expected ')' after expression")?;
                // Parentheses only group: the inner node keeps its own kind
                // but widens to cover the parentheses.
                return Ok(self.node(inner.kind, start));
            }
            TokenKind::LBracket => {
                self.advance();
                ExprKind::Array(self.parse_array_elements()?)
            }
            TokenKind::LBrace => {
                self.advance();
                ExprKind::Object(self.parse_object_properties()?)
            }
            _ => return Err(self.unexpected()),
        };
        Ok(self.node(kind, start))
    }

    /// Elements after `[`, through the closing `]`. One trailing comma is allowed.
    fn parse_array_elements(&mut self) -> PResult<Vec<Expr>> {
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            elements.push(self.parse_assignment()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBracket, "Expected ']' after array elements")?;
        Ok(elements)
    }

    /// Properties after `{`, through the closing `}`. Keys may be identifiers,
    /// keywords, strings or numbers. One trailing comma is allowed.
    fn parse_object_properties(&mut self) -> PResult<Vec<ObjectProperty>> {
        let mut properties = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let token = self.peek().clone();
            let key = match &token.kind {
                TokenKind::Identifier(name) => name.clone(),
                TokenKind::String(value) => value.clone(),
                kind if kind.is_keyword() => token.text.clone(),
                kind => match literal_value(kind, &token.text) {
                    Some(n) => format_number(n),
                    None => {
                        return Err(self.error_at_current(
                            ErrorCode::EXPECTED_TOKEN,
                            "Expected property name in object literal",
                        ))
                    }
                },
            };
            self.advance();
            self.expect(&TokenKind::Colon, "Expected ':' after property name")?;
            let value = self.parse_assignment()?;
            properties.push(ObjectProperty { key, value });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, "Expected '}' after object literal")?;
        Ok(properties)
    }
}

/// Reinterpret an already-parsed expression as an assignment target.
fn into_target(expr: Expr) -> Option<AssignTarget> {
    match expr.kind {
        ExprKind::Identifier(name) => Some(AssignTarget::Identifier(Ident::new(name, expr.span))),
        ExprKind::Member { object, property } => Some(AssignTarget::Member { object, property }),
        _ => None,
    }
}

fn update_op(kind: &TokenKind) -> UpdateOp {
    match kind {
        TokenKind::MinusMinus => UpdateOp::Decrement,
        _ => UpdateOp::Increment,
    }
}
