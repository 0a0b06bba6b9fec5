//! Core parser infrastructure: token cursor, node construction, errors.

use std::rc::Rc;

use rill_types::ast::{Block, Ident, TokenSlice};
use rill_types::{ErrorCode, ParseError, SourceFile, Span, Token, TokenKind};
use tracing::debug;

pub(crate) type PResult<T> = Result<T, ParseError>;

/// The parser.
///
/// Consumes a token stream produced by the lexer and builds an AST by
/// recursive descent. The first structural mismatch aborts the parse.
pub struct Parser<'src> {
    /// The token stream, shared with every node's [`TokenSlice`].
    tokens: Rc<[Token]>,
    /// Current index into `tokens`.
    pos: usize,
    /// Source file for error context.
    source_file: &'src SourceFile,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    ///
    /// A missing trailing [`TokenKind::Eof`] is appended.
    pub fn new(mut tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let end = source_file.source.len();
            let line = source_file.line_count() as u32;
            let col = source_file.line(line).map_or(0, |l| l.chars().count()) as u32 + 1;
            tokens.push(Token::new(TokenKind::Eof, "", Span::point(end, line, col)));
        }
        Self {
            tokens: Rc::from(tokens),
            pos: 0,
            source_file,
        }
    }

    /// Parse the whole token stream into the program's root block.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse(mut self) -> Result<Block, ParseError> {
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(self.parse_statement()?);
        }
        debug!(statements = statements.len(), "parsed program");

        let last = self.tokens.len().saturating_sub(1);
        let span = match (self.tokens.first(), self.tokens.get(last)) {
            (Some(first), Some(eof)) => first.span.merge(eof.span),
            _ => Span::default(),
        };
        Ok(Block {
            statements,
            span,
            tokens: TokenSlice::new(self.tokens.clone(), 0..last),
        })
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Index of the current token, used to mark where a node starts.
    pub(crate) fn mark(&self) -> usize {
        self.pos
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip an optional `;`.
    pub(crate) fn eat_semicolon(&mut self) {
        self.eat(&TokenKind::Semicolon);
    }

    // ── Node Construction ─────────────────────────────────────────────────────

    /// Span from the token at `start` through the last consumed token.
    pub(crate) fn span_from(&self, start: usize) -> Span {
        let first = self.tokens[start.min(self.tokens.len() - 1)].span;
        if self.pos > start {
            first.merge(self.tokens[self.pos - 1].span)
        } else {
            Span::point(first.start, first.line, first.column)
        }
    }

    /// Tokens from `start` through the last consumed token.
    pub(crate) fn slice_from(&self, start: usize) -> TokenSlice {
        TokenSlice::new(self.tokens.clone(), start..self.pos)
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind, failing with `message` otherwise.
    pub(crate) fn expect(&mut self, expected: &TokenKind, message: &str) -> PResult<Token> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(ErrorCode::EXPECTED_TOKEN, message))
        }
    }

    /// Expect an identifier token.
    pub(crate) fn expect_identifier(&mut self, message: &str) -> PResult<Ident> {
        match self.peek_kind() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Ok(Ident::new(name, span))
            }
            _ => Err(self.error_at_current(ErrorCode::EXPECTED_TOKEN, message)),
        }
    }

    /// Expect an identifier or a keyword used as a property name (`o.default`).
    pub(crate) fn expect_property_name(&mut self, message: &str) -> PResult<Ident> {
        let token = self.peek();
        let name = match &token.kind {
            TokenKind::Identifier(name) => name.clone(),
            kind if kind.is_keyword() => token.text.clone(),
            _ => return Err(self.error_at_current(ErrorCode::EXPECTED_TOKEN, message)),
        };
        let span = self.advance().span;
        Ok(Ident::new(name, span))
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Build an error positioned at the current token.
    pub(crate) fn error_at_current(&self, code: ErrorCode, message: impl Into<String>) -> ParseError {
        ParseError::at_token(self.source_file, code, message, self.peek())
    }

    /// `Unexpected token: X` at the current token.
    pub(crate) fn unexpected(&self) -> ParseError {
        let message = format!("Unexpected token: {}", self.peek().describe());
        self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message)
    }
}
