//! AST node types.
//!
//! Every statement and expression carries a [`Span`] (its byte range and
//! starting position) and the [`TokenSlice`] it was parsed from, so the
//! interpreter can name the offending source text in runtime errors.
//! Large recursive types are boxed to keep enum sizes reasonable.
//!
//! Equality on nodes is structural: spans and token slices are ignored,
//! only the shape and contents of the tree are compared.

use crate::{Span, Token};
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Token slices
// ══════════════════════════════════════════════════════════════════════════════

/// A contiguous run of tokens from the token stream a node was built from.
///
/// All slices of one parse share the same backing buffer.
#[derive(Clone)]
pub struct TokenSlice {
    all: Rc<[Token]>,
    range: Range<usize>,
}

impl TokenSlice {
    /// Create a slice over `all[range]`. The range is clamped to the buffer.
    pub fn new(all: Rc<[Token]>, range: Range<usize>) -> Self {
        let end = range.end.min(all.len());
        let start = range.start.min(end);
        Self {
            all,
            range: start..end,
        }
    }

    /// An empty slice, used for synthesized nodes.
    pub fn empty() -> Self {
        Self {
            all: Rc::from(Vec::new()),
            range: 0..0,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.all[self.range.clone()]
    }

    /// Index range into the full token stream.
    pub fn index_range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Reconstruct source text by joining raw lexemes.
    ///
    /// A single space separates tokens that were not adjacent in the original
    /// source, so re-lexing the result yields the same token sequence.
    pub fn source_text(&self) -> String {
        let mut out = String::new();
        let mut prev_end: Option<usize> = None;
        for token in self.tokens() {
            if let Some(end) = prev_end {
                if token.span.start > end {
                    out.push(' ');
                }
            }
            out.push_str(&token.text);
            prev_end = Some(token.span.end);
        }
        out
    }
}

impl fmt::Debug for TokenSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenSlice({:?})", self.range)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned identifier.
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Blocks & functions
// ══════════════════════════════════════════════════════════════════════════════

/// `{ stmts }`, and also the root node of every program.
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
    pub tokens: TokenSlice,
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.statements == other.statements
    }
}

/// Parameters and body shared by function declarations and expressions.
///
/// Held behind an `Rc` so every closure created from it shares one copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<Ident>,
    pub params: Vec<Ident>,
    pub body: Block,
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
    pub tokens: TokenSlice,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span, tokens: TokenSlice) -> Self {
        Self { kind, span, tokens }
    }
}

impl PartialEq for Stmt {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `expr;`
    Expression(Expr),
    /// `var a = 1, b;`
    VarDecl(VarDecl),
    /// `function name(params) { body }`
    FunctionDecl { name: Ident, function: Rc<Function> },
    Block(Block),
    If {
        condition: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    Break,
    Continue,
    Throw(Expr),
    Try {
        block: Block,
        handler: Option<CatchClause>,
        finalizer: Option<Block>,
    },
    Return(Option<Expr>),
    /// A lone `;`.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `var`/`let`/`const` statement with one or more declarators.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: DeclKind,
    pub declarators: Vec<Declarator>,
}

/// `name` or `name = init` inside a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: Ident,
    pub init: Option<Expr>,
}

/// `case test:` or `default:` followed by its statements.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` for `default`.
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

/// `catch (param) { body }`; the parameter is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Ident>,
    pub body: Block,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub tokens: TokenSlice,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span, tokens: TokenSlice) -> Self {
        Self { kind, span, tokens }
    }

    /// The source text this expression was parsed from.
    pub fn source_text(&self) -> String {
        self.tokens.source_text()
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──
    Number(f64),
    String(String),
    Bool(bool),
    Null,
    /// `[a, b, c]`
    Array(Vec<Expr>),
    /// `{ key: value, ... }` in source order.
    Object(Vec<ObjectProperty>),
    /// `function name?(params) { body }`
    Function(Rc<Function>),

    // ── Names ──
    Identifier(String),
    This,

    // ── Operators ──
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `&&` / `||`: short-circuiting, yields an operand.
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `left ?? right`
    Coalesce {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `++x`, `x--`, `o.p++`
    Update {
        op: UpdateOp,
        prefix: bool,
        target: AssignTarget,
    },
    /// `target = value`
    Assign {
        target: AssignTarget,
        value: Box<Expr>,
    },
    /// `target op= value`
    CompoundAssign {
        op: BinOp,
        target: AssignTarget,
        value: Box<Expr>,
    },
    /// `test ? consequent : alternate`
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },

    // ── Access & calls ──
    /// `object.name` or `object[expr]`
    Member {
        object: Box<Expr>,
        property: Property,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `new callee(args)`; omitted parentheses mean no arguments.
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

/// The property part of a member expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// `.name`
    Named(Ident),
    /// `[expr]`
    Computed(Box<Expr>),
}

/// A place that can be assigned to. The grammar only admits identifiers and
/// member expressions, so nothing else can be represented here.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Identifier(Ident),
    Member {
        object: Box<Expr>,
        property: Property,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    pub key: String,
    pub value: Expr,
}

/// Binary operators (everything except the short-circuiting ones).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Exp,
    // Equality
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    // Relational
    Less,
    LessEq,
    Greater,
    GreaterEq,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

impl BinOp {
    /// Returns the operator symbol for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Exp => "**",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNotEq => "!==",
            BinOp::Less => "<",
            BinOp::LessEq => "<=",
            BinOp::Greater => ">",
            BinOp::GreaterEq => ">=",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::UShr => ">>>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `+`
    Plus,
    /// `~`
    BitNot,
    Typeof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}
