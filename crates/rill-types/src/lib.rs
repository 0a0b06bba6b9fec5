//! Shared types for the Rill engine.
//!
//! This crate defines the token and AST node types, source spans, and the
//! positioned error record produced by the lexer and parser.

mod error;
mod span;
pub mod ast;
pub mod number;
pub mod token;

pub use error::{ErrorCategory, ErrorCode, ParseError};
pub use span::{SourceFile, Span};
pub use token::{Token, TokenKind, ALL_KEYWORDS};

/// Result type used by the lexer and parser.
pub type Result<T> = std::result::Result<T, ParseError>;
