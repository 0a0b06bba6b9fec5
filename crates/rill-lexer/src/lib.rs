//! Rill lexer: converts source text into a token stream.
//!
//! Token types live in `rill-types` so AST nodes can retain them; they are
//! re-exported here for convenience.

pub mod lexer;

pub use lexer::{tokenize, Lexer};
pub use rill_types::{Token, TokenKind, ALL_KEYWORDS};
