//! Rill parser: converts a token stream into an AST.

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::Parser;

use rill_types::ast::Block;
use rill_types::{ParseError, SourceFile};

/// Lex and parse a source string with a placeholder file name.
pub fn parse(source: &str) -> Result<Block, ParseError> {
    let file = SourceFile::new("<input>", source);
    let tokens = rill_lexer::Lexer::new(&file).lex()?;
    Parser::new(tokens, &file).parse()
}
