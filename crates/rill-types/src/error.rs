use crate::{SourceFile, Span, Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Lexical,
    Syntax,
}

/// Numeric error code (E100–E199).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Lexical errors (E100–E149) ──
    pub const UNEXPECTED_CHARACTER: Self = Self(100);
    pub const INVALID_NUMBER: Self = Self(101);

    // ── Syntax errors (E150–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(150);
    pub const EXPECTED_TOKEN: Self = Self(151);
    pub const INVALID_ASSIGNMENT_TARGET: Self = Self(152);
    pub const INVALID_UPDATE_TARGET: Self = Self(153);
    pub const MISSING_CATCH_OR_FINALLY: Self = Self(154);
    pub const INVALID_SWITCH_CASE: Self = Self(155);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=149 => ErrorCategory::Lexical,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Syntax => write!(f, "syntax"),
        }
    }
}

/// A fatal, positioned error from the lexer or the parser.
///
/// There is no recovery: the first error aborts the stage and is the only
/// one reported. Hosts can serialize it as a structured record instead of
/// parsing the rendered message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseError {
    /// Source file name.
    pub file: String,
    pub code: ErrorCode,
    /// Derived from `code`.
    pub category: ErrorCategory,
    pub message: String,
    pub line: u32,
    pub column: u32,
    /// The offending token's text, or `None` at end of input.
    pub token: Option<String>,
    /// The exact source line for context.
    pub source_line: String,
}

impl ParseError {
    /// Create an error at an explicit position.
    pub fn new(
        source: &SourceFile,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        token: Option<String>,
    ) -> Self {
        Self {
            file: source.name.clone(),
            code,
            category: code.category(),
            message: message.into(),
            line: span.line,
            column: span.column,
            token,
            source_line: source.line(span.line).unwrap_or("").to_string(),
        }
    }

    /// Create an error positioned at `token`.
    pub fn at_token(
        source: &SourceFile,
        code: ErrorCode,
        message: impl Into<String>,
        token: &Token,
    ) -> Self {
        let text = match token.kind {
            TokenKind::Eof => None,
            _ => Some(token.describe()),
        };
        Self::new(source, code, message, token.span, text)
    }

    /// `true` if the error was raised at end of input.
    pub fn at_eof(&self) -> bool {
        self.token.is_none()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] {} (Token: {})",
            self.line,
            self.column,
            self.message,
            self.token.as_deref().unwrap_or("EOF")
        )
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SourceFile {
        SourceFile::new("test.js", "var a = ;\nvar b = 2;")
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(
            ErrorCode::UNEXPECTED_CHARACTER.category(),
            ErrorCategory::Lexical
        );
        assert_eq!(ErrorCode::INVALID_NUMBER.category(), ErrorCategory::Lexical);
        assert_eq!(
            ErrorCode::INVALID_ASSIGNMENT_TARGET.category(),
            ErrorCategory::Syntax
        );
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::UNEXPECTED_TOKEN), "E150");
    }

    #[test]
    fn test_display_with_token() {
        let token = Token::new(TokenKind::Semicolon, ";", Span::new(8, 9, 1, 9));
        let err = ParseError::at_token(
            &source(),
            ErrorCode::UNEXPECTED_TOKEN,
            "Unexpected token: ;",
            &token,
        );
        assert_eq!(err.to_string(), "[1:9] Unexpected token: ; (Token: ;)");
        assert_eq!(err.source_line, "var a = ;");
        assert!(!err.at_eof());
    }

    #[test]
    fn test_display_at_eof() {
        let token = Token::new(TokenKind::Eof, "", Span::point(20, 2, 11));
        let err = ParseError::at_token(&source(), ErrorCode::EXPECTED_TOKEN, "Expected '}'", &token);
        assert_eq!(err.to_string(), "[2:11] Expected '}' (Token: EOF)");
        assert!(err.at_eof());
    }

    #[test]
    fn test_json_serialization() {
        let err = ParseError::new(
            &source(),
            ErrorCode::INVALID_ASSIGNMENT_TARGET,
            "Invalid assignment target",
            Span::new(0, 1, 2, 1),
            Some("=".into()),
        );
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"category\":\"syntax\""));
        assert!(json.contains("\"line\":2"));
        let back: ParseError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }
}
