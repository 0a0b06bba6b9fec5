//! Byte-level scanner producing the token stream for a Rill program.
//!
//! Features:
//! - Identifiers (letter/`_`/`$` start, alphanumerics/`_`/`$` after) and 24 reserved words
//! - Decimal, `0x` hex, `0o` octal and `0b` binary numeric literals
//! - Single- and double-quoted strings with backslash escapes
//! - Longest-match operators (`>>>` over `>>` over `>`, `===` over `==` over `=`)
//! - `//` and `/* */` comments; an unterminated block comment runs to end of input
//! - Newlines are whitespace: no token is produced for them
//! - Fail-fast: the first malformed input aborts the scan

use rill_types::{ErrorCode, ParseError, SourceFile, Span, Token, TokenKind};
use tracing::debug;

/// The lexer.
///
/// Converts source text into a vector of [`Token`]s terminated by
/// [`TokenKind::Eof`], or the first [`ParseError`] encountered.
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Source file for error reporting.
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, counted in characters).
    col: u32,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Lex the entire source file into a token stream.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn lex(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        debug!(count = tokens.len(), "lexed");
        Ok(tokens)
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if ch & 0xC0 != 0x80 {
            // UTF-8 continuation bytes do not start a new column.
            self.col += 1;
        }
        Some(ch)
    }

    /// The character starting at byte offset `pos`.
    fn char_at(&self, pos: usize) -> Option<char> {
        self.source_file.source.get(pos..)?.chars().next()
    }

    /// Consume the next byte if it equals `expected`.
    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn text_from(&self, start: usize) -> &'src str {
        let bytes: &'src [u8] = self.source;
        std::str::from_utf8(&bytes[start..self.pos]).unwrap_or("")
    }

    fn make(&self, kind: TokenKind, start: usize, line: u32, col: u32) -> Token {
        let text = self.text_from(start);
        Token::new(kind, text, Span::new(start, self.pos, line, col))
    }

    fn error(
        &self,
        code: ErrorCode,
        message: impl Into<String>,
        start: usize,
        line: u32,
        col: u32,
    ) -> ParseError {
        let text = self.text_from(start);
        ParseError::new(
            self.source_file,
            code,
            message,
            Span::new(start, self.pos, line, col),
            Some(text.to_string()),
        )
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace (newlines included) and comments.
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C), _) => {
                    self.advance();
                }
                (Some(b'/'), Some(b'/')) => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    self.advance();
                    self.advance();
                    loop {
                        match self.peek() {
                            None => break,
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            _ => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia();

        let start = self.pos;
        let line = self.line;
        let col = self.col;

        let Some(ch) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, "", Span::point(start, line, col)));
        };

        let kind = match ch {
            b'"' | b'\'' => return Ok(self.scan_string(ch, start, line, col)),
            b'0'..=b'9' => return self.scan_number(ch, start, line, col),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => {
                return Ok(self.scan_identifier(start, line, col))
            }
            0x80..=0xFF => {
                let c = self.char_at(start).unwrap_or(char::REPLACEMENT_CHARACTER);
                for _ in 1..c.len_utf8() {
                    self.advance();
                }
                if c.is_alphabetic() {
                    return Ok(self.scan_identifier(start, line, col));
                }
                return Err(self.error(
                    ErrorCode::UNEXPECTED_CHARACTER,
                    format!("Unexpected character: '{c}'"),
                    start,
                    line,
                    col,
                ));
            }

            b'+' => {
                if self.eat(b'+') {
                    TokenKind::PlusPlus
                } else if self.eat(b'=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            b'-' => {
                if self.eat(b'-') {
                    TokenKind::MinusMinus
                } else if self.eat(b'=') {
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }
            b'*' => {
                if self.eat(b'*') {
                    TokenKind::StarStar
                } else if self.eat(b'=') {
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                }
            }
            b'/' => {
                if self.eat(b'=') {
                    TokenKind::SlashEq
                } else {
                    TokenKind::Slash
                }
            }
            b'%' => {
                if self.eat(b'=') {
                    TokenKind::PercentEq
                } else {
                    TokenKind::Percent
                }
            }
            b'?' => {
                if self.eat(b'?') {
                    TokenKind::QuestionQuestion
                } else {
                    TokenKind::Question
                }
            }
            b'=' => {
                if self.eat(b'=') {
                    if self.eat(b'=') {
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else if self.eat(b'>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Eq
                }
            }
            b'!' => {
                if self.eat(b'=') {
                    if self.eat(b'=') {
                        TokenKind::BangEqEq
                    } else {
                        TokenKind::BangEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            b'<' => {
                if self.eat(b'<') {
                    TokenKind::LessLess
                } else if self.eat(b'=') {
                    TokenKind::LessEq
                } else {
                    TokenKind::Less
                }
            }
            b'>' => {
                if self.eat(b'>') {
                    if self.eat(b'>') {
                        TokenKind::GreaterGreaterGreater
                    } else {
                        TokenKind::GreaterGreater
                    }
                } else if self.eat(b'=') {
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }
            b'&' => {
                if self.eat(b'&') {
                    TokenKind::AmpAmp
                } else {
                    TokenKind::Amp
                }
            }
            b'|' => {
                if self.eat(b'|') {
                    TokenKind::PipePipe
                } else {
                    TokenKind::Pipe
                }
            }
            b'^' => TokenKind::Caret,
            b'~' => TokenKind::Tilde,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b':' => TokenKind::Colon,

            _ => {
                return Err(self.error(
                    ErrorCode::UNEXPECTED_CHARACTER,
                    format!("Unexpected character: '{}'", ch as char),
                    start,
                    line,
                    col,
                ))
            }
        };

        Ok(self.make(kind, start, line, col))
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(
        &mut self,
        first: u8,
        start: usize,
        line: u32,
        col: u32,
    ) -> Result<Token, ParseError> {
        if first == b'0' {
            let radix = match self.peek() {
                Some(b'x' | b'X') => Some((16, TokenKind::HexNumber)),
                Some(b'o' | b'O') => Some((8, TokenKind::OctalNumber)),
                Some(b'b' | b'B') => Some((2, TokenKind::BinaryNumber)),
                _ => None,
            };
            if let Some((radix, kind)) = radix {
                self.advance(); // consume the radix marker
                let digits_start = self.pos;
                while let Some(ch) = self.peek() {
                    if (ch as char).is_digit(radix) {
                        self.advance();
                    } else {
                        break;
                    }
                }
                // An empty `0o`/`0b` is left for the parser to reject.
                if self.pos == digits_start && radix == 16 {
                    return Err(self.error(
                        ErrorCode::INVALID_NUMBER,
                        "Invalid hexadecimal number",
                        start,
                        line,
                        col,
                    ));
                }
                return Ok(self.make(kind, start, line, col));
            }
        }

        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }

        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.advance(); // consume '.'
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
        }

        // Exponent: only consumed when at least one digit follows.
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let digit_at = match self.peek_at(1) {
                Some(b'+' | b'-') => 2,
                _ => 1,
            };
            if matches!(self.peek_at(digit_at), Some(b'0'..=b'9')) {
                for _ in 0..digit_at {
                    self.advance();
                }
                while let Some(b'0'..=b'9') = self.peek() {
                    self.advance();
                }
            }
        }

        Ok(self.make(TokenKind::Number, start, line, col))
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start: usize, line: u32, col: u32) -> Token {
        // The first character was already consumed.
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' || ch == b'$' {
                self.advance();
                continue;
            }
            match self.char_at(self.pos) {
                Some(c) if !c.is_ascii() && c.is_alphanumeric() => {
                    for _ in 0..c.len_utf8() {
                        self.advance();
                    }
                }
                _ => break,
            }
        }

        let text = self.text_from(start);
        let kind = TokenKind::from_keyword(text)
            .unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
        self.make(kind, start, line, col)
    }

    // ─────────────────────────────────────────────────────────────
    // String literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a string literal after its opening quote.
    ///
    /// An unterminated string is not an error: it ends at end of input.
    fn scan_string(&mut self, quote: u8, start: usize, line: u32, col: u32) -> Token {
        let mut buf: Vec<u8> = Vec::new();

        while let Some(ch) = self.advance() {
            match ch {
                _ if ch == quote => break,
                b'\\' => match self.advance() {
                    Some(b'n') => buf.push(b'\n'),
                    Some(b't') => buf.push(b'\t'),
                    Some(b'r') => buf.push(b'\r'),
                    // `\\`, `\"`, `\'` and any other escaped character pass through.
                    Some(other) => buf.push(other),
                    None => break,
                },
                _ => buf.push(ch),
            }
        }

        let value = String::from_utf8_lossy(&buf).into_owned();
        self.make(TokenKind::String(value), start, line, col)
    }
}

/// Lex a source string with a placeholder file name.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let file = SourceFile::new("<input>", source);
    Lexer::new(&file).lex()
}
