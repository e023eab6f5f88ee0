//! Tokenizer implementation.

use super::{Keyword, Span, Token, TokenKind};

/// A lexer over one batch of DDL text.
pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte position.
    pos: usize,
    /// Start of the token being scanned.
    start: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_line(&mut self) {
        while self.peek().is_some_and(|c| c != '\n') {
            self.advance();
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }
            match (self.peek(), self.peek_next()) {
                (Some('-'), Some('-')) | (Some('#'), _) => self.skip_line(),
                (Some('/'), Some('*')) => {
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            None => break,
                            _ => {}
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    fn error(&self, message: impl Into<String>) -> Token {
        self.make_token(TokenKind::Error(message.into()))
    }

    fn scan_word(&mut self) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }
        let text = &self.input[self.start..self.pos];
        match Keyword::from_str(text) {
            Some(keyword) => self.make_token(TokenKind::Keyword(keyword)),
            None => self.make_token(TokenKind::Identifier(String::from(text))),
        }
    }

    /// Backtick-quoted identifier; a doubled backtick stands for itself.
    fn scan_quoted_identifier(&mut self) -> Token {
        let mut name = String::new();
        loop {
            match self.advance() {
                Some('`') if self.peek() == Some('`') => {
                    self.advance();
                    name.push('`');
                }
                Some('`') => break,
                Some(c) => name.push(c),
                None => return self.error("unterminated quoted identifier"),
            }
        }
        self.make_token(TokenKind::Identifier(name))
    }

    /// Single- or double-quoted string with backslash escapes.
    fn scan_string(&mut self, quote: char) -> Token {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote && self.peek() == Some(quote) => {
                    self.advance();
                    value.push(quote);
                }
                Some(c) if c == quote => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('0') => value.push('\0'),
                    Some(other) => value.push(other),
                    None => return self.error("unterminated string literal"),
                },
                Some(c) => value.push(c),
                None => return self.error("unterminated string literal"),
            }
        }
        self.make_token(TokenKind::String(value))
    }

    /// `X'...'` hex literal; the `X` has been consumed.
    fn scan_hex(&mut self) -> Token {
        self.advance();
        let mut digits = String::new();
        loop {
            match self.advance() {
                Some('\'') => break,
                Some(c) if c.is_ascii_hexdigit() => digits.push(c),
                Some(c) => return self.error(format!("invalid character in hex literal: {c}")),
                None => return self.error("unterminated hex literal"),
            }
        }
        if digits.len() % 2 != 0 {
            return self.error("odd number of digits in hex literal");
        }
        let bytes = (0..digits.len())
            .step_by(2)
            .filter_map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
            .collect();
        self.make_token(TokenKind::Blob(bytes))
    }

    fn scan_number(&mut self) -> Token {
        let mut is_float = false;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        if self.peek().is_some_and(|c| c == 'e' || c == 'E')
            && self
                .peek_next()
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            is_float = true;
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        // `1col` is a legal identifier
        if !is_float && self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            return self.scan_word();
        }

        let text = &self.input[self.start..self.pos];
        if is_float {
            match text.parse::<f64>() {
                Ok(f) => self.make_token(TokenKind::Float(f)),
                Err(e) => self.error(format!("invalid number {text}: {e}")),
            }
        } else {
            match text.parse::<i64>() {
                Ok(i) => self.make_token(TokenKind::Integer(i)),
                Err(e) => self.error(format!("invalid integer {text}: {e}")),
            }
        }
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start = self.pos;

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.pos = self.start;
                return self.scan_number();
            }
            '.' => TokenKind::Dot,
            '@' => TokenKind::At,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '~' => TokenKind::BitNot,
            '^' => TokenKind::BitXor,
            '=' => TokenKind::Eq,
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    if self.peek() == Some('>') {
                        self.advance();
                        TokenKind::NullSafeEq
                    } else {
                        TokenKind::LtEq
                    }
                }
                Some('>') => {
                    self.advance();
                    TokenKind::NotEq
                }
                Some('<') => {
                    self.advance();
                    TokenKind::LeftShift
                }
                _ => TokenKind::Lt,
            },
            '>' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::GtEq
                }
                Some('>') => {
                    self.advance();
                    TokenKind::RightShift
                }
                _ => TokenKind::Gt,
            },
            '!' if self.peek() == Some('=') => {
                self.advance();
                TokenKind::NotEq
            }
            '!' => TokenKind::Bang,
            '|' if self.peek() == Some('|') => {
                self.advance();
                TokenKind::DoublePipe
            }
            '|' => TokenKind::BitOr,
            '&' if self.peek() == Some('&') => {
                self.advance();
                TokenKind::DoubleAmpersand
            }
            '&' => TokenKind::BitAnd,
            '\'' | '"' => return self.scan_string(c),
            '`' => return self.scan_quoted_identifier(),
            'X' | 'x' if self.peek() == Some('\'') => return self.scan_hex(),
            c if c.is_ascii_digit() => {
                self.pos = self.start;
                return self.scan_number();
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                self.pos = self.start;
                return self.scan_word();
            }
            other => TokenKind::Error(format!("unexpected character: {other}")),
        };
        self.make_token(kind)
    }

    /// Tokenizes the entire input, ending with an `Eof` token.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(String::from(name))
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(token_kinds("  \n\t "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            token_kinds("CREATE -- one\n# two\n/* three */ TABLE"),
            vec![
                TokenKind::Keyword(Keyword::Create),
                TokenKind::Keyword(Keyword::Table),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_backtick_identifiers() {
        assert_eq!(
            token_kinds("`order` `we``ird` name"),
            vec![ident("order"), ident("we`ird"), ident("name"), TokenKind::Eof]
        );
    }

    #[test]
    fn test_strings_with_escapes() {
        assert_eq!(
            token_kinds(r#"'it''s' "dq" 'a\'b\n'"#),
            vec![
                TokenKind::String(String::from("it's")),
                TokenKind::String(String::from("dq")),
                TokenKind::String(String::from("a'b\n")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            token_kinds("42 3.5 1e3 .5"),
            vec![
                TokenKind::Integer(42),
                TokenKind::Float(3.5),
                TokenKind::Float(1000.0),
                TokenKind::Float(0.5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_digit_leading_identifier() {
        assert_eq!(token_kinds("1st_col"), vec![ident("1st_col"), TokenKind::Eof]);
    }

    #[test]
    fn test_hex_literal() {
        assert_eq!(
            token_kinds("X'CAFE'"),
            vec![TokenKind::Blob(vec![0xCA, 0xFE]), TokenKind::Eof]
        );
        assert!(matches!(token_kinds("x'ABC'")[0], TokenKind::Error(_)));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            token_kinds("<=> <= <> != >= << >> && || ! ^"),
            vec![
                TokenKind::NullSafeEq,
                TokenKind::LtEq,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::GtEq,
                TokenKind::LeftShift,
                TokenKind::RightShift,
                TokenKind::DoubleAmpersand,
                TokenKind::DoublePipe,
                TokenKind::Bang,
                TokenKind::BitXor,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated() {
        assert!(matches!(token_kinds("'abc")[0], TokenKind::Error(_)));
        assert!(matches!(token_kinds("`abc")[0], TokenKind::Error(_)));
    }

    #[test]
    fn test_span_tracking() {
        let tokens = Lexer::new("ALTER TABLE `t`").tokenize();
        assert_eq!(tokens[0].span, Span::new(0, 5));
        assert_eq!(tokens[2].span, Span::new(12, 15));
    }
}
