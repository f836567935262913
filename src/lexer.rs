//! src/lexer.rs

/********************************************************************************
 *                            LEXER MODULE
 *-------------------------------------------------------------------------------*
 * Converts raw UTF-8 source text into a stream of `Spanned<Token>`. Scans
 * character-by-character; whitespace and line terminators separate tokens
 * but are otherwise insignificant.
 *
 * `#` is always the annotation operator (§4.3): it is immediately followed
 * either by a quoted string literal, in which case the lexer just emits
 * `Hash` and lets normal string lexing take the next token, or by bare text
 * running to end of line, in which case the lexer itself consumes that text
 * and emits a trailing `Str` token so the parser never has to special-case
 * unquoted annotation text.
 ********************************************************************************/

use num_bigint::BigInt;

use crate::error::MindError;
use crate::tokens::{Position, Spanned, Token};

pub struct Lexer {
    input: Vec<char>,
    current: usize,
    line: u32,
    column: u32,
    offset: u32,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            current: 0,
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Spanned<Token>>, MindError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            let pos = self.position();
            let c = self.advance();
            if c == '#' {
                tokens.push(Spanned { node: Token::Hash, pos });
                if let Some(text) = self.bare_annotation_text() {
                    tokens.push(Spanned { node: Token::Str(text), pos });
                }
                continue;
            }
            let token = self.scan(c, pos)?;
            tokens.push(Spanned { node: token, pos });
        }

        tokens.push(Spanned { node: Token::Eof, pos: self.position() });
        Ok(tokens)
    }

    fn scan(&mut self, c: char, pos: Position) -> Result<Token, MindError> {
        match c {
            '(' => Ok(Token::LParen),
            ')' => Ok(Token::RParen),
            '[' => Ok(Token::LBracket),
            ']' => Ok(Token::RBracket),
            '{' => Ok(Token::LBrace),
            '}' => Ok(Token::RBrace),
            ',' => Ok(Token::Comma),
            ':' => Ok(Token::Colon),
            ';' => Ok(Token::Semicolon),
            '.' => Ok(Token::Dot),
            '?' => Ok(Token::Question),
            '@' => Ok(Token::At),
            '+' => Ok(Token::Plus),
            '-' if self.match_char('>') => Ok(Token::Arrow),
            '-' => Ok(Token::Minus),
            '*' => Ok(Token::Star),
            '/' => Ok(Token::Slash),
            '%' => Ok(Token::Percent),
            '=' if self.match_char('=') => Ok(Token::EqEq),
            '=' => Ok(Token::Assign),
            '!' if self.match_char('=') => Ok(Token::NotEq),
            '!' => Ok(Token::Bang),
            '<' if self.match_char('=') => Ok(Token::LtEq),
            '<' => Ok(Token::Lt),
            '>' if self.match_char('=') => Ok(Token::GtEq),
            '>' => Ok(Token::Gt),
            '"' | '\'' => self.string(c, pos),
            ch if ch.is_ascii_digit() => self.number(ch),
            ch if ch.is_alphabetic() || ch == '_' => Ok(self.identifier(ch)),
            ch => Err(MindError::lex(format!("unexpected character '{}'", ch), pos)),
        }
    }

    //--------------------------------------------------------------------------
    // NUMBER LITERALS
    //--------------------------------------------------------------------------

    fn number(&mut self, start: char) -> Result<Token, MindError> {
        let mut value = start.to_string();
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            value.push(self.advance());
        }
        if self.peek() == Some('.') && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            value.push(self.advance());
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                value.push(self.advance());
            }
            value
                .parse::<f64>()
                .map(Token::Num)
                .map_err(|_| MindError::lex(format!("invalid numeric literal '{}'", value), self.position()))
        } else {
            value
                .parse::<BigInt>()
                .map(Token::Int)
                .map_err(|_| MindError::lex(format!("invalid integer literal '{}'", value), self.position()))
        }
    }

    //--------------------------------------------------------------------------
    // IDENTIFIERS AND KEYWORDS
    //--------------------------------------------------------------------------

    fn identifier(&mut self, start: char) -> Token {
        let mut text = start.to_string();
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            text.push(self.advance());
        }
        match text.as_str() {
            "let" => Token::Let,
            "fun" => Token::Fun,
            "do" => Token::Do,
            "then" => Token::Do,
            "end" => Token::End,
            "if" => Token::If,
            "elif" => Token::Elif,
            "else" => Token::Else,
            "for" => Token::For,
            "in" => Token::In,
            "return" => Token::Return,
            "break" => Token::Break,
            "continue" => Token::Continue,
            "type" => Token::Type,
            "oracle" => Token::Oracle,
            "from" => Token::From,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "this" => Token::This,
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            _ => Token::Identifier(text),
        }
    }

    //--------------------------------------------------------------------------
    // STRING LITERALS
    //--------------------------------------------------------------------------

    fn string(&mut self, quote: char, start: Position) -> Result<Token, MindError> {
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(MindError::lex("unterminated string literal", start)),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('n') => {
                            value.push('\n');
                            self.advance();
                        }
                        Some('t') => {
                            value.push('\t');
                            self.advance();
                        }
                        Some('r') => {
                            value.push('\r');
                            self.advance();
                        }
                        Some('"') => {
                            value.push('"');
                            self.advance();
                        }
                        Some('\'') => {
                            value.push('\'');
                            self.advance();
                        }
                        Some('\\') => {
                            value.push('\\');
                            self.advance();
                        }
                        Some(other) => {
                            return Err(MindError::lex(
                                format!("unknown escape sequence '\\{}'", other),
                                self.position(),
                            ))
                        }
                        None => return Err(MindError::lex("unterminated string literal", start)),
                    }
                }
                Some(_) => value.push(self.advance()),
            }
        }
        Ok(Token::Str(value))
    }

    /// After a bare `#` not immediately followed by a quote, consumes the
    /// rest of the line as the annotation's text.
    fn bare_annotation_text(&mut self) -> Option<String> {
        self.skip_horizontal_whitespace();
        if matches!(self.peek(), None | Some('"') | Some('\'')) {
            return None;
        }
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(self.advance());
        }
        Some(text.trim().to_string())
    }

    //--------------------------------------------------------------------------
    // WHITESPACE
    //--------------------------------------------------------------------------

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn skip_horizontal_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c == ' ' || c == '\t') {
            self.advance();
        }
    }

    //--------------------------------------------------------------------------
    // CURSOR UTILITIES
    //--------------------------------------------------------------------------

    fn position(&self) -> Position {
        Position { line: self.line, column: self.column, offset: self.offset }
    }

    fn advance(&mut self) -> char {
        let ch = self.input[self.current];
        self.current += 1;
        self.offset += ch.len_utf8() as u32;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        ch
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.current).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.current + n).copied()
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        Lexer::new(src).tokenize().unwrap().into_iter().map(|s| s.node).collect()
    }

    #[test]
    fn test_lexes_let_binding() {
        // Arrange
        let src = "let x = 1;";

        // Act
        let toks = tokens(src);

        // Assert
        assert_eq!(
            toks,
            vec![
                Token::Let,
                Token::Identifier("x".into()),
                Token::Assign,
                Token::Int(BigInt::from(1)),
                Token::Semicolon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_distinguishes_int_and_num_literals() {
        // Arrange / Act
        let toks = tokens("42 3.14");

        // Assert
        assert_eq!(toks[0], Token::Int(BigInt::from(42)));
        assert_eq!(toks[1], Token::Num(3.14));
    }

    #[test]
    fn test_dot_after_int_is_member_access_not_a_decimal() {
        // Arrange / Act: "5.len" is an int literal followed by `.len`.
        let toks = tokens("5.len");

        // Assert
        assert_eq!(toks[0], Token::Int(BigInt::from(5)));
        assert_eq!(toks[1], Token::Dot);
        assert_eq!(toks[2], Token::Identifier("len".into()));
    }

    #[test]
    fn test_string_escapes() {
        // Arrange / Act
        let toks = tokens(r#""a\nb""#);

        // Assert
        assert_eq!(toks[0], Token::Str("a\nb".to_string()));
    }

    #[test]
    fn test_single_quoted_string() {
        // Arrange / Act
        let toks = tokens("'hello'");

        // Assert
        assert_eq!(toks[0], Token::Str("hello".to_string()));
    }

    #[test]
    fn test_unterminated_string_is_lex_error() {
        // Arrange / Act
        let result = Lexer::new("\"abc").tokenize();

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_quoted_annotation_yields_hash_then_string_token() {
        // Arrange / Act
        let toks = tokens(r#"# "a count" 1"#);

        // Assert
        assert_eq!(toks[0], Token::Hash);
        assert_eq!(toks[1], Token::Str("a count".to_string()));
        assert_eq!(toks[2], Token::Int(BigInt::from(1)));
    }

    #[test]
    fn test_bare_annotation_consumes_rest_of_line() {
        // Arrange / Act
        let toks = tokens("# a running total\n1");

        // Assert
        assert_eq!(toks[0], Token::Hash);
        assert_eq!(toks[1], Token::Str("a running total".to_string()));
        assert_eq!(toks[2], Token::Int(BigInt::from(1)));
    }

    #[test]
    fn test_keyword_table() {
        // Arrange / Act
        let toks = tokens("fun do end if elif else for in return break continue type oracle from and or not this");

        // Assert
        assert_eq!(
            toks,
            vec![
                Token::Fun,
                Token::Do,
                Token::End,
                Token::If,
                Token::Elif,
                Token::Else,
                Token::For,
                Token::In,
                Token::Return,
                Token::Break,
                Token::Continue,
                Token::Type,
                Token::Oracle,
                Token::From,
                Token::And,
                Token::Or,
                Token::Not,
                Token::This,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_then_lexes_as_do_for_backward_compatibility() {
        // Arrange / Act
        let toks = tokens("then");

        // Assert
        assert_eq!(toks[0], Token::Do);
    }
}
