use crate::ast::Token;
use crate::errors::CompileError;
use crate::value::Value;

/// Tokenizes an expression, returning the token stream terminated by
/// [`Token::Eof`].
pub fn tokenize(expression: &str) -> Result<Vec<Token>, CompileError> {
    Lexer::new(expression).tokenize()
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if matches!(ch, ' ' | '\t' | '\n' | '\r') {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_number(&mut self) -> Result<Token, CompileError> {
        let start = self.position;
        let mut text = String::new();
        if self.current_char() == Some('-') {
            text.push('-');
            self.advance();
        }
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        match text.parse::<i64>() {
            Ok(value) => Ok(Token::Number(value)),
            Err(_) => Err(CompileError::InvalidNumber {
                text,
                position: start,
            }),
        }
    }

    /// Reads the body between `delimiter` pairs, keeping `\x` escape
    /// pairs intact so the caller can decode them. The opening
    /// delimiter must be the current character.
    fn read_delimited(&mut self, delimiter: char) -> Result<String, CompileError> {
        let start = self.position;
        self.advance();
        let mut body = String::new();
        while let Some(ch) = self.current_char() {
            if ch == delimiter {
                self.advance();
                return Ok(body);
            }
            if ch == '\\' {
                body.push(ch);
                self.advance();
                if let Some(escaped) = self.current_char() {
                    body.push(escaped);
                    self.advance();
                }
                continue;
            }
            body.push(ch);
            self.advance();
        }
        Err(CompileError::UnterminatedDelimiter {
            delimiter,
            position: start,
        })
    }

    /// A `"…"` quoted identifier: the body is decoded as a JSON string,
    /// so the full JSON escape set is honored.
    fn read_quoted_identifier(&mut self) -> Result<Token, CompileError> {
        let start = self.position;
        let raw = self.read_delimited('"')?;
        match serde_json::from_str::<String>(&format!("\"{}\"", raw)) {
            Ok(name) => Ok(Token::QuotedIdentifier(name)),
            Err(e) => Err(CompileError::InvalidLiteral {
                message: e.to_string(),
                position: start,
            }),
        }
    }

    /// A `'…'` raw string: only `\'` is an escape; every other
    /// backslash is kept verbatim.
    fn read_raw_string(&mut self) -> Result<Token, CompileError> {
        let start = self.position;
        self.advance();
        let mut body = String::new();
        while let Some(ch) = self.current_char() {
            match ch {
                '\'' => {
                    self.advance();
                    return Ok(Token::Literal(Value::String(body)));
                }
                '\\' if self.peek_char(1) == Some('\'') => {
                    body.push('\'');
                    self.advance();
                    self.advance();
                }
                _ => {
                    body.push(ch);
                    self.advance();
                }
            }
        }
        Err(CompileError::UnterminatedDelimiter {
            delimiter: '\'',
            position: start,
        })
    }

    /// A `` `…` `` literal: after unescaping `` \` ``, the body must
    /// parse as a JSON value.
    fn read_literal(&mut self) -> Result<Token, CompileError> {
        let start = self.position;
        self.advance();
        let mut body = String::new();
        while let Some(ch) = self.current_char() {
            match ch {
                '`' => {
                    self.advance();
                    return match serde_json::from_str::<serde_json::Value>(&body) {
                        Ok(value) => Ok(Token::Literal(Value::from(value))),
                        Err(e) => Err(CompileError::InvalidLiteral {
                            message: e.to_string(),
                            position: start,
                        }),
                    };
                }
                '\\' if self.peek_char(1) == Some('`') => {
                    body.push('`');
                    self.advance();
                    self.advance();
                }
                _ => {
                    body.push(ch);
                    self.advance();
                }
            }
        }
        Err(CompileError::UnterminatedDelimiter {
            delimiter: '`',
            position: start,
        })
    }

    fn next_token(&mut self) -> Result<Token, CompileError> {
        self.skip_whitespace();

        let ch = match self.current_char() {
            None => return Ok(Token::Eof),
            Some(ch) => ch,
        };

        match ch {
            c if c.is_ascii_alphabetic() || c == '_' => {
                Ok(Token::Identifier(self.read_identifier()))
            }
            c if c.is_ascii_digit() => self.read_number(),
            '-' => {
                if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.read_number()
                } else {
                    Err(CompileError::UnexpectedCharacter {
                        ch: '-',
                        position: self.position,
                    })
                }
            }
            '"' => self.read_quoted_identifier(),
            '\'' => self.read_raw_string(),
            '`' => self.read_literal(),
            '.' => {
                self.advance();
                Ok(Token::Dot)
            }
            '*' => {
                self.advance();
                Ok(Token::Star)
            }
            '@' => {
                self.advance();
                Ok(Token::At)
            }
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            ':' => {
                self.advance();
                Ok(Token::Colon)
            }
            '[' => match self.peek_char(1) {
                Some(']') => {
                    self.advance();
                    self.advance();
                    Ok(Token::Flatten)
                }
                Some('?') => {
                    self.advance();
                    self.advance();
                    Ok(Token::Filter)
                }
                _ => {
                    self.advance();
                    Ok(Token::Lbracket)
                }
            },
            ']' => {
                self.advance();
                Ok(Token::Rbracket)
            }
            '(' => {
                self.advance();
                Ok(Token::Lparen)
            }
            ')' => {
                self.advance();
                Ok(Token::Rparen)
            }
            '{' => {
                self.advance();
                Ok(Token::Lbrace)
            }
            '}' => {
                self.advance();
                Ok(Token::Rbrace)
            }
            '|' => {
                if self.peek_char(1) == Some('|') {
                    self.advance();
                    self.advance();
                    Ok(Token::Or)
                } else {
                    self.advance();
                    Ok(Token::Pipe)
                }
            }
            '&' => {
                if self.peek_char(1) == Some('&') {
                    self.advance();
                    self.advance();
                    Ok(Token::And)
                } else {
                    self.advance();
                    Ok(Token::Ampersand)
                }
            }
            '=' => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::Eq)
                } else {
                    Err(CompileError::BareEquals {
                        position: self.position,
                    })
                }
            }
            '!' => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::Ne)
                } else {
                    self.advance();
                    Ok(Token::Not)
                }
            }
            '>' => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::Gte)
                } else {
                    self.advance();
                    Ok(Token::Gt)
                }
            }
            '<' => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::Lte)
                } else {
                    self.advance();
                    Ok(Token::Lt)
                }
            }
            other => Err(CompileError::UnexpectedCharacter {
                ch: other,
                position: self.position,
            }),
        }
    }
}

#[test]
fn test_bracket_lookahead() {
    let tokens = tokenize("[] [? [").unwrap();
    assert_eq!(
        tokens,
        vec![Token::Flatten, Token::Filter, Token::Lbracket, Token::Eof]
    );
}

#[test]
fn test_bare_equals_is_rejected() {
    let err = tokenize("a = b").unwrap_err();
    assert_eq!(err, CompileError::BareEquals { position: 2 });
}
