use crate::ast::{Ast, Comparator, Token};
use crate::errors::CompileError;
use crate::lexer;

/// Parses an expression into its AST.
pub fn parse(expression: &str) -> Result<Ast, CompileError> {
    let tokens = lexer::tokenize(expression)?;
    Parser::new(tokens).parse()
}

/// Top-down operator precedence parser over a token buffer.
///
/// The core loop builds a left node with a null-denotation handler,
/// then keeps extending it with left-denotation handlers while the
/// next token's binding power exceeds the surrounding context's.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            position: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Ast, CompileError> {
        let ast = self.expression(0)?;
        match self.peek(0) {
            Token::Eof => Ok(ast),
            token => Err(CompileError::TrailingToken(token.clone())),
        }
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens.get(self.position + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens.get(self.position).cloned().unwrap_or(Token::Eof);
        self.position += 1;
        token
    }

    fn expect(&mut self, expected: &Token, context: &str) -> Result<(), CompileError> {
        if self.peek(0) == expected {
            self.position += 1;
            Ok(())
        } else {
            Err(CompileError::UnexpectedToken {
                expected: context.to_string(),
                got: self.peek(0).clone(),
            })
        }
    }

    fn expression(&mut self, rbp: usize) -> Result<Ast, CompileError> {
        let mut left = self.nud()?;
        while rbp < self.peek(0).lbp() {
            left = self.led(left)?;
        }
        Ok(left)
    }

    fn nud(&mut self) -> Result<Ast, CompileError> {
        match self.advance() {
            Token::At => Ok(Ast::Identity),
            Token::Identifier(name) => Ok(Ast::Field(name)),
            Token::QuotedIdentifier(name) => {
                if self.peek(0) == &Token::Lparen {
                    Err(CompileError::QuotedFunctionName(name))
                } else {
                    Ok(Ast::Field(name))
                }
            }
            Token::Literal(value) => Ok(Ast::Literal(value)),
            Token::Star => self.parse_wildcard_values(Ast::Identity),
            Token::Flatten => self.parse_flatten(Ast::Identity),
            Token::Filter => self.parse_filter(Ast::Identity),
            Token::Lbracket => {
                if matches!(self.peek(0), Token::Number(_) | Token::Colon) {
                    self.parse_index()
                } else if self.peek(0) == &Token::Star && self.peek(1) == &Token::Rbracket {
                    self.position += 2;
                    self.parse_wildcard_index(Ast::Identity)
                } else {
                    self.parse_multi_list()
                }
            }
            Token::Lbrace => self.parse_multi_hash(),
            Token::Ampersand => {
                let inner = self.expression(Token::Not.lbp())?;
                Ok(Ast::Expref(Box::new(inner)))
            }
            Token::Not => {
                let inner = self.expression(Token::Not.lbp())?;
                Ok(Ast::Not(Box::new(inner)))
            }
            Token::Lparen => {
                let inner = self.expression(0)?;
                self.expect(&Token::Rparen, "')'")?;
                Ok(inner)
            }
            token => Err(CompileError::UnexpectedToken {
                expected: "an expression".to_string(),
                got: token,
            }),
        }
    }

    fn led(&mut self, left: Ast) -> Result<Ast, CompileError> {
        match self.advance() {
            Token::Dot => {
                if self.peek(0) == &Token::Star {
                    self.position += 1;
                    self.parse_wildcard_values(left)
                } else {
                    let rhs = self.parse_dot(Token::Dot.lbp())?;
                    Ok(Ast::Subexpr {
                        lhs: Box::new(left),
                        rhs: Box::new(rhs),
                    })
                }
            }
            Token::Lbracket => {
                if matches!(self.peek(0), Token::Number(_) | Token::Colon) {
                    let rhs = self.parse_index()?;
                    Ok(Ast::Subexpr {
                        lhs: Box::new(left),
                        rhs: Box::new(rhs),
                    })
                } else {
                    self.expect(&Token::Star, "'*' after '['")?;
                    self.expect(&Token::Rbracket, "']' after wildcard index")?;
                    self.parse_wildcard_index(left)
                }
            }
            Token::Flatten => self.parse_flatten(left),
            Token::Filter => self.parse_filter(left),
            Token::Pipe => {
                let rhs = self.expression(Token::Pipe.lbp())?;
                Ok(Ast::Subexpr {
                    lhs: Box::new(left),
                    rhs: Box::new(rhs),
                })
            }
            Token::Or => {
                let rhs = self.expression(Token::Or.lbp())?;
                Ok(Ast::Or {
                    lhs: Box::new(left),
                    rhs: Box::new(rhs),
                })
            }
            Token::And => {
                let rhs = self.expression(Token::And.lbp())?;
                Ok(Ast::And {
                    lhs: Box::new(left),
                    rhs: Box::new(rhs),
                })
            }
            Token::Eq => self.parse_comparator(Comparator::Eq, left),
            Token::Ne => self.parse_comparator(Comparator::Ne, left),
            Token::Lt => self.parse_comparator(Comparator::Lt, left),
            Token::Lte => self.parse_comparator(Comparator::Lte, left),
            Token::Gt => self.parse_comparator(Comparator::Gt, left),
            Token::Gte => self.parse_comparator(Comparator::Gte, left),
            Token::Lparen => match left {
                Ast::Field(name) => self.parse_function(name),
                _ => Err(CompileError::UnexpectedToken {
                    expected: "a function name before '('".to_string(),
                    got: Token::Lparen,
                }),
            },
            token => Err(CompileError::UnexpectedToken {
                expected: "an operator".to_string(),
                got: token,
            }),
        }
    }

    /// `*` over object values: the wildcard itself projects, and the
    /// projection tail is parsed at the wildcard's binding power.
    fn parse_wildcard_values(&mut self, lhs: Ast) -> Result<Ast, CompileError> {
        let rhs = self.projection_rhs(Token::Star.lbp())?;
        Ok(Ast::Projection {
            lhs: Box::new(Ast::ObjectValues(Box::new(lhs))),
            rhs: Box::new(rhs),
        })
    }

    /// `[*]` over array elements.
    fn parse_wildcard_index(&mut self, lhs: Ast) -> Result<Ast, CompileError> {
        let rhs = self.projection_rhs(Token::Star.lbp())?;
        Ok(Ast::Projection {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_flatten(&mut self, lhs: Ast) -> Result<Ast, CompileError> {
        let rhs = self.projection_rhs(Token::Flatten.lbp())?;
        Ok(Ast::Projection {
            lhs: Box::new(Ast::Flatten(Box::new(lhs))),
            rhs: Box::new(rhs),
        })
    }

    fn parse_filter(&mut self, lhs: Ast) -> Result<Ast, CompileError> {
        let predicate = self.expression(0)?;
        self.expect(&Token::Rbracket, "']' after filter predicate")?;
        let then = self.projection_rhs(Token::Filter.lbp())?;
        Ok(Ast::Projection {
            lhs: Box::new(lhs),
            rhs: Box::new(Ast::Condition {
                predicate: Box::new(predicate),
                then: Box::new(then),
            }),
        })
    }

    /// The right side of a `.`: either a multi-select list, or a plain
    /// expression restricted to tokens that may follow a dot.
    fn parse_dot(&mut self, lbp: usize) -> Result<Ast, CompileError> {
        match self.peek(0) {
            Token::Lbracket => {
                self.position += 1;
                self.parse_multi_list()
            }
            Token::Identifier(_)
            | Token::QuotedIdentifier(_)
            | Token::Star
            | Token::Lbrace
            | Token::Ampersand
            | Token::Filter => self.expression(lbp),
            token => Err(CompileError::UnexpectedToken {
                expected: "an identifier, '*', '{', '[', '&', or '[?' after '.'".to_string(),
                got: token.clone(),
            }),
        }
    }

    /// Consumes the tail of a projection. A `.` continues into a
    /// dot-RHS, `[` and `[?` continue as expressions, and any token
    /// that binds looser than a projection ends the tail with an
    /// identity node.
    fn projection_rhs(&mut self, lbp: usize) -> Result<Ast, CompileError> {
        match self.peek(0) {
            Token::Dot => {
                self.position += 1;
                self.parse_dot(lbp)
            }
            Token::Lbracket | Token::Filter => self.expression(lbp),
            token if token.lbp() < 10 => Ok(Ast::Identity),
            token => Err(CompileError::UnexpectedToken {
                expected: "'.', '[', or '[?' after a projection".to_string(),
                got: token.clone(),
            }),
        }
    }

    /// An index or slice after `[`. A single number closes as a plain
    /// index; any `:` builds a slice, which projects over its result.
    fn parse_index(&mut self) -> Result<Ast, CompileError> {
        let mut parts: [Option<i64>; 3] = [None, None, None];
        let mut pos = 0;
        loop {
            match self.advance() {
                Token::Rbracket => break,
                Token::Number(value) => {
                    if parts[pos].is_some() {
                        return Err(CompileError::UnexpectedToken {
                            expected: "':' or ']'".to_string(),
                            got: Token::Number(value),
                        });
                    }
                    parts[pos] = Some(value);
                }
                Token::Colon => {
                    pos += 1;
                    if pos > 2 {
                        return Err(CompileError::UnexpectedToken {
                            expected: "at most two ':' in a slice".to_string(),
                            got: Token::Colon,
                        });
                    }
                }
                token => {
                    return Err(CompileError::UnexpectedToken {
                        expected: "a number, ':', or ']'".to_string(),
                        got: token,
                    })
                }
            }
        }
        if pos == 0 {
            // dispatch guarantees a leading number when no ':' was seen
            Ok(Ast::Index(parts[0].unwrap_or(0)))
        } else {
            let step = parts[2].unwrap_or(1);
            if step == 0 {
                return Err(CompileError::ZeroSliceStep);
            }
            let slice = Ast::Slice {
                start: parts[0],
                stop: parts[1],
                step,
            };
            let rhs = self.projection_rhs(Token::Star.lbp())?;
            Ok(Ast::Projection {
                lhs: Box::new(slice),
                rhs: Box::new(rhs),
            })
        }
    }

    fn parse_multi_list(&mut self) -> Result<Ast, CompileError> {
        let mut items = Vec::new();
        loop {
            items.push(self.expression(0)?);
            if self.peek(0) == &Token::Rbracket {
                self.position += 1;
                break;
            }
            self.expect(&Token::Comma, "',' or ']' in a multi-select list")?;
        }
        Ok(Ast::MultiList(items))
    }

    fn parse_multi_hash(&mut self) -> Result<Ast, CompileError> {
        let mut pairs: Vec<(String, Ast)> = Vec::new();
        loop {
            let key = match self.advance() {
                Token::Identifier(name) | Token::QuotedIdentifier(name) => name,
                token => {
                    return Err(CompileError::UnexpectedToken {
                        expected: "an identifier key".to_string(),
                        got: token,
                    })
                }
            };
            self.expect(&Token::Colon, "':' after an object key")?;
            let value = self.expression(0)?;
            // duplicate keys keep the last occurrence
            if let Some(entry) = pairs.iter_mut().find(|(existing, _)| *existing == key) {
                entry.1 = value;
            } else {
                pairs.push((key, value));
            }
            if self.peek(0) == &Token::Rbrace {
                self.position += 1;
                break;
            }
            self.expect(&Token::Comma, "',' or '}' in a multi-select hash")?;
        }
        Ok(Ast::MultiHash(pairs))
    }

    fn parse_function(&mut self, name: String) -> Result<Ast, CompileError> {
        let mut args = Vec::new();
        while self.peek(0) != &Token::Rparen {
            args.push(self.expression(0)?);
            if self.peek(0) != &Token::Rparen {
                self.expect(&Token::Comma, "',' or ')' in an argument list")?;
            }
        }
        self.position += 1;
        Ok(Ast::Function { name, args })
    }

    fn parse_comparator(&mut self, comparator: Comparator, lhs: Ast) -> Result<Ast, CompileError> {
        let rhs = self.expression(Token::Eq.lbp())?;
        Ok(Ast::Comparison {
            comparator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }
}
