//! Recursive-descent parser turning lexer tokens into a `Node` tree.
//
//      expr      ::= term (('+' | '-') term)*
//      term      ::= unary (('*' | '/') unary)*
//      unary     ::= ('-' | '+') unary | primary
//      primary   ::= NUMBER | TEXT | '(' expr ')' | name
//      name      ::= IDENT ('::' IDENT)* '(' args ')'
//                  | IDENT '.' IDENT '(' args ')'
//                  | IDENT '.' IDENT '::' IDENT '(' args ')'
//                  | IDENT accessor*
//      accessor  ::= '.' IDENT | '[' expr ']'
//      args      ::= [expr] (',' [expr])*

use std::iter::Peekable;
use std::vec::IntoIter;

use super::ExpressionError;
use super::ast::{Accessor, BinaryOp, FunctionCall, Node, UnaryOp};
use super::lexer::{Lexer, Spanned, Token};

/// Deepest tree the parser builds. Parentheses, arguments, indexes and
/// operators each count as one level.
pub const MAX_NESTING: usize = 128;

/// Parses a whole expression. Blank input gives `Node::Empty`.
pub fn parse(src: &str) -> Result<Node, ExpressionError> {
    let tokens: Vec<Spanned> = Lexer::new(src).collect::<Result<_, _>>()?;
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        depth: 0,
    };

    if parser.peek() == &Token::Eof {
        return Ok(Node::Empty);
    }
    let node = parser.parse_expr()?;
    parser.expect(Token::Eof, "an operator or the end of the expression")?;
    Ok(node)
}

struct Parser {
    tokens: Peekable<IntoIter<Spanned>>,
    /// Levels above the node being parsed.
    depth: usize,
}

impl Parser {
    fn peek(&mut self) -> &Token {
        // The lexer always ends with `Eof`, which is never consumed twice.
        self.tokens.peek().map(|(_, token)| token).unwrap_or(&Token::Eof)
    }

    fn position(&mut self) -> usize {
        self.tokens.peek().map(|(position, _)| *position).unwrap_or(0)
    }

    fn advance(&mut self) -> Token {
        self.tokens.next().map(|(_, token)| token).unwrap_or(Token::Eof)
    }

    fn unexpected(&mut self, expected: &str) -> ExpressionError {
        ExpressionError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.peek().describe(),
            position: self.position(),
        }
    }

    fn expect(&mut self, wanted: Token, expected: &str) -> Result<(), ExpressionError> {
        if self.peek() == &wanted {
            if wanted != Token::Eof {
                self.advance();
            }
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<String, ExpressionError> {
        match self.tokens.next_if(|(_, token)| matches!(token, Token::Ident(_))) {
            Some((_, Token::Ident(name))) => Ok(name),
            _ => Err(self.unexpected(expected)),
        }
    }

    fn nest(&mut self) -> Result<(), ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ExpressionError::TooDeep {
                max: MAX_NESTING,
                position: self.position(),
            });
        }
        Ok(())
    }

    fn parse_expr(&mut self) -> Result<Node, ExpressionError> {
        let outer = self.depth;
        self.nest()?;
        let mut node = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            self.nest()?;
            let right = self.parse_term()?;
            node = Node::Binary(op, Box::new(node), Box::new(right));
        }
        self.depth = outer;
        Ok(node)
    }

    fn parse_term(&mut self) -> Result<Node, ExpressionError> {
        let outer = self.depth;
        let mut node = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            self.nest()?;
            let right = self.parse_unary()?;
            node = Node::Binary(op, Box::new(node), Box::new(right));
        }
        self.depth = outer;
        Ok(node)
    }

    fn parse_unary(&mut self) -> Result<Node, ExpressionError> {
        let outer = self.depth;
        let mut ops = Vec::new();
        loop {
            let op = match self.peek() {
                Token::Minus => UnaryOp::Minus,
                Token::Plus => UnaryOp::Plus,
                _ => break,
            };
            self.advance();
            self.nest()?;
            ops.push(op);
        }
        let mut node = self.parse_primary()?;
        for op in ops.into_iter().rev() {
            node = Node::Unary(op, Box::new(node));
        }
        self.depth = outer;
        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<Node, ExpressionError> {
        match self.peek().clone() {
            Token::Number(number) => {
                self.advance();
                Ok(Node::Number(number))
            }
            Token::Text(text) => {
                self.advance();
                Ok(Node::Text(text))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "`)`")?;
                Ok(Node::Group(Box::new(inner)))
            }
            Token::Ident(_) => self.parse_name(),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn parse_name(&mut self) -> Result<Node, ExpressionError> {
        let first = self.expect_ident("a name")?;

        match self.peek() {
            Token::DoubleColon => {
                let mut name = first;
                while self.peek() == &Token::DoubleColon {
                    self.advance();
                    name.push_str("::");
                    name.push_str(&self.expect_ident("a function name")?);
                }
                let args = self.parse_args()?;
                Ok(Node::Call(FunctionCall {
                    object: None,
                    behavior: None,
                    name,
                    args,
                }))
            }
            Token::LParen => {
                let args = self.parse_args()?;
                Ok(Node::Call(FunctionCall {
                    object: None,
                    behavior: None,
                    name: first,
                    args,
                }))
            }
            Token::Dot => {
                self.advance();
                let member = self.expect_ident("a member name")?;
                match self.peek() {
                    Token::LParen => {
                        let args = self.parse_args()?;
                        Ok(Node::Call(FunctionCall {
                            object: Some(first),
                            behavior: None,
                            name: member,
                            args,
                        }))
                    }
                    Token::DoubleColon => {
                        self.advance();
                        let name = self.expect_ident("a behavior function name")?;
                        let args = self.parse_args()?;
                        Ok(Node::Call(FunctionCall {
                            object: Some(first),
                            behavior: Some(member),
                            name,
                            args,
                        }))
                    }
                    _ => {
                        let mut accessors = vec![Accessor::Child(member)];
                        accessors.extend(self.parse_accessors()?);
                        Ok(Node::Identifier {
                            name: first,
                            accessors,
                        })
                    }
                }
            }
            _ => {
                let accessors = self.parse_accessors()?;
                Ok(Node::Identifier {
                    name: first,
                    accessors,
                })
            }
        }
    }

    fn parse_accessors(&mut self) -> Result<Vec<Accessor>, ExpressionError> {
        let mut accessors = Vec::new();
        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    accessors.push(Accessor::Child(self.expect_ident("a child name")?));
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(Token::RBracket, "`]`")?;
                    accessors.push(Accessor::Index(Box::new(index)));
                }
                _ => return Ok(accessors),
            }
        }
    }

    /// `( … )` after a function name, empty arguments included.
    fn parse_args(&mut self) -> Result<Vec<Node>, ExpressionError> {
        self.expect(Token::LParen, "`(`")?;
        let mut args = Vec::new();
        if self.peek() == &Token::RParen {
            self.advance();
            return Ok(args);
        }
        loop {
            let arg = match self.peek() {
                Token::Comma | Token::RParen => Node::Empty,
                _ => self.parse_expr()?,
            };
            args.push(arg);
            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                Token::RParen => {
                    self.advance();
                    return Ok(args);
                }
                _ => return Err(self.unexpected("`,` or `)`")),
            }
        }
    }
}
