//! Hand-written lexer for the expression language.
//!
//! Only breaks the source into `Token`s; `Player.X()` comes out as
//! `Ident("Player") Dot Ident("X") LParen RParen` and the parser decides
//! what it means.
//
//  Lexical items:
//
//      Ident    ::= letter (letter | digit | '_')*      (letters may be non-ASCII)
//      Number   ::= digit+ ('.' digit*)? | '.' digit+
//      Text     ::= '"' (char | '\"' | '\\')* '"'
//      Symbols  ::= + - * / ( ) [ ] , . ::
//      Whitespace is discarded.

use std::iter::Peekable;
use std::str::CharIndices;

use super::ExpressionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    /// Kept as written.
    Number(String),
    /// Unescaped content between the quotes.
    Text(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    DoubleColon,
    Eof,
}

impl Token {
    /// How the token reads in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("`{name}`"),
            Token::Number(number) => format!("number {number}"),
            Token::Text(_) => "text".to_string(),
            Token::Plus => "`+`".to_string(),
            Token::Minus => "`-`".to_string(),
            Token::Star => "`*`".to_string(),
            Token::Slash => "`/`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Dot => "`.`".to_string(),
            Token::DoubleColon => "`::`".to_string(),
            Token::Eof => "end of expression".to_string(),
        }
    }
}

/// A token and the byte offset where it starts.
pub type Spanned = (usize, Token);

#[derive(Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            finished: false,
        }
    }

    fn next_char(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F, buf: &mut String) {
        while let Some(c) = self.peek_char() {
            if pred(c) {
                buf.push(c);
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self, first: char) -> String {
        let mut id = String::new();
        id.push(first);
        self.consume_while(|c| c.is_alphanumeric() || c == '_', &mut id);
        id
    }

    fn read_number(&mut self, first: char) -> String {
        let mut num = String::new();
        num.push(first);
        self.consume_while(|c| c.is_ascii_digit(), &mut num);
        if first != '.' && self.peek_char() == Some('.') {
            num.push('.');
            self.next_char();
            self.consume_while(|c| c.is_ascii_digit(), &mut num);
        }
        num
    }

    fn read_text(&mut self, start: usize) -> Result<String, ExpressionError> {
        let mut txt = String::new();
        while let Some((_, c)) = self.next_char() {
            match c {
                '"' => return Ok(txt),
                '\\' => match self.peek_char() {
                    Some(escaped @ ('"' | '\\')) => {
                        txt.push(escaped);
                        self.next_char();
                    }
                    _ => txt.push('\\'),
                },
                c => txt.push(c),
            }
        }
        Err(ExpressionError::UnterminatedText { position: start })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Spanned, ExpressionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while self.peek_char().is_some_and(char::is_whitespace) {
            self.next_char();
        }

        let Some((start, ch)) = self.next_char() else {
            self.finished = true;
            return Some(Ok((self.src.len(), Token::Eof)));
        };

        let tok_res = match ch {
            '+' => Ok(Token::Plus),
            '-' => Ok(Token::Minus),
            '*' => Ok(Token::Star),
            '/' => Ok(Token::Slash),
            '(' => Ok(Token::LParen),
            ')' => Ok(Token::RParen),
            '[' => Ok(Token::LBracket),
            ']' => Ok(Token::RBracket),
            ',' => Ok(Token::Comma),
            ':' if self.peek_char() == Some(':') => {
                self.next_char();
                Ok(Token::DoubleColon)
            }
            '.' if self.peek_char().is_some_and(|c| c.is_ascii_digit()) => {
                Ok(Token::Number(self.read_number('.')))
            }
            '.' => Ok(Token::Dot),
            '"' => self.read_text(start).map(Token::Text),
            c if c.is_ascii_digit() => Ok(Token::Number(self.read_number(c))),
            c if c.is_alphabetic() || c == '_' => Ok(Token::Ident(self.read_identifier(c))),
            character => Err(ExpressionError::UnexpectedCharacter {
                character,
                position: start,
            }),
        };

        if tok_res.is_err() {
            self.finished = true;
        }
        Some(tok_res.map(|token| (start, token)))
    }
}
