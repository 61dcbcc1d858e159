//! Recursive-descent parser for formula bodies.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! comparison := additive (('=' | '<>' | '<' | '<=' | '>' | '>=') additive)?
//! additive   := term (('+' | '-') term)*
//! term       := unary (('*' | '/') unary)*
//! unary      := ('-' | '+') unary | primary
//! primary    := NUMBER | STRING | TRUE | FALSE
//!             | CELL (':' CELL)?
//!             | IDENT '(' (comparison (',' comparison)*)? ')'
//!             | '(' comparison ')'
//! ```
//!
//! Only these productions exist, so a formula can reference cells, call the
//! fixed built-ins, and do arithmetic and comparisons, and nothing else.

use super::cell_ref::CellRef;
use super::lexer::{Token, tokenize};
use super::range::CellRange;
use crate::error::{EvalError, EvalResult};

/// Nesting limit for parentheses, calls and unary operators.
const MAX_DEPTH: usize = 64;

/// Upper bound on formula length in tokens.
pub const MAX_TOKENS: usize = 4096;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    Bool(bool),
    Cell(CellRef),
    Range(CellRange),
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Neg(Box<Expr>),
    /// `first op operand op operand ...` for one precedence level of `+ -`
    /// or `* /`, applied left to right. Stored flat so a long chain never
    /// nests.
    Chain {
        first: Box<Expr>,
        rest: Vec<(BinaryOp, Expr)>,
    },
    /// A single comparison.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Parse a formula body (the text after `=`) into an expression tree.
pub fn parse_expression(body: &str) -> EvalResult<Expr> {
    let tokens = tokenize(body)?;
    if tokens.is_empty() {
        return Err(EvalError::Parse("Empty formula".to_string()));
    }
    if tokens.len() > MAX_TOKENS {
        return Err(EvalError::Parse("Formula is too long".to_string()));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.comparison()?;

    if let Some(token) = parser.peek() {
        return Err(EvalError::Parse(format!(
            "Unexpected {:?} after expression",
            token
        )));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> EvalResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(EvalError::Parse(match self.peek() {
                Some(found) => format!("Expected {:?}, found {:?}", expected, found),
                None => format!("Expected {:?}, found end of formula", expected),
            }))
        }
    }

    fn enter(&mut self) -> EvalResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::Parse("Formula is nested too deeply".to_string()));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn comparison(&mut self) -> EvalResult<Expr> {
        let left = self.additive()?;
        let op = match self.peek() {
            Some(Token::Eq) => BinaryOp::Eq,
            Some(Token::Ne) => BinaryOp::Ne,
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::Le) => BinaryOp::Le,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::Ge) => BinaryOp::Ge,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.additive()?;
        Ok(binary(op, left, right))
    }

    fn additive(&mut self) -> EvalResult<Expr> {
        let first = self.term()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(chain(first, rest)),
            };
            self.pos += 1;
            rest.push((op, self.term()?));
        }
    }

    fn term(&mut self) -> EvalResult<Expr> {
        let first = self.unary()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(chain(first, rest)),
            };
            self.pos += 1;
            rest.push((op, self.unary()?));
        }
    }

    fn unary(&mut self) -> EvalResult<Expr> {
        if self.eat(&Token::Minus) {
            self.enter()?;
            let inner = self.unary()?;
            self.leave();
            return Ok(Expr::Neg(Box::new(inner)));
        }
        if self.eat(&Token::Plus) {
            self.enter()?;
            let inner = self.unary()?;
            self.leave();
            return Ok(inner);
        }
        self.primary()
    }

    fn primary(&mut self) -> EvalResult<Expr> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Str(s)) => Ok(Expr::Text(s)),
            Some(Token::Cell(start)) => {
                if self.eat(&Token::Colon) {
                    match self.advance() {
                        Some(Token::Cell(end)) => Ok(Expr::Range(CellRange::new(start, end))),
                        _ => Err(EvalError::Parse(format!(
                            "Expected a cell after '{}:'",
                            start
                        ))),
                    }
                } else {
                    Ok(Expr::Cell(start))
                }
            }
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LParen) {
                    self.enter()?;
                    let args = self.arguments()?;
                    self.leave();
                    Ok(Expr::Call { name, args })
                } else {
                    match name.as_str() {
                        "TRUE" => Ok(Expr::Bool(true)),
                        "FALSE" => Ok(Expr::Bool(false)),
                        _ => Err(EvalError::Parse(format!("Unknown name '{}'", name))),
                    }
                }
            }
            Some(Token::LParen) => {
                self.enter()?;
                let inner = self.comparison()?;
                self.expect(&Token::RParen)?;
                self.leave();
                Ok(inner)
            }
            Some(token) => Err(EvalError::Parse(format!("Unexpected {:?}", token))),
            None => Err(EvalError::Parse("Unexpected end of formula".to_string())),
        }
    }

    /// Arguments after the opening parenthesis, consuming the closing one.
    fn arguments(&mut self) -> EvalResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.comparison()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RParen)?;
            return Ok(args);
        }
    }
}

fn chain(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    if rest.is_empty() {
        first
    } else {
        Expr::Chain {
            first: Box::new(first),
            rest,
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
