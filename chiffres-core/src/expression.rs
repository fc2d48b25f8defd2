//! Arithmetic expression evaluation.
//!
//! Supports `+ - * /`, parentheses, unary signs and decimal numbers with the
//! usual precedence. Characters outside `[0-9+\-*/().]` and whitespace are
//! stripped first, and whitespace is then removed entirely, so `"1 2"` reads
//! as `12`.

use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// Why an expression has no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("Expression is empty")]
    Empty,
    #[error("Unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("Expression ends too early")]
    UnexpectedEnd,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Result is not a finite number")]
    NotFinite,
    #[error("Expression is nested more than {} levels deep", MAX_NESTING)]
    TooDeep,
}

/// Deepest run of parentheses and unary signs the parser accepts.
pub const MAX_NESTING: usize = 64;

/// Keep only arithmetic characters and drop whitespace.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.'))
        .collect()
}

/// Evaluate an arithmetic expression.
///
/// Never panics: empty input, malformed input, runaway nesting, division by
/// zero and overflow to infinity all come back as an [`ExprError`].
pub fn evaluate_expression(text: &str) -> Result<f64, ExprError> {
    let cleaned = sanitize(text);
    if cleaned.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser {
        chars: cleaned.chars().peekable(),
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(c) = parser.chars.next() {
        return Err(ExprError::UnexpectedChar(c));
    }
    if !value.is_finite() {
        return Err(ExprError::NotFinite);
    }
    Ok(value)
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    depth: usize,
}

impl Parser<'_> {
    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        while let Some(&op) = self.chars.peek() {
            match op {
                '+' => {
                    self.chars.next();
                    value += self.term()?;
                }
                '-' => {
                    self.chars.next();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.factor()?;
        while let Some(&op) = self.chars.peek() {
            match op {
                '*' => {
                    self.chars.next();
                    value *= self.factor()?;
                }
                '/' => {
                    self.chars.next();
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // factor := ('+' | '-') factor | number | '(' expr ')'
    fn factor(&mut self) -> Result<f64, ExprError> {
        if self.depth >= MAX_NESTING {
            return Err(ExprError::TooDeep);
        }
        self.depth += 1;
        let value = self.nested_factor();
        self.depth -= 1;
        value
    }

    fn nested_factor(&mut self) -> Result<f64, ExprError> {
        match self.chars.peek().copied() {
            None => Err(ExprError::UnexpectedEnd),
            Some('+') => {
                self.chars.next();
                self.factor()
            }
            Some('-') => {
                self.chars.next();
                Ok(-self.factor()?)
            }
            Some('(') => {
                self.chars.next();
                let value = self.expr()?;
                match self.chars.next() {
                    Some(')') => Ok(value),
                    Some(c) => Err(ExprError::UnexpectedChar(c)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(ExprError::UnexpectedChar(c)),
        }
    }

    fn number(&mut self) -> Result<f64, ExprError> {
        let mut literal = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                literal.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        literal
            .parse::<f64>()
            .map_err(|_| ExprError::InvalidNumber(literal))
    }
}
