//! Restricted arithmetic expression evaluator.
//!
//! The `/calc` flow evaluates text that originates from an untrusted
//! remote user, so the grammar is deliberately tiny: decimal literals,
//! the four arithmetic operators, unary minus, and parentheses. Anything
//! else (identifiers, calls, attribute access) is rejected at tokenize
//! time, before any evaluation happens.
//!
//! Grammar:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := NUMBER | '-' factor | '(' expr ')'
//! ```

use thiserror::Error;

/// Expression parse or evaluation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    #[error("unexpected character `{0}` in expression")]
    UnexpectedChar(char),

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("expression ended unexpectedly")]
    UnexpectedEnd,

    #[error("unexpected token `{0}`")]
    UnexpectedToken(String),

    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Plus => "+".into(),
            Self::Minus => "-".into(),
            Self::Star => "*".into(),
            Self::Slash => "/".into(),
            Self::LParen => "(".into(),
            Self::RParen => ")".into(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value: f64 = literal
                    .parse()
                    .map_err(|_| ExprError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            other => return Err(ExprError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.next();
                    value += self.term()?;
                }
                Token::Minus => {
                    self.next();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.next();
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.next();
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

    fn factor(&mut self) -> Result<f64, ExprError> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(ExprError::UnexpectedToken(other.describe())),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(other) => Err(ExprError::UnexpectedToken(other.describe())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

/// Evaluate a pure arithmetic expression.
pub fn evaluate(input: &str) -> Result<f64, ExprError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    match parser.next() {
        None => Ok(value),
        Some(trailing) => Err(ExprError::UnexpectedToken(trailing.describe())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_arithmetic() {
        assert_eq!(evaluate("100 + 50").unwrap(), 150.0);
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("7 / 2").unwrap(), 3.5);
        assert_eq!(evaluate("1.5 * 2").unwrap(), 3.0);
    }

    #[test]
    fn unary_minus() {
        assert_eq!(evaluate("-5 + 10").unwrap(), 5.0);
        assert_eq!(evaluate("2 * -3").unwrap(), -6.0);
    }

    #[test]
    fn identifiers_rejected_before_evaluation() {
        assert_eq!(
            evaluate("__import__('os')").unwrap_err(),
            ExprError::UnexpectedChar('_')
        );
        assert_eq!(evaluate("a + 1").unwrap_err(), ExprError::UnexpectedChar('a'));
        assert_eq!(
            evaluate("1 + x.y").unwrap_err(),
            ExprError::UnexpectedChar('x')
        );
    }

    #[test]
    fn malformed_input_rejected() {
        assert_eq!(evaluate("").unwrap_err(), ExprError::UnexpectedEnd);
        assert_eq!(evaluate("1 +").unwrap_err(), ExprError::UnexpectedEnd);
        assert_eq!(
            evaluate("1..2").unwrap_err(),
            ExprError::InvalidNumber("1..2".into())
        );
        assert_eq!(evaluate("(1 + 2").unwrap_err(), ExprError::UnexpectedEnd);
        assert!(matches!(
            evaluate("1 2").unwrap_err(),
            ExprError::UnexpectedToken(_)
        ));
    }

    #[test]
    fn division_by_zero_rejected() {
        assert_eq!(evaluate("1 / 0").unwrap_err(), ExprError::DivisionByZero);
        assert_eq!(
            evaluate("1 / (2 - 2)").unwrap_err(),
            ExprError::DivisionByZero
        );
    }
}
