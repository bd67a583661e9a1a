//! Arithmetic expression evaluator
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/" | "%") unary)*
//! unary   := ("-" | "+") unary | power
//! power   := primary ("^" unary)?
//! primary := number | "(" expr ")"
//! ```
//!
//! `^` is right-associative and binds tighter than unary minus, so
//! `-2^2 == -4` and `2^3^2 == 512`.

use crate::Tool;
use agent_core::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

/// Why an expression could not be evaluated
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NotFinite,

    #[error("expression is empty")]
    Empty,

    #[error("expression nests deeper than 256 levels")]
    TooDeep,
}

/// Deepest nesting of parentheses and unary signs the parser accepts
pub const MAX_DEPTH: usize = 256;

/// Evaluate an arithmetic expression
///
/// ```
/// use agent_tools::builtin::calculator::evaluate;
///
/// assert_eq!(evaluate("15 * 23").unwrap(), 345.0);
/// assert_eq!(evaluate("(1 + 2) ^ 2 / 4").unwrap(), 2.25);
/// ```
pub fn evaluate(expression: &str) -> std::result::Result<f64, CalcError> {
    let mut parser = Parser {
        chars: expression.chars().collect(),
        pos: 0,
        depth: 0,
    };
    parser.skip_whitespace();
    if parser.peek().is_none() {
        return Err(CalcError::Empty);
    }

    let value = parser.expr()?;
    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(CalcError::UnexpectedChar(c, parser.pos));
    }
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NotFinite)
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Run `parse` one nesting level deeper
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> std::result::Result<T, CalcError>,
    ) -> std::result::Result<T, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Consume `c` if it is the next non-blank character
    fn eat(&mut self, c: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> std::result::Result<f64, CalcError> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                value += self.term()?;
            } else if self.eat('-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> std::result::Result<f64, CalcError> {
        let mut value = self.unary()?;
        loop {
            if self.eat('*') {
                value *= self.unary()?;
            } else if self.eat('/') {
                let divisor = self.unary()?;
                if divisor == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                value /= divisor;
            } else if self.eat('%') {
                let divisor = self.unary()?;
                if divisor == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                value %= divisor;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> std::result::Result<f64, CalcError> {
        if self.eat('-') {
            Ok(-self.nested(Self::unary)?)
        } else if self.eat('+') {
            self.nested(Self::unary)
        } else {
            self.power()
        }
    }

    fn power(&mut self) -> std::result::Result<f64, CalcError> {
        let base = self.primary()?;
        if self.eat('^') {
            let exponent = self.nested(Self::unary)?;
            Ok(base.powf(exponent))
        } else {
            Ok(base)
        }
    }

    fn primary(&mut self) -> std::result::Result<f64, CalcError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(CalcError::UnexpectedEnd),
            Some('(') => {
                self.pos += 1;
                let value = self.nested(Self::expr)?;
                if self.eat(')') {
                    Ok(value)
                } else {
                    match self.peek() {
                        Some(c) => Err(CalcError::UnexpectedChar(c, self.pos)),
                        None => Err(CalcError::UnexpectedEnd),
                    }
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(CalcError::UnexpectedChar(c, self.pos)),
        }
    }

    fn number(&mut self) -> std::result::Result<f64, CalcError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse().map_err(|_| CalcError::InvalidNumber(text))
    }
}

/// Whole numbers are reported as JSON integers
fn to_json_number(value: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if value.fract() == 0.0 && value.abs() < MAX_EXACT {
        json!(value as i64)
    } else {
        json!(value)
    }
}

#[derive(Debug, Deserialize)]
struct CalculatorParams {
    expression: String,
}

/// Evaluates arithmetic expressions
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: CalculatorParams = serde_json::from_value(params)
            .map_err(|e| Error::InvalidInput(format!("Invalid parameters: {e}")))?;

        let result = evaluate(&params.expression).map_err(|e| {
            Error::ProcessingFailed(format!("Cannot evaluate '{}': {e}", params.expression))
        })?;
        debug!(expression = %params.expression, result, "Evaluated expression");

        Ok(json!({
            "expression": params.expression,
            "result": to_json_number(result),
        }))
    }

    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression. Supports + - * / % ^, parentheses, \
         unary minus and decimal numbers."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Arithmetic expression, e.g. \"(15 * 23) + 7\""
                }
            },
            "required": ["expression"]
        })
    }
}
