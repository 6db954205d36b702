//! Evaluator tool — evaluates arithmetic expressions.
//!
//! Accepts only numeric literals, the operators `+ - * / // % **`, and
//! parentheses. Anything else is rejected before evaluation starts.
//! Uses a recursive-descent parser; no dependencies beyond std.

use async_trait::async_trait;
use docent_core::error::{ExecErrorKind, ToolError};
use docent_core::tool::Tool;

pub struct EvaluatorTool;

pub const EVALUATOR_TOOL_NAME: &str = "calculator";

#[async_trait]
impl Tool for EvaluatorTool {
    fn name(&self) -> &str {
        EVALUATOR_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression. Supports +, -, *, /, // (floor division), % (modulo), ** (power), parentheses, and decimal numbers."
    }

    fn input_param(&self) -> &str {
        "expression"
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let value = evaluate(input).map_err(|e| match e {
            EvalError::Invalid(reason) => ToolError::InvalidInput {
                tool: EVALUATOR_TOOL_NAME.into(),
                reason,
            },
            EvalError::DivisionByZero => ToolError::Execution {
                tool: EVALUATOR_TOOL_NAME.into(),
                kind: ExecErrorKind::DivisionByZero,
                reason: input.trim().to_string(),
            },
            EvalError::NonFinite => ToolError::Execution {
                tool: EVALUATOR_TOOL_NAME.into(),
                kind: ExecErrorKind::NonFinite,
                reason: input.trim().to_string(),
            },
        })?;

        Ok(format!("Result: {}", format_number(value)))
    }
}

/// Format without a trailing `.0` for integral values.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// ── Recursive-descent expression evaluator ────────────────────────────────

/// Why evaluation failed.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Rejected before evaluation: a foreign token or malformed syntax.
    Invalid(String),
    DivisionByZero,
    NonFinite,
}

/// Evaluate an arithmetic expression string.
pub fn evaluate(expr: &str) -> Result<f64, EvalError> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser::new(&tokens);
    let result = parser.parse_expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(EvalError::Invalid(format!(
            "unexpected token at position {}: {:?}",
            parser.pos, parser.tokens[parser.pos]
        )));
    }
    if !result.is_finite() {
        return Err(EvalError::NonFinite);
    }
    Ok(result)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    DblStar,
    Slash,
    DblSlash,
    Percent,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::DblStar);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    tokens.push(Token::DblSlash);
                    i += 2;
                } else {
                    tokens.push(Token::Slash);
                    i += 1;
                }
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let num_str: String = chars[start..i].iter().collect();
                let num: f64 = num_str
                    .parse()
                    .map_err(|_| EvalError::Invalid(format!("invalid number: {num_str}")))?;
                tokens.push(Token::Number(num));
            }
            c => return Err(EvalError::Invalid(format!("unexpected character: '{c}'"))),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<f64, EvalError> {
        let mut left = self.parse_term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.consume();
                    left += self.parse_term()?;
                }
                Token::Minus => {
                    self.consume();
                    left -= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // term = factor (('*' | '/' | '//' | '%') factor)*
    fn parse_term(&mut self) -> Result<f64, EvalError> {
        let mut left = self.parse_factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.consume();
                    left *= self.parse_factor()?;
                }
                Token::Slash => {
                    self.consume();
                    let right = self.parse_factor()?;
                    if right == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    left /= right;
                }
                Token::DblSlash => {
                    self.consume();
                    let right = self.parse_factor()?;
                    if right == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    left = (left / right).floor();
                }
                Token::Percent => {
                    self.consume();
                    let right = self.parse_factor()?;
                    if right == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    // floored modulo: the result takes the divisor's sign
                    left -= right * (left / right).floor();
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // factor = '-' factor | power
    fn parse_factor(&mut self) -> Result<f64, EvalError> {
        if let Some(Token::Minus) = self.peek() {
            self.consume();
            let val = self.parse_factor()?;
            return Ok(-val);
        }
        self.parse_power()
    }

    // power = primary ('**' factor)?   right-associative, binds tighter
    // than unary minus on its left: -2 ** 2 is -(2 ** 2)
    fn parse_power(&mut self) -> Result<f64, EvalError> {
        let base = self.parse_primary()?;
        if let Some(Token::DblStar) = self.peek() {
            self.consume();
            let exponent = self.parse_factor()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    // primary = NUMBER | '(' expr ')'
    fn parse_primary(&mut self) -> Result<f64, EvalError> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(*n),
            Some(Token::LParen) => {
                let val = self.parse_expr()?;
                match self.consume() {
                    Some(Token::RParen) => Ok(val),
                    _ => Err(EvalError::Invalid("expected closing parenthesis".into())),
                }
            }
            Some(tok) => Err(EvalError::Invalid(format!("unexpected token: {tok:?}"))),
            None => Err(EvalError::Invalid("unexpected end of expression".into())),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
