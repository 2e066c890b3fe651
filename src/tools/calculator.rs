//! Arithmetic calculator tool.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Tool;

/// Evaluates arithmetic expressions.
pub struct Calculator;

#[async_trait]
impl Tool for Calculator {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression. Supports + - * / % ^, parentheses, the constants pi and e, and the functions sqrt, abs, sin, cos, tan, ln, log and exp."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The expression to evaluate, e.g. '2 * (3 + 4)'"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let expression = args["expression"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'expression' argument"))?;

        let value = evaluate(expression)?;
        Ok(format!("{} = {}", expression.trim(), format_number(value)))
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
}

fn lex(input: &str) -> anyhow::Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut num = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        num.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n = num
                    .parse::<f64>()
                    .map_err(|_| anyhow::anyhow!("invalid number: {}", num))?;
                tokens.push(Token::Number(n));
            }
            c if c.is_ascii_alphabetic() => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident.to_ascii_lowercase()));
            }
            '*' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::Caret);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '+' => {
                tokens.push(Token::Plus);
                chars.next();
            }
            '-' => {
                tokens.push(Token::Minus);
                chars.next();
            }
            '/' => {
                tokens.push(Token::Slash);
                chars.next();
            }
            '%' => {
                tokens.push(Token::Percent);
                chars.next();
            }
            '^' => {
                tokens.push(Token::Caret);
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            other => anyhow::bail!("unexpected character '{}'", other),
        }
    }

    Ok(tokens)
}

/// Nesting limit for parentheses, unary signs and exponents.
const MAX_DEPTH: usize = 64;

/// Evaluate an arithmetic expression string.
pub fn evaluate(input: &str) -> anyhow::Result<f64> {
    let tokens = lex(input)?;
    if tokens.is_empty() {
        anyhow::bail!("empty expression");
    }
    let mut pos = 0;
    let result = parse_expr(&tokens, &mut pos, 0)?;
    if pos != tokens.len() {
        anyhow::bail!("unexpected tokens after expression");
    }
    if !result.is_finite() {
        anyhow::bail!("result is not a finite number");
    }
    Ok(result)
}

fn check_depth(depth: usize) -> anyhow::Result<()> {
    if depth > MAX_DEPTH {
        anyhow::bail!("expression nested too deeply");
    }
    Ok(())
}

/// Addition and subtraction.
fn parse_expr(tokens: &[Token], pos: &mut usize, depth: usize) -> anyhow::Result<f64> {
    check_depth(depth)?;
    let mut left = parse_term(tokens, pos, depth)?;
    while let Some(token) = tokens.get(*pos) {
        match token {
            Token::Plus => {
                *pos += 1;
                left += parse_term(tokens, pos, depth)?;
            }
            Token::Minus => {
                *pos += 1;
                left -= parse_term(tokens, pos, depth)?;
            }
            _ => break,
        }
    }
    Ok(left)
}

/// Multiplication, division and modulo.
fn parse_term(tokens: &[Token], pos: &mut usize, depth: usize) -> anyhow::Result<f64> {
    let mut left = parse_unary(tokens, pos, depth)?;
    while let Some(token) = tokens.get(*pos) {
        match token {
            Token::Star => {
                *pos += 1;
                left *= parse_unary(tokens, pos, depth)?;
            }
            Token::Slash => {
                *pos += 1;
                let right = parse_unary(tokens, pos, depth)?;
                if right == 0.0 {
                    anyhow::bail!("division by zero");
                }
                left /= right;
            }
            Token::Percent => {
                *pos += 1;
                let right = parse_unary(tokens, pos, depth)?;
                if right == 0.0 {
                    anyhow::bail!("modulo by zero");
                }
                left %= right;
            }
            _ => break,
        }
    }
    Ok(left)
}

/// Unary minus binds looser than `^`, so `-2^2` is `-4`.
fn parse_unary(tokens: &[Token], pos: &mut usize, depth: usize) -> anyhow::Result<f64> {
    check_depth(depth)?;
    match tokens.get(*pos) {
        Some(Token::Minus) => {
            *pos += 1;
            Ok(-parse_unary(tokens, pos, depth + 1)?)
        }
        Some(Token::Plus) => {
            *pos += 1;
            parse_unary(tokens, pos, depth + 1)
        }
        _ => parse_power(tokens, pos, depth),
    }
}

/// Right-associative exponentiation.
fn parse_power(tokens: &[Token], pos: &mut usize, depth: usize) -> anyhow::Result<f64> {
    let base = parse_primary(tokens, pos, depth)?;
    if tokens.get(*pos) == Some(&Token::Caret) {
        *pos += 1;
        let exponent = parse_unary(tokens, pos, depth + 1)?;
        return Ok(base.powf(exponent));
    }
    Ok(base)
}

fn parse_primary(tokens: &[Token], pos: &mut usize, depth: usize) -> anyhow::Result<f64> {
    let token = tokens
        .get(*pos)
        .ok_or_else(|| anyhow::anyhow!("unexpected end of expression"))?;

    match token {
        Token::Number(n) => {
            *pos += 1;
            Ok(*n)
        }
        Token::LParen => {
            *pos += 1;
            let val = parse_expr(tokens, pos, depth + 1)?;
            expect_rparen(tokens, pos)?;
            Ok(val)
        }
        Token::Ident(name) => {
            *pos += 1;
            match name.as_str() {
                "pi" => Ok(std::f64::consts::PI),
                "e" => Ok(std::f64::consts::E),
                _ => {
                    if tokens.get(*pos) != Some(&Token::LParen) {
                        anyhow::bail!("unknown identifier '{}'", name);
                    }
                    *pos += 1;
                    let arg = parse_expr(tokens, pos, depth + 1)?;
                    expect_rparen(tokens, pos)?;
                    apply_function(name, arg)
                }
            }
        }
        _ => anyhow::bail!("unexpected token"),
    }
}

fn expect_rparen(tokens: &[Token], pos: &mut usize) -> anyhow::Result<()> {
    if tokens.get(*pos) != Some(&Token::RParen) {
        anyhow::bail!("missing closing parenthesis");
    }
    *pos += 1;
    Ok(())
}

fn apply_function(name: &str, arg: f64) -> anyhow::Result<f64> {
    let value = match name {
        "sqrt" => {
            if arg < 0.0 {
                anyhow::bail!("square root of a negative number");
            }
            arg.sqrt()
        }
        "abs" => arg.abs(),
        "sin" => arg.sin(),
        "cos" => arg.cos(),
        "tan" => arg.tan(),
        "ln" => arg.ln(),
        "log" => arg.log10(),
        "exp" => arg.exp(),
        other => anyhow::bail!("unknown function '{}'", other),
    };
    Ok(value)
}
