//! Expression evaluation inside echo, `if` and `foreach` tags
//!
//! The interpreter never evaluates expression text itself; it hands it to an
//! [`ExpressionHost`]. [`BasicExpressions`] is the default host and covers
//! what templates typically need:
//!
//! - paths: `$user.name`, `user.name`, `$items.0` (`$` optional)
//! - literals: `'text'`, `"text"`, `42`, `-1.5`, `true`, `false`, `null`
//! - `!`/`not`, `&&`/`and`, `||`/`or`, parentheses
//! - comparisons: `==`, `!=`, `<`, `<=`, `>`, `>=`
//!
//! An undefined path evaluates to `None`, which is falsy. Echoing it is an
//! error raised by the interpreter.

use super::engine::helpers::{resolve_path, truthy};
use super::Bindings;
use std::cmp::Ordering;
use std::fmt;
use toml::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionError(pub String);

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ExpressionError {}

/// Evaluates expression text against the current bindings.
///
/// `Ok(None)` means the expression refers to something undefined.
pub trait ExpressionHost: Send + Sync {
    fn evaluate(&self, expr: &str, bindings: &Bindings) -> Result<Option<Value>, ExpressionError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicExpressions;

impl ExpressionHost for BasicExpressions {
    fn evaluate(&self, expr: &str, bindings: &Bindings) -> Result<Option<Value>, ExpressionError> {
        let tokens = lex(expr)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            bindings,
        };
        let value = parser.or()?;
        match parser.tokens.get(parser.pos) {
            None => Ok(value),
            Some(token) => Err(ExpressionError(format!("unexpected {}", token))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Path(String),
    Not,
    And,
    Or,
    Cmp(CmpOp),
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Str(s) => write!(f, "string '{}'", s),
            Token::Int(i) => write!(f, "number {}", i),
            Token::Float(x) => write!(f, "number {}", x),
            Token::Bool(b) => write!(f, "'{}'", b),
            Token::Null => f.write_str("'null'"),
            Token::Path(p) => write!(f, "'{}'", p),
            Token::Not => f.write_str("'!'"),
            Token::And => f.write_str("'&&'"),
            Token::Or => f.write_str("'||'"),
            Token::Cmp(op) => write!(f, "'{:?}' comparison", op),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
        }
    }
}

fn lex(expr: &str) -> Result<Vec<Token>, ExpressionError> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '\'' | '"' => {
                let (text, end) = lex_string(&chars, i)?;
                tokens.push(Token::Str(text));
                i = end;
            }
            '&' if next == Some('&') => {
                tokens.push(Token::And);
                i += 2;
            }
            '|' if next == Some('|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            '=' | '!' if next == Some('=') => {
                let op = if c == '=' { CmpOp::Eq } else { CmpOp::Ne };
                tokens.push(Token::Cmp(op));
                i += 2;
                // `===` and `!==` compare the same way
                if chars.get(i) == Some(&'=') {
                    i += 1;
                }
            }
            '!' => {
                tokens.push(Token::Not);
                i += 1;
            }
            '<' | '>' => {
                let op = match (c, next == Some('=')) {
                    ('<', true) => CmpOp::Le,
                    ('<', false) => CmpOp::Lt,
                    (_, true) => CmpOp::Ge,
                    (_, false) => CmpOp::Gt,
                };
                tokens.push(Token::Cmp(op));
                i += if next == Some('=') { 2 } else { 1 };
            }
            c if c.is_ascii_digit() || (c == '-' && next.is_some_and(|n| n.is_ascii_digit())) => {
                let (token, end) = lex_number(&chars, i)?;
                tokens.push(token);
                i = end;
            }
            c if c == '$' || c.is_alphabetic() || c == '_' => {
                let start = i;
                i += 1;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    "null" => Token::Null,
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "$" => return Err(ExpressionError("'$' without a name".to_string())),
                    _ => Token::Path(word),
                });
            }
            other => {
                return Err(ExpressionError(format!("unexpected character '{}'", other)));
            }
        }
    }

    Ok(tokens)
}

fn lex_string(chars: &[char], start: usize) -> Result<(String, usize), ExpressionError> {
    let quote = chars[start];
    let mut text = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                text.push(chars[i + 1]);
                i += 2;
            }
            c if c == quote => return Ok((text, i + 1)),
            c => {
                text.push(c);
                i += 1;
            }
        }
    }

    Err(ExpressionError("unterminated string literal".to_string()))
}

fn lex_number(chars: &[char], start: usize) -> Result<(Token, usize), ExpressionError> {
    let mut i = start + 1;
    while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
        i += 1;
    }
    let text: String = chars[start..i].iter().collect();

    let token = if text.contains('.') {
        text.parse().map(Token::Float).ok()
    } else {
        text.parse().map(Token::Int).ok()
    };
    token
        .map(|t| (t, i))
        .ok_or_else(|| ExpressionError(format!("invalid number '{}'", text)))
}

/// Recursive descent, lowest precedence first: or, and, not, comparison
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    bindings: &'a Bindings,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn or(&mut self) -> Result<Option<Value>, ExpressionError> {
        let mut left = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.and()?;
            left = Some(Value::Boolean(
                truthy(left.as_ref()) || truthy(right.as_ref()),
            ));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Option<Value>, ExpressionError> {
        let mut left = self.not()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.not()?;
            left = Some(Value::Boolean(
                truthy(left.as_ref()) && truthy(right.as_ref()),
            ));
        }
        Ok(left)
    }

    fn not(&mut self) -> Result<Option<Value>, ExpressionError> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            let operand = self.not()?;
            return Ok(Some(Value::Boolean(!truthy(operand.as_ref()))));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Option<Value>, ExpressionError> {
        let left = self.primary()?;
        let op = match self.peek() {
            Some(Token::Cmp(op)) => *op,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.primary()?;
        compare(left.as_ref(), op, right.as_ref()).map(|b| Some(Value::Boolean(b)))
    }

    fn primary(&mut self) -> Result<Option<Value>, ExpressionError> {
        let bindings = self.bindings;
        match self.advance().cloned() {
            Some(Token::Str(s)) => Ok(Some(Value::String(s))),
            Some(Token::Int(i)) => Ok(Some(Value::Integer(i))),
            Some(Token::Float(x)) => Ok(Some(Value::Float(x))),
            Some(Token::Bool(b)) => Ok(Some(Value::Boolean(b))),
            Some(Token::Null) => Ok(None),
            Some(Token::Path(path)) => Ok(resolve_path(bindings, &path).cloned()),
            Some(Token::LParen) => {
                let inner = self.or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(ExpressionError("missing ')'".to_string())),
                }
            }
            Some(other) => Err(ExpressionError(format!("unexpected {}", other))),
            None => Err(ExpressionError("unexpected end of expression".to_string())),
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn compare(left: Option<&Value>, op: CmpOp, right: Option<&Value>) -> Result<bool, ExpressionError> {
    let numbers = match (left, right) {
        (Some(l), Some(r)) => as_number(l).zip(as_number(r)),
        _ => None,
    };

    match op {
        CmpOp::Eq | CmpOp::Ne => {
            let equal = match numbers {
                Some((l, r)) => l == r,
                None => left == right,
            };
            Ok(equal == (op == CmpOp::Eq))
        }
        _ => {
            let ordering = match (numbers, left, right) {
                (Some((l, r)), _, _) => l.partial_cmp(&r),
                (None, Some(Value::String(l)), Some(Value::String(r))) => Some(l.cmp(r)),
                _ => None,
            }
            .ok_or_else(|| ExpressionError("values cannot be ordered".to_string()))?;

            Ok(match op {
                CmpOp::Lt => ordering == Ordering::Less,
                CmpOp::Le => ordering != Ordering::Greater,
                CmpOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
    }
}
