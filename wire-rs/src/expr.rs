//! Arithmetic expression lexer, parser and evaluator.
//!
//! Operator precedence (lowest → highest):
//!   additive (`+` `-`)  →  multiplicative (`*` `/`)  →  power (`^`, right
//!   associative)  →  unary (`-` `+`)  →  primary (number, parenthesised expr)
//!
//! Every level parses its own operators and calls the next-higher level for
//! its operands, with one token of lookahead.  The value is computed while
//! parsing; no tree is built.
//!
//! [`eval`] is total: any malformed input yields NaN.  [`try_eval`] reports
//! why.

use std::fmt;

use thiserror::Error;

/// Maximum nesting of parentheses and unary operators.
pub const MAX_NESTING: usize = 256;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why an expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("malformed number '{0}'")]
    BadNumber(String),
    #[error("unexpected {0}")]
    Unexpected(Token),
    #[error("expected ')' but found {0}")]
    UnclosedParen(Token),
    #[error("unexpected {0} after expression")]
    Trailing(Token),
    #[error("expression nested deeper than {} levels", MAX_NESTING)]
    TooDeep,
}

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    /// Unrecognised input character.
    Unknown(char),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(n) => write!(f, "number {n}"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::Caret => f.write_str("'^'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Unknown(c) => write!(f, "character '{c}'"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer { src, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek2(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos + 1).copied()
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    /// `digits [. digits] [(e|E) [+|-] digits]`, with at least one digit
    /// in the mantissa.
    fn read_number(&mut self) -> Result<Token, ExprError> {
        let start = self.pos;
        let mut digits = self.skip_digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            digits += self.skip_digits();
        }
        if digits == 0 {
            return Err(ExprError::BadNumber(self.src[start..self.pos].to_owned()));
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.skip_digits() == 0 {
                return Err(ExprError::BadNumber(self.src[start..self.pos].to_owned()));
            }
        }
        let text = &self.src[start..self.pos];
        text.parse()
            .map(Token::Num)
            .map_err(|_| ExprError::BadNumber(text.to_owned()))
    }

    fn next_token(&mut self) -> Result<Token, ExprError> {
        self.skip_ws();
        let Some(ch) = self.peek() else {
            return Ok(Token::Eof);
        };
        if ch.is_ascii_digit() || (ch == b'.' && matches!(self.peek2(), Some(b'0'..=b'9'))) {
            return self.read_number();
        }
        let tok = match ch {
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'^' => Token::Caret,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'.' => return self.read_number(),
            _ => {
                let c = self.src[self.pos..].chars().next().unwrap_or('\u{fffd}');
                self.pos += c.len_utf8();
                return Ok(Token::Unknown(c));
            }
        };
        self.pos += 1;
        Ok(tok)
    }

    fn tokenize(mut self) -> Result<Vec<Token>, ExprError> {
        let mut tokens = Vec::new();
        loop {
            let t = self.next_token()?;
            let done = t == Token::Eof;
            tokens.push(t);
            if done {
                break;
            }
        }
        Ok(tokens)
    }
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        t
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn descend(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ExprError::TooDeep);
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn parse(&mut self) -> Result<f64, ExprError> {
        if self.peek() == &Token::Eof {
            return Err(ExprError::Empty);
        }
        let value = self.parse_additive()?;
        match self.advance() {
            Token::Eof => Ok(value),
            other => Err(ExprError::Trailing(other)),
        }
    }

    fn parse_additive(&mut self) -> Result<f64, ExprError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            if self.eat(&Token::Plus) {
                lhs += self.parse_multiplicative()?;
            } else if self.eat(&Token::Minus) {
                lhs -= self.parse_multiplicative()?;
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_multiplicative(&mut self) -> Result<f64, ExprError> {
        let mut lhs = self.parse_power()?;
        loop {
            if self.eat(&Token::Star) {
                lhs *= self.parse_power()?;
            } else if self.eat(&Token::Slash) {
                lhs /= self.parse_power()?;
            } else {
                return Ok(lhs);
            }
        }
    }

    /// `unary ("^" power)?`; right-recursive, so `^` associates right.
    fn parse_power(&mut self) -> Result<f64, ExprError> {
        let base = self.parse_unary()?;
        if self.eat(&Token::Caret) {
            self.descend()?;
            let exp = self.parse_power();
            self.ascend();
            return Ok(base.powf(exp?));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<f64, ExprError> {
        let negate = match self.peek() {
            Token::Minus => true,
            Token::Plus => false,
            _ => return self.parse_primary(),
        };
        self.pos += 1;
        self.descend()?;
        let operand = self.parse_unary();
        self.ascend();
        let operand = operand?;
        Ok(if negate { -operand } else { operand })
    }

    fn parse_primary(&mut self) -> Result<f64, ExprError> {
        match self.advance() {
            Token::Num(n) => Ok(n),
            Token::LParen => {
                self.descend()?;
                let inner = self.parse_additive();
                self.ascend();
                let inner = inner?;
                match self.advance() {
                    Token::RParen => Ok(inner),
                    other => Err(ExprError::UnclosedParen(other)),
                }
            }
            other => Err(ExprError::Unexpected(other)),
        }
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Evaluate `src`, reporting syntax errors.
pub fn try_eval(src: &str) -> Result<f64, ExprError> {
    let tokens = Lexer::new(src).tokenize()?;
    Parser::new(tokens).parse()
}

/// Evaluate `src`; malformed input yields NaN.
pub fn eval(src: &str) -> f64 {
    try_eval(src).unwrap_or_else(|e| {
        tracing::trace!(expr = src, error = %e, "expression rejected");
        f64::NAN
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::approx_constant)]
    fn literals() {
        assert_eq!(eval("42"), 42.0);
        assert_eq!(eval("3.14"), 3.14);
        assert_eq!(eval(".5"), 0.5);
        assert_eq!(eval("1."), 1.0);
        assert_eq!(eval("1e3"), 1000.0);
        assert_eq!(eval("2.5E-2"), 0.025);
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("2 + 3"), 5.0);
        assert_eq!(eval("10 - 4"), 6.0);
        assert_eq!(eval("3 * 4"), 12.0);
        assert_eq!(eval("10 / 4"), 2.5);
    }

    #[test]
    fn precedence() {
        assert_eq!(eval("2+3*4"), 14.0);
        assert_eq!(eval("(2+3)*4"), 20.0);
        assert_eq!(eval("2*3^2"), 18.0);
    }

    #[test]
    fn left_associative() {
        assert_eq!(eval("10-4-3"), 3.0);
        assert_eq!(eval("64/4/2"), 8.0);
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(eval("2^3^2"), 512.0);
        assert_eq!(eval("(2^3)^2"), 64.0);
    }

    #[test]
    fn unary_binds_tightest() {
        assert_eq!(eval("-5"), -5.0);
        assert_eq!(eval("-(3 + 2)"), -5.0);
        assert_eq!(eval("-2^2"), 4.0);
        assert_eq!(eval("2^-1"), 0.5);
        assert_eq!(eval("--3"), 3.0);
        assert_eq!(eval("+3 - -3"), 6.0);
    }

    #[test]
    fn division_by_zero_is_infinite() {
        assert_eq!(eval("1/0"), f64::INFINITY);
        assert_eq!(eval("-1/0"), f64::NEG_INFINITY);
        assert!(eval("0/0").is_nan());
    }

    #[test]
    fn whitespace_is_ignored() {
        assert_eq!(eval("  ( 1 +\t2 ) * 3 "), 9.0);
    }

    #[test]
    #[allow(clippy::eq_op)]
    fn malformed_input_is_nan() {
        for src in ["2+", "", "   ", "(1+2", "1+2)", "3 4", "abc", "2**3", "1e", ".", "()", "2 $ 3"] {
            let r = eval(src);
            assert!(r != r, "expected NaN for {src:?}, got {r}");
        }
    }

    #[test]
    fn error_reasons() {
        assert_eq!(try_eval(""), Err(ExprError::Empty));
        assert_eq!(try_eval("2+"), Err(ExprError::Unexpected(Token::Eof)));
        assert_eq!(try_eval("(1"), Err(ExprError::UnclosedParen(Token::Eof)));
        assert_eq!(try_eval("1)"), Err(ExprError::Trailing(Token::RParen)));
        assert_eq!(try_eval("1e+"), Err(ExprError::BadNumber("1e+".into())));
        assert_eq!(try_eval("x"), Err(ExprError::Unexpected(Token::Unknown('x'))));
    }

    #[test]
    fn nesting_limit() {
        let deep = "(".repeat(MAX_NESTING + 1) + "1" + &")".repeat(MAX_NESTING + 1);
        assert_eq!(try_eval(&deep), Err(ExprError::TooDeep));
        let ok = "(".repeat(50) + "1" + &")".repeat(50);
        assert_eq!(eval(&ok), 1.0);
        assert!(eval(&"-".repeat(10_000)).is_nan());
    }

    #[test]
    fn error_display() {
        assert_eq!(ExprError::Trailing(Token::Num(4.0)).to_string(), "unexpected number 4 after expression");
        assert_eq!(ExprError::Unexpected(Token::Eof).to_string(), "unexpected end of input");
    }
}
