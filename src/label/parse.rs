use std::fmt;

use thiserror::Error;

use crate::label::atom::LabelRegistry;
use crate::label::expr::Expr;

/// Malformed label expression text.
///
/// Reported to whoever supplied the text; an unparsed expression never
/// reaches the queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty label expression")]
    Empty,

    #[error("unexpected character `{ch}` at position {at}")]
    UnexpectedChar { ch: char, at: usize },

    #[error("unexpected `{found}` at position {at}")]
    UnexpectedToken { found: String, at: usize },

    #[error("unclosed parenthesis opened at position {at}")]
    UnclosedParen { at: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Not,
    And,
    Or,
    Implies,
    Iff,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => f.write_str(name),
            Token::Not => f.write_str("!"),
            Token::And => f.write_str("&&"),
            Token::Or => f.write_str("||"),
            Token::Implies => f.write_str("->"),
            Token::Iff => f.write_str("<->"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '.' || c == '-' || c == '_'
}

/// Lex into (position, token) pairs. Whitespace, including tabs, is
/// insignificant between tokens.
fn lex(text: &str) -> Result<Vec<(usize, Token)>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let at = i;
        match chars[i] {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push((at, Token::LParen));
                i += 1;
            }
            ')' => {
                tokens.push((at, Token::RParen));
                i += 1;
            }
            '!' => {
                tokens.push((at, Token::Not));
                i += 1;
            }
            '&' if chars.get(i + 1) == Some(&'&') => {
                tokens.push((at, Token::And));
                i += 2;
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                tokens.push((at, Token::Or));
                i += 2;
            }
            '<' if chars.get(i + 1) == Some(&'-') && chars.get(i + 2) == Some(&'>') => {
                tokens.push((at, Token::Iff));
                i += 3;
            }
            '-' if chars.get(i + 1) == Some(&'>') => {
                tokens.push((at, Token::Implies));
                i += 2;
            }
            c if is_ident_char(c) => {
                let mut name = String::new();
                // `-` stays part of the identifier unless it starts a `->`,
                // so both `solaris-x86` and `foo->bar` lex as intended.
                while i < chars.len()
                    && is_ident_char(chars[i])
                    && !(chars[i] == '-' && chars.get(i + 1) == Some(&'>'))
                {
                    name.push(chars[i]);
                    i += 1;
                }
                tokens.push((at, Token::Ident(name)));
            }
            c => return Err(ParseError::UnexpectedChar { ch: c, at }),
        }
    }

    Ok(tokens)
}

/// Parse `text` into an expression tree, interning atoms through `registry`.
///
/// Precedence, loose to tight: `<->`, `->`, `||`, `&&`, `!`. Explicit
/// parentheses are preserved on the resulting node (see [`Expr::grouped`]).
pub(crate) fn parse_expression(registry: &LabelRegistry, text: &str) -> Result<Expr, ParseError> {
    let tokens = lex(text)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut parser = Parser {
        registry,
        tokens,
        pos: 0,
    };
    let expr = parser.iff()?;

    match parser.peek() {
        None => Ok(expr),
        Some((at, token)) => Err(ParseError::UnexpectedToken {
            found: token.to_string(),
            at: *at,
        }),
    }
}

struct Parser<'a> {
    registry: &'a LabelRegistry,
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&(usize, Token)> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek().map(|(_, t)| t) == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn iff(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.implies()?;
        while self.eat(&Token::Iff) {
            expr = expr.iff(self.implies()?);
        }
        Ok(expr)
    }

    fn implies(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.or()?;
        while self.eat(&Token::Implies) {
            expr = expr.implies(self.or()?);
        }
        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.and()?;
        while self.eat(&Token::Or) {
            expr = expr.or(self.and()?);
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.negation()?;
        while self.eat(&Token::And) {
            expr = expr.and(self.negation()?);
        }
        Ok(expr)
    }

    fn negation(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Not) {
            Ok(self.negation()?.not())
        } else {
            self.atomic()
        }
    }

    fn atomic(&mut self) -> Result<Expr, ParseError> {
        let (at, token) = self.peek().cloned().ok_or(ParseError::UnexpectedEnd)?;
        match token {
            Token::Ident(name) => {
                self.pos += 1;
                Ok(self.registry.atom(&name).expr())
            }
            Token::LParen => {
                self.pos += 1;
                let inner = self.iff()?;
                if self.eat(&Token::RParen) {
                    Ok(inner.grouped())
                } else {
                    Err(ParseError::UnclosedParen { at })
                }
            }
            other => Err(ParseError::UnexpectedToken {
                found: other.to_string(),
                at,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(expected: &str, input: &str) {
        let reg = LabelRegistry::new();
        assert_eq!(reg.parse(input).unwrap().name(), expected, "input: {input}");
    }

    #[test]
    fn plain_atoms() {
        roundtrip("foo", "foo");
        roundtrip("32bit.dot", "32bit.dot");
        roundtrip("solaris-x86", "solaris-x86");
    }

    #[test]
    fn whitespace_is_insignificant() {
        roundtrip("foo||bar", "foo || bar");
        roundtrip("foo->bar", "foo ->\tbar");
        roundtrip("!foo<->bar", "!foo <-> bar");
    }

    #[test]
    fn user_parens_are_preserved() {
        roundtrip("foo||bar&&zot", "foo||bar&&zot");
        roundtrip("foo||(bar&&zot)", "foo||(bar&&zot)");
        roundtrip("(foo||bar)&&zot", "(foo||bar)&&zot");
    }

    #[test]
    fn double_parens_collapse() {
        roundtrip("(x)", "((x))");
    }

    #[test]
    fn adjacent_identifiers_are_rejected() {
        let reg = LabelRegistry::new();
        assert!(matches!(
            reg.parse("foo bar"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn stray_operator_characters_are_rejected() {
        let reg = LabelRegistry::new();
        assert_eq!(
            reg.parse("foo*bar"),
            Err(ParseError::UnexpectedChar { ch: '*', at: 3 })
        );
        assert!(matches!(
            reg.parse("foo & bar"),
            Err(ParseError::UnexpectedChar { ch: '&', .. })
        ));
    }

    #[test]
    fn unbalanced_parens_are_rejected() {
        let reg = LabelRegistry::new();
        assert_eq!(
            reg.parse("(foo||bar"),
            Err(ParseError::UnclosedParen { at: 0 })
        );
        assert!(matches!(
            reg.parse("foo)"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        let reg = LabelRegistry::new();
        assert_eq!(reg.parse(""), Err(ParseError::Empty));
        assert_eq!(reg.parse("  \t "), Err(ParseError::Empty));
    }

    #[test]
    fn dangling_operator_is_rejected() {
        let reg = LabelRegistry::new();
        assert_eq!(reg.parse("foo&&"), Err(ParseError::UnexpectedEnd));
    }
}
