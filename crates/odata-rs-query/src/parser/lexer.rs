//! Tokenizer for query option text.
//!
//! One lexer serves every clause: filter expressions, apply pipelines,
//! order-by lists, and select lists all share the same token alphabet.

use std::fmt;

use thiserror::Error;

/// A lexical or grammatical error in clause text.
///
/// `position` is the byte offset of the offending character or token in the
/// original clause text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {position}")]
pub struct SyntaxError {
    /// What went wrong.
    pub message: String,
    /// Byte offset into the clause text.
    pub position: usize,
}

impl SyntaxError {
    /// Creates a syntax error at the given byte offset.
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// One lexed token with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token's kind and payload.
    pub kind: TokenKind,
    /// Byte offset of the token's first character.
    pub position: usize,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, position: usize) -> Self {
        Self { kind, position }
    }
}

/// The kinds of token the clause grammar uses.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An identifier, keyword, or dotted name (`Name`, `not`, `attributes.color`, `$count`).
    Ident(String),
    /// A single-quoted string literal, quotes stripped and `''` unescaped.
    Str(String),
    /// An integer literal.
    Int(i64),
    /// A floating-point literal.
    Float(f64),
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `,`
    Comma,
    /// `/`
    Slash,
    /// `*`
    Star,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "'{name}'"),
            Self::Str(value) => write!(f, "string '{value}'"),
            Self::Int(value) => write!(f, "number '{value}'"),
            Self::Float(value) => write!(f, "number '{value}'"),
            Self::OpenParen => write!(f, "'('"),
            Self::CloseParen => write!(f, "')'"),
            Self::Comma => write!(f, "','"),
            Self::Slash => write!(f, "'/'"),
            Self::Star => write!(f, "'*'"),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Tokenizes clause text.
///
/// Strings use single quotes with `''` as the embedded-quote escape. A `-`
/// is only legal as a numeric sign. Dotted names lex as one identifier
/// token, so `attributes.color` arrives at the parser whole.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::new(TokenKind::OpenParen, pos));
            }
            ')' => {
                chars.next();
                tokens.push(Token::new(TokenKind::CloseParen, pos));
            }
            ',' => {
                chars.next();
                tokens.push(Token::new(TokenKind::Comma, pos));
            }
            '/' => {
                chars.next();
                tokens.push(Token::new(TokenKind::Slash, pos));
            }
            '*' => {
                chars.next();
                tokens.push(Token::new(TokenKind::Star, pos));
            }
            '\'' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\'')) => {
                            // '' inside a string is an escaped quote
                            if matches!(chars.peek(), Some(&(_, '\''))) {
                                chars.next();
                                value.push('\'');
                            } else {
                                break;
                            }
                        }
                        Some((_, c)) => value.push(c),
                        None => {
                            return Err(SyntaxError::new("unclosed string literal", pos));
                        }
                    }
                }
                tokens.push(Token::new(TokenKind::Str(value), pos));
            }
            '-' | '0'..='9' => {
                tokens.push(lex_number(&mut chars, pos)?);
            }
            c if is_ident_start(c) => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if is_ident_continue(c) || (name.is_empty() && is_ident_start(c)) {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::new(TokenKind::Ident(name), pos));
            }
            other => {
                return Err(SyntaxError::new(
                    format!("unexpected character '{other}'"),
                    pos,
                ));
            }
        }
    }

    Ok(tokens)
}

fn lex_number(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
) -> Result<Token, SyntaxError> {
    let mut text = String::new();
    if matches!(chars.peek(), Some(&(_, '-'))) {
        chars.next();
        text.push('-');
        if !matches!(chars.peek(), Some(&(_, c)) if c.is_ascii_digit()) {
            return Err(SyntaxError::new("expected a digit after '-'", start));
        }
    }
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_digit() {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }
    let mut is_float = false;
    if matches!(chars.peek(), Some(&(_, '.'))) {
        // only part of the number when a digit follows the dot
        let mut ahead = chars.clone();
        ahead.next();
        if matches!(ahead.peek(), Some(&(_, c)) if c.is_ascii_digit()) {
            chars.next();
            text.push('.');
            is_float = true;
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
        }
    }

    let kind = if is_float {
        let value = text
            .parse::<f64>()
            .map_err(|_| SyntaxError::new(format!("invalid number literal '{text}'"), start))?;
        TokenKind::Float(value)
    } else {
        let value = text
            .parse::<i64>()
            .map_err(|_| SyntaxError::new(format!("invalid number literal '{text}'"), start))?;
        TokenKind::Int(value)
    };
    Ok(Token::new(kind, start))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_basic_expression() {
        assert_eq!(
            kinds("Status eq 'Active'"),
            vec![
                TokenKind::Ident("Status".to_string()),
                TokenKind::Ident("eq".to_string()),
                TokenKind::Str("Active".to_string()),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("3 -7 2.5 -0.25"),
            vec![
                TokenKind::Int(3),
                TokenKind::Int(-7),
                TokenKind::Float(2.5),
                TokenKind::Float(-0.25),
            ]
        );
    }

    #[test]
    fn test_dotted_name_is_one_token() {
        assert_eq!(
            kinds("attributes.color"),
            vec![TokenKind::Ident("attributes.color".to_string())]
        );
    }

    #[test]
    fn test_dollar_count_is_one_token() {
        assert_eq!(
            kinds("$count as Total"),
            vec![
                TokenKind::Ident("$count".to_string()),
                TokenKind::Ident("as".to_string()),
                TokenKind::Ident("Total".to_string()),
            ]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("groupby((A),aggregate(X))/filter(Y)"),
            vec![
                TokenKind::Ident("groupby".to_string()),
                TokenKind::OpenParen,
                TokenKind::OpenParen,
                TokenKind::Ident("A".to_string()),
                TokenKind::CloseParen,
                TokenKind::Comma,
                TokenKind::Ident("aggregate".to_string()),
                TokenKind::OpenParen,
                TokenKind::Ident("X".to_string()),
                TokenKind::CloseParen,
                TokenKind::CloseParen,
                TokenKind::Slash,
                TokenKind::Ident("filter".to_string()),
                TokenKind::OpenParen,
                TokenKind::Ident("Y".to_string()),
                TokenKind::CloseParen,
            ]
        );
    }

    #[test]
    fn test_escaped_quote_in_string() {
        assert_eq!(
            kinds("'O''Brien'"),
            vec![TokenKind::Str("O'Brien".to_string())]
        );
    }

    #[test]
    fn test_unclosed_string() {
        let err = tokenize("Name eq 'Jo").unwrap_err();
        assert_eq!(err.message, "unclosed string literal");
        assert_eq!(err.position, 8);
    }

    #[test]
    fn test_bare_minus_rejected() {
        let err = tokenize("Value eq -").unwrap_err();
        assert_eq!(err.message, "expected a digit after '-'");
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("Name eq @").unwrap_err();
        assert!(err.message.contains('@'));
        assert_eq!(err.position, 8);
    }

    #[test]
    fn test_token_positions() {
        let tokens = tokenize("Name eq 'Jo'").unwrap();
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[1].position, 5);
        assert_eq!(tokens[2].position, 8);
    }

    #[test]
    fn test_star_token() {
        assert_eq!(kinds("*"), vec![TokenKind::Star]);
    }
}
