//! Parsers for the list-shaped clauses: `$orderby` and `$select`.

use crate::ast::OrderByTerm;
use crate::parser::lexer::{tokenize, SyntaxError, Token, TokenKind};

/// Parses an `$orderby` list: comma-separated column names, each with an
/// optional `asc` or `desc` direction. Ascending is the default.
pub fn parse_order_by(source: &str) -> Result<Vec<OrderByTerm>, SyntaxError> {
    let tokens = tokenize(source)?;
    let mut pos = 0;
    let mut terms = Vec::new();
    loop {
        let column = expect_name(&tokens, &mut pos, source.len())?;
        let mut descending = false;
        if let Some(token) = tokens.get(pos) {
            if let TokenKind::Ident(word) = &token.kind {
                match word.as_str() {
                    "asc" => pos += 1,
                    "desc" => {
                        descending = true;
                        pos += 1;
                    }
                    other => {
                        return Err(SyntaxError::new(
                            format!("expected 'asc' or 'desc' but found '{other}'"),
                            token.position,
                        ));
                    }
                }
            }
        }
        terms.push(OrderByTerm { column, descending });
        if !eat_comma(&tokens, &mut pos) {
            break;
        }
    }
    expect_end(&tokens, pos)?;
    Ok(terms)
}

/// Parses a `$select` list: comma-separated column names, where `*` selects
/// every column.
pub fn parse_select(source: &str) -> Result<Vec<String>, SyntaxError> {
    let tokens = tokenize(source)?;
    let mut pos = 0;
    let mut columns = Vec::new();
    loop {
        match tokens.get(pos) {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => {
                columns.push(name.clone());
                pos += 1;
            }
            Some(Token {
                kind: TokenKind::Star,
                ..
            }) => {
                columns.push("*".to_string());
                pos += 1;
            }
            Some(token) => {
                return Err(SyntaxError::new(
                    format!("expected a column name but found {}", token.kind),
                    token.position,
                ));
            }
            None => {
                return Err(SyntaxError::new("expected a column name", source.len()));
            }
        }
        if !eat_comma(&tokens, &mut pos) {
            break;
        }
    }
    expect_end(&tokens, pos)?;
    Ok(columns)
}

fn expect_name(tokens: &[Token], pos: &mut usize, end: usize) -> Result<String, SyntaxError> {
    match tokens.get(*pos) {
        Some(Token {
            kind: TokenKind::Ident(name),
            ..
        }) => {
            let name = name.clone();
            *pos += 1;
            Ok(name)
        }
        Some(token) => Err(SyntaxError::new(
            format!("expected a column name but found {}", token.kind),
            token.position,
        )),
        None => Err(SyntaxError::new("expected a column name", end)),
    }
}

fn eat_comma(tokens: &[Token], pos: &mut usize) -> bool {
    if matches!(
        tokens.get(*pos),
        Some(Token {
            kind: TokenKind::Comma,
            ..
        })
    ) {
        *pos += 1;
        true
    } else {
        false
    }
}

fn expect_end(tokens: &[Token], pos: usize) -> Result<(), SyntaxError> {
    match tokens.get(pos) {
        None => Ok(()),
        Some(token) => Err(SyntaxError::new(
            format!("unexpected {}", token.kind),
            token.position,
        )),
    }
}
