//! Parser for `$apply` transformation pipelines.
//!
//! A pipeline is a `/`-separated sequence of steps. Filter steps reuse the
//! expression parser; compute and expand capture their argument text raw
//! since the compiler rejects those steps by name.

use crate::ast::{AggregateExpr, AggregateMethod, Transformation};
use crate::parser::filter::parse_expression;
use crate::parser::lexer::{tokenize, SyntaxError, Token, TokenKind};

/// Parses an `$apply` pipeline into its ordered steps.
pub fn parse_apply(source: &str) -> Result<Vec<Transformation>, SyntaxError> {
    let tokens = tokenize(source)?;
    let mut parser = ApplyParser {
        tokens: &tokens,
        pos: 0,
        end: source.len(),
        source,
    };
    let mut steps = vec![parser.parse_step()?];
    while parser.eat_kind(&TokenKind::Slash) {
        steps.push(parser.parse_step()?);
    }
    parser.expect_end()?;
    Ok(steps)
}

struct ApplyParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    end: usize,
    source: &'a str,
}

impl ApplyParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn peek_ident(&self) -> Option<&str> {
        match self.peek_kind() {
            Some(TokenKind::Ident(word)) => Some(word.as_str()),
            _ => None,
        }
    }

    fn error_position(&self) -> usize {
        self.peek().map_or(self.end, |t| t.position)
    }

    fn eat_kind(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn found(&self) -> String {
        match self.peek_kind() {
            Some(kind) => format!("{kind}"),
            None => "end of input".to_string(),
        }
    }

    fn expect_open_paren(&mut self) -> Result<(), SyntaxError> {
        if self.eat_kind(&TokenKind::OpenParen) {
            Ok(())
        } else {
            Err(SyntaxError::new(
                format!("expected '(' but found {}", self.found()),
                self.error_position(),
            ))
        }
    }

    fn expect_close_paren(&mut self) -> Result<(), SyntaxError> {
        if self.eat_kind(&TokenKind::CloseParen) {
            Ok(())
        } else {
            Err(SyntaxError::new(
                format!("expected ')' but found {}", self.found()),
                self.error_position(),
            ))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Ident(word)) => {
                let word = word.clone();
                self.pos += 1;
                Ok(word)
            }
            _ => Err(SyntaxError::new(
                format!("expected {what} but found {}", self.found()),
                self.error_position(),
            )),
        }
    }

    fn expect_keyword(&mut self, word: &str) -> Result<(), SyntaxError> {
        if self.peek_ident() == Some(word) {
            self.pos += 1;
            Ok(())
        } else {
            Err(SyntaxError::new(
                format!("expected '{word}' but found {}", self.found()),
                self.error_position(),
            ))
        }
    }

    fn expect_end(&self) -> Result<(), SyntaxError> {
        match self.peek_kind() {
            None => Ok(()),
            Some(kind) => Err(SyntaxError::new(
                format!("unexpected {kind}"),
                self.error_position(),
            )),
        }
    }

    fn parse_step(&mut self) -> Result<Transformation, SyntaxError> {
        let position = self.error_position();
        let Some(word) = self.peek_ident().map(ToString::to_string) else {
            return Err(SyntaxError::new("expected a transformation name", position));
        };
        self.pos += 1;
        match word.as_str() {
            "filter" => {
                self.expect_open_paren()?;
                let expr = parse_expression(self.tokens, &mut self.pos, self.end)?;
                self.expect_close_paren()?;
                Ok(Transformation::Filter(expr))
            }
            "groupby" => self.parse_groupby(),
            "aggregate" => {
                self.expect_open_paren()?;
                let items = self.parse_aggregate_items()?;
                self.expect_close_paren()?;
                Ok(Transformation::Aggregate(items))
            }
            "compute" => Ok(Transformation::Compute(self.raw_argument()?)),
            "expand" => Ok(Transformation::Expand(self.raw_argument()?)),
            other => Err(SyntaxError::new(
                format!("unknown transformation '{other}'"),
                position,
            )),
        }
    }

    fn parse_groupby(&mut self) -> Result<Transformation, SyntaxError> {
        self.expect_open_paren()?;
        self.expect_open_paren()?;
        let mut columns = vec![self.expect_ident("a grouping column")?];
        while self.eat_kind(&TokenKind::Comma) {
            columns.push(self.expect_ident("a grouping column")?);
        }
        self.expect_close_paren()?;
        let child = if self.eat_kind(&TokenKind::Comma) {
            Some(Box::new(self.parse_step()?))
        } else {
            None
        };
        self.expect_close_paren()?;
        Ok(Transformation::GroupBy { columns, child })
    }

    fn parse_aggregate_items(&mut self) -> Result<Vec<AggregateExpr>, SyntaxError> {
        let mut items = vec![self.parse_aggregate_item()?];
        while self.eat_kind(&TokenKind::Comma) {
            items.push(self.parse_aggregate_item()?);
        }
        Ok(items)
    }

    fn parse_aggregate_item(&mut self) -> Result<AggregateExpr, SyntaxError> {
        let first = self.expect_ident("an aggregate source or '$count'")?;
        if first == "$count" {
            self.expect_keyword("as")?;
            let alias = self.expect_ident("an alias")?;
            return Ok(AggregateExpr {
                source: None,
                method: AggregateMethod::VirtualCount,
                alias,
            });
        }
        self.expect_keyword("with")?;
        let method = self.expect_ident("an aggregation method")?;
        self.expect_keyword("as")?;
        let alias = self.expect_ident("an alias")?;
        Ok(AggregateExpr {
            source: Some(first),
            method: AggregateMethod::from_name(&method),
            alias,
        })
    }

    /// Consumes `( ... )` and returns the inner text verbatim, trimmed.
    fn raw_argument(&mut self) -> Result<String, SyntaxError> {
        let open = match self.peek() {
            Some(token) if token.kind == TokenKind::OpenParen => token.position,
            _ => {
                return Err(SyntaxError::new(
                    format!("expected '(' but found {}", self.found()),
                    self.error_position(),
                ));
            }
        };
        self.pos += 1;
        let mut depth = 1usize;
        while self.pos < self.tokens.len() {
            let token = &self.tokens[self.pos];
            let position = token.position;
            let kind = token.kind.clone();
            self.pos += 1;
            match kind {
                TokenKind::OpenParen => depth += 1,
                TokenKind::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.source[open + 1..position].trim().to_string());
                    }
                }
                _ => {}
            }
        }
        Err(SyntaxError::new(
            "expected ')' but found end of input",
            self.end,
        ))
    }
}
