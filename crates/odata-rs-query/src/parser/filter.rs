//! Recursive-descent parser for `$filter` expressions.
//!
//! Precedence from loosest to tightest: `or`, `and`, comparisons, additive,
//! multiplicative, `not`, primaries. Comparisons are non-associative.

use crate::ast::{BinaryOp, FilterExpr};
use crate::parser::lexer::{tokenize, SyntaxError, Token, TokenKind};
use crate::value::Value;

/// Parses a complete `$filter` expression.
pub fn parse_filter(source: &str) -> Result<FilterExpr, SyntaxError> {
    let tokens = tokenize(source)?;
    let mut parser = FilterParser {
        tokens: &tokens,
        pos: 0,
        end: source.len(),
    };
    let expr = parser.parse_or()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parses one expression from an already-lexed token stream, starting at
/// `*pos` and leaving `*pos` on the first token it did not consume. Used to
/// embed filter expressions inside apply pipelines.
pub(crate) fn parse_expression(
    tokens: &[Token],
    pos: &mut usize,
    end: usize,
) -> Result<FilterExpr, SyntaxError> {
    let mut parser = FilterParser {
        tokens,
        pos: *pos,
        end,
    };
    let expr = parser.parse_or()?;
    *pos = parser.pos;
    Ok(expr)
}

struct FilterParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    end: usize,
}

impl FilterParser<'_> {
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

    fn eat_keyword(&mut self, word: &str) -> bool {
        if self.peek_ident() == Some(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_kind(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_close_paren(&mut self) -> Result<(), SyntaxError> {
        if self.eat_kind(&TokenKind::CloseParen) {
            Ok(())
        } else {
            let message = match self.peek_kind() {
                Some(kind) => format!("expected ')' but found {kind}"),
                None => "expected ')' but found end of input".to_string(),
            };
            Err(SyntaxError::new(message, self.error_position()))
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

    fn parse_or(&mut self) -> Result<FilterExpr, SyntaxError> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = FilterExpr::binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<FilterExpr, SyntaxError> {
        let mut left = self.parse_comparison()?;
        while self.eat_keyword("and") {
            let right = self.parse_comparison()?;
            left = FilterExpr::binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<FilterExpr, SyntaxError> {
        let left = self.parse_additive()?;
        if self.eat_keyword("in") {
            let list = self.parse_primary()?;
            return Ok(FilterExpr::In {
                left: Box::new(left),
                list: Box::new(list),
            });
        }
        let op = match self.peek_ident() {
            Some("eq") => Some(BinaryOp::Eq),
            Some("ne") => Some(BinaryOp::Ne),
            Some("gt") => Some(BinaryOp::Gt),
            Some("ge") => Some(BinaryOp::Ge),
            Some("lt") => Some(BinaryOp::Lt),
            Some("le") => Some(BinaryOp::Le),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let right = self.parse_additive()?;
            return Ok(FilterExpr::binary(op, left, right));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<FilterExpr, SyntaxError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_ident() {
                Some("add") => BinaryOp::Add,
                Some("sub") => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = FilterExpr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<FilterExpr, SyntaxError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_ident() {
                Some("mul") => BinaryOp::Mul,
                Some("div") => BinaryOp::Div,
                Some("mod") => BinaryOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = FilterExpr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<FilterExpr, SyntaxError> {
        if self.eat_keyword("not") {
            let operand = self.parse_unary()?;
            return Ok(FilterExpr::not(operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<FilterExpr, SyntaxError> {
        let Some(token) = self.peek() else {
            return Err(SyntaxError::new("unexpected end of input", self.end));
        };
        let position = token.position;
        match token.kind.clone() {
            TokenKind::OpenParen => {
                self.pos += 1;
                let first = self.parse_or()?;
                if self.eat_kind(&TokenKind::Comma) {
                    let mut items = vec![first];
                    loop {
                        items.push(self.parse_or()?);
                        if !self.eat_kind(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect_close_paren()?;
                    Ok(FilterExpr::Collection(items))
                } else {
                    self.expect_close_paren()?;
                    Ok(first)
                }
            }
            TokenKind::Ident(name) => {
                self.pos += 1;
                match name.as_str() {
                    "true" => return Ok(FilterExpr::Literal(Value::Bool(true))),
                    "false" => return Ok(FilterExpr::Literal(Value::Bool(false))),
                    "null" => return Ok(FilterExpr::Literal(Value::Null)),
                    _ => {}
                }
                if self.peek_kind() == Some(&TokenKind::OpenParen) {
                    self.pos += 1;
                    let mut args = Vec::new();
                    if self.peek_kind() != Some(&TokenKind::CloseParen) {
                        loop {
                            args.push(self.parse_or()?);
                            if !self.eat_kind(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect_close_paren()?;
                    // cast(expr, type) wraps its subject in a conversion
                    // node; the target type is not carried
                    if name == "cast" && !args.is_empty() {
                        let subject = args.swap_remove(0);
                        return Ok(FilterExpr::Convert(Box::new(subject)));
                    }
                    return Ok(FilterExpr::Function { name, args });
                }
                if name.contains('.') {
                    Ok(FilterExpr::OpenProperty(name))
                } else {
                    Ok(FilterExpr::Property(name))
                }
            }
            TokenKind::Str(value) => {
                self.pos += 1;
                Ok(FilterExpr::Literal(Value::String(value)))
            }
            TokenKind::Int(value) => {
                self.pos += 1;
                Ok(FilterExpr::Literal(Value::Int(value)))
            }
            TokenKind::Float(value) => {
                self.pos += 1;
                Ok(FilterExpr::Literal(Value::Float(value)))
            }
            other => Err(SyntaxError::new(format!("unexpected {other}"), position)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str) -> FilterExpr {
        FilterExpr::Property(name.to_string())
    }

    fn lit(value: impl Into<Value>) -> FilterExpr {
        FilterExpr::Literal(value.into())
    }

    #[test]
    fn test_simple_comparison() {
        let expr = parse_filter("Status eq 'Active'").unwrap();
        assert_eq!(
            expr,
            FilterExpr::binary(BinaryOp::Eq, prop("Status"), lit("Active"))
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse_filter("A eq 1 or B eq 2 and C eq 3").unwrap();
        assert_eq!(
            expr,
            FilterExpr::binary(
                BinaryOp::Or,
                FilterExpr::binary(BinaryOp::Eq, prop("A"), lit(1)),
                FilterExpr::binary(
                    BinaryOp::And,
                    FilterExpr::binary(BinaryOp::Eq, prop("B"), lit(2)),
                    FilterExpr::binary(BinaryOp::Eq, prop("C"), lit(3)),
                ),
            )
        );
    }

    #[test]
    fn test_grouping_overrides_precedence() {
        let expr = parse_filter("(A eq 1 or B eq 2) and C eq 3").unwrap();
        assert!(matches!(
            expr,
            FilterExpr::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn test_function_call() {
        let expr = parse_filter("contains(Name,'Jo')").unwrap();
        assert_eq!(
            expr,
            FilterExpr::Function {
                name: "contains".to_string(),
                args: vec![prop("Name"), lit("Jo")],
            }
        );
    }

    #[test]
    fn test_function_in_comparison() {
        let expr = parse_filter("year(Created) eq 2024").unwrap();
        assert_eq!(
            expr,
            FilterExpr::binary(
                BinaryOp::Eq,
                FilterExpr::Function {
                    name: "year".to_string(),
                    args: vec![prop("Created")],
                },
                lit(2024),
            )
        );
    }

    #[test]
    fn test_not_over_function() {
        let expr = parse_filter("not contains(Name,'x')").unwrap();
        assert_eq!(
            expr,
            FilterExpr::not(FilterExpr::Function {
                name: "contains".to_string(),
                args: vec![prop("Name"), lit("x")],
            })
        );
    }

    #[test]
    fn test_not_on_comparison_left() {
        // `not` binds tighter than `eq`, so it lands on the left operand
        let expr = parse_filter("not Active eq true").unwrap();
        assert_eq!(
            expr,
            FilterExpr::binary(BinaryOp::Eq, FilterExpr::not(prop("Active")), lit(true))
        );
    }

    #[test]
    fn test_in_with_collection() {
        let expr = parse_filter("Status in ('Active','Inactive')").unwrap();
        assert_eq!(
            expr,
            FilterExpr::In {
                left: Box::new(prop("Status")),
                list: Box::new(FilterExpr::Collection(vec![lit("Active"), lit("Inactive")])),
            }
        );
    }

    #[test]
    fn test_dotted_name_is_open_property() {
        let expr = parse_filter("attributes.color eq 'red'").unwrap();
        assert_eq!(
            expr,
            FilterExpr::binary(
                BinaryOp::Eq,
                FilterExpr::OpenProperty("attributes.color".to_string()),
                lit("red"),
            )
        );
    }

    #[test]
    fn test_boolean_and_null_literals() {
        assert_eq!(parse_filter("true").unwrap(), lit(true));
        assert_eq!(parse_filter("false").unwrap(), lit(false));
        assert_eq!(parse_filter("null").unwrap(), FilterExpr::Literal(Value::Null));
    }

    #[test]
    fn test_cast_becomes_convert() {
        let expr = parse_filter("cast(Created, Edm.String) eq '2024'").unwrap();
        assert_eq!(
            expr,
            FilterExpr::binary(
                BinaryOp::Eq,
                FilterExpr::Convert(Box::new(prop("Created"))),
                lit("2024"),
            )
        );
    }

    #[test]
    fn test_arithmetic_parses_below_comparison() {
        let expr = parse_filter("Price add 5 gt 10").unwrap();
        assert_eq!(
            expr,
            FilterExpr::binary(
                BinaryOp::Gt,
                FilterExpr::binary(BinaryOp::Add, prop("Price"), lit(5)),
                lit(10),
            )
        );
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = parse_filter("A eq 1 B").unwrap_err();
        assert!(err.message.contains("unexpected"));
        assert_eq!(err.position, 7);
    }

    #[test]
    fn test_missing_operand() {
        assert!(parse_filter("A eq").is_err());
        assert!(parse_filter("and A eq 1").is_err());
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        let err = parse_filter("(A eq 1").unwrap_err();
        assert!(err.message.contains("expected ')'"));
    }
}
