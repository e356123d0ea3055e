//! Clause text parsers.
//!
//! Each query option has its own entry point over a shared tokenizer:
//!
//! - [`parse_filter`] for `$filter` expressions
//! - [`parse_apply`] for `$apply` pipelines
//! - [`parse_order_by`] and [`parse_select`] for the list clauses
//!
//! Parsers report [`SyntaxError`]s with byte positions into the clause text;
//! the compiler wraps those into clause-tagged errors.

mod apply;
mod filter;
mod lexer;
mod terms;

pub use apply::parse_apply;
pub use filter::parse_filter;
pub use lexer::{tokenize, SyntaxError, Token, TokenKind};
pub use terms::{parse_order_by, parse_select};
