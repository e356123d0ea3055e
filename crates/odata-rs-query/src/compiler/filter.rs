//! Compilation of filter expression trees into WHERE clauses.

use odata_rs_core::ODataResult;

use crate::ast::{BinaryOp, FilterExpr, UnaryOp};
use crate::builder::SqlQuery;
use crate::compiler::resolve::{column_for, parse_datetime_utc, value_for};
use crate::registry::ColumnRegistry;
use crate::value::Value;

/// Compiles one filter node into the query, dispatching on node kind.
///
/// Nodes that assert nothing on their own, a bare column reference, a
/// standalone literal, an arithmetic expression, pass the query through
/// unchanged.
pub(crate) fn compile_filter(
    expr: &FilterExpr,
    query: SqlQuery,
    registry: &mut ColumnRegistry,
) -> ODataResult<SqlQuery> {
    match expr {
        FilterExpr::Binary { op, left, right }
            if matches!(op, BinaryOp::And | BinaryOp::Or) =>
        {
            let is_or = *op == BinaryOp::Or;
            query.where_group(|group| {
                let group = compile_filter(left, group, registry)?;
                let group = if is_or { group.or() } else { group };
                compile_filter(right, group, registry)
            })
        }
        FilterExpr::Binary { op, left, right } if op.is_comparison() => {
            compile_comparison(*op, left, right, query, registry)
        }
        // arithmetic without a surrounding comparison asserts nothing
        FilterExpr::Binary { .. } => Ok(query),
        FilterExpr::In { left, list } => {
            let column = column_for(left, registry)?;
            let ty = registry.column_type(&column).cloned();
            let values = match value_for(list, ty.as_ref()) {
                Value::List(items) => items,
                other => vec![other],
            };
            Ok(query.where_in(column, values))
        }
        FilterExpr::Unary {
            op: UnaryOp::Not,
            operand,
        } => {
            // the toggle lands on whichever predicate is pushed next; with
            // no predicate-producing operand it stays pending in this scope
            let query = query.not();
            match operand.as_ref() {
                FilterExpr::Function { .. } | FilterExpr::Binary { .. } => {
                    compile_filter(operand, query, registry)
                }
                _ => Ok(query),
            }
        }
        FilterExpr::Function { name, args } => {
            compile_bare_function(name, args, query, registry)
        }
        FilterExpr::Property(_)
        | FilterExpr::OpenProperty(_)
        | FilterExpr::Literal(_)
        | FilterExpr::Collection(_)
        | FilterExpr::Convert(_) => Ok(query),
    }
}

fn compile_comparison(
    op: BinaryOp,
    left: &FilterExpr,
    right: &FilterExpr,
    mut query: SqlQuery,
    registry: &mut ColumnRegistry,
) -> ODataResult<SqlQuery> {
    let mut left = left;
    if let FilterExpr::Unary {
        op: UnaryOp::Not,
        operand,
    } = left
    {
        // the negation compiles first, then the comparison continues
        // against the inner operand
        query = compile_filter(left, query, registry)?;
        left = operand.as_ref();
    }
    if !is_constant(right) {
        return Ok(query);
    }
    if let FilterExpr::Function { name, args } = left {
        let value = value_for(right, None);
        return apply_function_comparison(name, args, op.sql_symbol(), value, query, registry);
    }
    let column = column_for(left, registry)?;
    let ty = registry.column_type(&column).cloned();
    let value = value_for(right, ty.as_ref());
    Ok(query.where_op(column, op.sql_symbol(), value))
}

const fn is_constant(node: &FilterExpr) -> bool {
    matches!(
        node,
        FilterExpr::Literal(_) | FilterExpr::Convert(_) | FilterExpr::Collection(_)
    )
}

/// A function call compared against a constant, e.g. `year(Created) eq 2024`.
///
/// Date-part extractions compare the raw constant. `date` and `time`
/// normalize the constant to `yyyy-MM-dd` or `HH:mm` text first. Names
/// outside the date family assert nothing.
fn apply_function_comparison(
    name: &str,
    args: &[FilterExpr],
    op: &str,
    value: Value,
    query: SqlQuery,
    registry: &mut ColumnRegistry,
) -> ODataResult<SqlQuery> {
    let Some(first) = args.first() else {
        return Ok(query);
    };
    let column = column_for(first, registry)?;
    let lowered = name.to_lowercase();
    match lowered.as_str() {
        "year" | "month" | "day" | "hour" | "minute" => {
            Ok(query.where_date_part(lowered, column, op, value))
        }
        "date" => Ok(query.where_date(column, op, format_temporal(value, "%Y-%m-%d"))),
        "time" => Ok(query.where_time(column, op, format_temporal(value, "%H:%M"))),
        _ => Ok(query),
    }
}

fn format_temporal(value: Value, format: &str) -> Value {
    match value {
        Value::DateTime(dt) => Value::String(dt.format(format).to_string()),
        Value::String(text) => parse_datetime_utc(&text).map_or_else(
            || Value::String(text.trim().to_string()),
            |dt| Value::String(dt.format(format).to_string()),
        ),
        other => other,
    }
}

/// A function call standing alone as a predicate.
///
/// Only the text-match family produces clauses; any other name passes the
/// query through unchanged.
fn compile_bare_function(
    name: &str,
    args: &[FilterExpr],
    query: SqlQuery,
    registry: &mut ColumnRegistry,
) -> ODataResult<SqlQuery> {
    enum Kind {
        Contains,
        StartsWith,
        EndsWith,
    }
    let kind = match name.to_lowercase().as_str() {
        "contains" => Kind::Contains,
        "startswith" => Kind::StartsWith,
        "endswith" => Kind::EndsWith,
        _ => return Ok(query),
    };
    let Some(first) = args.first() else {
        return Ok(query);
    };
    let column = column_for(first, registry)?;
    let ty = registry.column_type(&column).cloned();
    let value = args
        .get(1)
        .map_or(Value::Null, |arg| value_for(arg, ty.as_ref()));
    Ok(match kind {
        Kind::Contains => query.where_contains(column, value),
        Kind::StartsWith => query.where_starts_with(column, value),
        Kind::EndsWith => query.where_ends_with(column, value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Glue, Predicate, TextMatchKind};
    use crate::parser::parse_filter;
    use crate::schema::{ColumnType, TableSchema};
    use chrono::{TimeZone, Utc};
    use odata_rs_core::ODataError;

    fn registry() -> ColumnRegistry {
        let schema = TableSchema::new("employees")
            .id_column("Id")
            .column("Id", ColumnType::Number)
            .column("Name", ColumnType::Text)
            .column("Status", ColumnType::enum_of(&["Active", "Inactive"]))
            .column("DivisionId", ColumnType::Number)
            .column("Created", ColumnType::DateTime);
        ColumnRegistry::strict(&schema)
    }

    fn compile(source: &str) -> SqlQuery {
        let expr = parse_filter(source).unwrap();
        compile_filter(&expr, SqlQuery::table("employees"), &mut registry()).unwrap()
    }

    fn compile_err(source: &str) -> ODataError {
        let expr = parse_filter(source).unwrap();
        compile_filter(&expr, SqlQuery::table("employees"), &mut registry()).unwrap_err()
    }

    #[test]
    fn test_simple_comparison() {
        let query = compile("divisionid eq 3");
        assert_eq!(query.wheres.len(), 1);
        assert_eq!(
            query.wheres[0].predicate,
            Predicate::Compare {
                column: "DivisionId".to_string(),
                op: "=".to_string(),
                value: Value::Int(3),
            }
        );
    }

    #[test]
    fn test_and_produces_group() {
        let query = compile("Status eq 'Active' and DivisionId eq 3");
        assert_eq!(query.wheres.len(), 1);
        let Predicate::Group(inner) = &query.wheres[0].predicate else {
            panic!("expected a group");
        };
        assert_eq!(inner.len(), 2);
        assert_eq!(inner[1].glue, Glue::And);
    }

    #[test]
    fn test_or_glues_right_side() {
        let query = compile("Status eq 'Active' or DivisionId eq 3");
        let Predicate::Group(inner) = &query.wheres[0].predicate else {
            panic!("expected a group");
        };
        assert_eq!(inner[1].glue, Glue::Or);
    }

    #[test]
    fn test_enum_literal_canonicalized() {
        let query = compile("Status eq 'ACTIVE'");
        assert_eq!(
            query.wheres[0].predicate,
            Predicate::Compare {
                column: "Status".to_string(),
                op: "=".to_string(),
                value: Value::String("Active".to_string()),
            }
        );
    }

    #[test]
    fn test_datetime_literal_coerced() {
        let query = compile("Created ge '2024-01-01'");
        assert_eq!(
            query.wheres[0].predicate,
            Predicate::Compare {
                column: "Created".to_string(),
                op: ">=".to_string(),
                value: Value::DateTime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            }
        );
    }

    #[test]
    fn test_contains_builds_text_match() {
        let query = compile("contains(Name,'Jo')");
        assert_eq!(
            query.wheres[0].predicate,
            Predicate::TextMatch {
                column: "Name".to_string(),
                kind: TextMatchKind::Contains,
                value: Value::String("Jo".to_string()),
            }
        );
    }

    #[test]
    fn test_not_contains_negates_clause() {
        let query = compile("not contains(Name,'Jo')");
        assert!(query.wheres[0].negated);
    }

    #[test]
    fn test_not_over_bare_property_is_a_no_op() {
        let query = compile("not Name");
        assert!(query.wheres.is_empty());
        assert!(query.negate_next);
    }

    #[test]
    fn test_pending_not_caught_by_later_clause() {
        // the right side of the `and` absorbs the toggle the left side left
        // hanging
        let query = compile("not Name and DivisionId eq 3");
        let Predicate::Group(inner) = &query.wheres[0].predicate else {
            panic!("expected a group");
        };
        assert_eq!(inner.len(), 1);
        assert!(inner[0].negated);
    }

    #[test]
    fn test_nested_not_swallows_operand() {
        // recursion stops at the inner `not`, so the contains never compiles
        // and only the outer toggle remains pending
        let query = compile("not not contains(Name,'x')");
        assert!(query.wheres.is_empty());
        assert!(query.negate_next);
    }

    #[test]
    fn test_unary_left_of_comparison_toggles() {
        let query = compile("not Status eq 'Active'");
        assert!(query.wheres[0].negated);
        assert_eq!(
            query.wheres[0].predicate,
            Predicate::Compare {
                column: "Status".to_string(),
                op: "=".to_string(),
                value: Value::String("Active".to_string()),
            }
        );
    }

    #[test]
    fn test_unary_function_left_compiles_negated_predicate() {
        // the negated contains lands as its own clause; the comparison
        // against `true` then has nothing to add for a text function
        let query = compile("not contains(Name,'x') eq true");
        assert_eq!(query.wheres.len(), 1);
        assert!(query.wheres[0].negated);
        assert!(matches!(
            query.wheres[0].predicate,
            Predicate::TextMatch { .. }
        ));
        assert!(!query.negate_next);
    }

    #[test]
    fn test_year_comparison() {
        let query = compile("year(Created) eq 2024");
        assert_eq!(
            query.wheres[0].predicate,
            Predicate::DatePart {
                part: "year".to_string(),
                column: "Created".to_string(),
                op: "=".to_string(),
                value: Value::Int(2024),
            }
        );
    }

    #[test]
    fn test_date_comparison_normalizes_text() {
        let query = compile("date(Created) eq '2024-01-02T15:30:00Z'");
        assert_eq!(
            query.wheres[0].predicate,
            Predicate::DateOnly {
                column: "Created".to_string(),
                op: "=".to_string(),
                value: Value::String("2024-01-02".to_string()),
            }
        );
    }

    #[test]
    fn test_time_comparison_normalizes_text() {
        let query = compile("time(Created) ge '2024-01-02T15:30:00Z'");
        assert_eq!(
            query.wheres[0].predicate,
            Predicate::TimeOnly {
                column: "Created".to_string(),
                op: ">=".to_string(),
                value: Value::String("15:30".to_string()),
            }
        );
    }

    #[test]
    fn test_in_list_coerces_elements() {
        let query = compile("Status in ('active','INACTIVE')");
        assert_eq!(
            query.wheres[0].predicate,
            Predicate::InList {
                column: "Status".to_string(),
                values: vec![
                    Value::String("Active".to_string()),
                    Value::String("Inactive".to_string()),
                ],
            }
        );
    }

    #[test]
    fn test_unknown_column_fails() {
        assert_eq!(
            compile_err("Salary gt 10"),
            ODataError::UnknownColumn("Salary".to_string())
        );
    }

    #[test]
    fn test_unknown_function_is_a_no_op() {
        let query = compile("tolower(Name) eq 'jo'");
        assert!(query.wheres.is_empty());
    }

    #[test]
    fn test_column_to_column_comparison_is_a_no_op() {
        let query = compile("Name eq Status");
        assert!(query.wheres.is_empty());
    }

    #[test]
    fn test_standalone_literal_is_a_no_op() {
        let query = compile("true");
        assert!(query.wheres.is_empty());
    }
}
