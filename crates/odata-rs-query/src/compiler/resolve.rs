//! Column and value extraction from expression nodes.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use odata_rs_core::ODataResult;

use crate::ast::FilterExpr;
use crate::registry::ColumnRegistry;
use crate::schema::ColumnType;
use crate::value::Value;

/// Resolves the node standing in column position to a canonical column name.
///
/// A conversion wrapper is unwrapped exactly once. Property nodes use their
/// written name; a function node in column position contributes its function
/// name. Anything else yields an empty name, which the registry rejects.
pub(crate) fn column_for(
    node: &FilterExpr,
    registry: &mut ColumnRegistry,
) -> ODataResult<String> {
    let node = match node {
        FilterExpr::Convert(inner) => inner.as_ref(),
        other => other,
    };
    let name = match node {
        FilterExpr::Property(name) | FilterExpr::OpenProperty(name) => name.as_str(),
        FilterExpr::Function { name, .. } => name.as_str(),
        _ => "",
    };
    registry.validate(name)
}

/// Extracts the constant value of a node, coerced to the column's type.
///
/// Conversion wrappers are unwrapped all the way down, and collections
/// coerce element-wise. Non-constant nodes yield `NULL`.
pub(crate) fn value_for(node: &FilterExpr, column_type: Option<&ColumnType>) -> Value {
    match node {
        FilterExpr::Convert(inner) => value_for(inner, column_type),
        FilterExpr::Literal(value) => coerce(value, column_type),
        FilterExpr::Collection(items) => Value::List(
            items
                .iter()
                .map(|item| value_for(item, column_type))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn coerce(value: &Value, column_type: Option<&ColumnType>) -> Value {
    match (column_type, value) {
        (Some(ColumnType::DateTime), Value::String(text)) => parse_datetime_utc(text)
            .map_or_else(|| Value::String(text.trim().to_string()), Value::DateTime),
        (Some(ColumnType::Enum { variants }), Value::String(text)) => {
            let trimmed = text.trim();
            variants
                .iter()
                .find(|variant| variant.eq_ignore_ascii_case(trimmed))
                .map_or_else(
                    || Value::String(trimmed.to_string()),
                    |canonical| Value::String(canonical.clone()),
                )
        }
        _ => value.clone(),
    }
}

/// Leniently parses timestamp text, assuming UTC when no offset is given.
///
/// Accepts RFC 3339, `T`- or space-separated date-times with optional
/// fractional seconds or missing seconds, and bare dates (taken as
/// midnight).
pub(crate) fn parse_datetime_utc(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}
