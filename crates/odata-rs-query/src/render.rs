//! Rendering compiled queries to SQL text plus bound parameters.
//!
//! The renderer is the only backend-aware layer. Identifiers are quoted
//! with double quotes on every backend; placeholders, case-insensitive
//! matching, date extraction, and dynamic-column access differ per backend.

use serde::{Deserialize, Serialize};

use crate::builder::{FromSource, Glue, Predicate, SqlQuery, TextMatchKind, WhereClause};
use crate::value::Value;

/// The SQL dialect to render for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlBackend {
    /// PostgreSQL: `$n` placeholders, `ILIKE`, `->>'key'` extraction.
    PostgreSQL,
    /// SQLite: `?` placeholders, `strftime` date parts, `json_extract`.
    SQLite,
    /// MySQL: `?` placeholders, `EXTRACT`, `json_extract`.
    MySQL,
}

/// Renders [`SqlQuery`] values into `(sql, params)` pairs for one backend.
#[derive(Debug, Clone, Copy)]
pub struct SqlRenderer {
    backend: SqlBackend,
}

impl SqlRenderer {
    /// Creates a renderer for the given backend.
    pub const fn new(backend: SqlBackend) -> Self {
        Self { backend }
    }

    /// Renders the query to SQL text and its bound parameters, in order of
    /// appearance.
    pub fn render(&self, query: &SqlQuery) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let sql = self.render_query(query, &mut params);
        (sql, params)
    }

    fn placeholder(&self, index: usize) -> String {
        match self.backend {
            SqlBackend::PostgreSQL => format!("${index}"),
            SqlBackend::SQLite | SqlBackend::MySQL => "?".to_string(),
        }
    }

    fn render_query(&self, query: &SqlQuery, params: &mut Vec<Value>) -> String {
        let mut sql = String::from("SELECT ");

        if query.count {
            sql.push_str("COUNT(*)");
        } else {
            let mut projections: Vec<String> = query
                .selects
                .iter()
                .map(|column| self.column_expr(column))
                .collect();
            projections.extend(query.raw_selects.iter().cloned());
            if projections.is_empty() {
                sql.push('*');
            } else {
                sql.push_str(&projections.join(", "));
            }
        }

        match &query.from {
            FromSource::Table(name) => {
                sql.push_str(" FROM \"");
                sql.push_str(name);
                sql.push('"');
            }
            FromSource::Subquery(inner) => {
                let inner_sql = self.render_query(inner, params);
                sql.push_str(" FROM (");
                sql.push_str(&inner_sql);
                sql.push_str(") AS sub");
            }
            FromSource::None => {}
        }

        if !query.wheres.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.render_clauses(&query.wheres, params));
        }

        if !query.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            let columns: Vec<String> = query
                .group_by
                .iter()
                .map(|column| self.column_expr(column))
                .collect();
            sql.push_str(&columns.join(", "));
        }

        if !query.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let terms: Vec<String> = query
                .order_by
                .iter()
                .map(|term| {
                    let direction = if term.descending { "DESC" } else { "ASC" };
                    format!("{} {direction}", self.column_expr(&term.column))
                })
                .collect();
            sql.push_str(&terms.join(", "));
        }

        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = query.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        sql
    }

    fn render_clauses(&self, clauses: &[WhereClause], params: &mut Vec<Value>) -> String {
        let mut out = String::new();
        for (i, clause) in clauses.iter().enumerate() {
            if i > 0 {
                out.push_str(match clause.glue {
                    Glue::And => " AND ",
                    Glue::Or => " OR ",
                });
            }
            let rendered = self.render_predicate(&clause.predicate, params);
            if clause.negated {
                out.push_str("NOT (");
                out.push_str(&rendered);
                out.push(')');
            } else {
                out.push_str(&rendered);
            }
        }
        out
    }

    fn render_predicate(&self, predicate: &Predicate, params: &mut Vec<Value>) -> String {
        match predicate {
            Predicate::Compare { column, op, value } => {
                params.push(value.clone());
                format!(
                    "{} {op} {}",
                    self.column_expr(column),
                    self.placeholder(params.len())
                )
            }
            Predicate::TextMatch {
                column,
                kind,
                value,
            } => {
                let text = text_of(value);
                let pattern = match kind {
                    TextMatchKind::Contains => format!("%{text}%"),
                    TextMatchKind::StartsWith => format!("{text}%"),
                    TextMatchKind::EndsWith => format!("%{text}"),
                };
                params.push(Value::String(pattern));
                let column = self.column_expr(column);
                let placeholder = self.placeholder(params.len());
                if self.backend == SqlBackend::PostgreSQL {
                    format!("{column} ILIKE {placeholder}")
                } else {
                    format!("LOWER({column}) LIKE LOWER({placeholder})")
                }
            }
            Predicate::InList { column, values } => {
                let mut slots = Vec::with_capacity(values.len());
                for value in values {
                    params.push(value.clone());
                    slots.push(self.placeholder(params.len()));
                }
                format!("{} IN ({})", self.column_expr(column), slots.join(", "))
            }
            Predicate::DatePart {
                part,
                column,
                op,
                value,
            } => {
                params.push(value.clone());
                let placeholder = self.placeholder(params.len());
                let column = self.column_expr(column);
                match self.backend {
                    SqlBackend::SQLite => {
                        let pattern = strftime_pattern(part);
                        format!(
                            "CAST(strftime('{pattern}', {column}) AS INTEGER) {op} {placeholder}"
                        )
                    }
                    SqlBackend::PostgreSQL | SqlBackend::MySQL => {
                        format!(
                            "EXTRACT({} FROM {column}) {op} {placeholder}",
                            part.to_uppercase()
                        )
                    }
                }
            }
            Predicate::DateOnly { column, op, value } => {
                params.push(value.clone());
                let placeholder = self.placeholder(params.len());
                let column = self.column_expr(column);
                match self.backend {
                    SqlBackend::PostgreSQL => format!("CAST({column} AS DATE) {op} {placeholder}"),
                    SqlBackend::SQLite => format!("date({column}) {op} {placeholder}"),
                    SqlBackend::MySQL => format!("DATE({column}) {op} {placeholder}"),
                }
            }
            Predicate::TimeOnly { column, op, value } => {
                params.push(value.clone());
                let placeholder = self.placeholder(params.len());
                let column = self.column_expr(column);
                match self.backend {
                    SqlBackend::PostgreSQL => {
                        format!("TO_CHAR({column}, 'HH24:MI') {op} {placeholder}")
                    }
                    SqlBackend::SQLite => {
                        format!("strftime('%H:%M', {column}) {op} {placeholder}")
                    }
                    SqlBackend::MySQL => {
                        format!("DATE_FORMAT({column}, '%H:%i') {op} {placeholder}")
                    }
                }
            }
            Predicate::Group(clauses) => {
                format!("({})", self.render_clauses(clauses, params))
            }
        }
    }

    /// Quotes a column, rendering dotted dynamic names as JSON extraction
    /// from their container column.
    fn column_expr(&self, column: &str) -> String {
        if let Some((container, key)) = column.split_once('.') {
            return match self.backend {
                SqlBackend::PostgreSQL => format!("\"{container}\"->>'{key}'"),
                SqlBackend::SQLite | SqlBackend::MySQL => {
                    format!("json_extract(\"{container}\", '$.{key}')")
                }
            };
        }
        format!("\"{column}\"")
    }
}

fn strftime_pattern(part: &str) -> &'static str {
    match part {
        "month" => "%m",
        "day" => "%d",
        "hour" => "%H",
        "minute" => "%M",
        _ => "%Y",
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
