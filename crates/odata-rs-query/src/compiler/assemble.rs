//! The request-level compiler: query options in, executable query out.

use odata_rs_core::logging::compile_span;
use odata_rs_core::{Clause, ODataError, ODataResult, Settings};

use crate::builder::SqlQuery;
use crate::compiler::filter::compile_filter;
use crate::compiler::transform::compile_transformations;
use crate::parser::{parse_apply, parse_filter, parse_order_by, parse_select};
use crate::registry::ColumnRegistry;
use crate::request::{QueryMode, QueryRequest};
use crate::schema::{Queryable, TableSchema};

/// Compiles [`QueryRequest`]s against table schemas.
///
/// A compiler is cheap to construct and stateless across calls; build one
/// per store configuration and reuse it.
#[derive(Debug, Clone, Default)]
pub struct QueryCompiler {
    containers: Vec<String>,
    max_top: Option<u64>,
}

impl QueryCompiler {
    /// Creates a strict compiler: declared columns only, no row cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compiler from application settings, taking the attribute
    /// container list and the optional row cap from there.
    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            containers: settings.attribute_containers.clone(),
            max_top: settings.max_top,
        }
    }

    /// Accepts dynamic columns under the given attribute containers.
    #[must_use]
    pub fn allow_containers(mut self, containers: Vec<String>) -> Self {
        self.containers = containers;
        self
    }

    /// Caps `$top`; larger requests are clamped, not rejected.
    #[must_use]
    pub fn max_top(mut self, cap: u64) -> Self {
        self.max_top = Some(cap);
        self
    }

    /// Compiles a request against `T`'s schema.
    pub fn compile<T: Queryable>(
        &self,
        request: &QueryRequest,
        mode: QueryMode,
    ) -> ODataResult<SqlQuery> {
        self.compile_table(T::schema(), request, mode)
    }

    /// Compiles a request against an explicit schema.
    ///
    /// In [`QueryMode::Count`], paging and projection text is never parsed
    /// and ordering is parsed but not applied, so only `$filter`, `$apply`,
    /// and malformed `$orderby` text can fail a count.
    pub fn compile_table(
        &self,
        schema: &TableSchema,
        request: &QueryRequest,
        mode: QueryMode,
    ) -> ODataResult<SqlQuery> {
        let span = compile_span(schema.table);
        let _guard = span.enter();

        let mut registry = if self.containers.is_empty() {
            ColumnRegistry::strict(schema)
        } else {
            ColumnRegistry::with_containers(schema, &self.containers)
        };

        // parse everything this mode consumes before touching the query, so
        // malformed text fails the request whole
        let steps = match clause_text(&request.apply) {
            Some(text) => Some(
                parse_apply(text).map_err(|e| ODataError::parse(Clause::Apply, e.to_string()))?,
            ),
            None => None,
        };
        let filter = match clause_text(&request.filter) {
            Some(text) => Some(
                parse_filter(text)
                    .map_err(|e| ODataError::parse(Clause::Filter, e.to_string()))?,
            ),
            None => None,
        };
        let (mut top, mut skip) = (None, None);
        if mode == QueryMode::Rows {
            top = clause_text(&request.top)
                .map(|text| parse_paging(Clause::Top, text))
                .transpose()?;
            skip = clause_text(&request.skip)
                .map(|text| parse_paging(Clause::Skip, text))
                .transpose()?;
        }
        let order_by = match clause_text(&request.order_by) {
            Some(text) => Some(
                parse_order_by(text)
                    .map_err(|e| ODataError::parse(Clause::OrderBy, e.to_string()))?,
            ),
            None => None,
        };
        let select_cols = if mode == QueryMode::Rows {
            match clause_text(&request.select) {
                Some(text) => Some(
                    parse_select(text)
                        .map_err(|e| ODataError::parse(Clause::Select, e.to_string()))?,
                ),
                None => None,
            }
        } else {
            None
        };

        // a projection that drops the identifier cannot feed row hydration
        if let Some(columns) = &select_cols {
            let has_star = columns.iter().any(|c| c == "*");
            let has_id = columns
                .iter()
                .any(|c| c.eq_ignore_ascii_case(schema.id_column));
            if !has_star && !has_id {
                return Err(ODataError::MissingIdentifier(schema.id_column.to_string()));
            }
        }

        let mut query = SqlQuery::table(schema.table);
        if mode == QueryMode::Count {
            query = query.as_count();
        }

        if mode == QueryMode::Rows {
            if let Some(mut n) = top {
                if let Some(cap) = self.max_top {
                    if n > cap {
                        tracing::debug!(requested = n, cap, "clamping top");
                        n = cap;
                    }
                }
                query = query.limit(n);
            }
            if let Some(n) = skip {
                query = query.offset(n);
            }
        }

        if let Some(steps) = &steps {
            query = compile_transformations(steps, query, &mut registry)?;
            // later clauses refine the transformed rows, not the raw table
            if filter.is_some() || select_cols.is_some() {
                query = SqlQuery::from_subquery(query);
            }
        }

        if let Some(expr) = &filter {
            query = compile_filter(expr, query, &mut registry)?;
        }

        if mode == QueryMode::Rows {
            if let Some(terms) = &order_by {
                for term in terms {
                    let column = registry.validate(&term.column)?;
                    query = query.order_by(column, term.descending);
                }
            }
            if let Some(columns) = &select_cols {
                if !columns.iter().any(|c| c == "*") {
                    for column in columns {
                        let name = registry.validate(column)?;
                        query = query.select(name);
                    }
                }
            }
        }

        query = query.with_dynamic_columns(registry.take_dynamic_columns());
        tracing::debug!(
            transformed = steps.is_some(),
            filtered = filter.is_some(),
            dynamic = query.dynamic_columns().len(),
            "compiled query"
        );
        Ok(query)
    }
}

fn clause_text(option: &Option<String>) -> Option<&str> {
    match option.as_deref() {
        Some(text) if !text.trim().is_empty() => Some(text),
        _ => None,
    }
}

fn parse_paging(clause: Clause, text: &str) -> ODataResult<u64> {
    let trimmed = text.trim();
    trimmed.parse::<u64>().map_err(|_| {
        ODataError::parse(
            clause,
            format!("expected a non-negative integer, got '{trimmed}'"),
        )
    })
}
