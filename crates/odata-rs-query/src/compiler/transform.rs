//! Compilation of `$apply` pipelines.

use odata_rs_core::{ODataError, ODataResult};

use crate::ast::{AggregateExpr, AggregateMethod, Transformation};
use crate::builder::SqlQuery;
use crate::compiler::filter::compile_filter;
use crate::registry::ColumnRegistry;

/// Applies the pipeline steps in order.
///
/// Before every step except the first, the query so far becomes a subquery
/// unless the previous step was a filter; filters compose in place. An
/// aggregate step is terminal: whatever follows it is never reached.
pub(crate) fn compile_transformations(
    steps: &[Transformation],
    mut query: SqlQuery,
    registry: &mut ColumnRegistry,
) -> ODataResult<SqlQuery> {
    for (i, step) in steps.iter().enumerate() {
        if i > 0 && !matches!(steps[i - 1], Transformation::Filter(_)) {
            query = SqlQuery::from_subquery(query);
        }
        match step {
            Transformation::Filter(expr) => {
                query = compile_filter(expr, query, registry)?;
            }
            Transformation::GroupBy { columns, child } => {
                for column in columns {
                    let name = registry.validate(column)?;
                    query = query.select(name.clone()).group_by(name);
                }
                match child.as_deref() {
                    Some(Transformation::Aggregate(items)) => {
                        query = apply_aggregates(items, query, registry)?;
                    }
                    Some(other) => {
                        return Err(ODataError::UnsupportedTransformation(
                            other.kind_name().to_string(),
                        ));
                    }
                    None => {}
                }
            }
            Transformation::Aggregate(items) => {
                query = apply_aggregates(items, query, registry)?;
                return Ok(query);
            }
            Transformation::Compute(_) | Transformation::Expand(_) => {
                return Err(ODataError::UnsupportedTransformation(
                    step.kind_name().to_string(),
                ));
            }
        }
    }
    Ok(query)
}

fn apply_aggregates(
    items: &[AggregateExpr],
    mut query: SqlQuery,
    registry: &mut ColumnRegistry,
) -> ODataResult<SqlQuery> {
    for item in items {
        let rendered = match &item.method {
            AggregateMethod::Sum => format!("SUM({})", source_column(item, registry)?),
            AggregateMethod::Min => format!("MIN({})", source_column(item, registry)?),
            AggregateMethod::Max => format!("MAX({})", source_column(item, registry)?),
            AggregateMethod::Average => format!("AVG({})", source_column(item, registry)?),
            AggregateMethod::CountDistinct => {
                format!("COUNT(DISTINCT {})", source_column(item, registry)?)
            }
            AggregateMethod::VirtualCount => "COUNT(1)".to_string(),
            AggregateMethod::Custom(name) => {
                return Err(ODataError::UnsupportedAggregate(name.clone()));
            }
        };
        query = query.select_raw(format!("{rendered} AS {}", item.alias));
    }
    Ok(query)
}

fn source_column(item: &AggregateExpr, registry: &mut ColumnRegistry) -> ODataResult<String> {
    registry.validate(item.source.as_deref().unwrap_or_default())
}
