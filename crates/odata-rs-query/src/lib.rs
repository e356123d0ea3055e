//! Query-option compilation for relational stores.
//!
//! This crate turns the structured query options of an HTTP API,
//! `$filter`, `$apply`, `$orderby`, `$select`, `$top`, and `$skip`, into a
//! backend-neutral [`SqlQuery`] that renders to parameterized SQL.
//!
//! - [`request`]: the raw clause text a caller hands in
//! - [`parser`]: clause text to syntax trees
//! - [`ast`]: the filter and transformation trees
//! - [`schema`]: static table metadata and the [`Queryable`] trait
//! - [`registry`]: case-insensitive column resolution
//! - [`compiler`]: trees to [`SqlQuery`], via [`QueryCompiler`]
//! - [`builder`]: the composable query object itself
//! - [`render`]: per-backend SQL text generation
//!
//! # Example
//!
//! ```
//! use std::sync::LazyLock;
//!
//! use odata_rs_query::{
//!     ColumnType, QueryCompiler, QueryMode, QueryRequest, Queryable, SqlBackend,
//!     SqlRenderer, TableSchema,
//! };
//!
//! struct Employee;
//!
//! impl Queryable for Employee {
//!     fn schema() -> &'static TableSchema {
//!         static SCHEMA: LazyLock<TableSchema> = LazyLock::new(|| {
//!             TableSchema::new("employees")
//!                 .id_column("Id")
//!                 .column("Id", ColumnType::Number)
//!                 .column("Name", ColumnType::Text)
//!                 .column("DivisionId", ColumnType::Number)
//!         });
//!         &SCHEMA
//!     }
//! }
//!
//! let request = QueryRequest::new()
//!     .filter("contains(Name,'Jo') and DivisionId eq 3")
//!     .top("10");
//! let query = QueryCompiler::new().compile::<Employee>(&request, QueryMode::Rows)?;
//! let (sql, params) = SqlRenderer::new(SqlBackend::PostgreSQL).render(&query);
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM \"employees\" WHERE (\"Name\" ILIKE $1 AND \"DivisionId\" = $2) LIMIT 10"
//! );
//! assert_eq!(params.len(), 2);
//! # Ok::<(), odata_rs_core::ODataError>(())
//! ```

pub mod ast;
pub mod builder;
pub mod compiler;
pub mod parser;
pub mod registry;
pub mod render;
pub mod request;
pub mod schema;
pub mod value;

pub use ast::{
    AggregateExpr, AggregateMethod, BinaryOp, FilterExpr, OrderByTerm, Transformation, UnaryOp,
};
pub use builder::{FromSource, Glue, Ordering, Predicate, SqlQuery, TextMatchKind, WhereClause};
pub use compiler::QueryCompiler;
pub use registry::ColumnRegistry;
pub use render::{SqlBackend, SqlRenderer};
pub use request::{QueryMode, QueryRequest};
pub use schema::{ColumnDef, ColumnType, Queryable, TableSchema};
pub use value::Value;
