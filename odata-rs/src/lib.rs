//! # odata-rs
//!
//! An OData-style query compiler targeting relational SQL builders.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `odata-rs` to get the whole stack, or on the
//! individual crates for finer-grained control.

/// Foundation types: errors, settings, and logging setup.
pub use odata_rs_core as core;

/// Query-option parsing, compilation, and SQL rendering.
pub use odata_rs_query as query;

pub use odata_rs_core::{Clause, ODataError, ODataResult, Settings, SETTINGS};
pub use odata_rs_query::{
    ColumnType, QueryCompiler, QueryMode, QueryRequest, Queryable, SqlBackend, SqlQuery,
    SqlRenderer, TableSchema, Value,
};

// Third-party re-exports so applications can match versions
pub use chrono;
pub use serde;
pub use serde_json;
pub use tracing;
