//! Core error types for the odata-rs workspace.
//!
//! This module provides the [`ODataError`] enum covering every failure a
//! query compilation can produce: clause parse errors, column resolution
//! errors, projection errors, and unsupported pipeline constructs. A request
//! either compiles completely or fails with exactly one of these.

use std::fmt;

use thiserror::Error;

/// The query-option clause an error originated from.
///
/// Every parse diagnostic is tagged with the clause it came from so API
/// consumers can tell a broken `$filter` apart from a broken `$orderby`
/// without string-matching the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    /// The `$filter` expression.
    Filter,
    /// The `$apply` transformation pipeline.
    Apply,
    /// The `$orderby` term list.
    OrderBy,
    /// The `$select` field list.
    Select,
    /// The `$top` paging value.
    Top,
    /// The `$skip` paging value.
    Skip,
}

impl Clause {
    /// Returns the query-option name for this clause.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filter => "$filter",
            Self::Apply => "$apply",
            Self::OrderBy => "$orderby",
            Self::Select => "$select",
            Self::Top => "$top",
            Self::Skip => "$skip",
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The primary error type for the odata-rs workspace.
///
/// Compilation is atomic: a request either produces a complete query or
/// exactly one `ODataError`. Every variant names the offending clause,
/// column, or construct so the message can be returned to the API caller
/// as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ODataError {
    // ── Parsing ──────────────────────────────────────────────────────

    /// A query clause failed to parse.
    #[error("{clause} error: {message}")]
    Parse {
        /// The clause the malformed text came from.
        clause: Clause,
        /// The parser diagnostic.
        message: String,
    },

    // ── Column resolution ────────────────────────────────────────────

    /// A referenced column does not exist on the queried type.
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),

    /// A referenced name is an attribute container, not a column.
    #[error("Ambiguous column: '{0}' is an attribute container; qualify it with a key")]
    AmbiguousColumn(String),

    // ── Projection ───────────────────────────────────────────────────

    /// An explicit field list omitted the identifier column.
    #[error("Select list must include the identifier column '{0}'")]
    MissingIdentifier(String),

    // ── Transformation pipeline ──────────────────────────────────────

    /// A pipeline step kind outside filter/groupby/aggregate.
    #[error("Unsupported transformation: {0}")]
    UnsupportedTransformation(String),

    /// An aggregation method outside the supported set.
    #[error("Unsupported aggregation method: {0}")]
    UnsupportedAggregate(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ODataError {
    /// Creates a clause-tagged parse error.
    pub fn parse(clause: Clause, message: impl Into<String>) -> Self {
        Self::Parse {
            clause,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code an API layer should map this error to.
    ///
    /// Everything a caller can cause with request text is a 400; only
    /// configuration problems are the server's fault.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Parse { .. }
            | Self::UnknownColumn(_)
            | Self::AmbiguousColumn(_)
            | Self::MissingIdentifier(_)
            | Self::UnsupportedTransformation(_)
            | Self::UnsupportedAggregate(_) => 400,
            Self::Configuration(_) => 500,
        }
    }
}

/// A convenience type alias for `Result<T, ODataError>`.
pub type ODataResult<T> = Result<T, ODataError>;
