//! The executable query object the compiler produces.
//!
//! [`SqlQuery`] is a backend-neutral description of one SELECT: source,
//! projection, predicates, grouping, ordering, and paging. Predicates carry
//! two pieces of pending state, a glue word and a negation flag, which the
//! next pushed predicate consumes. `or()` and `not()` therefore modify
//! whatever clause lands next, not the one before them.

use serde::{Deserialize, Serialize};

use odata_rs_core::ODataResult;

use crate::value::Value;

/// How a predicate joins the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Glue {
    /// `AND`, the default.
    #[default]
    And,
    /// `OR`.
    Or,
}

/// One ordering term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    /// The ordered column.
    pub column: String,
    /// Whether to sort descending.
    pub descending: bool,
}

/// What the query selects from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FromSource {
    /// No source yet. Group shells stay in this state.
    #[default]
    None,
    /// A named table.
    Table(String),
    /// A nested query, rendered as a parenthesized derived table.
    Subquery(Box<SqlQuery>),
}

/// The kind of case-insensitive text match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMatchKind {
    /// The value occurs anywhere in the column.
    Contains,
    /// The column begins with the value.
    StartsWith,
    /// The column ends with the value.
    EndsWith,
}

/// One WHERE entry: the predicate plus how it attaches to its predecessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    /// Glue to the previous clause. Ignored on the first clause of a scope.
    pub glue: Glue,
    /// Whether the predicate is wrapped in `NOT (...)`.
    pub negated: bool,
    /// The predicate itself.
    pub predicate: Predicate,
}

/// A single WHERE predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// `column <op> value`.
    Compare {
        /// The column name.
        column: String,
        /// The SQL comparison symbol.
        op: String,
        /// The bound value.
        value: Value,
    },
    /// A case-insensitive substring, prefix, or suffix match.
    TextMatch {
        /// The column name.
        column: String,
        /// Substring, prefix, or suffix.
        kind: TextMatchKind,
        /// The matched text.
        value: Value,
    },
    /// `column IN (v, v, ...)`.
    InList {
        /// The column name.
        column: String,
        /// The candidate values.
        values: Vec<Value>,
    },
    /// A comparison against one extracted date part, e.g. the year.
    DatePart {
        /// The part name in lowercase: `year`, `month`, `day`, `hour`, `minute`.
        part: String,
        /// The column name.
        column: String,
        /// The SQL comparison symbol.
        op: String,
        /// The bound value.
        value: Value,
    },
    /// A comparison against the column's calendar date, `yyyy-MM-dd`.
    DateOnly {
        /// The column name.
        column: String,
        /// The SQL comparison symbol.
        op: String,
        /// The bound value.
        value: Value,
    },
    /// A comparison against the column's clock time, `HH:mm`.
    TimeOnly {
        /// The column name.
        column: String,
        /// The SQL comparison symbol.
        op: String,
        /// The bound value.
        value: Value,
    },
    /// A parenthesized group of clauses.
    Group(Vec<WhereClause>),
}

/// A composable SELECT description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SqlQuery {
    pub(crate) from: FromSource,
    pub(crate) selects: Vec<String>,
    pub(crate) raw_selects: Vec<String>,
    pub(crate) wheres: Vec<WhereClause>,
    pub(crate) group_by: Vec<String>,
    pub(crate) order_by: Vec<Ordering>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) count: bool,
    pub(crate) next_glue: Glue,
    pub(crate) negate_next: bool,
    pub(crate) dynamic_columns: Vec<String>,
}

impl SqlQuery {
    /// Creates a query over a named table.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            from: FromSource::Table(name.into()),
            ..Self::default()
        }
    }

    /// Creates a query whose source is another query.
    ///
    /// The outer query starts fresh; nothing from the inner query leaks out
    /// except through the derived table.
    pub fn from_subquery(inner: Self) -> Self {
        Self {
            from: FromSource::Subquery(Box::new(inner)),
            ..Self::default()
        }
    }

    /// A sourceless query used to collect one parenthesized clause group.
    pub(crate) fn group_shell() -> Self {
        Self::default()
    }

    /// Adds a projected column.
    #[must_use]
    pub fn select(mut self, column: impl Into<String>) -> Self {
        self.selects.push(column.into());
        self
    }

    /// Adds a raw projection expression, emitted verbatim.
    #[must_use]
    pub fn select_raw(mut self, expr: impl Into<String>) -> Self {
        self.raw_selects.push(expr.into());
        self
    }

    /// Adds a grouping column.
    #[must_use]
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    /// Adds an ordering term.
    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order_by.push(Ordering {
            column: column.into(),
            descending,
        });
        self
    }

    /// Caps the number of returned rows.
    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skips leading rows.
    #[must_use]
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Switches the projection to `COUNT(*)`.
    #[must_use]
    pub fn as_count(mut self) -> Self {
        self.count = true;
        self
    }

    /// Joins the next pushed predicate with `OR` instead of `AND`.
    #[must_use]
    pub fn or(mut self) -> Self {
        self.next_glue = Glue::Or;
        self
    }

    /// Toggles negation for the next pushed predicate.
    ///
    /// Two `not()` calls with nothing pushed in between cancel out. If no
    /// predicate follows in this scope the flag silently finds the next one
    /// that does.
    #[must_use]
    pub fn not(mut self) -> Self {
        self.negate_next = !self.negate_next;
        self
    }

    /// Pushes `column <op> value`.
    #[must_use]
    pub fn where_op(
        self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.push_clause(Predicate::Compare {
            column: column.into(),
            op: op.into(),
            value: value.into(),
        })
    }

    /// Pushes a case-insensitive substring match.
    #[must_use]
    pub fn where_contains(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_text_match(column.into(), TextMatchKind::Contains, value.into())
    }

    /// Pushes a case-insensitive prefix match.
    #[must_use]
    pub fn where_starts_with(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_text_match(column.into(), TextMatchKind::StartsWith, value.into())
    }

    /// Pushes a case-insensitive suffix match.
    #[must_use]
    pub fn where_ends_with(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_text_match(column.into(), TextMatchKind::EndsWith, value.into())
    }

    /// Pushes `column IN (values...)`.
    #[must_use]
    pub fn where_in(self, column: impl Into<String>, values: Vec<Value>) -> Self {
        self.push_clause(Predicate::InList {
            column: column.into(),
            values,
        })
    }

    /// Pushes a comparison against one extracted date part.
    #[must_use]
    pub fn where_date_part(
        self,
        part: impl Into<String>,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.push_clause(Predicate::DatePart {
            part: part.into(),
            column: column.into(),
            op: op.into(),
            value: value.into(),
        })
    }

    /// Pushes a comparison against the column's calendar date.
    #[must_use]
    pub fn where_date(
        self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.push_clause(Predicate::DateOnly {
            column: column.into(),
            op: op.into(),
            value: value.into(),
        })
    }

    /// Pushes a comparison against the column's clock time.
    #[must_use]
    pub fn where_time(
        self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.push_clause(Predicate::TimeOnly {
            column: column.into(),
            op: op.into(),
            value: value.into(),
        })
    }

    /// Collects the clauses `f` pushes into one parenthesized group.
    ///
    /// The closure receives a fresh scope; pending glue and negation on the
    /// outer query apply to the group as a whole. A group that ends up empty
    /// is dropped without consuming the outer pending state.
    pub fn where_group<F>(self, f: F) -> ODataResult<Self>
    where
        F: FnOnce(Self) -> ODataResult<Self>,
    {
        let child = f(Self::group_shell())?;
        if child.wheres.is_empty() {
            return Ok(self);
        }
        Ok(self.push_clause(Predicate::Group(child.wheres)))
    }

    /// Whether this query projects `COUNT(*)`.
    pub const fn is_count(&self) -> bool {
        self.count
    }

    /// Dynamic column names referenced during compilation, in first-seen
    /// order. Callers use these to prepare value-table access.
    pub fn dynamic_columns(&self) -> &[String] {
        &self.dynamic_columns
    }

    pub(crate) fn with_dynamic_columns(mut self, columns: Vec<String>) -> Self {
        self.dynamic_columns = columns;
        self
    }

    fn push_text_match(self, column: String, kind: TextMatchKind, value: Value) -> Self {
        self.push_clause(Predicate::TextMatch {
            column,
            kind,
            value,
        })
    }

    fn push_clause(mut self, predicate: Predicate) -> Self {
        let glue = self.next_glue;
        let negated = self.negate_next;
        self.next_glue = Glue::And;
        self.negate_next = false;
        self.wheres.push(WhereClause {
            glue,
            negated,
            predicate,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_glue_is_and() {
        let query = SqlQuery::table("t")
            .where_op("A", "=", 1)
            .where_op("B", "=", 2);

        assert_eq!(query.wheres.len(), 2);
        assert_eq!(query.wheres[1].glue, Glue::And);
    }

    #[test]
    fn test_or_applies_to_next_clause_only() {
        let query = SqlQuery::table("t")
            .where_op("A", "=", 1)
            .or()
            .where_op("B", "=", 2)
            .where_op("C", "=", 3);

        assert_eq!(query.wheres[1].glue, Glue::Or);
        assert_eq!(query.wheres[2].glue, Glue::And);
    }

    #[test]
    fn test_not_toggles() {
        let query = SqlQuery::table("t").not().not().where_op("A", "=", 1);
        assert!(!query.wheres[0].negated);

        let query = SqlQuery::table("t").not().where_op("A", "=", 1);
        assert!(query.wheres[0].negated);
    }

    #[test]
    fn test_pending_not_survives_until_next_clause() {
        // nothing consumes the flag here, so the later clause picks it up
        let query = SqlQuery::table("t")
            .not()
            .where_group(Ok)
            .unwrap()
            .where_op("A", "=", 1);

        assert!(query.wheres[0].negated);
    }

    #[test]
    fn test_empty_group_skipped() {
        let query = SqlQuery::table("t").where_group(Ok).unwrap();
        assert!(query.wheres.is_empty());
    }

    #[test]
    fn test_group_collects_child_clauses() {
        let query = SqlQuery::table("t")
            .where_group(|g| Ok(g.where_op("A", "=", 1).or().where_op("B", "=", 2)))
            .unwrap();

        assert_eq!(query.wheres.len(), 1);
        match &query.wheres[0].predicate {
            Predicate::Group(inner) => {
                assert_eq!(inner.len(), 2);
                assert_eq!(inner[1].glue, Glue::Or);
            }
            other => panic!("expected a group, got {other:?}"),
        }
    }

    #[test]
    fn test_from_subquery_starts_fresh() {
        let inner = SqlQuery::table("t").where_op("A", "=", 1).limit(5);
        let outer = SqlQuery::from_subquery(inner);

        assert!(outer.wheres.is_empty());
        assert!(outer.limit.is_none());
        assert!(matches!(outer.from, FromSource::Subquery(_)));
    }

    #[test]
    fn test_as_count() {
        let query = SqlQuery::table("t").as_count();
        assert!(query.is_count());
    }
}
