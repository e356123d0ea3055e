//! Table schemas: the static column metadata a compiler resolves names against.

use serde::{Deserialize, Serialize};

/// The semantic type of a column, used to drive value coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnType {
    /// Free-form text.
    Text,
    /// Integer or floating-point number.
    Number,
    /// Boolean.
    Bool,
    /// A point in time; string literals are coerced to UTC timestamps.
    DateTime,
    /// A closed set of named values; literals are matched case-insensitively
    /// and rewritten to the canonical variant spelling.
    Enum {
        /// The canonical variant spellings.
        variants: Vec<String>,
    },
    /// A nested object. Not addressable in queries.
    Object,
    /// A collection of values. Not addressable in queries.
    Collection,
}

impl ColumnType {
    /// Whether columns of this type are entered into a lookup registry.
    ///
    /// Object and collection columns have no scalar representation and are
    /// skipped; referencing one by name is an unknown-column error.
    pub const fn is_registrable(&self) -> bool {
        !matches!(self, Self::Object | Self::Collection)
    }

    /// Shorthand for an enum type over the given variant names.
    pub fn enum_of(variants: &[&str]) -> Self {
        Self::Enum {
            variants: variants.iter().map(ToString::to_string).collect(),
        }
    }
}

/// A single column declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// The canonical column name as it appears in storage.
    pub name: &'static str,
    /// The column's semantic type.
    pub column_type: ColumnType,
}

impl ColumnDef {
    /// Creates a column declaration.
    pub fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self { name, column_type }
    }
}

/// The static description of one queryable table.
///
/// Built once per type, typically inside a `LazyLock`, and handed out as a
/// `&'static` reference through [`Queryable::schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// The table name.
    pub table: &'static str,
    /// The identifier column. A `$select` list must include it.
    pub id_column: &'static str,
    /// The declared columns.
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Creates a schema for `table` with the default identifier column `id`.
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            id_column: "id",
            columns: Vec::new(),
        }
    }

    /// Overrides the identifier column name.
    #[must_use]
    pub fn id_column(mut self, name: &'static str) -> Self {
        self.id_column = name;
        self
    }

    /// Declares a column.
    #[must_use]
    pub fn column(mut self, name: &'static str, column_type: ColumnType) -> Self {
        self.columns.push(ColumnDef::new(name, column_type));
        self
    }
}

/// A type whose instances live in one table and can be queried.
///
/// # Example
///
/// ```
/// use std::sync::LazyLock;
///
/// use odata_rs_query::schema::{ColumnType, Queryable, TableSchema};
///
/// struct Employee;
///
/// impl Queryable for Employee {
///     fn schema() -> &'static TableSchema {
///         static SCHEMA: LazyLock<TableSchema> = LazyLock::new(|| {
///             TableSchema::new("employees")
///                 .id_column("Id")
///                 .column("Id", ColumnType::Number)
///                 .column("Name", ColumnType::Text)
///                 .column("Status", ColumnType::enum_of(&["Active", "Inactive"]))
///         });
///         &SCHEMA
///     }
/// }
///
/// assert_eq!(Employee::schema().table, "employees");
/// ```
pub trait Queryable {
    /// The static schema for this type's table.
    fn schema() -> &'static TableSchema;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_builder() {
        let schema = TableSchema::new("employees")
            .id_column("Id")
            .column("Id", ColumnType::Number)
            .column("Name", ColumnType::Text);

        assert_eq!(schema.table, "employees");
        assert_eq!(schema.id_column, "Id");
        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.columns[1].name, "Name");
    }

    #[test]
    fn test_default_id_column() {
        let schema = TableSchema::new("logs");
        assert_eq!(schema.id_column, "id");
    }

    #[test]
    fn test_registrable_types() {
        assert!(ColumnType::Text.is_registrable());
        assert!(ColumnType::Number.is_registrable());
        assert!(ColumnType::DateTime.is_registrable());
        assert!(ColumnType::enum_of(&["A"]).is_registrable());
        assert!(!ColumnType::Object.is_registrable());
        assert!(!ColumnType::Collection.is_registrable());
    }

    #[test]
    fn test_enum_of() {
        let ty = ColumnType::enum_of(&["Active", "Inactive"]);
        assert_eq!(
            ty,
            ColumnType::Enum {
                variants: vec!["Active".to_string(), "Inactive".to_string()]
            }
        );
    }
}
