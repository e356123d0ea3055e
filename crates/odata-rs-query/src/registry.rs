//! Column name resolution.
//!
//! A [`ColumnRegistry`] is built from a [`TableSchema`] once per compilation
//! and consulted for every column reference in every clause. Lookup is
//! case-insensitive; the registry answers with the canonical spelling so the
//! emitted SQL always uses the declared casing.

use std::collections::HashMap;

use odata_rs_core::{ODataError, ODataResult};

use crate::schema::{ColumnType, TableSchema};

/// Resolves query-text column names to canonical columns.
///
/// Two flavors exist. A strict registry accepts declared columns only. A
/// container-aware registry additionally accepts dotted dynamic names under
/// configured attribute containers, e.g. `attributes.color`, and records
/// which dynamic names a compilation touched.
#[derive(Debug, Clone)]
pub struct ColumnRegistry {
    /// Lowercased name to (canonical spelling, type).
    columns: HashMap<String, (String, ColumnType)>,
    /// Lowercased container prefixes, trailing dots stripped. Empty in the
    /// strict flavor.
    containers: Vec<String>,
    /// Dynamic names encountered so far, in first-seen order.
    dynamic: Vec<String>,
}

impl ColumnRegistry {
    /// Builds a strict registry over the schema's registrable columns.
    pub fn strict(schema: &TableSchema) -> Self {
        Self::build(schema, &[])
    }

    /// Builds a container-aware registry.
    ///
    /// Container names are matched case-insensitively; a trailing dot in a
    /// configured name is ignored.
    pub fn with_containers(schema: &TableSchema, containers: &[String]) -> Self {
        Self::build(schema, containers)
    }

    fn build(schema: &TableSchema, containers: &[String]) -> Self {
        let mut columns = HashMap::new();
        for def in &schema.columns {
            if def.column_type.is_registrable() {
                columns.insert(
                    def.name.to_lowercase(),
                    (def.name.to_string(), def.column_type.clone()),
                );
            }
        }
        let containers = containers
            .iter()
            .map(|c| c.trim_end_matches('.').to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        Self {
            columns,
            containers,
            dynamic: Vec::new(),
        }
    }

    /// The declared type of a canonical column name, if any.
    ///
    /// Dynamic names have no declared type and return `None`.
    pub fn column_type(&self, name: &str) -> Option<&ColumnType> {
        self.columns.get(&name.to_lowercase()).map(|(_, ty)| ty)
    }

    /// Validates a column reference and returns its canonical spelling.
    ///
    /// Declared columns resolve case-insensitively to their declared casing.
    /// In a container-aware registry, a dotted name under a configured
    /// container is accepted as-written and recorded; a bare container name
    /// is rejected as ambiguous since it names a group of values rather than
    /// one column.
    pub fn validate(&mut self, name: &str) -> ODataResult<String> {
        let lowered = name.to_lowercase();
        if let Some((canonical, _)) = self.columns.get(&lowered) {
            return Ok(canonical.clone());
        }
        if self.containers.is_empty() {
            return Err(ODataError::UnknownColumn(name.to_string()));
        }
        for container in &self.containers {
            if lowered == *container {
                return Err(ODataError::AmbiguousColumn(name.to_string()));
            }
            if lowered.len() > container.len() + 1
                && lowered.starts_with(container)
                && lowered.as_bytes()[container.len()] == b'.'
            {
                if !self
                    .dynamic
                    .iter()
                    .any(|d| d.eq_ignore_ascii_case(name))
                {
                    self.dynamic.push(name.to_string());
                }
                return Ok(name.to_string());
            }
        }
        Err(ODataError::UnknownColumn(name.to_string()))
    }

    /// The dynamic names this registry has accepted, in first-seen order.
    pub fn dynamic_columns(&self) -> &[String] {
        &self.dynamic
    }

    /// Drains the accepted dynamic names for attachment to a compiled query.
    pub(crate) fn take_dynamic_columns(&mut self) -> Vec<String> {
        std::mem::take(&mut self.dynamic)
    }
}
