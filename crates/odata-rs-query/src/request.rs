//! The raw query options a caller hands to the compiler.

use serde::{Deserialize, Serialize};

/// One request's query options, all as raw clause text.
///
/// Every field is optional; a blank string is treated the same as an absent
/// clause. The struct deserializes from camelCase keys so it can be read
/// straight out of a query-string or JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryRequest {
    /// A caller-side status discriminator. Carried for the owning
    /// repository to act on; the compiler itself ignores it.
    pub status: Option<String>,
    /// `$orderby` text.
    pub order_by: Option<String>,
    /// `$filter` text.
    pub filter: Option<String>,
    /// `$select` text.
    pub select: Option<String>,
    /// `$top` text.
    pub top: Option<String>,
    /// `$skip` text.
    pub skip: Option<String>,
    /// `$apply` text.
    pub apply: Option<String>,
}

impl QueryRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `$filter` text.
    #[must_use]
    pub fn filter(mut self, text: impl Into<String>) -> Self {
        self.filter = Some(text.into());
        self
    }

    /// Sets the `$apply` text.
    #[must_use]
    pub fn apply(mut self, text: impl Into<String>) -> Self {
        self.apply = Some(text.into());
        self
    }

    /// Sets the `$orderby` text.
    #[must_use]
    pub fn order_by(mut self, text: impl Into<String>) -> Self {
        self.order_by = Some(text.into());
        self
    }

    /// Sets the `$select` text.
    #[must_use]
    pub fn select(mut self, text: impl Into<String>) -> Self {
        self.select = Some(text.into());
        self
    }

    /// Sets the `$top` text.
    #[must_use]
    pub fn top(mut self, text: impl Into<String>) -> Self {
        self.top = Some(text.into());
        self
    }

    /// Sets the `$skip` text.
    #[must_use]
    pub fn skip(mut self, text: impl Into<String>) -> Self {
        self.skip = Some(text.into());
        self
    }

    /// Sets the status discriminator.
    #[must_use]
    pub fn status(mut self, text: impl Into<String>) -> Self {
        self.status = Some(text.into());
        self
    }
}

/// What shape of result the compiled query should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Return matching rows. All clauses apply.
    Rows,
    /// Return the matching-row count. Paging, ordering, and projection are
    /// not applied; their clause text goes unparsed.
    Count,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let request = QueryRequest::new()
            .filter("Status eq 'Active'")
            .top("10")
            .order_by("Name desc");

        assert_eq!(request.filter.as_deref(), Some("Status eq 'Active'"));
        assert_eq!(request.top.as_deref(), Some("10"));
        assert_eq!(request.order_by.as_deref(), Some("Name desc"));
        assert!(request.select.is_none());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let request: QueryRequest = serde_json::from_str(
            r#"{"filter": "Id eq 1", "orderBy": "Name", "top": "5"}"#,
        )
        .unwrap();

        assert_eq!(request.filter.as_deref(), Some("Id eq 1"));
        assert_eq!(request.order_by.as_deref(), Some("Name"));
        assert_eq!(request.top.as_deref(), Some("5"));
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let request: QueryRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, QueryRequest::default());
    }
}
