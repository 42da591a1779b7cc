//! Query language understood by [`DocumentStore`](crate::DocumentStore)
//! implementations.
//!
//! Deliberately small: a query names one collection and applies at most one
//! field-equality filter, which is all the view-model layer needs to scope
//! documents to an owner or a parent.

use crate::document::Document;

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Predicate applied to every document in the queried collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Match every document.
    All,

    /// Match documents whose top-level `field` equals `value` exactly.
    FieldEq {
        field: String,
        value: serde_json::Value,
    },
}

impl Filter {
    /// Build an equality filter on a single top-level field.
    pub fn field_eq(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Filter::FieldEq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether `doc` satisfies this filter.
    ///
    /// A missing field never matches, even against `Value::Null`.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::FieldEq { field, value } => doc.field(field) == Some(value),
        }
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A filtered view over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Collection the query runs against.
    pub collection: &'static str,

    /// Predicate applied to each document in the collection.
    pub filter: Filter,
}

impl Query {
    /// Query every document in `collection`.
    pub fn all(collection: &'static str) -> Self {
        Self {
            collection,
            filter: Filter::All,
        }
    }

    /// Query documents in `collection` whose `field` equals `value`.
    pub fn where_eq(
        collection: &'static str,
        field: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            collection,
            filter: Filter::field_eq(field, value),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
