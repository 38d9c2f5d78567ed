// crates/contract-gate-core/src/row.rs
// ============================================================================
// Module: Contract Gate Example Rows
// Description: Named example rows whose cells override generated values.
// Purpose: Let named contract examples and table rows drive generation.
// Dependencies: indexmap, serde
// ============================================================================

//! ## Overview
//! An example row maps column names to raw text cells. Generation consults
//! the row by key at every object level; the reserved column
//! [`REQUEST_BODY_COLUMN`] replaces a whole body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Column that supplies an entire request body.
pub const REQUEST_BODY_COLUMN: &str = "(REQUEST-BODY)";

// ============================================================================
// SECTION: Example Row
// ============================================================================

/// Named example row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleRow {
    /// Example name; empty for anonymous rows.
    pub name: String,
    /// Cells keyed by column name.
    pub columns: IndexMap<String, String>,
}

impl ExampleRow {
    /// Creates an empty row.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
        }
    }

    /// Adds a cell.
    #[must_use]
    pub fn with_cell(mut self, column: impl Into<String>, text: impl Into<String>) -> Self {
        self.columns.insert(column.into(), text.into());
        self
    }

    /// Returns a cell.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Returns the whole-body cell, if any.
    #[must_use]
    pub fn request_body(&self) -> Option<&str> {
        self.get(REQUEST_BODY_COLUMN)
    }
}
