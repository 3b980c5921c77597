//! # Schema Errors
//!
//! Failures that can occur before any request is validated: loading schema
//! files, looking up a schema by name, or compiling a malformed schema.

use thiserror::Error;

/// Error raised while loading or compiling a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema document is not a valid schema for the selected draft.
    #[error("invalid schema '{schema}': {reason}")]
    Invalid {
        /// Schema name, or `<inline>` for anonymous documents.
        schema: String,
        /// Message reported by the schema engine.
        reason: String,
    },

    /// A named schema is not present in the catalog.
    #[error("schema not found: {name}")]
    NotFound {
        /// The requested schema name.
        name: String,
    },

    /// A schema file or directory could not be read or parsed.
    #[error("schema load error for '{path}': {reason}")]
    Load {
        /// File or directory that failed to load.
        path: String,
        /// Reason the load failed.
        reason: String,
    },

    /// IO error reading a schema file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    pub(crate) fn invalid(schema: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invalid {
            schema: schema.into(),
            reason: reason.to_string(),
        }
    }
}
