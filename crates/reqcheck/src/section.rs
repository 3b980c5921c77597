//! # Request Sections
//!
//! The four independently validated parts of a request, and the set of
//! schemas configured for them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One independently validated part of a request.
///
/// The declaration order is the evaluation order, and `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    /// URL path parameters.
    Params,
    /// Query string parameters.
    Query,
    /// Decoded request body.
    Body,
    /// Request headers.
    Headers,
}

impl Section {
    /// All sections, in evaluation order.
    pub const ALL: [Section; 4] = [Self::Params, Self::Query, Self::Body, Self::Headers];

    /// Lower-case field name of the section.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Params => "params",
            Self::Query => "query",
            Self::Body => "body",
            Self::Headers => "headers",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a section's schema comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    /// A schema document given by value.
    Inline(Value),
    /// A schema loaded in the compiler's catalog, by file name or `$id`.
    Named(String),
}

impl SchemaSource {
    /// Refer to a catalog schema by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl From<Value> for SchemaSource {
    fn from(value: Value) -> Self {
        Self::Inline(value)
    }
}

/// Optional schema per section. Sections left unset are never validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionSchemas {
    entries: BTreeMap<Section, SchemaSource>,
}

impl SectionSchemas {
    /// An empty set: a stage built from it lets every request through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the schema for URL path parameters.
    pub fn params(self, schema: impl Into<SchemaSource>) -> Self {
        self.with(Section::Params, schema)
    }

    /// Set the schema for query parameters.
    pub fn query(self, schema: impl Into<SchemaSource>) -> Self {
        self.with(Section::Query, schema)
    }

    /// Set the schema for the decoded body.
    pub fn body(self, schema: impl Into<SchemaSource>) -> Self {
        self.with(Section::Body, schema)
    }

    /// Set the schema for headers.
    pub fn headers(self, schema: impl Into<SchemaSource>) -> Self {
        self.with(Section::Headers, schema)
    }

    /// Set the schema for `section`, replacing any previous one.
    pub fn with(mut self, section: Section, schema: impl Into<SchemaSource>) -> Self {
        self.entries.insert(section, schema.into());
        self
    }

    /// The schema configured for `section`, if any.
    pub fn get(&self, section: Section) -> Option<&SchemaSource> {
        self.entries.get(&section)
    }

    /// Returns true if no section has a schema.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured sections with their schemas, in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (Section, &SchemaSource)> {
        self.entries.iter().map(|(section, source)| (*section, source))
    }
}
