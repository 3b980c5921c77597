//! # Schema Compiler
//!
//! Turns schema documents into [`CompiledChecker`]s. All preprocessing cost
//! is paid here, once per schema.

use serde_json::Value;

use crate::catalog::{CatalogRetriever, SchemaCatalog};
use crate::checker::CompiledChecker;
use crate::error::SchemaError;

/// Label used in errors for schemas passed by value rather than by name.
const INLINE_SCHEMA: &str = "<inline>";

/// Compiler configuration.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Draft used for schemas that do not declare `$schema`.
    pub draft: jsonschema::Draft,
    /// Catalog used to resolve cross-schema `$ref`s and named lookups.
    pub catalog: Option<SchemaCatalog>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            draft: jsonschema::Draft::Draft202012,
            catalog: None,
        }
    }
}

impl CompilerOptions {
    /// Use the given draft for schemas without `$schema`.
    pub fn with_draft(mut self, draft: jsonschema::Draft) -> Self {
        self.draft = draft;
        self
    }

    /// Resolve `$ref`s and schema names against `catalog`.
    pub fn with_catalog(mut self, catalog: SchemaCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }
}

/// Compiles schemas with a fixed set of [`CompilerOptions`].
#[derive(Debug, Clone, Default)]
pub struct SchemaCompiler {
    options: CompilerOptions,
}

impl SchemaCompiler {
    /// Create a compiler with the given options.
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    /// Returns the compiler options.
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Invalid`] if the document is not a valid schema.
    pub fn compile(&self, schema: &Value) -> Result<CompiledChecker, SchemaError> {
        self.compile_labeled(INLINE_SCHEMA, schema)
    }

    /// Compile a schema loaded in the catalog, by file name or `$id`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotFound`] if there is no catalog or the name
    /// is not in it, and [`SchemaError::Invalid`] if it fails to compile.
    pub fn compile_named(&self, name: &str) -> Result<CompiledChecker, SchemaError> {
        let schema = self
            .options
            .catalog
            .as_ref()
            .and_then(|catalog| catalog.get(name))
            .ok_or_else(|| SchemaError::NotFound {
                name: name.to_string(),
            })?;
        self.compile_labeled(name, schema)
    }

    fn compile_labeled(&self, label: &str, schema: &Value) -> Result<CompiledChecker, SchemaError> {
        // Always install the local retriever so compilation never goes to the network.
        let retriever = match &self.options.catalog {
            Some(catalog) => catalog.retriever(),
            None => CatalogRetriever::empty(),
        };

        let validator = jsonschema::options()
            .with_draft(self.options.draft)
            .with_retriever(retriever)
            .build(schema)
            .map_err(|e| SchemaError::invalid(label, e))?;

        tracing::trace!(schema = label, "compiled schema");
        Ok(CompiledChecker::new(validator))
    }
}

/// Compile a schema with default options (Draft 2020-12, no catalog).
///
/// # Errors
///
/// Returns [`SchemaError::Invalid`] if the document is not a valid schema.
pub fn compile(schema: &Value) -> Result<CompiledChecker, SchemaError> {
    SchemaCompiler::default().compile(schema)
}
