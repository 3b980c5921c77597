//! # Schema Catalog
//!
//! Loads schema documents from a directory so that request schemas can be
//! referenced by name and can `$ref` each other.
//!
//! Files are picked up by suffix: `*.schema.json`, `*.schema.yaml` and
//! `*.schema.yml`. Each schema is indexed by its file name and, if present,
//! by its `$id`. Cross-schema `$ref` URIs are resolved from memory by the
//! catalog's retriever; URIs that match nothing resolve to the permissive
//! empty schema rather than triggering a network fetch.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use jsonschema::{Retrieve, Uri};
use serde_json::Value;

use crate::error::SchemaError;

const JSON_SUFFIX: &str = ".schema.json";
const YAML_SUFFIXES: [&str; 2] = [".schema.yaml", ".schema.yml"];

/// In-memory set of named schema documents.
///
/// Cloning is cheap; clones share the loaded documents.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    /// Schema documents keyed by file name.
    schemas: Arc<HashMap<String, Value>>,
    /// Every URI or name a schema can be referenced by.
    by_uri: Arc<HashMap<String, Value>>,
}

impl SchemaCatalog {
    /// Load every schema file in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Load`] if the directory cannot be read or a
    /// schema file is not valid JSON/YAML.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| SchemaError::Load {
            path: dir.display().to_string(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        let mut documents = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(value) = load_schema_file(&path, name)? {
                documents.push((name.to_string(), value));
            }
        }

        let catalog = Self::from_documents(documents);
        tracing::info!(
            dir = %dir.display(),
            schemas = catalog.len(),
            "loaded schema catalog"
        );
        Ok(catalog)
    }

    /// Build a catalog from `(name, document)` pairs already in memory.
    pub fn from_documents(documents: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut schemas = HashMap::new();
        let mut by_uri = HashMap::new();

        for (name, value) in documents {
            if let Some(id) = value.get("$id").and_then(Value::as_str) {
                by_uri.insert(id.to_string(), value.clone());
            }
            by_uri.insert(name.clone(), value.clone());
            schemas.insert(name, value);
        }

        Self {
            schemas: Arc::new(schemas),
            by_uri: Arc::new(by_uri),
        }
    }

    /// Returns the number of loaded schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if no schemas are loaded.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Returns the names of all loaded schemas, sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a schema by file name or `$id`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name).or_else(|| self.by_uri.get(name))
    }

    pub(crate) fn retriever(&self) -> CatalogRetriever {
        CatalogRetriever {
            by_uri: Arc::clone(&self.by_uri),
        }
    }
}

/// Parse one file if its name marks it as a schema.
fn load_schema_file(path: &Path, name: &str) -> Result<Option<Value>, SchemaError> {
    let is_json = name.ends_with(JSON_SUFFIX);
    let is_yaml = YAML_SUFFIXES.iter().any(|suffix| name.ends_with(suffix));
    if !is_json && !is_yaml {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let parsed: Result<Value, String> = if is_json {
        serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}"))
    } else {
        serde_yaml::from_str(&content).map_err(|e| format!("invalid YAML: {e}"))
    };

    parsed.map(Some).map_err(|reason| SchemaError::Load {
        path: path.display().to_string(),
        reason,
    })
}

/// Resolves `$ref` URIs against the catalog without network access.
pub(crate) struct CatalogRetriever {
    by_uri: Arc<HashMap<String, Value>>,
}

impl CatalogRetriever {
    pub(crate) fn empty() -> Self {
        Self {
            by_uri: Arc::default(),
        }
    }
}

impl Retrieve for CatalogRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        // Relative refs arrive as `json-schema:///<file>`; match on the file name.
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.by_uri.get(filename) {
            return Ok(value.clone());
        }

        tracing::warn!(uri = uri_str, "unresolved schema reference, accepting any value");
        Ok(serde_json::json!({}))
    }
}
