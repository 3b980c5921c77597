//! # reqcheck-schema — Schema Compilation
//!
//! Wraps the `jsonschema` crate behind a small, engine-agnostic surface:
//! a schema document is compiled exactly once into a [`CompiledChecker`],
//! which then answers two questions for any number of values:
//!
//! - [`CompiledChecker::check`] — does the value conform? (hot path)
//! - [`CompiledChecker::violations`] — lazily, which rules did it break?
//!
//! The [`Checker`] trait is the seam the request-validation stage
//! evaluates against. [`CompiledChecker`] is the JSON Schema implementation;
//! anything else that can answer both questions can stand in for it.
//!
//! ## Schema Resolution
//!
//! A [`SchemaCatalog`] loads `*.schema.json` / `*.schema.yaml` files from a
//! directory. When attached to a [`SchemaCompiler`] through
//! [`CompilerOptions`], cross-schema `$ref` URIs resolve against the catalog
//! in memory. No network requests are ever made while compiling.
//!
//! ## Crate Policy
//!
//! - Compilation errors are returned, never swallowed.
//! - Compiled checkers are immutable and `Send + Sync`.
//! - No `.unwrap()` outside tests.

pub mod catalog;
pub mod checker;
pub mod compiler;
pub mod error;

pub use catalog::SchemaCatalog;
pub use checker::{Checker, CompiledChecker, Violation};
pub use compiler::{compile, CompilerOptions, SchemaCompiler};
pub use error::SchemaError;

/// Re-exported so callers can pick a draft without depending on `jsonschema`.
pub use jsonschema::Draft;
