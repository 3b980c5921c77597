//! # Compiled Checkers
//!
//! A [`CompiledChecker`] is the per-schema artifact produced once at
//! construction time. Request-time validation only ever executes the
//! precompiled matcher; the schema document is never re-interpreted.

use std::fmt;

use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single rule violation found in a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// JSON Pointer to the violating location in the validated value.
    pub instance_path: String,
    /// JSON Pointer to the schema rule that rejected the value.
    pub schema_path: String,
    /// The rule that was violated (`required`, `type`, `minLength`, ...).
    pub keyword: String,
    /// Human-readable expected-vs-actual description from the engine.
    pub message: String,
}

impl Violation {
    fn from_engine(error: jsonschema::ValidationError<'_>) -> Self {
        let schema_path = error.schema_path.to_string();
        Self {
            instance_path: error.instance_path.to_string(),
            keyword: keyword_of(&schema_path).to_string(),
            schema_path,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// The last segment of a schema path names the keyword that failed.
fn keyword_of(schema_path: &str) -> &str {
    schema_path.rsplit('/').next().unwrap_or_default()
}

/// Conformance test plus violation enumeration over a compiled schema.
///
/// Implementations must be immutable after construction: one checker is
/// shared by every request a stage serves.
pub trait Checker: Send + Sync {
    /// Returns `true` iff `value` conforms. Pure and side-effect free.
    fn check(&self, value: &Value) -> bool;

    /// Enumerates every violation in `value`, lazily.
    ///
    /// Each call starts a fresh enumeration. Conforming values yield nothing.
    fn violations<'a>(&'a self, value: &'a Value) -> Box<dyn Iterator<Item = Violation> + 'a>;
}

/// A JSON Schema compiled into an optimized matcher.
///
/// Built by [`SchemaCompiler::compile`](crate::SchemaCompiler::compile).
pub struct CompiledChecker {
    validator: Validator,
}

impl CompiledChecker {
    pub(crate) fn new(validator: Validator) -> Self {
        Self { validator }
    }

    /// Returns `true` iff `value` conforms to the schema.
    pub fn check(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }

    /// Lazily enumerates the violations in `value`.
    pub fn violations<'a>(&'a self, value: &'a Value) -> impl Iterator<Item = Violation> + 'a {
        self.validator.iter_errors(value).map(Violation::from_engine)
    }
}

impl Checker for CompiledChecker {
    fn check(&self, value: &Value) -> bool {
        CompiledChecker::check(self, value)
    }

    fn violations<'a>(&'a self, value: &'a Value) -> Box<dyn Iterator<Item = Violation> + 'a> {
        Box::new(CompiledChecker::violations(self, value))
    }
}

impl fmt::Debug for CompiledChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledChecker").finish_non_exhaustive()
    }
}
