//! # Validation Stage
//!
//! A [`ValidationStage`] is built once from a [`SectionSchemas`] set and then
//! serves every request. Building compiles each configured section's schema
//! exactly once; sections without a schema are skipped for good.
//!
//! Per request, every configured section is checked in the order Params,
//! Query, Body, Headers. A failing section does not stop the others: all
//! failures are collected in one pass and surfaced as a single
//! [`RequestValidationError`].
//!
//! Two entry points share one evaluation routine:
//!
//! - [`ValidationStage::run`] hands the outcome to a [`Next`] continuation
//!   (proceed with nothing, or abort with the error).
//! - [`ValidationStage::validate`] returns it as a `Result`.

use std::fmt;

use reqcheck_schema::{Checker, SchemaCompiler};

use crate::error::{RequestValidationError, SectionFailure, StageError};
use crate::request::RequestSections;
use crate::section::{SchemaSource, Section, SectionSchemas};

/// The host pipeline's continuation: proceed, or abort with an error.
///
/// Any `FnOnce(Option<RequestValidationError>) -> T` is a `Next`: it is
/// called with `None` to proceed and `Some(error)` to abort.
pub trait Next {
    /// What invoking the continuation produces.
    type Output;

    /// Continue to the next pipeline stage.
    fn proceed(self) -> Self::Output;

    /// Abort and route `error` to failure handling.
    fn abort(self, error: RequestValidationError) -> Self::Output;
}

impl<F, T> Next for F
where
    F: FnOnce(Option<RequestValidationError>) -> T,
{
    type Output = T;

    fn proceed(self) -> T {
        self(None)
    }

    fn abort(self, error: RequestValidationError) -> T {
        self(Some(error))
    }
}

struct SectionChecker {
    section: Section,
    checker: Box<dyn Checker>,
}

/// Validates requests against per-section compiled schemas.
///
/// Immutable once built; share it across threads behind an `Arc`.
pub struct ValidationStage {
    /// One checker per configured section, sorted by section.
    checkers: Vec<SectionChecker>,
}

impl ValidationStage {
    /// Build a stage with the default compiler (Draft 2020-12, no catalog).
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Compile`] for the first section whose schema
    /// fails to compile.
    pub fn build(sections: SectionSchemas) -> Result<Self, StageError> {
        Self::build_with(&SchemaCompiler::default(), sections)
    }

    /// Build a stage, compiling every configured section with `compiler`.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Compile`] for the first section whose schema
    /// is missing from the catalog or fails to compile.
    pub fn build_with(
        compiler: &SchemaCompiler,
        sections: SectionSchemas,
    ) -> Result<Self, StageError> {
        let mut checkers = Vec::new();
        for (section, source) in sections.iter() {
            let compiled = match source {
                SchemaSource::Inline(schema) => compiler.compile(schema),
                SchemaSource::Named(name) => compiler.compile_named(name),
            }
            .map_err(|source| StageError::Compile { section, source })?;

            tracing::debug!(%section, "compiled section schema");
            checkers.push(SectionChecker {
                section,
                checker: Box::new(compiled),
            });
        }

        tracing::debug!(sections = checkers.len(), "built validation stage");
        Ok(Self { checkers })
    }

    /// Build a stage from already-compiled checkers.
    ///
    /// Order of the input does not matter; a repeated section keeps the
    /// last checker given for it.
    pub fn from_checkers<I>(checkers: I) -> Self
    where
        I: IntoIterator<Item = (Section, Box<dyn Checker>)>,
    {
        let mut by_section: Vec<SectionChecker> = Vec::new();
        for (section, checker) in checkers {
            by_section.retain(|c| c.section != section);
            by_section.push(SectionChecker { section, checker });
        }
        by_section.sort_by_key(|c| c.section);
        Self {
            checkers: by_section,
        }
    }

    /// Sections this stage validates, in evaluation order.
    pub fn sections(&self) -> impl Iterator<Item = Section> + '_ {
        self.checkers.iter().map(|c| c.section)
    }

    /// Returns true if no section is configured: every request proceeds.
    pub fn is_noop(&self) -> bool {
        self.checkers.is_empty()
    }

    /// Validate `request` and hand the outcome to `next`.
    ///
    /// `next` is invoked exactly once: [`Next::proceed`] if every configured
    /// section conforms, otherwise [`Next::abort`] with one error holding
    /// every failing section.
    pub fn run<R, N>(&self, request: &R, next: N) -> N::Output
    where
        R: RequestSections + ?Sized,
        N: Next,
    {
        match self.evaluate(request) {
            None => next.proceed(),
            Some(error) => next.abort(error),
        }
    }

    /// Validate `request`, returning the aggregated error as `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestValidationError`] if any configured section fails.
    pub fn validate<R>(&self, request: &R) -> Result<(), RequestValidationError>
    where
        R: RequestSections + ?Sized,
    {
        match self.evaluate(request) {
            None => Ok(()),
            Some(error) => Err(error),
        }
    }

    fn evaluate<R>(&self, request: &R) -> Option<RequestValidationError>
    where
        R: RequestSections + ?Sized,
    {
        let mut failures = Vec::new();
        for SectionChecker { section, checker } in &self.checkers {
            let data = request.section(*section);
            if !checker.check(&data) {
                failures.push(SectionFailure {
                    section: *section,
                    violations: checker.violations(&data).collect(),
                });
            }
        }

        if failures.is_empty() {
            None
        } else {
            Some(RequestValidationError::new(failures))
        }
    }
}

impl fmt::Debug for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationStage")
            .field("sections", &self.sections().collect::<Vec<_>>())
            .finish()
    }
}

/// Build a stage validating any combination of sections.
///
/// # Errors
///
/// Returns [`StageError`] if a configured schema fails to compile.
pub fn validate_request(sections: SectionSchemas) -> Result<ValidationStage, StageError> {
    ValidationStage::build(sections)
}

/// Build a stage validating only URL path parameters.
///
/// # Errors
///
/// Returns [`StageError`] if the schema fails to compile.
pub fn validate_params(schema: impl Into<SchemaSource>) -> Result<ValidationStage, StageError> {
    ValidationStage::build(SectionSchemas::new().params(schema))
}

/// Build a stage validating only query parameters.
///
/// # Errors
///
/// Returns [`StageError`] if the schema fails to compile.
pub fn validate_query(schema: impl Into<SchemaSource>) -> Result<ValidationStage, StageError> {
    ValidationStage::build(SectionSchemas::new().query(schema))
}

/// Build a stage validating only the decoded body.
///
/// # Errors
///
/// Returns [`StageError`] if the schema fails to compile.
pub fn validate_body(schema: impl Into<SchemaSource>) -> Result<ValidationStage, StageError> {
    ValidationStage::build(SectionSchemas::new().body(schema))
}

/// Build a stage validating only headers.
///
/// # Errors
///
/// Returns [`StageError`] if the schema fails to compile.
pub fn validate_headers(schema: impl Into<SchemaSource>) -> Result<ValidationStage, StageError> {
    ValidationStage::build(SectionSchemas::new().headers(schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestParts;
    use reqcheck_schema::{SchemaError, Violation};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Rejects everything and counts how often it is consulted.
    struct RejectAll {
        checks: Arc<AtomicUsize>,
    }

    impl Checker for RejectAll {
        fn check(&self, _value: &Value) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst);
            false
        }

        fn violations<'a>(&'a self, _value: &'a Value) -> Box<dyn Iterator<Item = Violation> + 'a> {
            Box::new(std::iter::once(Violation {
                instance_path: String::new(),
                schema_path: String::new(),
                keyword: "false".to_string(),
                message: "rejected".to_string(),
            }))
        }
    }

    fn body_schema() -> Value {
        json!({
            "type": "object",
            "properties": { "bodyKey": { "type": "number" } },
            "required": ["bodyKey"]
        })
    }

    fn params_schema() -> Value {
        json!({
            "type": "object",
            "properties": { "urlParameter": { "type": "string" } },
            "required": ["urlParameter"]
        })
    }

    #[test]
    fn empty_stage_always_proceeds() {
        let stage = ValidationStage::build(SectionSchemas::new()).unwrap();
        assert!(stage.is_noop());
        let outcome = stage.run(&RequestParts::new(), |err: Option<RequestValidationError>| err);
        assert!(outcome.is_none());
    }

    #[test]
    fn run_proceeds_with_no_error_when_conforming() {
        let stage = validate_body(body_schema()).unwrap();
        let req = RequestParts::new().with_body(json!({ "bodyKey": 10 }));
        let mut calls = Vec::new();
        stage.run(&req, |err: Option<RequestValidationError>| calls.push(err));
        assert_eq!(calls, vec![None]);
    }

    #[test]
    fn run_aborts_once_with_aggregate_error() {
        let stage = validate_body(body_schema()).unwrap();
        let mut calls = Vec::new();
        stage.run(&RequestParts::new(), |err: Option<RequestValidationError>| {
            calls.push(err)
        });
        assert_eq!(calls.len(), 1);
        let err = calls.pop().unwrap().expect("failure continuation");
        assert_eq!(err.sections(), vec![Section::Body]);
    }

    #[test]
    fn validate_returns_err_value() {
        let stage = validate_params(params_schema()).unwrap();
        assert!(stage
            .validate(&RequestParts::new().with_param("urlParameter", "param"))
            .is_ok());
        let err = stage.validate(&RequestParts::new()).unwrap_err();
        assert_eq!(err.sections(), vec![Section::Params]);
    }

    #[test]
    fn failing_section_does_not_short_circuit_later_sections() {
        let counters: Vec<Arc<AtomicUsize>> = (0..4).map(|_| Arc::default()).collect();
        let stage = ValidationStage::from_checkers(Section::ALL.iter().zip(&counters).map(
            |(section, checks)| {
                let checker: Box<dyn Checker> = Box::new(RejectAll {
                    checks: Arc::clone(checks),
                });
                (*section, checker)
            },
        ));

        let err = stage.validate(&RequestParts::new()).unwrap_err();
        assert_eq!(err.sections(), Section::ALL.to_vec());
        for checks in &counters {
            assert_eq!(checks.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn from_checkers_sorts_and_keeps_last_duplicate() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let stage = ValidationStage::from_checkers(vec![
            (
                Section::Headers,
                Box::new(RejectAll { checks: Arc::clone(&first) }) as Box<dyn Checker>,
            ),
            (
                Section::Query,
                Box::new(RejectAll { checks: Arc::new(AtomicUsize::new(0)) }) as Box<dyn Checker>,
            ),
            (
                Section::Headers,
                Box::new(RejectAll { checks: Arc::clone(&second) }) as Box<dyn Checker>,
            ),
        ]);
        assert_eq!(
            stage.sections().collect::<Vec<_>>(),
            vec![Section::Query, Section::Headers]
        );
        let _ = stage.validate(&RequestParts::new());
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn compile_error_names_section() {
        let err = validate_query(json!({ "type": 12 })).unwrap_err();
        assert_eq!(err.section(), Section::Query);
        assert!(matches!(
            err,
            StageError::Compile {
                source: SchemaError::Invalid { .. },
                ..
            }
        ));
    }

    #[test]
    fn named_schema_without_catalog_fails_build() {
        let err = validate_body(SchemaSource::named("order.schema.json")).unwrap_err();
        assert!(matches!(
            err,
            StageError::Compile {
                section: Section::Body,
                source: SchemaError::NotFound { .. },
            }
        ));
    }

    #[test]
    fn custom_next_implementation() {
        enum Flow {
            Continue,
            Reject(usize),
        }

        struct Counting;

        impl Next for Counting {
            type Output = Flow;

            fn proceed(self) -> Flow {
                Flow::Continue
            }

            fn abort(self, error: RequestValidationError) -> Flow {
                Flow::Reject(error.violation_count())
            }
        }

        let stage = validate_params(params_schema()).unwrap();
        assert!(matches!(
            stage.run(&RequestParts::new().with_param("urlParameter", "x"), Counting),
            Flow::Continue
        ));
        assert!(matches!(
            stage.run(&RequestParts::new(), Counting),
            Flow::Reject(1)
        ));
    }

    #[test]
    fn debug_lists_sections() {
        let stage = validate_request(
            SectionSchemas::new()
                .body(body_schema())
                .params(params_schema()),
        )
        .unwrap();
        assert_eq!(format!("{stage:?}"), "ValidationStage { sections: [Params, Body] }");
    }

    #[test]
    fn stage_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ValidationStage>();
    }
}
