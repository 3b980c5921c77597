//! # reqcheck — Request Validation Stages
//!
//! Builds pipeline stages that validate the four sections of an incoming
//! request (URL params, query, body, headers) against JSON Schemas.
//!
//! ```no_run
//! use reqcheck::{validate_request, RequestParts, SectionSchemas};
//! use serde_json::json;
//!
//! let stage = validate_request(
//!     SectionSchemas::new()
//!         .params(json!({ "type": "object", "required": ["id"] }))
//!         .body(json!({ "type": "object", "required": ["name"] })),
//! )?;
//!
//! let request = RequestParts::new().with_param("id", "7");
//! stage.run(&request, |outcome: Option<reqcheck::RequestValidationError>| match outcome {
//!     None => println!("proceed"),
//!     Some(err) => println!("{} section(s) failed", err.failures().len()),
//! });
//! # Ok::<(), reqcheck::StageError>(())
//! ```
//!
//! ## Lifecycle
//!
//! Schemas are compiled once, when the stage is built. A stage is immutable
//! and serves every request; building it is the only fallible step that
//! involves the schemas themselves.
//!
//! ## Failure Signaling
//!
//! A failing request produces one [`RequestValidationError`] listing every
//! failing section, ordered Params, Query, Body, Headers, each with all its
//! violations. [`ValidationStage::run`] passes it to the pipeline's
//! [`Next`] continuation; [`ValidationStage::validate`] returns it as `Err`.
//! Neither logs nor panics on a failing request.

pub mod error;
pub mod request;
pub mod section;
pub mod stage;

pub use error::{RequestValidationError, SectionFailure, StageError};
pub use request::{RequestParts, RequestSections};
pub use section::{SchemaSource, Section, SectionSchemas};
pub use stage::{
    validate_body, validate_headers, validate_params, validate_query, validate_request, Next,
    ValidationStage,
};

pub use reqcheck_schema::{
    Checker, CompiledChecker, CompilerOptions, Draft, SchemaCatalog, SchemaCompiler, SchemaError,
    Violation,
};
