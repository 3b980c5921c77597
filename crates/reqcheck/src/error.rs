//! # Validation Errors
//!
//! - [`StageError`]: a stage could not be built. Returned to whoever builds it.
//! - [`RequestValidationError`]: a request failed one or more sections. This
//!   is a value handed to the pipeline, carrying every failing section with
//!   every violation. It is never logged here; rendering it is the host's job.

use std::fmt;

use reqcheck_schema::{SchemaError, Violation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::section::Section;

/// Error building a validation stage.
#[derive(Error, Debug)]
pub enum StageError {
    /// A section's schema could not be loaded or compiled.
    #[error("cannot compile {section} schema: {source}")]
    Compile {
        /// The section whose schema failed.
        section: Section,
        /// The underlying schema error.
        #[source]
        source: SchemaError,
    },
}

impl StageError {
    /// The section whose schema failed.
    pub fn section(&self) -> Section {
        match self {
            Self::Compile { section, .. } => *section,
        }
    }
}

/// All violations found in one section of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFailure {
    /// The failing section.
    pub section: Section,
    /// Every violation the section's checker reported, in engine order.
    pub violations: Vec<Violation>,
}

impl fmt::Display for SectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.section)?;
        for v in &self.violations {
            write!(f, "\n  {v}")?;
        }
        Ok(())
    }
}

/// The single failure outcome of validating a request.
///
/// Holds one [`SectionFailure`] per failing section, ordered Params, Query,
/// Body, Headers. Never empty.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("request validation failed")]
#[serde(try_from = "FailureList")]
pub struct RequestValidationError {
    failures: Vec<SectionFailure>,
}

/// Wire form of [`RequestValidationError`], checked on the way in.
#[derive(Deserialize)]
struct FailureList {
    failures: Vec<SectionFailure>,
}

impl TryFrom<FailureList> for RequestValidationError {
    type Error = String;

    fn try_from(list: FailureList) -> Result<Self, Self::Error> {
        let failures = list.failures;
        if failures.is_empty() {
            return Err("request validation error without failures".to_string());
        }
        if !failures.windows(2).all(|w| w[0].section < w[1].section) {
            return Err(
                "section failures must be unique and ordered params, query, body, headers"
                    .to_string(),
            );
        }
        Ok(Self { failures })
    }
}

impl RequestValidationError {
    /// Fixed message carried by every instance.
    pub const MESSAGE: &'static str = "request validation failed";

    /// `failures` must be non-empty and in evaluation order.
    pub(crate) fn new(failures: Vec<SectionFailure>) -> Self {
        debug_assert!(!failures.is_empty());
        debug_assert!(failures.windows(2).all(|w| w[0].section < w[1].section));
        Self { failures }
    }

    /// Failing sections with their violations, in evaluation order.
    pub fn failures(&self) -> &[SectionFailure] {
        &self.failures
    }

    /// Consumes self and returns the failures.
    pub fn into_failures(self) -> Vec<SectionFailure> {
        self.failures
    }

    /// The failing sections, in evaluation order.
    pub fn sections(&self) -> Vec<Section> {
        self.failures.iter().map(|f| f.section).collect()
    }

    /// The failure for `section`, if that section failed.
    pub fn failure(&self, section: Section) -> Option<&SectionFailure> {
        self.failures.iter().find(|f| f.section == section)
    }

    /// Total number of violations across all sections.
    pub fn violation_count(&self) -> usize {
        self.failures.iter().map(|f| f.violations.len()).sum()
    }
}
