//! # reqcheck-axum — Axum Binding
//!
//! Runs a [`ValidationStage`](reqcheck::ValidationStage) as axum middleware.
//!
//! ```no_run
//! use axum::response::IntoResponse;
//! use axum::{http::StatusCode, middleware, routing::post, Router};
//! use reqcheck::{validate_body, RequestValidationError};
//! use reqcheck_axum::{validate_request, StageState};
//! use serde_json::json;
//!
//! let stage = validate_body(json!({ "type": "object", "required": ["name"] }))?;
//! let state = StageState::new(stage, |err: RequestValidationError| {
//!     (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()).into_response()
//! });
//!
//! let app: Router = Router::new()
//!     .route("/items/{id}", post(|| async { "created" }))
//!     .route_layer(middleware::from_fn_with_state(state, validate_request));
//! # Ok::<(), reqcheck::StageError>(())
//! ```
//!
//! ## Host Duties
//!
//! The binding only reads what axum already parsed: routed path parameters,
//! the query string, and the header map. The body must be decoded upstream
//! and attached as a [`DecodedBody`] extension; without one, the body section
//! is absent. Rejected requests are turned into responses by the rejection
//! function given to [`StageState`].

pub mod middleware;

pub use middleware::{validate_request, DecodedBody, StageState};
