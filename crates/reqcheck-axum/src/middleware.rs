//! # Validation Middleware
//!
//! [`validate_request`] is an `axum::middleware::from_fn_with_state`
//! function. It reads the four sections from the routed request, runs the
//! stage, and either forwards the request untouched or returns whatever the
//! rejection function makes of the error.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{Query, RawPathParams, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use reqcheck::{RequestParts, RequestSections, RequestValidationError, ValidationStage};
use serde_json::Value;

/// Body decoded by upstream middleware, attached as a request extension.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBody(pub Value);

type RejectFn = dyn Fn(RequestValidationError) -> Response + Send + Sync;

/// Middleware state: the stage and what to do with a rejected request.
#[derive(Clone)]
pub struct StageState {
    stage: Arc<ValidationStage>,
    reject: Arc<RejectFn>,
}

impl StageState {
    /// Pair a stage with the function that renders its failures.
    pub fn new<F>(stage: ValidationStage, reject: F) -> Self
    where
        F: Fn(RequestValidationError) -> Response + Send + Sync + 'static,
    {
        Self::shared(Arc::new(stage), reject)
    }

    /// Like [`StageState::new`], for a stage already shared elsewhere.
    pub fn shared<F>(stage: Arc<ValidationStage>, reject: F) -> Self
    where
        F: Fn(RequestValidationError) -> Response + Send + Sync + 'static,
    {
        Self {
            stage,
            reject: Arc::new(reject),
        }
    }

    /// The stage this middleware runs.
    pub fn stage(&self) -> &ValidationStage {
        &self.stage
    }
}

impl fmt::Debug for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageState")
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

/// Sections of an axum request; the body is borrowed from the extension.
struct AxumSections<'a> {
    parts: RequestParts,
    body: Option<&'a Value>,
}

impl RequestSections for AxumSections<'_> {
    fn params(&self) -> Cow<'_, Value> {
        self.parts.params()
    }

    fn query(&self) -> Cow<'_, Value> {
        self.parts.query()
    }

    fn body(&self) -> Cow<'_, Value> {
        match self.body {
            Some(body) => Cow::Borrowed(body),
            None => Cow::Owned(Value::Null),
        }
    }

    fn headers(&self) -> Cow<'_, Value> {
        self.parts.headers()
    }
}

fn sections<'a>(params: Option<&RawPathParams>, request: &'a Request) -> AxumSections<'a> {
    let mut parts = RequestParts::new();

    if let Some(params) = params {
        for (name, value) in params.iter() {
            parts = parts.with_param(name, value);
        }
    }

    match Query::<Vec<(String, String)>>::try_from_uri(request.uri()) {
        Ok(Query(pairs)) => {
            for (name, value) in pairs {
                parts = parts.with_query(name, value);
            }
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unparseable query string, validating as absent");
        }
    }

    // Repeated headers are joined; values that are not UTF-8 are skipped.
    let headers = request.headers();
    for name in headers.keys() {
        let values: Vec<&str> = headers
            .get_all(name)
            .iter()
            .filter_map(|v| std::str::from_utf8(v.as_bytes()).ok())
            .collect();
        if !values.is_empty() {
            parts = parts.with_header(name.as_str(), values.join(", "));
        }
    }

    AxumSections {
        parts,
        body: request.extensions().get::<DecodedBody>().map(|b| &b.0),
    }
}

/// Middleware that validates a request before it reaches its handler.
///
/// Install with `axum::middleware::from_fn_with_state(state, validate_request)`,
/// after routing (`Router::route_layer`) so path parameters are available.
pub async fn validate_request(
    State(state): State<StageState>,
    params: Result<RawPathParams, RawPathParamsRejection>,
    request: Request,
    next: Next,
) -> Response {
    let verdict = {
        let sections = sections(params.as_ref().ok(), &request);
        state.stage.validate(&sections)
    };

    match verdict {
        Ok(()) => next.run(request).await,
        Err(err) => {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                sections = ?err.sections(),
                violations = err.violation_count(),
                "request rejected by validation stage"
            );
            (state.reject)(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde_json::json;

    fn request(uri: &str) -> axum::http::request::Builder {
        axum::http::Request::builder().uri(uri)
    }

    #[test]
    fn query_pairs_become_object() {
        let req = request("/search?q=rust&tag=a&tag=b").body(Body::empty()).unwrap();
        let s = sections(None, &req);
        assert_eq!(*s.query(), json!({ "q": "rust", "tag": ["a", "b"] }));
    }

    #[test]
    fn missing_query_is_empty_object() {
        let req = request("/search").body(Body::empty()).unwrap();
        assert_eq!(*sections(None, &req).query(), json!({}));
    }

    #[test]
    fn headers_are_lower_case_and_joined() {
        let req = request("/")
            .header("Authorization", "Bearer abc")
            .header("Accept", "text/plain")
            .header("Accept", "application/json")
            .body(Body::empty())
            .unwrap();
        let s = sections(None, &req);
        assert_eq!(
            *s.headers(),
            json!({
                "authorization": "Bearer abc",
                "accept": "text/plain, application/json"
            })
        );
    }

    #[test]
    fn utf8_header_values_are_kept() {
        let mut req = request("/").body(Body::empty()).unwrap();
        req.headers_mut().insert(
            "x-name",
            axum::http::HeaderValue::from_bytes("café".as_bytes()).unwrap(),
        );
        req.headers_mut().insert(
            "x-raw",
            axum::http::HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );
        assert_eq!(*sections(None, &req).headers(), json!({ "x-name": "café" }));
    }

    #[test]
    fn body_comes_from_extension() {
        let mut req = request("/").body(Body::empty()).unwrap();
        assert_eq!(*sections(None, &req).body(), Value::Null);

        req.extensions_mut().insert(DecodedBody(json!({ "bodyKey": 10 })));
        assert_eq!(*sections(None, &req).body(), json!({ "bodyKey": 10 }));
    }

    #[test]
    fn params_absent_without_routing() {
        let req = request("/items/7").body(Body::empty()).unwrap();
        assert_eq!(*sections(None, &req).params(), json!({}));
    }

    #[test]
    fn state_debug_shows_stage() {
        let stage = reqcheck::validate_body(json!({ "type": "object" })).unwrap();
        let state = StageState::new(stage, |_err| Response::default());
        assert!(format!("{state:?}").contains("Body"));
        assert_eq!(state.stage().sections().count(), 1);
    }
}
