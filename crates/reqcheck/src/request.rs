//! # Request Abstraction
//!
//! The stage reads a request only through [`RequestSections`]: four pure
//! readers returning each section as a JSON value. A section the request
//! does not carry reads as absent data (empty object for params, query and
//! headers; `null` for the body) and is validated like any other value.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::section::Section;

/// Read access to the four validated sections of a request.
///
/// Readers must not mutate the request.
pub trait RequestSections {
    /// URL path parameters: an object of string values.
    fn params(&self) -> Cow<'_, Value>;

    /// Query parameters: an object of strings or arrays of strings.
    fn query(&self) -> Cow<'_, Value>;

    /// Body, already decoded by upstream middleware. `null` when absent.
    fn body(&self) -> Cow<'_, Value>;

    /// Headers: an object of string values.
    fn headers(&self) -> Cow<'_, Value>;

    /// Dispatch to the reader for `section`.
    fn section(&self, section: Section) -> Cow<'_, Value> {
        match section {
            Section::Params => self.params(),
            Section::Query => self.query(),
            Section::Body => self.body(),
            Section::Headers => self.headers(),
        }
    }
}

impl<T: RequestSections + ?Sized> RequestSections for &T {
    fn params(&self) -> Cow<'_, Value> {
        (**self).params()
    }

    fn query(&self) -> Cow<'_, Value> {
        (**self).query()
    }

    fn body(&self) -> Cow<'_, Value> {
        (**self).body()
    }

    fn headers(&self) -> Cow<'_, Value> {
        (**self).headers()
    }
}

/// An owned request carrying its four sections.
///
/// Params, query and headers are always JSON objects; the body is any value.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParts {
    params: Value,
    query: Value,
    body: Value,
    headers: Value,
}

impl Default for RequestParts {
    fn default() -> Self {
        Self {
            params: Value::Object(Map::new()),
            query: Value::Object(Map::new()),
            body: Value::Null,
            headers: Value::Object(Map::new()),
        }
    }
}

impl RequestParts {
    /// A request with every section absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a URL path parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert(&mut self.params, name.into(), Value::String(value.into()));
        self
    }

    /// Add a query parameter. Repeating a name collects the values into an array.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = Value::String(value.into());
        if let Some(map) = self.query.as_object_mut() {
            match map.get_mut(&name) {
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(name, value);
                }
            }
        }
        self
    }

    /// Set a query parameter to a list of values.
    pub fn with_query_values<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|v| Value::String(v.into()))
            .collect();
        insert(&mut self.query, name.into(), Value::Array(values));
        self
    }

    /// Add a header. The name is kept as given.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert(&mut self.headers, name.into(), Value::String(value.into()));
        self
    }

    /// Set the decoded body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }
}

fn insert(section: &mut Value, name: String, value: Value) {
    if let Some(map) = section.as_object_mut() {
        map.insert(name, value);
    }
}

impl RequestSections for RequestParts {
    fn params(&self) -> Cow<'_, Value> {
        Cow::Borrowed(&self.params)
    }

    fn query(&self) -> Cow<'_, Value> {
        Cow::Borrowed(&self.query)
    }

    fn body(&self) -> Cow<'_, Value> {
        Cow::Borrowed(&self.body)
    }

    fn headers(&self) -> Cow<'_, Value> {
        Cow::Borrowed(&self.headers)
    }
}
