//! Per-request GraphQL context.
//!
//! The transport layer places a [`RequestContext`] into the engine request
//! data. Route resolvers copy its headers into the request they re-dispatch
//! through the REST pipeline.
//!
//! # Example
//!
//! ```ignore
//! let request = async_graphql::Request::new(query)
//!     .data(RequestContext::new(headers).with_origin(Method::POST, "/v1/graphql"));
//! let response = schema.execute(request).await;
//! ```

use http::{HeaderMap, Method};

/// Transport details of the originating GraphQL request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Headers of the originating request.
    pub headers: HeaderMap,

    /// Method of the originating request.
    pub method: Option<Method>,

    /// Path of the originating request.
    pub path: Option<String>,
}

impl RequestContext {
    /// Creates a context carrying `headers`.
    #[must_use]
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            headers,
            method: None,
            path: None,
        }
    }

    /// Records the method and path of the originating request.
    #[must_use]
    pub fn with_origin(mut self, method: Method, path: impl Into<String>) -> Self {
        self.method = Some(method);
        self.path = Some(path.into());
        self
    }
}
