//! Re-entry into the REST execution pipeline.
//!
//! The GraphQL layer does not execute route actions itself. It synthesises a
//! [`RestRequest`] whose parameters are the GraphQL arguments and hands it to a
//! [`RouteExecutor`], then inspects the response model to tell payloads from
//! errors.

use std::sync::Arc;

use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, header};
use serde_json::{Map, Value};

use crate::error::RestError;
use crate::model::{MODEL_ERROR, MODEL_ERROR_DEV};
use crate::route::{HttpMethod, RouteDefinition};

/// A request synthesised for re-dispatch through the REST pipeline.
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub method: HttpMethod,
    pub path: String,
    /// Transport headers copied from the originating request.
    pub headers: HeaderMap,
    /// Effective request parameters.
    pub params: Map<String, Value>,
}

impl RestRequest {
    /// Creates a request targeting `route` with no headers or parameters.
    #[must_use]
    pub fn for_route(route: &RouteDefinition) -> Self {
        Self {
            method: route.method,
            path: route.path.clone(),
            headers: HeaderMap::new(),
            params: Map::new(),
        }
    }

    /// Replaces the transport headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Replaces the effective parameters.
    #[must_use]
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    /// Removes a JSON `content-type` header.
    ///
    /// Executors re-parse a JSON body when the header is present, which would
    /// replace the injected parameters with the original GraphQL request body.
    #[must_use]
    pub fn without_json_content_type(mut self) -> Self {
        let is_json = self
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value: &HeaderValue| value.to_str().ok())
            .is_some_and(|value| value.trim().to_ascii_lowercase().starts_with("application/json"));
        if is_json {
            self.headers.remove(header::CONTENT_TYPE);
        }
        self
    }
}

/// How a response should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// A regular payload.
    Payload,
    /// A plain error (message and code).
    Error,
    /// An error with file, line and trace details.
    DeveloperError,
}

/// Outcome of executing a route.
#[derive(Debug, Clone, PartialEq)]
pub struct RestResponse {
    /// Response body.
    pub payload: Value,
    /// Name of the response model the body was rendered with.
    pub model: String,
}

impl RestResponse {
    /// Creates a response rendered with `model`.
    pub fn new(model: impl Into<String>, payload: Value) -> Self {
        Self {
            payload,
            model: model.into(),
        }
    }

    /// Classifies the response by its model.
    #[must_use]
    pub fn kind(&self) -> ResponseKind {
        match self.model.as_str() {
            MODEL_ERROR_DEV => ResponseKind::DeveloperError,
            MODEL_ERROR => ResponseKind::Error,
            _ => ResponseKind::Payload,
        }
    }
}

/// Executes a route against a synthesised request.
#[async_trait]
pub trait RouteExecutor: Send + Sync {
    /// Runs the route's action and returns the rendered response.
    ///
    /// Domain failures are returned as error-model responses; `Err` is
    /// reserved for failures of the pipeline itself.
    async fn execute(
        &self,
        route: &RouteDefinition,
        request: RestRequest,
    ) -> Result<RestResponse, RestError>;
}

/// Shared executor handle.
pub type DynRouteExecutor = Arc<dyn RouteExecutor>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strips_json_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        headers.insert("x-project", HeaderValue::from_static("console"));

        let route = RouteDefinition::new(HttpMethod::Post, "/v1/users");
        let request = RestRequest::for_route(&route)
            .with_headers(headers)
            .without_json_content_type();

        assert!(request.headers.get(header::CONTENT_TYPE).is_none());
        assert_eq!(request.headers["x-project"], "console");
    }

    #[test]
    fn test_keeps_other_content_types() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data"),
        );

        let route = RouteDefinition::new(HttpMethod::Post, "/v1/storage/files");
        let request = RestRequest::for_route(&route)
            .with_headers(headers)
            .without_json_content_type();

        assert_eq!(request.headers[header::CONTENT_TYPE], "multipart/form-data");
    }

    #[test]
    fn test_response_kind() {
        assert_eq!(
            RestResponse::new("user", json!({})).kind(),
            ResponseKind::Payload
        );
        assert_eq!(
            RestResponse::new(MODEL_ERROR, json!({})).kind(),
            ResponseKind::Error
        );
        assert_eq!(
            RestResponse::new(MODEL_ERROR_DEV, json!({})).kind(),
            ResponseKind::DeveloperError
        );
    }
}
