//! Offline route executor serving canned responses.

use std::collections::HashMap;

use async_trait::async_trait;
use restgraph_rest::{
    HttpMethod, MODEL_ERROR, RestError, RestRequest, RestResponse, RouteDefinition, RouteExecutor,
};
use serde_json::{Value, json};
use tracing::debug;

#[derive(Debug, Default)]
pub struct FixtureExecutor {
    responses: HashMap<(HttpMethod, String), RestResponse>,
}

impl FixtureExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, route: &RouteDefinition, model: impl Into<String>, payload: Value) {
        self.responses.insert(
            (route.method, route.path.clone()),
            RestResponse::new(model, payload),
        );
    }
}

#[async_trait]
impl RouteExecutor for FixtureExecutor {
    async fn execute(
        &self,
        route: &RouteDefinition,
        request: RestRequest,
    ) -> Result<RestResponse, RestError> {
        let params = Value::Object(request.params);
        debug!(
            method = %request.method,
            path = %request.path,
            params = %params,
            "Executing route fixture"
        );

        let response = self
            .responses
            .get(&(route.method, route.path.clone()))
            .cloned()
            .unwrap_or_else(|| {
                RestResponse::new(
                    MODEL_ERROR,
                    json!({
                        "message": format!("No fixture for {} {}", route.method, route.path),
                        "code": 501,
                    }),
                )
            });
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restgraph_rest::ResponseKind;

    #[tokio::test]
    async fn test_missing_fixture_is_an_error_model() {
        let executor = FixtureExecutor::new();
        let route = RouteDefinition::new(HttpMethod::Get, "/v1/health");

        let response = executor
            .execute(&route, RestRequest::for_route(&route))
            .await
            .unwrap();

        assert_eq!(response.kind(), ResponseKind::Error);
        assert_eq!(response.payload["code"], 501);
    }

    #[tokio::test]
    async fn test_fixture_by_method_and_path() {
        let mut executor = FixtureExecutor::new();
        let get = RouteDefinition::new(HttpMethod::Get, "/v1/users");
        let post = RouteDefinition::new(HttpMethod::Post, "/v1/users");
        executor.insert(&get, "userList", json!({"total": 1}));

        let listed = executor
            .execute(&get, RestRequest::for_route(&get))
            .await
            .unwrap();
        let created = executor
            .execute(&post, RestRequest::for_route(&post))
            .await
            .unwrap();

        assert_eq!(listed.model, "userList");
        assert_eq!(created.kind(), ResponseKind::Error);
    }
}
