//! Route definitions and the route registry.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::MODEL_NONE;
use crate::serde_util::one_or_many;
use crate::validator::ValidatorSource;

/// HTTP method of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// All methods, in registry enumeration order.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Converts to the `http` crate's method type.
    #[must_use]
    pub fn as_http(self) -> http::Method {
        match self {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Options => http::Method::OPTIONS,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Delete => write!(f, "DELETE"),
            HttpMethod::Head => write!(f, "HEAD"),
            HttpMethod::Options => write!(f, "OPTIONS"),
        }
    }
}

/// A declared route parameter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteParam {
    /// Parameter name.
    pub name: String,
    /// Validator instance or factory.
    pub validator: ValidatorSource,
    /// Whether the parameter must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Value used when an optional parameter is omitted.
    #[serde(default)]
    pub default: Option<Value>,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Names of framework resources the validator factory needs.
    #[serde(default)]
    pub injections: Vec<String>,
}

impl RouteParam {
    /// Creates an optional parameter without default.
    pub fn new(name: impl Into<String>, validator: impl Into<ValidatorSource>) -> Self {
        Self {
            name: name.into(),
            validator: validator.into(),
            required: false,
            default: None,
            description: String::new(),
            injections: Vec::new(),
        }
    }

    /// Marks the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the resources injected into the validator factory.
    #[must_use]
    pub fn with_injections(mut self, injections: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.injections = injections.into_iter().map(Into::into).collect();
        self
    }
}

/// A REST route and its SDK labels.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDefinition {
    pub method: HttpMethod,
    pub path: String,
    /// SDK namespace label (e.g. `users`).
    #[serde(default)]
    pub namespace: Option<String>,
    /// SDK method label (e.g. `list`).
    #[serde(default)]
    pub sdk_method: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Response model name(s); `none` when the route returns no body.
    #[serde(
        default = "default_response_models",
        rename = "responseModel",
        deserialize_with = "one_or_many"
    )]
    pub response_models: Vec<String>,
    /// Parameters in declaration order.
    #[serde(default)]
    pub params: Vec<RouteParam>,
}

fn default_response_models() -> Vec<String> {
    vec![MODEL_NONE.to_string()]
}

impl RouteDefinition {
    /// Creates a route returning no body.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            namespace: None,
            sdk_method: None,
            description: String::new(),
            response_models: default_response_models(),
            params: Vec::new(),
        }
    }

    /// Sets the SDK namespace and method labels.
    #[must_use]
    pub fn with_sdk(mut self, namespace: impl Into<String>, method: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self.sdk_method = Some(method.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets a single response model.
    #[must_use]
    pub fn with_response_model(mut self, model: impl Into<String>) -> Self {
        self.response_models = vec![model.into()];
        self
    }

    /// Sets several response models.
    #[must_use]
    pub fn with_response_models(mut self, models: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.response_models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with_param(mut self, param: RouteParam) -> Self {
        self.params.push(param);
        self
    }

    /// Returns `true` if the route declares no response body.
    #[must_use]
    pub fn returns_none(&self) -> bool {
        self.response_models.is_empty() || self.response_models.iter().any(|m| m == MODEL_NONE)
    }
}

/// All registered routes, enumerable by HTTP method.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    routes: Vec<RouteDefinition>,
}

impl RouteRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route.
    pub fn add(&mut self, route: RouteDefinition) {
        self.routes.push(route);
    }

    /// Builder-style variant of [`RouteRegistry::add`].
    #[must_use]
    pub fn with_route(mut self, route: RouteDefinition) -> Self {
        self.add(route);
        self
    }

    /// Routes registered for `method`, in registration order.
    pub fn routes(&self, method: HttpMethod) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter().filter(move |route| route.method == method)
    }

    /// All routes grouped by method in [`HttpMethod::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteDefinition> {
        HttpMethod::ALL
            .into_iter()
            .flat_map(move |method| self.routes(method))
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl FromIterator<RouteDefinition> for RouteRegistry {
    fn from_iter<I: IntoIterator<Item = RouteDefinition>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;
    use serde_json::json;

    #[test]
    fn test_registry_groups_by_method() {
        let registry: RouteRegistry = [
            RouteDefinition::new(HttpMethod::Post, "/v1/users"),
            RouteDefinition::new(HttpMethod::Get, "/v1/users"),
            RouteDefinition::new(HttpMethod::Delete, "/v1/users/:id"),
            RouteDefinition::new(HttpMethod::Get, "/v1/teams"),
        ]
        .into_iter()
        .collect();

        let order: Vec<_> = registry.iter().map(|r| (r.method, r.path.as_str())).collect();
        assert_eq!(
            order,
            vec![
                (HttpMethod::Get, "/v1/users"),
                (HttpMethod::Get, "/v1/teams"),
                (HttpMethod::Post, "/v1/users"),
                (HttpMethod::Delete, "/v1/users/:id"),
            ]
        );
        assert_eq!(registry.routes(HttpMethod::Get).count(), 2);
    }

    #[test]
    fn test_returns_none() {
        let route = RouteDefinition::new(HttpMethod::Get, "/v1/health");
        assert!(route.returns_none());
        assert!(!route.with_response_model("health").returns_none());
    }

    #[test]
    fn test_deserialize_route() {
        let route: RouteDefinition = serde_json::from_value(json!({
            "method": "GET",
            "path": "/v1/users",
            "namespace": "users",
            "sdkMethod": "list",
            "responseModel": "userList",
            "params": [
                {"name": "limit", "validator": {"type": "range", "min": 0, "max": 100}, "default": 25},
                {"name": "search", "validator": {"type": "text", "maxLength": 256}}
            ]
        }))
        .unwrap();

        assert_eq!(route.method, HttpMethod::Get);
        assert_eq!(route.response_models, vec!["userList"]);
        assert_eq!(route.params.len(), 2);
        assert!(!route.params[0].required);
        assert_eq!(route.params[0].default, Some(json!(25)));
        assert!(matches!(
            &route.params[1].validator,
            ValidatorSource::Instance(Validator::Text { max_length: 256 })
        ));
    }

    #[test]
    fn test_deserialize_defaults_to_none_model() {
        let route: RouteDefinition =
            serde_json::from_value(json!({"method": "DELETE", "path": "/v1/x"})).unwrap();
        assert!(route.returns_none());
    }
}
