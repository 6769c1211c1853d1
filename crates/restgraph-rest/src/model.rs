//! Response models ("shapes") registered by the REST layer.
//!
//! A response model names an output payload and describes each of its fields
//! by one or more raw type tags. A tag is either a primitive (`string`,
//! `integer`, ...) or the name of another registered model.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RestError;
use crate::serde_util::one_or_many;

/// Model name used by routes that return no body.
pub const MODEL_NONE: &str = "none";

/// Model name of a plain error response.
pub const MODEL_ERROR: &str = "error";

/// Model name of an error response carrying file, line and trace.
pub const MODEL_ERROR_DEV: &str = "errorDev";

/// Describes one field of a response model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Raw type tags the field may hold.
    #[serde(rename = "type", deserialize_with = "one_or_many")]
    pub types: Vec<String>,
    /// Whether the field is a list of values.
    #[serde(default)]
    pub array: bool,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

impl FieldRule {
    /// Creates a scalar rule with a single type tag.
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            types: vec![type_tag.into()],
            array: false,
            description: String::new(),
        }
    }

    /// Marks the rule as list-valued.
    #[must_use]
    pub fn with_array(mut self, array: bool) -> Self {
        self.array = array;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A named response payload shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseShape {
    /// Model name (also the GraphQL type name).
    pub name: String,
    /// Field rules in declaration order.
    #[serde(default)]
    pub rules: IndexMap<String, FieldRule>,
}

impl ResponseShape {
    /// Creates a shape without fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: IndexMap::new(),
        }
    }

    /// Adds a field rule.
    #[must_use]
    pub fn with_rule(mut self, key: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.insert(key.into(), rule);
        self
    }
}

/// Lookup of response models by name.
pub trait ModelRegistry: Send + Sync {
    /// Returns the model registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RestError::ModelNotFound` when no model has that name.
    fn get_model(&self, name: &str) -> Result<Arc<ResponseShape>, RestError>;
}

/// Shared model registry handle.
pub type DynModelRegistry = Arc<dyn ModelRegistry>;

/// Hash-map backed [`ModelRegistry`].
#[derive(Debug, Default, Clone)]
pub struct MemoryModelRegistry {
    models: HashMap<String, Arc<ResponseShape>>,
}

impl MemoryModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model, replacing any model with the same name.
    pub fn register(&mut self, shape: ResponseShape) {
        let name = shape.name.clone();
        if self.models.insert(name.clone(), Arc::new(shape)).is_some() {
            warn!(model = %name, "Response model registered twice, keeping the latest");
        }
    }

    /// Builder-style variant of [`MemoryModelRegistry::register`].
    #[must_use]
    pub fn with_model(mut self, shape: ResponseShape) -> Self {
        self.register(shape);
        self
    }

    /// Number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if no models are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl ModelRegistry for MemoryModelRegistry {
    fn get_model(&self, name: &str) -> Result<Arc<ResponseShape>, RestError> {
        self.models.get(name).cloned().ok_or_else(|| {
            debug!(model = %name, registered = self.models.len(), "Response model not registered");
            RestError::ModelNotFound(name.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_lookup() {
        let registry = MemoryModelRegistry::new()
            .with_model(ResponseShape::new("user").with_rule("name", FieldRule::new("string")));

        let user = registry.get_model("user").unwrap();
        assert_eq!(user.rules.len(), 1);
        assert!(matches!(
            registry.get_model("team"),
            Err(RestError::ModelNotFound(name)) if name == "team"
        ));
    }

    #[test]
    fn test_register_twice_keeps_latest() {
        let registry = MemoryModelRegistry::new()
            .with_model(ResponseShape::new("user").with_rule("name", FieldRule::new("string")))
            .with_model(ResponseShape::new("user"));

        assert_eq!(registry.len(), 1);
        assert!(registry.get_model("user").unwrap().rules.is_empty());
    }

    #[test]
    fn test_rule_accepts_single_or_many_types() {
        let shape: ResponseShape = serde_json::from_value(json!({
            "name": "document",
            "rules": {
                "$id": {"type": "string"},
                "value": {"type": ["string", "integer"], "array": true}
            }
        }))
        .unwrap();

        assert_eq!(shape.rules["$id"].types, vec!["string"]);
        assert_eq!(shape.rules["value"].types, vec!["string", "integer"]);
        assert!(shape.rules["value"].array);
        let keys: Vec<_> = shape.rules.keys().cloned().collect();
        assert_eq!(keys, vec!["$id", "value"]);
    }
}
