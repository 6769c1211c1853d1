//! Project manifest.
//!
//! A JSON file describing everything a schema is built from:
//!
//! ```json
//! {
//!   "models": [{"name": "user", "rules": {"$id": {"type": "string"}}}],
//!   "routes": [{
//!     "method": "GET", "path": "/v1/users/:id",
//!     "namespace": "users", "sdkMethod": "get", "responseModel": "user",
//!     "params": [{"name": "userId", "validator": {"type": "uid"}, "required": true}],
//!     "response": {"model": "user", "payload": {"$id": "u1"}}
//!   }],
//!   "attributes": [{"collectionId": "posts", "key": "title", "type": "string", "status": "available"}],
//!   "documents": {"posts": [{"$id": "p1", "title": "Hello"}]}
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use restgraph_graphql::SchemaSources;
use restgraph_rest::{MemoryModelRegistry, Resources, ResponseShape, RouteDefinition, RouteRegistry};
use restgraph_storage::{Attribute, Document, MemoryStore};
use serde::Deserialize;
use serde_json::Value;

use crate::executor::FixtureExecutor;

#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub models: Vec<ResponseShape>,
    #[serde(default)]
    pub routes: Vec<ManifestRoute>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Seed documents per collection.
    #[serde(default)]
    pub documents: IndexMap<String, Vec<Document>>,
}

#[derive(Debug, Deserialize)]
pub struct ManifestRoute {
    #[serde(flatten)]
    pub route: RouteDefinition,
    /// Canned response returned when the route is executed.
    #[serde(default)]
    pub response: Option<Fixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub model: String,
    #[serde(default)]
    pub payload: Value,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read manifest {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid manifest {}", path.display()))
    }

    /// Builds the schema sources backed by in-memory stores.
    pub async fn into_sources(self) -> SchemaSources {
        let models = self
            .models
            .into_iter()
            .fold(MemoryModelRegistry::new(), MemoryModelRegistry::with_model);

        let mut executor = FixtureExecutor::new();
        let mut routes = RouteRegistry::new();
        for entry in self.routes {
            if let Some(fixture) = entry.response {
                executor.insert(&entry.route, fixture.model, fixture.payload);
            }
            routes.add(entry.route);
        }

        let store = Arc::new(MemoryStore::with_attributes(self.attributes));
        for (collection_id, documents) in self.documents {
            store.seed_documents(&collection_id, documents).await;
        }

        SchemaSources {
            routes: Arc::new(routes),
            models: Arc::new(models),
            executor: Arc::new(executor),
            resources: Resources::new(),
            attributes: store.clone(),
            documents: store,
        }
    }
}
