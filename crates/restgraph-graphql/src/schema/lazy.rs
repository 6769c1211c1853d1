//! Lazily built, invalidatable schema.
//!
//! Collections and their attributes change at runtime, so the schema is built
//! on first use, shared until [`LazySchema::invalidate`] is called, and then
//! rebuilt on the next access.

use std::sync::Arc;

use async_graphql::dynamic::Schema;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{info, warn};

use super::SchemaBuilder;
use crate::error::GraphQLError;

/// State of the lazy schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// Not built yet, or invalidated.
    Uninitialized,
    Building,
    Ready,
    /// The last build failed.
    Failed,
}

#[derive(Default)]
struct Slot {
    schema: Option<Arc<Schema>>,
    last_error: Option<String>,
}

/// Shared schema holder with single-flight builds.
///
/// # Example
///
/// ```ignore
/// let lazy = LazySchema::new(builder);
/// let schema = lazy.get_or_build().await?;
///
/// // after a collection changed
/// lazy.invalidate().await;
/// ```
pub struct LazySchema {
    slot: RwLock<Slot>,
    state: RwLock<SchemaState>,
    /// Held for the duration of a build or an invalidation.
    build_lock: Mutex<()>,
    builder: Arc<SchemaBuilder>,
}

impl LazySchema {
    /// Creates an unbuilt holder.
    #[must_use]
    pub fn new(builder: SchemaBuilder) -> Self {
        Self {
            slot: RwLock::new(Slot::default()),
            state: RwLock::new(SchemaState::Uninitialized),
            build_lock: Mutex::new(()),
            builder: Arc::new(builder),
        }
    }

    /// Returns the current state of the schema.
    pub async fn state(&self) -> SchemaState {
        *self.state.read().await
    }

    /// Returns the schema, building it if necessary.
    ///
    /// Does not wait for a build started by another caller.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::SchemaInitializing` while another build runs and
    /// `GraphQLError::SchemaBuildFailed` if this build fails.
    pub async fn get_or_build(&self) -> Result<Arc<Schema>, GraphQLError> {
        if let Some(schema) = self.get().await {
            return Ok(schema);
        }
        let Ok(guard) = self.build_lock.try_lock() else {
            return Err(GraphQLError::SchemaInitializing);
        };
        self.build_locked(guard, false).await
    }

    /// Returns the schema, waiting for an in-progress build.
    ///
    /// A failure recorded by an earlier build is returned without retrying;
    /// call [`LazySchema::invalidate`] to retry.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::SchemaBuildFailed` if the build failed.
    pub async fn get_or_build_wait(&self) -> Result<Arc<Schema>, GraphQLError> {
        if let Some(schema) = self.get().await {
            return Ok(schema);
        }
        let guard = self.build_lock.lock().await;
        self.build_locked(guard, true).await
    }

    async fn build_locked(
        &self,
        _guard: MutexGuard<'_, ()>,
        reuse_failure: bool,
    ) -> Result<Arc<Schema>, GraphQLError> {
        {
            let slot = self.slot.read().await;
            if let Some(schema) = &slot.schema {
                return Ok(Arc::clone(schema));
            }
            if reuse_failure
                && *self.state.read().await == SchemaState::Failed
                && let Some(err) = &slot.last_error
            {
                return Err(GraphQLError::SchemaBuildFailed(err.clone()));
            }
        }

        *self.state.write().await = SchemaState::Building;
        info!("Building GraphQL schema...");

        match self.builder.build().await {
            Ok(schema) => {
                let schema = Arc::new(schema);
                {
                    let mut slot = self.slot.write().await;
                    slot.schema = Some(Arc::clone(&schema));
                    slot.last_error = None;
                }
                *self.state.write().await = SchemaState::Ready;
                info!("GraphQL schema ready");
                Ok(schema)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Failed to build GraphQL schema");
                self.slot.write().await.last_error = Some(message.clone());
                *self.state.write().await = SchemaState::Failed;
                Err(GraphQLError::SchemaBuildFailed(message))
            }
        }
    }

    /// Returns the schema if it is built, without triggering a build.
    pub async fn get(&self) -> Option<Arc<Schema>> {
        self.slot.read().await.schema.clone()
    }

    /// Drops the cached schema; the next access rebuilds it.
    pub async fn invalidate(&self) {
        let _guard = self.build_lock.lock().await;

        *self.slot.write().await = Slot::default();
        *self.state.write().await = SchemaState::Uninitialized;

        info!("GraphQL schema invalidated - will rebuild on next request");
    }

    /// Returns the last build error, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.slot.read().await.last_error.clone()
    }

    /// Returns whether the schema is ready for use.
    pub async fn is_ready(&self) -> bool {
        *self.state.read().await == SchemaState::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaBuilderConfig, SchemaSources};
    use async_trait::async_trait;
    use restgraph_rest::{
        MemoryModelRegistry, RestError, RestRequest, RestResponse, RouteDefinition,
        RouteExecutor, RouteRegistry,
    };
    use restgraph_storage::{Attribute, AttributeStore, MemoryStore, StorageError};

    struct NoopExecutor;

    #[async_trait]
    impl RouteExecutor for NoopExecutor {
        async fn execute(
            &self,
            _route: &RouteDefinition,
            _request: RestRequest,
        ) -> Result<RestResponse, RestError> {
            Ok(RestResponse::new("none", serde_json::Value::Null))
        }
    }

    struct BrokenAttributes;

    #[async_trait]
    impl AttributeStore for BrokenAttributes {
        async fn find_attributes(
            &self,
            _limit: usize,
            _offset: usize,
        ) -> Result<Vec<Attribute>, StorageError> {
            Err(StorageError::connection_error("metadata database unreachable"))
        }
    }

    fn lazy(store: Arc<MemoryStore>, attributes: Option<Arc<dyn AttributeStore>>) -> LazySchema {
        let fallback: Arc<dyn AttributeStore> = store.clone();
        let sources = SchemaSources {
            routes: Arc::new(RouteRegistry::new()),
            models: Arc::new(MemoryModelRegistry::new()),
            executor: Arc::new(NoopExecutor),
            resources: restgraph_rest::Resources::new(),
            attributes: attributes.unwrap_or(fallback),
            documents: store,
        };
        LazySchema::new(SchemaBuilder::new(sources, SchemaBuilderConfig::default()))
    }

    #[tokio::test]
    async fn test_builds_once_until_invalidated() {
        let store = Arc::new(MemoryStore::with_attributes(vec![Attribute::new(
            "posts", "title", "string",
        )]));
        let lazy = lazy(store.clone(), None);
        assert_eq!(lazy.state().await, SchemaState::Uninitialized);
        assert!(lazy.get().await.is_none());

        let first = lazy.get_or_build().await.unwrap();
        let second = lazy.get_or_build_wait().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(lazy.is_ready().await);
        assert!(!first.sdl().contains("commentsGet"));

        store
            .add_attribute(Attribute::new("comments", "body", "string"))
            .await;
        lazy.invalidate().await;
        assert_eq!(lazy.state().await, SchemaState::Uninitialized);

        let rebuilt = lazy.get_or_build().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &rebuilt));
        assert!(rebuilt.sdl().contains("commentsGet"));
    }

    #[tokio::test]
    async fn test_failed_build_is_recorded() {
        let lazy = lazy(Arc::new(MemoryStore::new()), Some(Arc::new(BrokenAttributes)));

        let err = lazy.get_or_build().await.unwrap_err();
        assert!(matches!(err, GraphQLError::SchemaBuildFailed(_)));
        assert_eq!(lazy.state().await, SchemaState::Failed);
        assert!(
            lazy.last_error()
                .await
                .is_some_and(|e| e.contains("metadata database unreachable"))
        );

        let again = lazy.get_or_build_wait().await.unwrap_err();
        assert!(matches!(again, GraphQLError::SchemaBuildFailed(_)));

        lazy.invalidate().await;
        assert!(lazy.last_error().await.is_none());
    }
}
