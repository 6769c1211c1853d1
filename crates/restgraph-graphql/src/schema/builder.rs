//! Schema session.
//!
//! [`SchemaBuilder::build`] runs one complete schema build: both assemblers
//! run concurrently against a fresh [`TypeCache`], their fragments are merged,
//! and every composite type, the JSON scalar and the root types are registered
//! with the engine.

use std::sync::Arc;

use async_graphql::dynamic::Schema;
use restgraph_rest::{DynModelRegistry, DynRouteExecutor, Resources, RouteRegistry};
use restgraph_storage::{DynAttributeStore, DynDocumentStore};
use tracing::{debug, info};

use super::collections::CollectionSchemaAssembler;
use super::composite::CompositeBuilder;
use super::merger::{MUTATION_TYPE, QUERY_TYPE, merge};
use super::routes::RouteSchemaAssembler;
use super::type_cache::TypeCache;
use super::types::json_scalar;
use crate::error::GraphQLError;

/// Configuration for the schema builder.
#[derive(Debug, Clone)]
pub struct SchemaBuilderConfig {
    /// Attributes fetched per metadata page.
    pub attribute_page_size: usize,

    /// Default `limit` of `<collection>List` fields.
    pub list_default_limit: usize,

    /// Routes under this prefix are never exposed.
    pub mock_path_prefix: String,

    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            attribute_page_size: 50,
            list_default_limit: 50,
            mock_path_prefix: "/v1/mock/".to_string(),
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
        }
    }
}

/// The collaborators a schema is built from.
#[derive(Clone)]
pub struct SchemaSources {
    pub routes: Arc<RouteRegistry>,
    pub models: DynModelRegistry,
    /// Re-entry point used by route fields.
    pub executor: DynRouteExecutor,
    /// Resources injected into validator factories.
    pub resources: Resources,
    pub attributes: DynAttributeStore,
    pub documents: DynDocumentStore,
}

/// Builds the GraphQL schema from routes and collections.
///
/// # Example
///
/// ```ignore
/// let builder = SchemaBuilder::new(sources, config.to_schema_builder_config());
/// let schema = builder.build().await?;
/// println!("{}", schema.sdl());
/// ```
pub struct SchemaBuilder {
    sources: SchemaSources,
    config: SchemaBuilderConfig,
}

impl SchemaBuilder {
    /// Creates a new schema builder.
    #[must_use]
    pub fn new(sources: SchemaSources, config: SchemaBuilderConfig) -> Self {
        Self { sources, config }
    }

    /// Returns the builder configuration.
    #[must_use]
    pub fn config(&self) -> &SchemaBuilderConfig {
        &self.config
    }

    /// Builds the GraphQL schema.
    ///
    /// # Errors
    ///
    /// Fails if attribute metadata cannot be read, a validator cannot be
    /// resolved, or the engine rejects the assembled types.
    pub async fn build(&self) -> Result<Schema, GraphQLError> {
        debug!("Starting GraphQL schema build");

        let composites = CompositeBuilder::new(
            self.sources.models.clone(),
            Arc::new(TypeCache::new()),
        );
        let routes = RouteSchemaAssembler::new(
            self.sources.routes.clone(),
            self.sources.models.clone(),
            self.sources.executor.clone(),
        )
        .with_resources(self.sources.resources.clone())
        .with_mock_path_prefix(&self.config.mock_path_prefix);
        let collections = CollectionSchemaAssembler::new(
            self.sources.attributes.clone(),
            self.sources.documents.clone(),
        )
        .with_page_size(self.config.attribute_page_size)
        .with_list_default_limit(self.config.list_default_limit);

        let (route_fragment, collection_fragment) = tokio::try_join!(
            async { routes.assemble(&composites) },
            collections.assemble()
        )?;

        let merged = merge(route_fragment, collection_fragment);
        let mutation_root = merged.mutation.is_some().then_some(MUTATION_TYPE);

        let mut schema_builder = Schema::build(QUERY_TYPE, mutation_root, None);
        schema_builder = schema_builder.register(json_scalar());
        for ty in &merged.types {
            schema_builder = schema_builder.register(ty.to_object());
        }
        schema_builder = schema_builder.register(merged.query);
        if let Some(mutation) = merged.mutation {
            schema_builder = schema_builder.register(mutation);
        }

        // Configure limits
        let mut schema_builder = schema_builder
            .limit_depth(self.config.max_depth)
            .limit_complexity(self.config.max_complexity);
        if !self.config.introspection_enabled {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder
            .finish()
            .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))?;

        info!(
            query_fields = merged.query_fields.len(),
            mutation_fields = merged.mutation_fields.len(),
            types = merged.types.len(),
            "GraphQL schema build complete"
        );
        Ok(schema)
    }
}
