//! # restgraph-graphql
//!
//! Builds a GraphQL schema at runtime from two sources:
//!
//! - REST route definitions with typed parameters and named response models;
//!   every route becomes a field that re-enters the REST pipeline
//! - collections whose attributes are stored as data; every collection becomes
//!   a type with `Get`, `List`, `Create`, `Update` and `Delete` fields
//!
//! The schema is an `async_graphql::dynamic::Schema`.
//!
//! ## Example
//!
//! ```ignore
//! use restgraph_graphql::{GraphQLConfig, LazySchema, SchemaBuilder, SchemaSources};
//!
//! let config = GraphQLConfig::default();
//! let lazy = LazySchema::new(SchemaBuilder::new(sources, config.to_schema_builder_config()));
//!
//! let schema = lazy.get_or_build().await?;
//! let response = config.error_formatter().apply(schema.execute(query).await);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod resolvers;
pub mod schema;

pub use config::{Environment, GraphQLConfig};
pub use context::RequestContext;
pub use error::{GraphQLError, ResolverError};
pub use format::{ErrorEnvelope, ErrorFormatter};
pub use schema::{
    CollectionSchemaAssembler, CompositeBuilder, CompositeType, GraphType, LazySchema,
    MergedSchema, RouteSchemaAssembler, SchemaBuilder, SchemaBuilderConfig, SchemaFragment,
    SchemaSources, SchemaState, TypeCache, merge,
};
