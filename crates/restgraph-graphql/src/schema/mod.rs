//! Runtime schema construction.
//!
//! - [`types`]: the unified [`GraphType`] and the primitive type table
//! - [`validators`]: route parameter validators to argument types
//! - [`composite`]: composite types from response models and attributes
//! - [`collections`], [`routes`]: the two fragment assemblers
//! - [`merger`]: fragment union into the root types
//! - [`builder`], [`lazy`]: one build session, and its cached result

pub mod builder;
pub mod collections;
pub mod composite;
pub mod lazy;
pub mod merger;
pub mod routes;
pub mod type_cache;
pub mod types;
pub mod validators;

pub use builder::{SchemaBuilder, SchemaBuilderConfig, SchemaSources};
pub use collections::CollectionSchemaAssembler;
pub use composite::{CompositeBuilder, CompositeField, CompositeType, build_from_attributes};
pub use lazy::{LazySchema, SchemaState};
pub use merger::{MUTATION_TYPE, MergedSchema, QUERY_TYPE, SchemaFragment, merge};
pub use routes::RouteSchemaAssembler;
pub use type_cache::TypeCache;
pub use types::{GraphType, JSON_SCALAR, escape_key, map_attribute_type, map_primitive};
pub use validators::{map_validator, validator_type};
