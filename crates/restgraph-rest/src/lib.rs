//! # restgraph-rest
//!
//! The slice of the REST framework the schema engine depends on:
//!
//! - [`RouteRegistry`] of [`RouteDefinition`]s with typed [`RouteParam`]s
//! - the closed [`Validator`] set and injection-resolved [`ValidatorFactory`]s
//! - named [`ResponseShape`]s behind a [`ModelRegistry`]
//! - [`RouteExecutor`], the re-entry point used by route resolvers

mod error;
mod execution;
mod model;
mod route;
mod serde_util;
mod validator;

pub use error::RestError;
pub use execution::{DynRouteExecutor, ResponseKind, RestRequest, RestResponse, RouteExecutor};
pub use model::{
    DynModelRegistry, FieldRule, MODEL_ERROR, MODEL_ERROR_DEV, MODEL_NONE, MemoryModelRegistry,
    ModelRegistry, ResponseShape,
};
pub use route::{HttpMethod, RouteDefinition, RouteParam, RouteRegistry};
pub use validator::{Injected, Resources, Validator, ValidatorFactory, ValidatorSource};
