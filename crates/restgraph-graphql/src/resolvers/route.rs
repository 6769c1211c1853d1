//! Route resolver.
//!
//! Re-enters the REST pipeline for one route, using the GraphQL arguments as
//! the request parameters, and classifies the rendered response by its model.

use std::sync::Arc;

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use indexmap::IndexMap;
use restgraph_rest::{DynRouteExecutor, ResponseKind, RestRequest, RouteDefinition};
use tracing::{debug, warn};

use super::{arguments_to_json, settle, to_record};
use crate::context::RequestContext;
use crate::error::ResolverError;

/// Resolver for route-derived fields such as `usersList`.
pub struct RouteResolver;

impl RouteResolver {
    /// Creates a resolver executing `route` through `executor`.
    ///
    /// `keys` maps argument names to parameter names. Parameters omitted from
    /// the query take their declared default.
    pub fn resolve(
        executor: DynRouteExecutor,
        route: Arc<RouteDefinition>,
        field: String,
        keys: Arc<IndexMap<String, String>>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let executor = executor.clone();
            let route = route.clone();
            let field = field.clone();
            let keys = keys.clone();
            FieldFuture::new(async move {
                settle(&field, async {
                    let mut params = to_record(arguments_to_json(&ctx), &keys);
                    for param in &route.params {
                        if let Some(default) = &param.default
                            && params.get(&param.name).is_none_or(serde_json::Value::is_null)
                        {
                            params.insert(param.name.clone(), default.clone());
                        }
                    }

                    let headers = ctx
                        .data_opt::<RequestContext>()
                        .map(|request| request.headers.clone())
                        .unwrap_or_default();
                    let request = RestRequest::for_route(&route)
                        .with_headers(headers)
                        .with_params(params)
                        .without_json_content_type();

                    debug!(
                        field = %field,
                        method = %route.method,
                        path = %route.path,
                        "Re-dispatching route"
                    );

                    let response = executor
                        .execute(&route, request)
                        .await
                        .map_err(|e| {
                            warn!(error = %e, path = %route.path, "Route execution failed");
                            ResolverError::from_rest(e)
                        })?;

                    match response.kind() {
                        ResponseKind::DeveloperError => Err(ResolverError::developer(&response.payload)),
                        ResponseKind::Error => Err(ResolverError::generic(&response.payload)),
                        ResponseKind::Payload => Ok(Some(response.payload)),
                    }
                })
                .await
            })
        }
    }
}
