//! Route schema assembly.
//!
//! Every route that declares a response model becomes one root field named
//! `<namespace><Method>` (`users` + `list` gives `usersList`). GET routes go
//! to the query root; POST, PUT, PATCH and DELETE routes go to the mutation
//! root. Other methods, mock routes and routes without a body are skipped.

use std::sync::Arc;

use async_graphql::dynamic::{Field, InputValue, TypeRef};
use indexmap::IndexMap;
use restgraph_rest::{
    DynModelRegistry, DynRouteExecutor, HttpMethod, Resources, RouteDefinition, RouteRegistry,
};
use tracing::{debug, trace, warn};

use super::composite::CompositeBuilder;
use super::merger::SchemaFragment;
use super::types::{GraphType, capitalize_first, escape_key, is_valid_graphql_name};
use super::validators::map_validator;
use crate::error::GraphQLError;
use crate::resolvers::{RouteResolver, json_to_graphql_value};

/// Root type a route field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    Query,
    Mutation,
}

impl Root {
    fn for_method(method: HttpMethod) -> Option<Self> {
        match method {
            HttpMethod::Get => Some(Self::Query),
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch | HttpMethod::Delete => {
                Some(Self::Mutation)
            }
            HttpMethod::Head | HttpMethod::Options => None,
        }
    }
}

/// A mapped route parameter.
struct Argument {
    name: String,
    ty: GraphType,
    description: String,
    default: Option<serde_json::Value>,
}

impl Argument {
    fn to_input_value(&self) -> InputValue {
        let mut input = InputValue::new(&self.name, self.ty.to_type_ref());
        if !self.description.is_empty() {
            input = input.description(&self.description);
        }
        if let Some(default) = &self.default {
            input = input.default_value(json_to_graphql_value(default.clone()));
        }
        input
    }
}

/// Builds the route-derived schema fragment.
pub struct RouteSchemaAssembler {
    routes: Arc<RouteRegistry>,
    models: DynModelRegistry,
    executor: DynRouteExecutor,
    resources: Resources,
    mock_path_prefix: String,
}

impl RouteSchemaAssembler {
    /// Creates an assembler without framework resources.
    #[must_use]
    pub fn new(
        routes: Arc<RouteRegistry>,
        models: DynModelRegistry,
        executor: DynRouteExecutor,
    ) -> Self {
        Self {
            routes,
            models,
            executor,
            resources: Resources::new(),
            mock_path_prefix: "/v1/mock/".to_string(),
        }
    }

    /// Sets the resources available to validator factories.
    #[must_use]
    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    /// Sets the path prefix of routes that are never exposed.
    #[must_use]
    pub fn with_mock_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.mock_path_prefix = prefix.into();
        self
    }

    /// Emits one field per route and response model.
    ///
    /// Response models are built with `builder`; every type in its cache is
    /// added to the fragment.
    ///
    /// # Errors
    ///
    /// Fails if a parameter's validator cannot be resolved.
    pub fn assemble(&self, builder: &CompositeBuilder) -> Result<SchemaFragment, GraphQLError> {
        let mut fragment = SchemaFragment::new();

        for route in self.routes.iter() {
            let Some((root, name)) = self.field_target(route) else {
                continue;
            };

            let (arguments, keys) = self.arguments(route)?;
            let route = Arc::new(route.clone());

            for model_name in &route.response_models {
                let model = match self.models.get_model(model_name) {
                    Ok(model) => model,
                    Err(e) => {
                        warn!(field = %name, model = %model_name, error = %e, "Skipping unresolved response model");
                        continue;
                    }
                };
                let ty = builder.build_from_shape(&model);

                let mut field = Field::new(
                    &name,
                    TypeRef::named(&ty.name),
                    RouteResolver::resolve(
                        self.executor.clone(),
                        Arc::clone(&route),
                        name.clone(),
                        Arc::clone(&keys),
                    ),
                );
                if !route.description.is_empty() {
                    field = field.description(&route.description);
                }
                for argument in &arguments {
                    field = field.argument(argument.to_input_value());
                }

                trace!(field = %name, model = %ty.name, root = ?root, "Emitting route field");
                match root {
                    Root::Query => fragment.add_query(&name, field),
                    Root::Mutation => fragment.add_mutation(&name, field),
                }
            }
        }

        for ty in builder.cache().types() {
            fragment.add_type(ty);
        }

        debug!(
            query_fields = fragment.query.len(),
            mutation_fields = fragment.mutation.len(),
            types = fragment.types.len(),
            "Assembled route schema"
        );
        Ok(fragment)
    }

    /// Decides whether and where a route is exposed.
    fn field_target(&self, route: &RouteDefinition) -> Option<(Root, String)> {
        if route.path.starts_with(&self.mock_path_prefix) {
            trace!(path = %route.path, "Skipping mock route");
            return None;
        }
        if route.returns_none() {
            return None;
        }
        let Some(root) = Root::for_method(route.method) else {
            trace!(method = %route.method, path = %route.path, "Skipping route method");
            return None;
        };
        let (Some(namespace), Some(method)) = (&route.namespace, &route.sdk_method) else {
            debug!(path = %route.path, "Skipping route without SDK labels");
            return None;
        };

        let name = format!("{namespace}{}", capitalize_first(method));
        if !is_valid_graphql_name(&name) {
            warn!(field = %name, path = %route.path, "Skipping route with invalid field name");
            return None;
        }
        Some((root, name))
    }

    /// Maps the route's parameters to arguments.
    fn arguments(
        &self,
        route: &RouteDefinition,
    ) -> Result<(Vec<Argument>, Arc<IndexMap<String, String>>), GraphQLError> {
        let mut arguments = Vec::with_capacity(route.params.len());
        let mut keys = IndexMap::with_capacity(route.params.len());

        for param in &route.params {
            let ty = map_validator(
                &param.validator,
                param.required,
                &self.resources,
                &param.injections,
            )?;
            let name = escape_key(&param.name);
            keys.insert(name.clone(), param.name.clone());
            arguments.push(Argument {
                name,
                ty,
                description: param.description.clone(),
                default: param
                    .default
                    .clone()
                    .filter(|default| !param.required && !default.is_null()),
            });
        }

        Ok((arguments, Arc::new(keys)))
    }
}
