//! Composite (object) type construction.
//!
//! Response models are built recursively: a field whose type tag is not a
//! primitive names another model, which is fetched from the registry and
//! built (or taken from the [`TypeCache`]) first. Collection types are built
//! directly from their attributes.

use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{Field, FieldFuture, Object, TypeRef};
use indexmap::IndexMap;
use restgraph_rest::{DynModelRegistry, ResponseShape};
use restgraph_storage::Attribute;
use tracing::{debug, trace, warn};

use super::type_cache::TypeCache;
use super::types::{GraphType, escape_key, is_primitive, map_attribute_type, map_primitive};

/// A field of a composite type.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeField {
    /// GraphQL field name (escaped).
    pub name: String,
    /// Key read from the underlying record.
    pub source_key: String,
    pub ty: GraphType,
    pub description: Option<String>,
}

impl CompositeField {
    /// Creates a field for a record key, escaping its GraphQL name.
    pub fn new(source_key: impl Into<String>, ty: GraphType) -> Self {
        let source_key = source_key.into();
        Self {
            name: escape_key(&source_key),
            source_key,
            ty,
            description: None,
        }
    }

    /// Sets the description; empty strings are ignored.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        if !description.is_empty() {
            self.description = Some(description);
        }
        self
    }

    /// Converts to an engine field resolving from the parent record.
    #[must_use]
    pub fn to_field(&self) -> Field {
        let field = create_field_resolver(&self.name, &self.source_key, self.ty.to_type_ref());
        match &self.description {
            Some(description) => field.description(description),
            None => field,
        }
    }
}

/// A named composite type.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeType {
    pub name: String,
    pub description: Option<String>,
    /// Fields keyed by GraphQL field name.
    pub fields: IndexMap<String, CompositeField>,
}

impl CompositeType {
    /// Creates a type without fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a field, replacing and returning any field with the same GraphQL
    /// name. Distinct source keys can escape to one name (`a-b`, `a_b`).
    pub fn insert(&mut self, field: CompositeField) -> Option<CompositeField> {
        let replaced = self.fields.insert(field.name.clone(), field);
        if let Some(previous) = &replaced {
            warn!(
                type_name = %self.name,
                field = %previous.name,
                replaced_key = %previous.source_key,
                "Field name collision after escaping, keeping the later key"
            );
        }
        replaced
    }

    /// Returns the field with the given GraphQL name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&CompositeField> {
        self.fields.get(name)
    }

    /// Converts to an engine object type.
    #[must_use]
    pub fn to_object(&self) -> Object {
        let mut obj = Object::new(&self.name);
        if let Some(description) = &self.description {
            obj = obj.description(description);
        }

        for field in self.fields.values() {
            obj = obj.field(field.to_field());
        }

        // GraphQL requires at least one field per type.
        if self.fields.is_empty() {
            trace!(type_name = %self.name, "No fields, adding placeholder field");
            obj = obj.field(
                Field::new("_placeholder", TypeRef::named(TypeRef::STRING), |_ctx| {
                    FieldFuture::new(async { Ok(None::<Value>) })
                })
                .description("Placeholder field - type has no defined fields"),
            );
        }

        obj
    }
}

/// Builds composite types from response models, memoized per session.
pub struct CompositeBuilder {
    models: DynModelRegistry,
    cache: Arc<TypeCache>,
}

impl CompositeBuilder {
    /// Creates a builder sharing `cache` with the rest of the session.
    #[must_use]
    pub fn new(models: DynModelRegistry, cache: Arc<TypeCache>) -> Self {
        Self { models, cache }
    }

    /// The session's type cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<TypeCache> {
        &self.cache
    }

    /// Builds the composite type for `shape`, or returns the cached one.
    ///
    /// Fields referencing unknown models are dropped. When a rule lists several
    /// type tags, the last one that resolves determines the field type.
    pub fn build_from_shape(&self, shape: &ResponseShape) -> Arc<CompositeType> {
        if let Some(cached) = self.cache.get(&shape.name) {
            return cached;
        }

        trace!(type_name = %shape.name, "Generating GraphQL type");
        self.cache.start_generating(&shape.name);

        let mut ty = CompositeType::new(&shape.name);
        for (key, rule) in &shape.rules {
            let mut resolved = None;
            for tag in &rule.types {
                if let Some(tag_type) = self.resolve_tag(&shape.name, key, tag) {
                    resolved = Some(tag_type);
                }
            }

            let Some(resolved) = resolved else {
                continue;
            };
            let field = CompositeField::new(key, resolved.wrap(rule.array, false))
                .with_description(&rule.description);
            ty.insert(field);
        }

        debug!(type_name = %ty.name, fields = ty.fields.len(), "Built composite type");
        self.cache.finish_generating(ty)
    }

    /// Resolves one type tag of a field rule.
    fn resolve_tag(&self, parent: &str, key: &str, tag: &str) -> Option<GraphType> {
        if is_primitive(tag) {
            return Some(map_primitive(tag));
        }

        // Built already, or an enclosing call is building it.
        if self.cache.is_known(tag) {
            return Some(GraphType::Object(tag.to_string()));
        }

        match self.models.get_model(tag) {
            Ok(model) => {
                let built = self.build_from_shape(&model);
                Some(GraphType::Object(built.name.clone()))
            }
            Err(e) => {
                warn!(
                    type_name = %parent,
                    field = %key,
                    model = %tag,
                    error = %e,
                    "Dropping field with unresolved model"
                );
                None
            }
        }
    }
}

/// Maps an attribute to its field on the collection type.
#[must_use]
pub fn attribute_field(attribute: &Attribute) -> CompositeField {
    let ty = map_attribute_type(&attribute.attr_type).wrap(attribute.array, attribute.required);
    CompositeField::new(&attribute.key, ty)
}

/// Builds a collection's composite type from its attributes.
#[must_use]
pub fn build_from_attributes<'a>(
    collection_id: &str,
    attributes: impl IntoIterator<Item = &'a Attribute>,
) -> CompositeType {
    let mut ty = CompositeType::new(collection_id);
    for attribute in attributes {
        ty.insert(attribute_field(attribute));
    }
    ty
}

/// Creates a field resolver that extracts a value from the parent JSON object.
///
/// The GraphQL name may differ from the record key (`_id` for `$id`); the
/// original key is used for the lookup.
fn create_field_resolver(graphql_name: &str, source_key: &str, type_ref: TypeRef) -> Field {
    let source_key = source_key.to_string();

    Field::new(graphql_name, type_ref, move |ctx| {
        let source_key = source_key.clone();
        FieldFuture::new(async move {
            if let Some(parent) = ctx.parent_value.as_value()
                && let Value::Object(obj) = parent
                && let Some(value) = obj.get(&async_graphql::Name::new(&source_key))
                && !matches!(value, Value::Null)
            {
                return Ok(Some(value.clone()));
            }
            Ok(None)
        })
    })
}
