//! Merging of schema fragments into the root types.
//!
//! Each assembler produces a [`SchemaFragment`]. [`merge`] unions the query
//! and mutation field maps of two fragments, sorts them by name and wraps
//! them as the `Query` and `Mutation` root objects.

use std::fmt;
use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{Field, FieldFuture, Object, TypeRef};
use indexmap::IndexMap;
use tracing::{debug, warn};

use super::composite::CompositeType;
use super::types::JSON_SCALAR;

/// Name of the query root type.
pub const QUERY_TYPE: &str = "Query";

/// Name of the mutation root type.
pub const MUTATION_TYPE: &str = "Mutation";

/// Type names owned by the engine; no composite type may take them.
const RESERVED_TYPES: [&str; 8] = [
    QUERY_TYPE,
    MUTATION_TYPE,
    JSON_SCALAR,
    "String",
    "Int",
    "Float",
    "Boolean",
    "ID",
];

/// Root fields and composite types produced by one assembler.
#[derive(Default)]
pub struct SchemaFragment {
    pub query: IndexMap<String, Field>,
    pub mutation: IndexMap<String, Field>,
    /// Composite types the fields return, keyed by type name.
    pub types: IndexMap<String, Arc<CompositeType>>,
    /// Root field name to the type whose fields it serves.
    pub owners: IndexMap<String, String>,
}

impl SchemaFragment {
    /// Creates an empty fragment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query field, replacing any field with the same name.
    pub fn add_query(&mut self, name: impl Into<String>, field: Field) {
        self.query.insert(name.into(), field);
    }

    /// Adds a mutation field, replacing any field with the same name.
    pub fn add_mutation(&mut self, name: impl Into<String>, field: Field) {
        self.mutation.insert(name.into(), field);
    }

    /// Adds a composite type.
    pub fn add_type(&mut self, ty: Arc<CompositeType>) {
        self.types.insert(ty.name.clone(), ty);
    }

    /// Records that root field `field` belongs to type `owner`.
    pub fn claim(&mut self, owner: &str, field: impl Into<String>) {
        self.owners.insert(field.into(), owner.to_string());
    }

    /// Removes type `name` together with every root field it owns.
    pub fn remove_type(&mut self, name: &str) {
        self.types.shift_remove(name);
        let owned: Vec<String> = self
            .owners
            .iter()
            .filter(|(_, owner)| owner.as_str() == name)
            .map(|(field, _)| field.clone())
            .collect();
        for field in owned {
            self.owners.shift_remove(&field);
            self.query.shift_remove(&field);
            self.mutation.shift_remove(&field);
        }
    }

    /// Returns `true` if the fragment has no root fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.mutation.is_empty()
    }
}

impl fmt::Debug for SchemaFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaFragment")
            .field("query", &self.query.keys().collect::<Vec<_>>())
            .field("mutation", &self.mutation.keys().collect::<Vec<_>>())
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("owners", &self.owners)
            .finish()
    }
}

/// The merged root types, ready for registration.
pub struct MergedSchema {
    /// Query field names in registration order.
    pub query_fields: Vec<String>,
    /// Mutation field names in registration order.
    pub mutation_fields: Vec<String>,
    pub query: Object,
    /// Absent when no mutation fields exist.
    pub mutation: Option<Object>,
    /// Every composite type referenced by a root field.
    pub types: Vec<Arc<CompositeType>>,
}

/// Merges the route and collection fragments.
///
/// On a root field name collision the collection fragment's field wins. A
/// collection whose type name is reserved or already taken by a response
/// model is dropped along with its fields.
#[must_use]
pub fn merge(routes: SchemaFragment, mut collections: SchemaFragment) -> MergedSchema {
    let shadowing: Vec<String> = collections
        .types
        .keys()
        .filter(|name| {
            RESERVED_TYPES.contains(&name.as_str())
                || name.starts_with("__")
                || routes.types.contains_key(name.as_str())
        })
        .cloned()
        .collect();
    for name in shadowing {
        warn!(collection = %name, "Skipping collection whose name is already a schema type");
        collections.remove_type(&name);
    }

    let mut query = routes.query;
    let mut mutation = routes.mutation;
    let mut types = routes.types;

    union_into(&mut query, collections.query, QUERY_TYPE);
    union_into(&mut mutation, collections.mutation, MUTATION_TYPE);
    types.extend(collections.types);

    query.sort_keys();
    mutation.sort_keys();

    let query_fields: Vec<String> = query.keys().cloned().collect();
    let mutation_fields: Vec<String> = mutation.keys().cloned().collect();
    debug!(
        query_fields = query_fields.len(),
        mutation_fields = mutation_fields.len(),
        types = types.len(),
        "Merged schema fragments"
    );

    let query = root_object(QUERY_TYPE, query);
    let mutation = (!mutation.is_empty()).then(|| root_object(MUTATION_TYPE, mutation));

    MergedSchema {
        query_fields,
        mutation_fields,
        query,
        mutation,
        types: types.into_values().collect(),
    }
}

fn union_into(target: &mut IndexMap<String, Field>, source: IndexMap<String, Field>, root: &str) {
    for (name, field) in source {
        if target.insert(name.clone(), field).is_some() {
            warn!(root = %root, field = %name, "Duplicate root field, keeping the collection field");
        }
    }
}

fn root_object(name: &str, fields: IndexMap<String, Field>) -> Object {
    let mut obj = Object::new(name);

    // GraphQL requires at least one field per type.
    if fields.is_empty() {
        obj = obj.field(
            Field::new("_placeholder", TypeRef::named(TypeRef::STRING), |_| {
                FieldFuture::new(async { Ok(Some(Value::from("No fields registered"))) })
            })
            .description("Placeholder field - schema has no root fields"),
        );
    }

    for field in fields.into_values() {
        obj = obj.field(field);
    }
    obj
}
