//! Collection schema assembly.
//!
//! Attribute metadata is read page by page. The attributes of each page are
//! classified into the shared collection map by concurrent tasks, and the
//! next page is only requested once every task of the current page has
//! finished. After the last page, one task per collection builds its
//! composite type, and five CRUD fields are emitted for it:
//!
//! | Field | Root | Store call |
//! |---|---|---|
//! | `<id>Get` | Query | `get_document` |
//! | `<id>List` | Query | `list_documents` |
//! | `<id>Create` | Mutation | `create_document` |
//! | `<id>Update` | Mutation | `update_document` |
//! | `<id>Delete` | Mutation | `delete_document` |

use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{Field, InputValue, TypeRef};
use indexmap::IndexMap;
use restgraph_storage::{Attribute, DynAttributeStore, DynDocumentStore};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

use super::composite::{CompositeType, build_from_attributes};
use super::merger::SchemaFragment;
use super::types::{escape_key, is_valid_graphql_name};
use crate::error::GraphQLError;
use crate::resolvers::{
    CreateResolver, DeleteResolver, GetResolver, ListResolver, UpdateResolver,
};

/// Available attributes of each collection, with their discovery position.
type CollectionMap = IndexMap<String, Vec<(usize, Attribute)>>;

/// Builds the collection-derived schema fragment.
pub struct CollectionSchemaAssembler {
    attributes: DynAttributeStore,
    documents: DynDocumentStore,
    page_size: usize,
    list_default_limit: usize,
}

impl CollectionSchemaAssembler {
    /// Creates an assembler with a page size and list limit of 50.
    #[must_use]
    pub fn new(attributes: DynAttributeStore, documents: DynDocumentStore) -> Self {
        Self {
            attributes,
            documents,
            page_size: 50,
            list_default_limit: 50,
        }
    }

    /// Sets the number of attributes fetched per page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets the default `limit` of list fields.
    #[must_use]
    pub fn with_list_default_limit(mut self, limit: usize) -> Self {
        self.list_default_limit = limit;
        self
    }

    /// Discovers all collections and emits their types and CRUD fields.
    ///
    /// # Errors
    ///
    /// Fails if an attribute page cannot be fetched or a task fails. No
    /// partial fragment is returned.
    pub async fn assemble(&self) -> Result<SchemaFragment, GraphQLError> {
        let collections = self.discover().await?;
        let types = Self::build_types(collections).await?;

        let mut fragment = SchemaFragment::new();
        for ty in types {
            self.emit_fields(&mut fragment, &ty);
            fragment.add_type(Arc::new(ty));
        }

        debug!(
            collections = fragment.types.len(),
            query_fields = fragment.query.len(),
            mutation_fields = fragment.mutation.len(),
            "Assembled collection schema"
        );
        Ok(fragment)
    }

    /// Reads every attribute page and groups available attributes by collection.
    async fn discover(&self) -> Result<CollectionMap, GraphQLError> {
        let collections: Arc<Mutex<CollectionMap>> = Arc::default();
        let mut offset = 0;

        loop {
            let page = self
                .attributes
                .find_attributes(self.page_size, offset)
                .await?;
            if page.is_empty() {
                break;
            }
            let count = page.len();
            debug!(offset, count, "Fetched attribute page");

            let mut tasks = JoinSet::new();
            for (i, attribute) in page.into_iter().enumerate() {
                let collections = Arc::clone(&collections);
                let position = offset + i;
                tasks.spawn(async move { classify(&collections, position, attribute).await });
            }
            while let Some(joined) = tasks.join_next().await {
                joined.map_err(|e| {
                    GraphQLError::Internal(format!("Attribute classification task failed: {e}"))
                })?;
            }

            offset += count;
        }

        let collections = Arc::try_unwrap(collections)
            .map_err(|_| GraphQLError::Internal("Collection map still shared".into()))?
            .into_inner();
        Ok(collections)
    }

    /// Builds one composite type per collection, concurrently.
    async fn build_types(collections: CollectionMap) -> Result<Vec<CompositeType>, GraphQLError> {
        let mut tasks = JoinSet::new();
        for (collection_id, mut attributes) in collections {
            tasks.spawn(async move {
                attributes.sort_by_key(|(position, _)| *position);
                build_from_attributes(&collection_id, attributes.iter().map(|(_, a)| a))
            });
        }

        let mut types = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let ty = joined.map_err(|e| {
                GraphQLError::Internal(format!("Collection type task failed: {e}"))
            })?;
            trace!(collection = %ty.name, fields = ty.fields.len(), "Built collection type");
            types.push(ty);
        }
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    fn emit_fields(&self, fragment: &mut SchemaFragment, ty: &CompositeType) {
        let id = ty.name.as_str();
        let keys: Arc<IndexMap<String, String>> = Arc::new(
            ty.fields
                .values()
                .map(|field| (field.name.clone(), field.source_key.clone()))
                .collect(),
        );
        let data_arguments = || {
            ty.fields
                .values()
                .map(|field| InputValue::new(&field.name, field.ty.to_type_ref()))
                .collect::<Vec<_>>()
        };

        fragment.add_query(
            format!("{id}Get"),
            Field::new(
                format!("{id}Get"),
                TypeRef::named(id),
                GetResolver::resolve(self.documents.clone(), id.to_string()),
            )
            .description(format!("Get a document from the {id} collection"))
            .argument(InputValue::new("id", TypeRef::named(TypeRef::STRING))),
        );

        let default_limit = i64::try_from(self.list_default_limit).unwrap_or(i64::MAX);
        fragment.add_query(
            format!("{id}List"),
            Field::new(
                format!("{id}List"),
                TypeRef::named_nn_list(id),
                ListResolver::resolve(
                    self.documents.clone(),
                    id.to_string(),
                    self.list_default_limit,
                ),
            )
            .description(format!("List documents of the {id} collection"))
            .argument(
                InputValue::new("limit", TypeRef::named(TypeRef::INT))
                    .default_value(Value::from(default_limit)),
            )
            .argument(
                InputValue::new("offset", TypeRef::named(TypeRef::INT))
                    .default_value(Value::from(0)),
            )
            .argument(InputValue::new("cursor", TypeRef::named(TypeRef::STRING)))
            .argument(
                InputValue::new("orderAttributes", TypeRef::named_list(TypeRef::STRING))
                    .default_value(Value::List(Vec::new())),
            )
            .argument(
                InputValue::new("orderType", TypeRef::named_list(TypeRef::STRING))
                    .default_value(Value::List(Vec::new())),
            ),
        );

        let mut create = Field::new(
            format!("{id}Create"),
            TypeRef::named(id),
            CreateResolver::resolve(self.documents.clone(), id.to_string(), Arc::clone(&keys)),
        )
        .description(format!("Create a document in the {id} collection"));
        for argument in data_arguments() {
            create = create.argument(argument);
        }
        fragment.add_mutation(format!("{id}Create"), create);

        let id_is_attribute = ty.fields.contains_key("id");
        let mut update = Field::new(
            format!("{id}Update"),
            TypeRef::named(id),
            UpdateResolver::resolve(
                self.documents.clone(),
                id.to_string(),
                Arc::clone(&keys),
                id_is_attribute,
            ),
        )
        .description(format!("Update a document of the {id} collection"));
        if !id_is_attribute {
            update = update.argument(InputValue::new("id", TypeRef::named_nn(TypeRef::STRING)));
        }
        for field in ty.fields.values() {
            // The `id` attribute also addresses the document.
            let arg_type = if field.name == "id" {
                field.ty.clone().required()
            } else {
                field.ty.clone()
            };
            update = update.argument(InputValue::new(&field.name, arg_type.to_type_ref()));
        }
        fragment.add_mutation(format!("{id}Update"), update);

        fragment.add_mutation(
            format!("{id}Delete"),
            Field::new(
                format!("{id}Delete"),
                TypeRef::named(id),
                DeleteResolver::resolve(self.documents.clone(), id.to_string()),
            )
            .description(format!("Delete a document from the {id} collection"))
            .argument(InputValue::new("id", TypeRef::named(TypeRef::STRING))),
        );

        for suffix in ["Get", "List", "Create", "Update", "Delete"] {
            fragment.claim(id, format!("{id}{suffix}"));
        }
    }
}

/// Adds one attribute to the shared collection map, or skips it.
async fn classify(collections: &Mutex<CollectionMap>, position: usize, attribute: Attribute) {
    if !attribute.status.is_available() {
        trace!(
            collection = %attribute.collection_id,
            key = %attribute.key,
            status = ?attribute.status,
            "Skipping unavailable attribute"
        );
        return;
    }
    if !is_valid_graphql_name(&attribute.collection_id) {
        warn!(collection = %attribute.collection_id, "Skipping collection with invalid GraphQL name");
        return;
    }
    if !is_valid_graphql_name(&escape_key(&attribute.key)) {
        warn!(
            collection = %attribute.collection_id,
            key = %attribute.key,
            "Skipping attribute with invalid GraphQL name"
        );
        return;
    }

    collections
        .lock()
        .await
        .entry(attribute.collection_id.clone())
        .or_default()
        .push((position, attribute));
}

#[cfg(test)]
mod tests {
    use super::*;
    use restgraph_storage::{AttributeStatus, MemoryStore};

    fn assembler(attributes: Vec<Attribute>, page_size: usize) -> CollectionSchemaAssembler {
        let store = Arc::new(MemoryStore::with_attributes(attributes));
        CollectionSchemaAssembler::new(store.clone(), store).with_page_size(page_size)
    }

    #[tokio::test]
    async fn test_five_fields_per_collection() {
        let fragment = assembler(
            vec![
                Attribute::new("posts", "title", "string"),
                Attribute::new("comments", "body", "string"),
            ],
            50,
        )
        .assemble()
        .await
        .unwrap();

        let mut query: Vec<_> = fragment.query.keys().cloned().collect();
        query.sort();
        let mut mutation: Vec<_> = fragment.mutation.keys().cloned().collect();
        mutation.sort();
        assert_eq!(
            query,
            vec!["commentsGet", "commentsList", "postsGet", "postsList"]
        );
        assert_eq!(
            mutation,
            vec![
                "commentsCreate",
                "commentsDelete",
                "commentsUpdate",
                "postsCreate",
                "postsDelete",
                "postsUpdate"
            ]
        );
    }

    #[tokio::test]
    async fn test_unavailable_only_collection_is_omitted() {
        let fragment = assembler(
            vec![
                Attribute::new("posts", "title", "string").with_status(AttributeStatus::Processing),
                Attribute::new("users", "name", "string"),
                Attribute::new("users", "legacy", "string").with_status(AttributeStatus::Failed),
            ],
            50,
        )
        .assemble()
        .await
        .unwrap();

        assert!(!fragment.query.keys().any(|name| name.starts_with("posts")));
        assert!(!fragment.types.contains_key("posts"));
        let users = &fragment.types["users"];
        assert!(users.field("name").is_some());
        assert!(users.field("legacy").is_none());
    }

    #[tokio::test]
    async fn test_attributes_across_pages_keep_order() {
        let attributes: Vec<_> = (0..7)
            .map(|i| Attribute::new("metrics", format!("m{i}"), "integer"))
            .collect();

        let fragment = assembler(attributes, 2).assemble().await.unwrap();

        let names: Vec<_> = fragment.types["metrics"].fields.keys().cloned().collect();
        assert_eq!(names, vec!["m0", "m1", "m2", "m3", "m4", "m5", "m6"]);
    }

    #[tokio::test]
    async fn test_invalid_collection_name_is_skipped() {
        let fragment = assembler(
            vec![
                Attribute::new("my-collection", "title", "string"),
                Attribute::new("posts", "title", "string"),
            ],
            50,
        )
        .assemble()
        .await
        .unwrap();

        assert_eq!(fragment.types.len(), 1);
        assert!(fragment.types.contains_key("posts"));
    }

    #[tokio::test]
    async fn test_no_attributes_yields_empty_fragment() {
        let fragment = assembler(Vec::new(), 50).assemble().await.unwrap();
        assert!(fragment.is_empty());
        assert!(fragment.types.is_empty());
    }
}
