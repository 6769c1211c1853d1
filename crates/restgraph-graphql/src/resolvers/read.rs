//! Document read resolvers.
//!
//! `<collection>Get(id)` fetches one document and resolves to null when it
//! does not exist. `<collection>List(...)` lists documents with offset and
//! cursor pagination.

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use restgraph_storage::{DynDocumentStore, ListQuery, OrderType};
use serde_json::Value;
use tracing::debug;

use super::{required_string_argument, settle, string_argument};
use crate::error::ResolverError;

/// Resolver for `<collection>Get`.
pub struct GetResolver;

impl GetResolver {
    /// Creates a resolver reading one document of `collection_id` by `id`.
    pub fn resolve(
        store: DynDocumentStore,
        collection_id: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        let field = format!("{collection_id}Get");
        move |ctx| {
            let store = store.clone();
            let collection_id = collection_id.clone();
            let field = field.clone();
            FieldFuture::new(async move {
                settle(&field, async {
                    let id = required_string_argument(&ctx, "id")?;
                    debug!(collection = %collection_id, id = %id, "Resolving document read");

                    let document = store
                        .get_document(&collection_id, &id)
                        .await
                        .map_err(ResolverError::from_storage)?;
                    if document.is_none() {
                        debug!(collection = %collection_id, id = %id, "Document not found");
                    }
                    Ok(document.map(Value::Object))
                })
                .await
            })
        }
    }
}

/// Resolver for `<collection>List`.
pub struct ListResolver;

impl ListResolver {
    /// Creates a resolver listing documents of `collection_id`.
    ///
    /// Omitted arguments fall back to `default_limit` and offset 0.
    pub fn resolve(
        store: DynDocumentStore,
        collection_id: String,
        default_limit: usize,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        let field = format!("{collection_id}List");
        move |ctx| {
            let store = store.clone();
            let collection_id = collection_id.clone();
            let field = field.clone();
            FieldFuture::new(async move {
                settle(&field, async {
                    let query = list_query(&ctx, default_limit)?;
                    debug!(
                        collection = %collection_id,
                        limit = query.limit,
                        offset = query.offset,
                        cursor = ?query.cursor,
                        "Resolving document list"
                    );

                    let documents = store
                        .list_documents(&collection_id, &query)
                        .await
                        .map_err(ResolverError::from_storage)?;
                    Ok(Some(Value::Array(
                        documents.into_iter().map(Value::Object).collect(),
                    )))
                })
                .await
            })
        }
    }
}

/// Builds the list query from the field arguments.
fn list_query(ctx: &ResolverContext<'_>, default_limit: usize) -> Result<ListQuery, ResolverError> {
    let mut query = ListQuery::new()
        .with_limit(non_negative(ctx, "limit")?.unwrap_or(default_limit))
        .with_offset(non_negative(ctx, "offset")?.unwrap_or(0));

    if let Some(cursor) = string_argument(ctx, "cursor") {
        query = query.with_cursor(cursor);
    }

    let attributes = string_list(ctx, "orderAttributes");
    let types = string_list(ctx, "orderType");
    for (i, attribute) in attributes.into_iter().enumerate() {
        let order = match types.get(i) {
            Some(raw) => OrderType::parse(raw).ok_or_else(|| {
                ResolverError::new(format!("Invalid order type '{raw}', expected ASC or DESC"), 400)
            })?,
            None => OrderType::Asc,
        };
        query = query.with_order(attribute, order);
    }

    Ok(query)
}

fn non_negative(ctx: &ResolverContext<'_>, name: &str) -> Result<Option<usize>, ResolverError> {
    let Some(value) = ctx.args.get(name) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let raw = value
        .i64()
        .map_err(|_| ResolverError::new(format!("Argument '{name}' must be an integer"), 400))?;
    usize::try_from(raw)
        .map(Some)
        .map_err(|_| ResolverError::new(format!("Argument '{name}' must not be negative"), 400))
}

fn string_list(ctx: &ResolverContext<'_>, name: &str) -> Vec<String> {
    ctx.args
        .get(name)
        .and_then(|value| value.list().ok())
        .map(|list| {
            list.iter()
                .filter_map(|item| item.string().ok().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
