//! Document update resolver.

use std::sync::Arc;

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use indexmap::IndexMap;
use restgraph_storage::DynDocumentStore;
use serde_json::Value;
use tracing::{debug, warn};

use super::{arguments_to_json, document_id_argument, settle, to_record};
use crate::error::ResolverError;

/// Resolver for `<collection>Update`.
///
/// The document is addressed by the `id` argument; every argument becomes
/// part of the changes.
pub struct UpdateResolver;

impl UpdateResolver {
    /// Creates a resolver updating documents of `collection_id`.
    ///
    /// When `id_is_attribute` is false the `id` argument only addresses the
    /// document and is left out of the changes. Otherwise the `id` attribute
    /// doubles as the address, so a numeric value is accepted as well.
    pub fn resolve(
        store: DynDocumentStore,
        collection_id: String,
        keys: Arc<IndexMap<String, String>>,
        id_is_attribute: bool,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        let field = format!("{collection_id}Update");
        move |ctx| {
            let store = store.clone();
            let collection_id = collection_id.clone();
            let keys = keys.clone();
            let field = field.clone();
            FieldFuture::new(async move {
                settle(&field, async {
                    let id = document_id_argument(&ctx)?;
                    let mut arguments = arguments_to_json(&ctx);
                    if !id_is_attribute {
                        arguments.remove("id");
                    }
                    let changes = to_record(arguments, &keys);
                    debug!(collection = %collection_id, id = %id, "Processing update mutation");

                    let updated = store
                        .update_document(&collection_id, &id, changes)
                        .await
                        .map_err(|e| {
                            warn!(error = %e, collection = %collection_id, id = %id, "Update failed");
                            ResolverError::from_storage(e)
                        })?;
                    Ok(Some(Value::Object(updated)))
                })
                .await
            })
        }
    }
}
