//! Document delete resolver.
//!
//! Handles `<collection>Delete(id)` and resolves to the document as it was
//! before deletion.

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use restgraph_storage::DynDocumentStore;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::{required_string_argument, settle};
use crate::error::ResolverError;

/// Resolver for `<collection>Delete`.
pub struct DeleteResolver;

impl DeleteResolver {
    /// Creates a resolver deleting documents of `collection_id`.
    pub fn resolve(
        store: DynDocumentStore,
        collection_id: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        let field = format!("{collection_id}Delete");
        move |ctx| {
            let store = store.clone();
            let collection_id = collection_id.clone();
            let field = field.clone();
            FieldFuture::new(async move {
                settle(&field, async {
                    let id = required_string_argument(&ctx, "id")?;
                    trace!(collection = %collection_id, id = %id, "Deleting document via storage");

                    let deleted = store
                        .delete_document(&collection_id, &id)
                        .await
                        .map_err(|e| {
                            warn!(error = %e, collection = %collection_id, id = %id, "Delete failed");
                            ResolverError::from_storage(e)
                        })?;

                    debug!(collection = %collection_id, id = %id, "Document deleted");
                    Ok(Some(Value::Object(deleted)))
                })
                .await
            })
        }
    }
}
