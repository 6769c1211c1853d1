//! Document create resolver.

use std::sync::Arc;

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use indexmap::IndexMap;
use restgraph_storage::DynDocumentStore;
use serde_json::Value;
use tracing::{debug, warn};

use super::{arguments_to_json, settle, to_record};
use crate::error::ResolverError;

/// Resolver for `<collection>Create`.
///
/// The full argument map becomes the new document:
/// ```graphql
/// mutation {
///   postsCreate(title: "Hello", tags: ["intro"]) { _id title }
/// }
/// ```
pub struct CreateResolver;

impl CreateResolver {
    /// Creates a resolver inserting documents into `collection_id`.
    ///
    /// `keys` maps argument names to the attribute keys they stand for.
    pub fn resolve(
        store: DynDocumentStore,
        collection_id: String,
        keys: Arc<IndexMap<String, String>>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        let field = format!("{collection_id}Create");
        move |ctx| {
            let store = store.clone();
            let collection_id = collection_id.clone();
            let keys = keys.clone();
            let field = field.clone();
            FieldFuture::new(async move {
                settle(&field, async {
                    let document = to_record(arguments_to_json(&ctx), &keys);
                    debug!(collection = %collection_id, "Processing create mutation");

                    let created = store
                        .create_document(&collection_id, document)
                        .await
                        .map_err(|e| {
                            warn!(error = %e, collection = %collection_id, "Create failed");
                            ResolverError::from_storage(e)
                        })?;
                    Ok(Some(Value::Object(created)))
                })
                .await
            })
        }
    }
}
