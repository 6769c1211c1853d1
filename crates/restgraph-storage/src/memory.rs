//! In-memory attribute and document store.
//!
//! Used by the CLI for offline schema work and by tests. Documents are kept in
//! insertion order per collection; list ordering falls back to that order when
//! no `order_attributes` are given.

use std::cmp::Ordering;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::StorageError;
use crate::traits::{AttributeStore, DocumentStore};
use crate::types::{
    Attribute, DOCUMENT_COLLECTION_KEY, DOCUMENT_ID_KEY, Document, ListQuery, OrderType,
};

/// In-memory backend implementing both [`AttributeStore`] and [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    attributes: RwLock<Vec<Attribute>>,
    documents: RwLock<IndexMap<String, IndexMap<String, Document>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with attribute metadata.
    #[must_use]
    pub fn with_attributes(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes: RwLock::new(attributes),
            documents: RwLock::new(IndexMap::new()),
        }
    }

    /// Appends an attribute definition.
    pub async fn add_attribute(&self, attribute: Attribute) {
        self.attributes.write().await.push(attribute);
    }

    /// Inserts documents without ID conflict checks, replacing any with the same `$id`.
    pub async fn seed_documents(&self, collection_id: &str, documents: Vec<Document>) {
        let mut collections = self.documents.write().await;
        let collection = collections.entry(collection_id.to_string()).or_default();
        for mut document in documents {
            let id = document_id(&document).unwrap_or_else(new_document_id);
            stamp(&mut document, collection_id, &id);
            collection.insert(id, document);
        }
    }

    /// Returns the number of documents stored in a collection.
    pub async fn document_count(&self, collection_id: &str) -> usize {
        self.documents
            .read()
            .await
            .get(collection_id)
            .map_or(0, IndexMap::len)
    }
}

#[async_trait]
impl AttributeStore for MemoryStore {
    async fn find_attributes(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Attribute>, StorageError> {
        let attributes = self.attributes.read().await;
        trace!(limit, offset, total = attributes.len(), "Reading attribute page");
        Ok(attributes.iter().skip(offset).take(limit).cloned().collect())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(
        &self,
        collection_id: &str,
        id: &str,
    ) -> Result<Option<Document>, StorageError> {
        let collections = self.documents.read().await;
        Ok(collections
            .get(collection_id)
            .and_then(|collection| collection.get(id))
            .cloned())
    }

    async fn list_documents(
        &self,
        collection_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<Document>, StorageError> {
        let collections = self.documents.read().await;
        let Some(collection) = collections.get(collection_id) else {
            return Ok(Vec::new());
        };

        let mut documents: Vec<&Document> = collection.values().collect();
        if !query.order_attributes.is_empty() {
            documents.sort_by(|a, b| compare_documents(a, b, query));
        }

        let start = match &query.cursor {
            Some(cursor) => {
                let position = documents
                    .iter()
                    .position(|doc| document_id(doc).as_deref() == Some(cursor.as_str()))
                    .ok_or_else(|| StorageError::not_found(collection_id, cursor.clone()))?;
                position + 1
            }
            None => 0,
        };

        Ok(documents
            .into_iter()
            .skip(start + query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn create_document(
        &self,
        collection_id: &str,
        mut document: Document,
    ) -> Result<Document, StorageError> {
        let mut collections = self.documents.write().await;
        let collection = collections.entry(collection_id.to_string()).or_default();

        let id = document_id(&document).unwrap_or_else(new_document_id);
        if collection.contains_key(&id) {
            return Err(StorageError::already_exists(collection_id, id));
        }

        stamp(&mut document, collection_id, &id);
        collection.insert(id, document.clone());
        Ok(document)
    }

    async fn update_document(
        &self,
        collection_id: &str,
        id: &str,
        changes: Document,
    ) -> Result<Document, StorageError> {
        let mut collections = self.documents.write().await;
        let document = collections
            .get_mut(collection_id)
            .and_then(|collection| collection.get_mut(id))
            .ok_or_else(|| StorageError::not_found(collection_id, id))?;

        for (key, value) in changes {
            // System keys are owned by the store.
            if key == DOCUMENT_ID_KEY || key == DOCUMENT_COLLECTION_KEY {
                continue;
            }
            document.insert(key, value);
        }
        Ok(document.clone())
    }

    async fn delete_document(
        &self,
        collection_id: &str,
        id: &str,
    ) -> Result<Document, StorageError> {
        let mut collections = self.documents.write().await;
        collections
            .get_mut(collection_id)
            .and_then(|collection| collection.shift_remove(id))
            .ok_or_else(|| StorageError::not_found(collection_id, id))
    }
}

fn document_id(document: &Document) -> Option<String> {
    document
        .get(DOCUMENT_ID_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn stamp(document: &mut Document, collection_id: &str, id: &str) {
    document.insert(DOCUMENT_ID_KEY.to_string(), Value::String(id.to_string()));
    document.insert(
        DOCUMENT_COLLECTION_KEY.to_string(),
        Value::String(collection_id.to_string()),
    );
}

fn compare_documents(a: &Document, b: &Document, query: &ListQuery) -> Ordering {
    for (index, attribute) in query.order_attributes.iter().enumerate() {
        let order = query
            .order_types
            .get(index)
            .copied()
            .unwrap_or(OrderType::Asc);
        let ordering = compare_values(a.get(attribute), b.get(attribute));
        let ordering = match order {
            OrderType::Asc => ordering,
            OrderType::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Orders JSON scalars; missing and null values sort last.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
