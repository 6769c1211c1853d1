//! Store traits consumed by the schema engine.
//!
//! The engine only needs a narrow slice of the database: a paginated view of
//! attribute metadata while the schema is built, and the five document
//! operations bound to each collection's GraphQL fields.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::{Attribute, Document, ListQuery};

/// Paginated source of attribute metadata.
///
/// # Example
///
/// ```ignore
/// let mut offset = 0;
/// loop {
///     let page = store.find_attributes(50, offset).await?;
///     if page.is_empty() {
///         break;
///     }
///     offset += page.len();
/// }
/// ```
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// Returns at most `limit` attributes starting at `offset`, in a stable order.
    ///
    /// An empty page marks the end of the sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata store cannot be read.
    async fn find_attributes(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Attribute>, StorageError>;
}

/// Document CRUD operations for dynamically-defined collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads a document by ID.
    ///
    /// Returns `None` if the document does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing documents.
    async fn get_document(
        &self,
        collection_id: &str,
        id: &str,
    ) -> Result<Option<Document>, StorageError>;

    /// Lists documents in a collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if `query.cursor` names an unknown document.
    async fn list_documents(
        &self,
        collection_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<Document>, StorageError>;

    /// Creates a document. A missing `$id` is generated by the store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the `$id` is taken.
    async fn create_document(
        &self,
        collection_id: &str,
        document: Document,
    ) -> Result<Document, StorageError>;

    /// Applies `changes` to an existing document and returns the result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the document does not exist.
    async fn update_document(
        &self,
        collection_id: &str,
        id: &str,
        changes: Document,
    ) -> Result<Document, StorageError>;

    /// Deletes a document and returns it as it was before deletion.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the document does not exist.
    async fn delete_document(&self, collection_id: &str, id: &str)
    -> Result<Document, StorageError>;
}
