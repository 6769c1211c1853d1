//! # restgraph-storage
//!
//! Storage contracts for the restgraph schema engine.
//!
//! The schema engine reads collection metadata from an [`AttributeStore`] while
//! it builds the schema, and binds every collection's GraphQL fields to a
//! [`DocumentStore`]. Neither trait says anything about how documents are
//! persisted; [`MemoryStore`] is a complete in-memory backend for both.

mod error;
mod memory;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use memory::MemoryStore;
pub use traits::{AttributeStore, DocumentStore};
pub use types::{
    Attribute, AttributeStatus, DOCUMENT_COLLECTION_KEY, DOCUMENT_ID_KEY, Document, ListQuery,
    OrderType,
};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Shared attribute store handle.
pub type DynAttributeStore = std::sync::Arc<dyn AttributeStore>;

/// Shared document store handle.
pub type DynDocumentStore = std::sync::Arc<dyn DocumentStore>;
