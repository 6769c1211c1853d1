//! Storage error types shared by the attribute and document stores.

use std::fmt;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested document was not found.
    #[error("Document not found: {collection}/{id}")]
    NotFound {
        /// Collection the document was looked up in.
        collection: String,
        /// The ID of the document that was not found.
        id: String,
    },

    /// The collection itself does not exist.
    #[error("Collection not found: {collection}")]
    CollectionNotFound {
        /// The missing collection ID.
        collection: String,
    },

    /// Attempted to create a document that already exists.
    #[error("Document already exists: {collection}/{id}")]
    AlreadyExists {
        /// Collection of the conflicting document.
        collection: String,
        /// The ID of the conflicting document.
        id: String,
    },

    /// The document data is invalid.
    #[error("Invalid document: {message}")]
    InvalidDocument {
        /// Description of why the document is invalid.
        message: String,
    },

    /// Failed to reach the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Creates a new `CollectionNotFound` error.
    #[must_use]
    pub fn collection_not_found(collection: impl Into<String>) -> Self {
        Self::CollectionNotFound {
            collection: collection.into(),
        }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Creates a new `InvalidDocument` error.
    #[must_use]
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::CollectionNotFound { .. })
    }

    /// Returns the error category for logging and error envelopes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } | Self::CollectionNotFound { .. } => ErrorCategory::NotFound,
            Self::AlreadyExists { .. } => ErrorCategory::Conflict,
            Self::InvalidDocument { .. } => ErrorCategory::Validation,
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Document or collection not found.
    NotFound,
    /// Document already exists.
    Conflict,
    /// Validation error.
    Validation,
    /// Infrastructure/connection error.
    Infrastructure,
    /// Internal error.
    Internal,
}

impl ErrorCategory {
    /// HTTP-style status code reported to API clients for this category.
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Validation => 400,
            Self::Infrastructure => 503,
            Self::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::not_found("posts", "123");
        assert_eq!(err.to_string(), "Document not found: posts/123");

        let err = StorageError::already_exists("posts", "456");
        assert_eq!(err.to_string(), "Document already exists: posts/456");

        let err = StorageError::collection_not_found("posts");
        assert_eq!(err.to_string(), "Collection not found: posts");
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            StorageError::not_found("posts", "1").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            StorageError::already_exists("posts", "1").category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            StorageError::invalid_document("bad").category(),
            ErrorCategory::Validation
        );
        assert!(StorageError::collection_not_found("posts").is_not_found());
    }

    #[test]
    fn test_category_status_codes() {
        assert_eq!(ErrorCategory::NotFound.status_code(), 404);
        assert_eq!(ErrorCategory::Conflict.status_code(), 409);
        assert_eq!(ErrorCategory::Internal.status_code(), 500);
    }
}
