//! Error types for GraphQL operations.
//!
//! [`GraphQLError`] covers schema construction and is returned from the build.
//! [`ResolverError`] is the cause attached to a single field's failure; the
//! [`ErrorFormatter`](crate::ErrorFormatter) reads it back when rendering the
//! response.

use std::any::Any;
use std::fmt;
use std::panic::Location;

use async_graphql::ErrorExtensionValues;
use restgraph_rest::RestError;
use restgraph_storage::StorageError;
use serde_json::Value;

/// Errors that can occur while building or serving the schema.
#[derive(Debug)]
pub enum GraphQLError {
    /// Schema is still being built - client should retry.
    SchemaInitializing,

    /// Schema build failed.
    SchemaBuildFailed(String),

    /// The attribute or document store failed.
    Storage(String),

    /// A validator factory needed a resource that is not registered.
    MissingResource(String),

    /// The REST framework contracts reported an error.
    Rest(String),

    /// Internal error (task failure, poisoned state).
    Internal(String),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaInitializing => {
                write!(f, "GraphQL schema is initializing, please retry")
            }
            Self::SchemaBuildFailed(msg) => {
                write!(f, "Failed to build GraphQL schema: {msg}")
            }
            Self::Storage(msg) => {
                write!(f, "Storage error: {msg}")
            }
            Self::MissingResource(name) => {
                write!(f, "Resource not registered: {name}")
            }
            Self::Rest(msg) => {
                write!(f, "REST error: {msg}")
            }
            Self::Internal(msg) => {
                write!(f, "Internal error: {msg}")
            }
        }
    }
}

impl std::error::Error for GraphQLError {}

impl GraphQLError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::SchemaInitializing => 503,
            Self::SchemaBuildFailed(_)
            | Self::Storage(_)
            | Self::MissingResource(_)
            | Self::Rest(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaInitializing => "SCHEMA_INITIALIZING",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::MissingResource(_) => "MISSING_RESOURCE",
            Self::Rest(_) => "REST_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the Retry-After header value in seconds, if applicable.
    #[must_use]
    pub fn retry_after(&self) -> Option<u32> {
        match self {
            Self::SchemaInitializing => Some(5),
            _ => None,
        }
    }
}

impl From<StorageError> for GraphQLError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<RestError> for GraphQLError {
    fn from(err: RestError) -> Self {
        match err {
            RestError::MissingResource(name) => Self::MissingResource(name),
            other => Self::Rest(other.to_string()),
        }
    }
}

/// Failure of a single field resolution.
///
/// Carried as the source of the `async_graphql::Error` so the formatter can
/// recover the status code and origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverError {
    pub message: String,
    /// HTTP-style status code.
    pub code: u16,
    /// Originating file, when known.
    pub file: Option<String>,
    /// Originating line, when known.
    pub line: Option<u32>,
    /// Stack trace reported by the REST layer.
    pub trace: Option<Value>,
}

impl ResolverError {
    /// Creates an error located at the caller.
    #[must_use]
    #[track_caller]
    pub fn new(message: impl Into<String>, code: u16) -> Self {
        let location = Location::caller();
        Self {
            message: message.into(),
            code,
            file: Some(location.file().to_string()),
            line: Some(location.line()),
            trace: None,
        }
    }

    /// Wraps a document store failure.
    #[must_use]
    #[track_caller]
    pub fn from_storage(err: StorageError) -> Self {
        Self::new(err.to_string(), err.category().status_code())
    }

    /// Wraps a failure of the REST pipeline itself.
    #[must_use]
    #[track_caller]
    pub fn from_rest(err: RestError) -> Self {
        Self::new(err.to_string(), err.status_code())
    }

    /// Builds a plain error from an `error` model payload (message and code only).
    #[must_use]
    pub fn generic(payload: &Value) -> Self {
        Self {
            message: payload_message(payload),
            code: payload_code(payload),
            file: None,
            line: None,
            trace: None,
        }
    }

    /// Builds a detailed error from an `errorDev` model payload.
    #[must_use]
    pub fn developer(payload: &Value) -> Self {
        Self {
            message: payload_message(payload),
            code: payload_code(payload),
            file: payload
                .get("file")
                .and_then(Value::as_str)
                .map(str::to_string),
            line: payload
                .get("line")
                .and_then(Value::as_u64)
                .and_then(|line| u32::try_from(line).ok()),
            trace: payload.get("trace").filter(|t| !t.is_null()).cloned(),
        }
    }

    /// Converts a caught panic payload.
    #[must_use]
    pub fn from_panic(panic: Box<dyn Any + Send>) -> Self {
        let message = if let Some(msg) = panic.downcast_ref::<&str>() {
            (*msg).to_string()
        } else if let Some(msg) = panic.downcast_ref::<String>() {
            msg.clone()
        } else {
            "resolver panicked".to_string()
        };
        Self {
            message,
            code: 500,
            file: None,
            line: None,
            trace: None,
        }
    }
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ResolverError {}

impl ResolverError {
    /// Converts into a field error that keeps `self` as its source and
    /// carries the status code in the `code` extension.
    #[must_use]
    pub fn into_graphql(self) -> async_graphql::Error {
        let mut extensions = ErrorExtensionValues::default();
        extensions.set("code", i32::from(self.code));
        let mut error = async_graphql::Error::new_with_source(self);
        error.extensions = Some(extensions);
        error
    }
}

fn payload_message(payload: &Value) -> String {
    payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Server Error")
        .to_string()
}

fn payload_code(payload: &Value) -> u16 {
    payload
        .get("code")
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
        .filter(|code| *code != 0)
        .unwrap_or(500)
}
