//! Error envelopes.
//!
//! The engine reports failed fields as `ServerError`s. [`ErrorFormatter`]
//! turns each one into an [`ErrorEnvelope`], reading the underlying
//! [`ResolverError`] when the failure carries one. Origin details (file, line
//! and trace) are only exposed in development.

use async_graphql::{Response, ServerError};
use serde::Serialize;
use serde_json::Value;

use crate::error::ResolverError;

/// User-facing description of one error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub message: String,
    pub code: u16,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Value>,
}

/// Formats execution errors for one environment.
#[derive(Debug, Clone)]
pub struct ErrorFormatter {
    development: bool,
    version: String,
}

impl ErrorFormatter {
    /// Creates a formatter.
    #[must_use]
    pub fn new(development: bool, version: impl Into<String>) -> Self {
        Self {
            development,
            version: version.into(),
        }
    }

    /// Returns `true` if origin details are exposed.
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.development
    }

    /// Builds the envelope for one error.
    #[must_use]
    pub fn format(&self, error: &ServerError) -> ErrorEnvelope {
        let Some(cause) = error.source::<ResolverError>() else {
            let code = error
                .extensions
                .as_ref()
                .and_then(|ext| ext.get("code"))
                .and_then(|code| match code {
                    async_graphql::Value::Number(n) => n.as_u64(),
                    _ => None,
                })
                .and_then(|code| u16::try_from(code).ok())
                .unwrap_or(500);
            return ErrorEnvelope {
                message: error.message.clone(),
                code,
                version: self.version.clone(),
                file: None,
                line: None,
                trace: None,
            };
        };

        let mut envelope = ErrorEnvelope {
            message: cause.message.clone(),
            code: cause.code,
            version: self.version.clone(),
            file: None,
            line: None,
            trace: None,
        };
        if self.development {
            envelope.file.clone_from(&cause.file);
            envelope.line = cause.line;
            envelope.trace.clone_from(&cause.trace);
        }
        envelope
    }

    /// Rewrites the errors of a response in place of the engine's formatting.
    ///
    /// Each error keeps its locations and path; message and extensions are
    /// replaced by the envelope.
    #[must_use]
    pub fn apply(&self, mut response: Response) -> Response {
        for error in &mut response.errors {
            let envelope = self.format(error);
            error.message.clone_from(&envelope.message);

            let extensions = error.extensions.get_or_insert_with(Default::default);
            extensions.set("code", i32::from(envelope.code));
            extensions.set("version", envelope.version.as_str());
            if let Some(file) = &envelope.file {
                extensions.set("file", file.as_str());
            }
            if let Some(line) = envelope.line {
                extensions.set("line", line);
            }
            if let Some(trace) = envelope.trace {
                extensions.set("trace", crate::resolvers::json_to_graphql_value(trace));
            }
        }
        response
    }
}
