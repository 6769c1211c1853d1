//! Errors raised by the REST framework contracts.

/// Errors produced while resolving routes, validators, or response models.
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// No response model is registered under this name.
    #[error("Response model not found: {0}")]
    ModelNotFound(String),

    /// A validator factory asked for a resource the container does not hold.
    #[error("Resource not registered: {0}")]
    MissingResource(String),

    /// A registered resource has a different type than the factory expected.
    #[error("Resource {name} has an unexpected type")]
    ResourceType {
        /// Name of the resource.
        name: String,
    },

    /// The route could not be executed.
    #[error("Route execution failed: {message}")]
    Execution {
        /// Description of the failure.
        message: String,
        /// Status code reported by the executor.
        code: u16,
    },
}

impl RestError {
    /// Creates a new `Execution` error.
    #[must_use]
    pub fn execution(message: impl Into<String>, code: u16) -> Self {
        Self::Execution {
            message: message.into(),
            code,
        }
    }

    /// Returns the status code reported to API clients.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ModelNotFound(_) => 404,
            Self::MissingResource(_) | Self::ResourceType { .. } => 500,
            Self::Execution { code, .. } => *code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RestError::ModelNotFound("user".into()).status_code(), 404);
        assert_eq!(RestError::MissingResource("db".into()).status_code(), 500);
        assert_eq!(RestError::execution("boom", 503).status_code(), 503);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            RestError::ModelNotFound("user".into()).to_string(),
            "Response model not found: user"
        );
    }
}
