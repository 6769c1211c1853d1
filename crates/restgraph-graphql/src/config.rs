//! GraphQL configuration.
//!
//! Configuration is read from the `[graphql]` section of `restgraph.toml`.
//!
//! # Example Configuration
//!
//! ```toml
//! [graphql]
//! environment = "development"
//! version = "1.4.0"
//! attribute_page_size = 50
//! max_depth = 15
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Deployment environment; controls how much error detail reaches clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Returns `true` for [`Environment::Development`].
    #[must_use]
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// GraphQL API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLConfig {
    /// Deployment environment.
    /// Default: production
    #[serde(default)]
    pub environment: Environment,

    /// API version reported in error envelopes.
    /// Default: the crate version
    #[serde(default = "default_version")]
    pub version: String,

    /// Number of attributes fetched per metadata page while building.
    /// Default: 50
    #[serde(default = "default_attribute_page_size")]
    pub attribute_page_size: usize,

    /// Default `limit` argument of `<collection>List` fields.
    /// Default: 50
    #[serde(default = "default_list_limit")]
    pub list_default_limit: usize,

    /// Routes under this prefix are never exposed.
    /// Default: "/v1/mock/"
    #[serde(default = "default_mock_path_prefix")]
    pub mock_path_prefix: String,

    /// Maximum query depth allowed.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable GraphQL introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_attribute_page_size() -> usize {
    50
}

fn default_list_limit() -> usize {
    50
}

fn default_mock_path_prefix() -> String {
    "/v1/mock/".to_string()
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            version: default_version(),
            attribute_page_size: default_attribute_page_size(),
            list_default_limit: default_list_limit(),
            mock_path_prefix: default_mock_path_prefix(),
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
        }
    }
}

impl GraphQLConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.attribute_page_size == 0 {
            return Err("graphql.attribute_page_size must be > 0".into());
        }
        if self.list_default_limit == 0 {
            return Err("graphql.list_default_limit must be > 0".into());
        }
        if self.max_depth == 0 {
            return Err("graphql.max_depth must be > 0".into());
        }
        if self.max_complexity == 0 {
            return Err("graphql.max_complexity must be > 0".into());
        }
        Ok(())
    }

    /// Converts this config to a SchemaBuilderConfig.
    #[must_use]
    pub fn to_schema_builder_config(&self) -> crate::SchemaBuilderConfig {
        crate::SchemaBuilderConfig {
            attribute_page_size: self.attribute_page_size,
            list_default_limit: self.list_default_limit,
            mock_path_prefix: self.mock_path_prefix.clone(),
            max_depth: self.max_depth,
            max_complexity: self.max_complexity,
            introspection_enabled: self.introspection,
        }
    }

    /// Builds the error formatter for this environment and version.
    #[must_use]
    pub fn error_formatter(&self) -> crate::ErrorFormatter {
        crate::ErrorFormatter::new(self.environment.is_development(), self.version.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GraphQLConfig::default();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.attribute_page_size, 50);
        assert_eq!(config.list_default_limit, 50);
        assert_eq!(config.mock_path_prefix, "/v1/mock/");
        assert_eq!(config.max_depth, 15);
        assert_eq!(config.max_complexity, 500);
        assert!(config.introspection);
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_valid_config() {
        assert!(GraphQLConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_page_size() {
        let mut config = GraphQLConfig::default();
        config.attribute_page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_max_depth() {
        let mut config = GraphQLConfig::default();
        config.max_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
            environment = "development"
            version = "1.4.0"
            attribute_page_size = 10
            introspection = false
        "#;

        let config: GraphQLConfig = toml::from_str(toml).unwrap();
        assert!(config.environment.is_development());
        assert_eq!(config.version, "1.4.0");
        assert_eq!(config.attribute_page_size, 10);
        assert_eq!(config.list_default_limit, 50);
        assert!(!config.introspection);
    }

    #[test]
    fn test_to_schema_builder_config() {
        let config = GraphQLConfig {
            attribute_page_size: 7,
            ..Default::default()
        };
        let builder_config = config.to_schema_builder_config();
        assert_eq!(builder_config.attribute_page_size, 7);
        assert!(builder_config.introspection_enabled);
    }
}
