//! CLI configuration.
//!
//! Read from `restgraph.toml` (or `--config`), then overridden by
//! `RESTGRAPH__...` environment variables, e.g.
//! `RESTGRAPH__GRAPHQL__ENVIRONMENT=development`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use restgraph_graphql::GraphQLConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_FILE: &str = "restgraph.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub graphql: GraphQLConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when neither RUST_LOG nor --log-level is set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.logging.level.trim().is_empty() {
            return Err("logging.level must not be empty".into());
        }
        self.graphql.validate()
    }
}

/// Loads the configuration; a missing file is not an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, String> {
    let mut builder = Config::builder();
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
    if path.exists() {
        builder = builder.add_source(File::from(path));
    }
    // Environment variable overrides, e.g., RESTGRAPH__GRAPHQL__VERSION=1.4.0
    builder = builder.add_source(
        Environment::with_prefix("RESTGRAPH")
            .try_parsing(true)
            .separator("__"),
    );
    let cfg = builder
        .build()
        .map_err(|e| format!("config build error: {e}"))?;
    let merged: AppConfig = cfg
        .try_deserialize()
        .map_err(|e| format!("config deserialize error: {e}"))?;
    merged.validate()?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loads_graphql_section() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[graphql]
environment = "development"
version = "1.4.0"
attribute_page_size = 10

[logging]
level = "debug"
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();

        assert!(config.graphql.environment.is_development());
        assert_eq!(config.graphql.version, "1.4.0");
        assert_eq!(config.graphql.attribute_page_size, 10);
        assert_eq!(config.graphql.list_default_limit, 50);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();

        assert!(!config.graphql.environment.is_development());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[graphql]\nattribute_page_size = 0").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.contains("attribute_page_size"));
    }
}
