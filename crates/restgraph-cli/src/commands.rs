use std::path::Path;

use anyhow::{Context, Result};
use async_graphql::{Request, Variables};
use restgraph_graphql::{LazySchema, SchemaBuilder};
use serde_json::Value;
use tracing::info;

use crate::cli::QueryArgs;
use crate::config::AppConfig;
use crate::manifest::Manifest;
use crate::output::{print_json, print_warning};

async fn load_schema(config: &AppConfig, manifest: &Path) -> Result<LazySchema> {
    let manifest = Manifest::load(manifest)?;
    info!(
        models = manifest.models.len(),
        routes = manifest.routes.len(),
        attributes = manifest.attributes.len(),
        "Loaded manifest"
    );
    let sources = manifest.into_sources().await;
    Ok(LazySchema::new(SchemaBuilder::new(
        sources,
        config.graphql.to_schema_builder_config(),
    )))
}

pub async fn sdl(config: &AppConfig, manifest: &Path) -> Result<()> {
    let lazy = load_schema(config, manifest).await?;
    let schema = lazy.get_or_build_wait().await?;
    println!("{}", schema.sdl());
    Ok(())
}

pub async fn query(config: &AppConfig, args: &QueryArgs) -> Result<()> {
    let lazy = load_schema(config, &args.manifest).await?;
    let schema = lazy.get_or_build_wait().await?;

    let mut request = Request::new(&args.query);
    if let Some(raw) = &args.variables {
        let variables: Value = serde_json::from_str(raw).context("--variables is not valid JSON")?;
        request = request.variables(Variables::from_json(variables));
    }
    if let Some(operation) = &args.operation {
        request = request.operation_name(operation);
    }

    let response = config.graphql.error_formatter().apply(schema.execute(request).await);
    if !response.errors.is_empty() {
        print_warning(&format!("{} field(s) failed", response.errors.len()));
    }
    print_json(&serde_json::to_value(&response)?)
}
