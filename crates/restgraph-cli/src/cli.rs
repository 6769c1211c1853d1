use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "restgraph")]
#[command(about = "Build a GraphQL schema from REST routes and collections")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./restgraph.toml when present)
    #[arg(short, long, global = true, env = "RESTGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the schema in SDL
    Sdl(SdlArgs),
    /// Execute a GraphQL document against the manifest's in-memory stores
    Query(QueryArgs),
}

#[derive(clap::Args)]
pub struct SdlArgs {
    /// Project manifest (JSON)
    #[arg(short, long)]
    pub manifest: PathBuf,
}

#[derive(clap::Args)]
pub struct QueryArgs {
    /// Project manifest (JSON)
    #[arg(short, long)]
    pub manifest: PathBuf,
    /// GraphQL document
    #[arg(short, long)]
    pub query: String,
    /// Variables as a JSON object
    #[arg(long)]
    pub variables: Option<String>,
    /// Operation to run when the document has several
    #[arg(long)]
    pub operation: Option<String>,
}
