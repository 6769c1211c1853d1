mod cli;
mod commands;
mod config;
mod executor;
mod manifest;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref()).map_err(anyhow::Error::msg)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    observability::init_tracing_with_level(level);

    match &cli.command {
        Commands::Sdl(args) => commands::sdl(&config, &args.manifest).await?,
        Commands::Query(args) => commands::query(&config, args).await?,
    }

    Ok(())
}
