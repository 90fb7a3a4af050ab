use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;

use backend::Workspace;
use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("listkeeper=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let ws = Workspace::open(&cli.data).await?;

    let modified = match &cli.command {
        Commands::Add(args) => commands::items::add(&ws, args, format).await.map(|_| true),
        Commands::Show(args) => commands::list::show(&ws, args, format).await.map(|_| false),
        Commands::Move(args) => commands::items::move_item(&ws, args, format)
            .await
            .map(|_| true),
        Commands::Remove(args) => commands::items::remove(&ws, args, format).await.map(|_| true),
        Commands::Restore(args) => commands::items::restore(&ws, args, format)
            .await
            .map(|_| true),
        Commands::Delete(args) => commands::items::delete(&ws, args, format).await.map(|_| true),
        Commands::Check(args) => commands::list::check(&ws, args, format)
            .await
            .map(|_| args.repair),
    }?;

    if modified {
        ws.save().await?;
        tracing::info!("Saved {}", cli.data.display());
    }
    Ok(())
}
