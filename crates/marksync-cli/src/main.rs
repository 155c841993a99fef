//! marksync - browse, edit and selectively sync a bookmark tree from the
//! command line.

mod cli;
mod commands;
mod config;
mod error;

#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::Context;
use crate::config::{default_settings_path, CliConfig};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "marksync=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    if let Commands::Completions { shell, output } = &command {
        return commands::completions::run_completions(*shell, output.as_deref());
    }

    let config = CliConfig::load().map_err(CliError::Config)?;
    let context = Context {
        bookmarks_path: config.resolve_bookmarks_path(cli.bookmarks),
        settings_path: default_settings_path(),
        client: config
            .resolve_client_config(cli.api_url)
            .map_err(CliError::Config)?,
    };
    tracing::debug!(bookmarks = %context.bookmarks_path.display(), "Resolved bookmark store");

    dispatch(command, &context).await
}

async fn dispatch(command: Commands, context: &Context) -> Result<(), CliError> {
    match command {
        Commands::Tree {
            query,
            folders,
            json,
        } => commands::tree::run_tree(query, folders, json, context).await,
        Commands::Search { query, json } => {
            commands::search::run_search(&query, json, context).await
        }
        Commands::Add { title, url, parent } => {
            commands::add::run_add(&title, &url, parent.as_deref(), context).await
        }
        Commands::Edit { id, title, url } => {
            commands::edit::run_edit(&id, title, url, context).await
        }
        Commands::Delete { ids } => commands::delete::run_delete(&ids, context).await,
        Commands::Move {
            id,
            to,
            index,
            before,
        } => commands::move_cmd::run_move(&id, to, index, before, context).await,
        Commands::Mkdir { name, parent } => {
            commands::mkdir::run_mkdir(&name, parent.as_deref(), context).await
        }
        Commands::Rmdir { id } => commands::rmdir::run_rmdir(&id, context).await,
        Commands::Sync { key, selection } => {
            commands::sync::run_sync(key, &selection, context).await
        }
        Commands::Upload { selection } => commands::sync::run_upload(&selection, context).await,
        Commands::Consent { command } => commands::consent::run_consent(command, context).await,
        Commands::Config { command } => commands::config::run_config(command, context),
        Commands::Completions { shell, output } => {
            commands::completions::run_completions(shell, output.as_deref())
        }
    }
}
