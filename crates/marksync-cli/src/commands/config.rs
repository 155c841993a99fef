use std::path::PathBuf;

use crate::cli::ConfigCommands;
use crate::commands::common::Context;
use crate::config::{default_config_path, validate_api_base_url, CliConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, context: &Context) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            run_config_show(context);
            Ok(())
        }
        ConfigCommands::Set {
            api_base_url,
            bookmarks_path,
            api_key,
        } => run_config_set(api_base_url, bookmarks_path, api_key),
        ConfigCommands::Path => {
            println!("{}", default_config_path().display());
            Ok(())
        }
    }
}

fn run_config_show(context: &Context) {
    println!("api_base_url: {}", context.client.api_base_url);
    println!("bookmarks: {}", context.bookmarks_path.display());
    println!("settings: {}", context.settings_path.display());
    println!("timeout_ms: {}", context.client.timeout_ms);
    println!("max_retries: {}", context.client.max_retries);
    let api_key = if context.client.api_key.is_some() { "set" } else { "not set" };
    println!("api_key: {api_key}");
}

pub fn run_config_set(
    api_base_url: Option<String>,
    bookmarks_path: Option<PathBuf>,
    api_key: Option<String>,
) -> Result<(), CliError> {
    if api_base_url.is_none() && bookmarks_path.is_none() && api_key.is_none() {
        return Err(CliError::Config(
            "Nothing to set; pass --api-base-url, --bookmarks-path or --api-key".to_string(),
        ));
    }

    let mut config = CliConfig::load().map_err(CliError::Config)?;
    if let Some(url) = api_base_url {
        config.api_base_url = Some(validate_api_base_url(&url).map_err(CliError::Config)?);
    }
    if let Some(path) = bookmarks_path {
        config.bookmarks_path = Some(path);
    }
    if let Some(key) = api_key {
        config.api_key = Some(key);
    }

    let path = config.save().map_err(CliError::Config)?;
    println!("Saved {}", path.display());
    Ok(())
}
