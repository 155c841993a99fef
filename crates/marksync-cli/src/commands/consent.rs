use marksync_core::settings::{ConsentGate, JsonFileSettingsStore};

use crate::cli::ConsentCommands;
use crate::commands::common::Context;
use crate::error::CliError;

pub async fn run_consent(command: ConsentCommands, context: &Context) -> Result<(), CliError> {
    let settings = JsonFileSettingsStore::open(&context.settings_path)?;
    let gate = ConsentGate::new(&settings);

    match command {
        ConsentCommands::Grant => {
            gate.grant().await?;
            println!("Consent recorded. Selected bookmarks may now be synced.");
        }
        ConsentCommands::Revoke => {
            gate.revoke().await?;
            println!("Consent withdrawn.");
        }
        ConsentCommands::Status => {
            if gate.has_consent().await? {
                println!("granted");
            } else {
                println!("not granted");
            }
        }
    }
    Ok(())
}
