use marksync_core::settings::{ConsentGate, JsonFileSettingsStore};
use marksync_core::sync::{SyncHandle, SyncReport};
use marksync_core::util::normalize_text_option;

use crate::cli::SelectionArgs;
use crate::commands::common::{apply_selection, open_controller, Context, Controller};
use crate::config::SYNC_KEY_ENV;
use crate::error::CliError;

pub async fn run_sync(
    key: Option<String>,
    selection: &SelectionArgs,
    context: &Context,
) -> Result<(), CliError> {
    ensure_consent(context).await?;
    let sync_key = normalize_text_option(key)
        .or_else(|| normalize_text_option(std::env::var(SYNC_KEY_ENV).ok()))
        .ok_or(CliError::MissingSyncKey)?;

    let mut controller = open_controller(context).await?;
    apply_selection(&mut controller, selection)?;
    print_selected_folders(&controller);

    let handle = controller.begin_sync()?;
    let watcher = spawn_interrupt_watcher(handle.clone());
    let result = controller.sync(&sync_key, handle.token().clone()).await;
    watcher.abort();

    report(&controller, result?);
    Ok(())
}

pub async fn run_upload(selection: &SelectionArgs, context: &Context) -> Result<(), CliError> {
    ensure_consent(context).await?;

    let mut controller = open_controller(context).await?;
    apply_selection(&mut controller, selection)?;
    print_selected_folders(&controller);

    let handle = controller.begin_sync()?;
    let watcher = spawn_interrupt_watcher(handle.clone());
    let result = controller.upload(handle.token().clone()).await;
    watcher.abort();

    report(&controller, result?);
    Ok(())
}

pub async fn ensure_consent(context: &Context) -> Result<(), CliError> {
    let settings = JsonFileSettingsStore::open(&context.settings_path)?;
    if ConsentGate::new(&settings).has_consent().await? {
        Ok(())
    } else {
        Err(CliError::ConsentRequired)
    }
}

/// Cancel the transfer on Ctrl-C.
fn spawn_interrupt_watcher(handle: SyncHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling sync");
            handle.cancel();
        }
    })
}

fn print_selected_folders(controller: &Controller) {
    let state = controller.state();
    let folders = state.selected_folder_summary();
    for folder in &folders {
        println!("{} ({} URLs)", folder.name, folder.url_count);
    }
    if folders.len() > 1 {
        println!(
            "{} URLs across {} folders",
            state.selected_folder_url_count(),
            folders.len()
        );
    }
    println!("Sending {} bookmark(s)...", state.selected_count());
}

fn report(controller: &Controller, report: SyncReport) {
    if let Some(message) = &controller.state().message {
        println!("{}", message.text);
    }
    println!(
        "{} node(s) sent in {} request(s)",
        report.nodes, report.chunks
    );
}
