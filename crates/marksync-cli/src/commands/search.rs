use crate::commands::common::{normalize_search_query, open_controller, Context, ItemRow};
use crate::error::CliError;

pub async fn run_search(query: &str, as_json: bool, context: &Context) -> Result<(), CliError> {
    let normalized_query = normalize_search_query(query)?;
    let controller = open_controller(context).await?;
    let items = controller.store().search(&normalized_query).await?;

    if as_json {
        let rows = items.iter().map(ItemRow::from).collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No bookmarks match '{normalized_query}'.");
        return Ok(());
    }
    for row in items.iter().map(ItemRow::from) {
        match row.url {
            Some(url) => println!("[{}] {} <{url}>", row.id, row.title),
            None => println!("[{}] {}/", row.id, row.title),
        }
    }
    Ok(())
}
