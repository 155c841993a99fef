use crate::commands::common::{open_controller, Context};
use crate::error::CliError;

pub async fn run_add(
    title: &str,
    url: &str,
    parent_id: Option<&str>,
    context: &Context,
) -> Result<(), CliError> {
    let mut controller = open_controller(context).await?;
    let item = controller.add_bookmark(title, url, parent_id).await?;

    println!("{}", item.id());
    Ok(())
}
