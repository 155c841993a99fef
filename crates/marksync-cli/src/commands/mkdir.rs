use crate::commands::common::{open_controller, Context};
use crate::error::CliError;

pub async fn run_mkdir(
    name: &str,
    parent_id: Option<&str>,
    context: &Context,
) -> Result<(), CliError> {
    let mut controller = open_controller(context).await?;
    let folder = controller.create_folder(name, parent_id).await?;

    println!("{}", folder.id);
    Ok(())
}
