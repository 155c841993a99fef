use marksync_core::dnd::DropIntent;
use marksync_core::models::MoveDestination;

use crate::commands::common::{open_controller, Context};
use crate::error::CliError;

pub async fn run_move(
    id: &str,
    to: Option<String>,
    index: Option<usize>,
    before: Option<String>,
    context: &Context,
) -> Result<(), CliError> {
    let mut controller = open_controller(context).await?;

    let moved = match (to, before) {
        (Some(parent_id), _) => {
            let destination = MoveDestination {
                parent_id: Some(parent_id),
                index,
            };
            Some(controller.move_bookmark(id, &destination).await?)
        }
        (None, Some(target_id)) => {
            let intent = DropIntent::OnItem {
                item_id: id.to_string(),
                target_id,
            };
            controller.drop_item(&intent).await?
        }
        (None, None) => {
            return Err(CliError::Config(
                "Pass --to <folder> or --before <bookmark>".to_string(),
            ));
        }
    };

    match moved {
        Some(item) => println!("{}", item.id()),
        None => println!("Nothing to move"),
    }
    Ok(())
}
