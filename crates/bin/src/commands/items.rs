//! Commands acting on one item.

use listkeeper::RecordId;

use crate::backend::{Item, Workspace};
use crate::cli::{AddArgs, ItemArgs, MoveArgs, MoveTarget};
use crate::output::OutputFormat;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Run the `add` command
pub async fn add(ws: &Workspace, args: &AddArgs, format: OutputFormat) -> CommandResult {
    let item = Item {
        name: args.name.clone(),
        list: args.list.clone(),
        position: args.at,
    };
    let id = ws.items.insert(&item).await?;
    let position = ws.list.position(&id).await?;
    report(format, &id, position, "added")
}

/// Run the `move` command
pub async fn move_item(ws: &Workspace, args: &MoveArgs, format: OutputFormat) -> CommandResult {
    let id = RecordId::from(args.id.as_str());
    match args.to {
        MoveTarget::Top => {
            ws.list.move_to_top(&id).await?;
        }
        MoveTarget::Bottom => {
            ws.list.move_to_bottom(&id).await?;
        }
        MoveTarget::Up => {
            ws.list.move_higher(&id).await?;
        }
        MoveTarget::Down => {
            ws.list.move_lower(&id).await?;
        }
        MoveTarget::Position(position) => {
            ws.list.insert_at(&id, position).await?;
        }
    }
    let position = ws.list.position(&id).await?;
    report(format, &id, position, "moved")
}

/// Run the `remove` command
pub async fn remove(ws: &Workspace, args: &ItemArgs, format: OutputFormat) -> CommandResult {
    let id = RecordId::from(args.id.as_str());
    let removed = ws.list.remove_from_list(&id).await?;
    report(
        format,
        &id,
        None,
        if removed { "removed" } else { "not in list" },
    )
}

/// Run the `restore` command
pub async fn restore(ws: &Workspace, args: &ItemArgs, format: OutputFormat) -> CommandResult {
    let id = RecordId::from(args.id.as_str());
    let position = ws.list.add_to_list_bottom(&id).await?;
    report(format, &id, Some(position), "restored")
}

/// Run the `delete` command
pub async fn delete(ws: &Workspace, args: &ItemArgs, format: OutputFormat) -> CommandResult {
    let id = RecordId::from(args.id.as_str());
    if !ws.items.delete(&id).await? {
        return Err(format!("no item with id {id}").into());
    }
    report(format, &id, None, "deleted")
}

fn report(
    format: OutputFormat,
    id: &RecordId,
    position: Option<i64>,
    action: &str,
) -> CommandResult {
    match format {
        OutputFormat::Human => match position {
            Some(position) => println!("{id} {action} at position {position}"),
            None => println!("{id} {action}"),
        },
        OutputFormat::Json => {
            let value = serde_json::json!({
                "id": id,
                "position": position,
                "status": action,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
