//! Commands acting on a whole list.

use crate::backend::{Workspace, list_scope};
use crate::cli::{CheckArgs, ListArgs};
use crate::output::{OutputFormat, cell, print_table};

/// Run the `show` command
pub async fn show(
    ws: &Workspace,
    args: &ListArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let items = ws.list.items(&list_scope(&args.list)).await?;

    match format {
        OutputFormat::Human => {
            if items.is_empty() {
                println!("List '{}' is empty.", args.list);
                return Ok(());
            }
            let rows: Vec<Vec<String>> = items
                .iter()
                .map(|doc| vec![cell(doc, "position"), cell(doc, "name"), cell(doc, "_id")])
                .collect();
            print_table(&["POS", "NAME", "ID"], &rows);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&items)?);
        }
    }
    Ok(())
}

/// Run the `check` command
pub async fn check(
    ws: &Workspace,
    args: &CheckArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let scope = list_scope(&args.list);
    let result = ws.list.check(&scope).await;

    let repaired = match result {
        Ok(()) => None,
        Err(e) if e.is_invariant_violation() && args.repair => {
            Some(ws.list.compact(&scope).await?)
        }
        Err(e) => return Err(e.into()),
    };

    match format {
        OutputFormat::Human => match repaired {
            None => println!("List '{}' is consistent.", args.list),
            Some(changed) => {
                println!("List '{}' repaired, {changed} positions rewritten.", args.list)
            }
        },
        OutputFormat::Json => {
            let value = serde_json::json!({
                "list": args.list,
                "consistent": repaired.is_none(),
                "repaired": repaired,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
