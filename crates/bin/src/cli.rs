//! CLI argument definitions for the Listkeeper binary.

use std::{path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand};

/// Ordered lists of named items, kept in a JSON file
#[derive(Parser, Debug)]
#[command(name = "listkeeper")]
#[command(about = "Listkeeper: ordered lists with dense positions")]
#[command(version)]
pub struct Cli {
    /// JSON file holding the items
    #[arg(
        short = 'D',
        long,
        global = true,
        default_value = "listkeeper.json",
        env = "LISTKEEPER_DATA"
    )]
    pub data: PathBuf,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add an item to a list, at the bottom unless a position is given
    Add(AddArgs),
    /// Show the items of a list in order
    Show(ListArgs),
    /// Move an item within its list
    Move(MoveArgs),
    /// Take an item out of its list without deleting it
    Remove(ItemArgs),
    /// Put a removed item back at the bottom of its list
    Restore(ItemArgs),
    /// Delete an item
    Delete(ItemArgs),
    /// Verify that a list's positions run 1..=N
    Check(CheckArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// List to add the item to
    pub list: String,

    /// Item name
    pub name: String,

    /// Position to insert at; out-of-range values are clamped
    #[arg(long)]
    pub at: Option<i64>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// List name
    pub list: String,
}

#[derive(clap::Args, Debug)]
pub struct ItemArgs {
    /// Item id, as printed by `show`
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// Item id, as printed by `show`
    pub id: String,

    /// Where to move: top, bottom, up, down or a position
    #[arg(allow_hyphen_values = true)]
    pub to: MoveTarget,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// List name
    pub list: String,

    /// Renumber the list if its positions are not dense
    #[arg(long)]
    pub repair: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    Top,
    Bottom,
    Up,
    Down,
    Position(i64),
}

impl FromStr for MoveTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => other.parse().map(Self::Position).map_err(|_| {
                format!("expected top, bottom, up, down or a position, got '{other}'")
            }),
        }
    }
}
