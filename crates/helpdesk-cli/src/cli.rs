//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use helpdesk_core::{
  reference::{CategoryId, EmployeeId},
  ticket::{StatusFilter, TicketId},
};

#[derive(Parser, Debug)]
#[command(name = "helpdesk", author, version, about = "Help desk ticket tracker")]
pub struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "helpdesk.toml")]
  pub config: PathBuf,

  /// SQLite database file; overrides `store_path` from the config.
  #[arg(long, value_name = "PATH", env = "HELPDESK_STORE")]
  pub store: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Show tickets, optionally filtered.
  List(ListArgs),
  /// Open a new ticket.
  Add(AddArgs),
  /// Edit an existing ticket.
  Update(UpdateArgs),
  /// Remove one ticket.
  Delete {
    id:  TicketId,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
  },
  /// Remove every ticket.
  Clear {
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
  },
  /// Manage ticket categories.
  #[command(subcommand)]
  Categories(ReferenceCommand),
  /// Manage employees tickets can be assigned to.
  #[command(subcommand)]
  Employees(ReferenceCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceCommand {
  List,
  Add { name: String },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
  /// `All`, `New`, `In Progress`, `Resolved` or `Closed`.
  #[arg(long, default_value = StatusFilter::ALL)]
  pub status:   StatusFilter,
  #[arg(long)]
  pub category: Option<CategoryId>,
  /// Matched against the title and the assignee's name.
  #[arg(long)]
  pub keyword:  Option<String>,
  /// Print JSON instead of a table.
  #[arg(long)]
  pub json:     bool,
}

/// Optional ticket fields shared by `add` and `update`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFields {
  #[arg(long)]
  pub description: Option<String>,
  #[arg(long)]
  pub assignee:    Option<EmployeeId>,
  #[arg(long)]
  pub status:      Option<String>,
  /// Resolution notes; required when resolving or closing.
  #[arg(long)]
  pub notes:       Option<String>,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct AddArgs {
  #[arg(long)]
  pub title:    String,
  #[arg(long)]
  pub category: CategoryId,
  #[command(flatten)]
  pub fields:   TicketFields,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateArgs {
  pub id:          TicketId,
  #[arg(long)]
  pub title:       Option<String>,
  #[arg(long)]
  pub category:    Option<CategoryId>,
  /// Unassign the ticket.
  #[arg(long, conflicts_with = "assignee")]
  pub no_assignee: bool,
  #[command(flatten)]
  pub fields:      TicketFields,
}
