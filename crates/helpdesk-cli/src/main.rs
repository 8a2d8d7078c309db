//! `helpdesk`: command-line front end for the help desk ticket store.
//!
//! # Usage
//!
//! ```
//! helpdesk categories add Hardware
//! helpdesk add --title "Printer jam" --category 1
//! helpdesk update 1 --status Resolved --assignee 2 --notes "Replaced roller"
//! helpdesk list --status "In Progress" --keyword jam
//! ```
//!
//! Settings come from `helpdesk.toml` (or `--config`) and `HELPDESK_*`
//! environment variables.

mod app;
mod cli;
mod form;
mod render;
mod settings;

use std::{io, process::ExitCode};

use anyhow::Context as _;
use app::App;
use clap::Parser;
use cli::Cli;
use helpdesk_store_sqlite::SqliteStore;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  // stdout carries listings; logs go to stderr.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config)
    .with_context(|| format!("failed to read config {}", cli.config.display()))?;
  if let Some(path) = cli.store {
    settings.store_path = path;
  }

  let store_path = settings.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::debug!(?store_path, "store opened");

  let mut app = App::new(
    store,
    settings.confirm_delete,
    io::stdin().lock(),
    io::stdout().lock(),
  );

  Ok(if app.run(cli.command).await? {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  })
}
