//! Command dispatcher: turns parsed commands into service calls and prints
//! what comes back.

use std::{
  io::{BufRead, Write},
  sync::Arc,
};

use anyhow::Context as _;
use helpdesk_core::{
  service::{Outcome, TicketService},
  store::{ReferenceStore, TicketQuery, TicketStore as _},
  ticket::TicketId,
};
use helpdesk_store_sqlite::SqliteStore;
use mockable::DefaultClock;
use tracing::debug;

use crate::{
  cli::{AddArgs, Command, ListArgs, ReferenceCommand, UpdateArgs},
  form::TicketForm,
  render,
};

/// Longest keyword accepted by `list`, in characters.
pub const MAX_KEYWORD_LEN: usize = 100;

const KEYWORD_TOO_LONG: &str = "Keyword is too long.";

/// Which reference table a `categories` / `employees` command targets.
#[derive(Debug, Clone, Copy)]
enum Reference {
  Category,
  Employee,
}

pub struct App<R, W> {
  service:        TicketService<SqliteStore, DefaultClock>,
  confirm_delete: bool,
  input:          R,
  out:            W,
}

impl<R: BufRead, W: Write> App<R, W> {
  pub fn new(store: SqliteStore, confirm_delete: bool, input: R, out: W) -> Self {
    Self {
      service: TicketService::new(Arc::new(store), Arc::new(DefaultClock)),
      confirm_delete,
      input,
      out,
    }
  }

  /// Run one command. Returns `false` when the command was refused.
  pub async fn run(&mut self, command: Command) -> anyhow::Result<bool> {
    debug!(?command, "running command");
    match command {
      Command::List(args) => self.list(args).await,
      Command::Add(args) => self.add(args).await,
      Command::Update(args) => self.update(args).await,
      Command::Delete { id, yes } => self.delete(id, yes).await,
      Command::Clear { yes } => self.clear(yes).await,
      Command::Categories(cmd) => self.reference(Reference::Category, cmd).await,
      Command::Employees(cmd) => self.reference(Reference::Employee, cmd).await,
    }
  }

  #[cfg(test)]
  pub fn into_output(self) -> W { self.out }

  // ── Tickets ───────────────────────────────────────────────────────────────

  async fn list(&mut self, args: ListArgs) -> anyhow::Result<bool> {
    if let Some(k) = &args.keyword
      && !k.trim().is_empty()
      && k.chars().count() > MAX_KEYWORD_LEN
    {
      writeln!(self.out, "{KEYWORD_TOO_LONG}")?;
      return Ok(false);
    }

    let query =
      TicketQuery::new(args.status, args.category, args.keyword.as_deref());
    let tickets = self.service.list(&query).await;
    if args.json {
      render::tickets_json(&mut self.out, &tickets)?;
    } else {
      render::tickets(&mut self.out, &tickets)?;
    }
    Ok(true)
  }

  async fn add(&mut self, args: AddArgs) -> anyhow::Result<bool> {
    let draft = TicketForm::for_add(args).into_draft();
    let outcome = self.service.create(draft).await;
    self.report(outcome).await
  }

  async fn update(&mut self, args: UpdateArgs) -> anyhow::Result<bool> {
    let id = args.id;
    let current = self
      .service
      .store()
      .get_by_id(id)
      .await
      .with_context(|| format!("failed to load ticket {id}"))?;

    let form = TicketForm::for_update(current.as_ref().map(|r| &r.ticket), args);
    let outcome = self.service.update(id, form.into_draft()).await;
    self.report(outcome).await
  }

  async fn delete(&mut self, id: TicketId, yes: bool) -> anyhow::Result<bool> {
    if self.confirm_delete
      && !yes
      && !self.confirm(&format!("Delete ticket {id}?"))?
    {
      writeln!(self.out, "Cancelled.")?;
      return Ok(true);
    }
    let outcome = self.service.delete(id).await;
    self.report(outcome).await
  }

  async fn clear(&mut self, yes: bool) -> anyhow::Result<bool> {
    let empty = self.service.list(&TicketQuery::default()).await.is_empty();
    if !empty && !yes && !self.confirm("Delete ALL tickets?")? {
      writeln!(self.out, "Cancelled.")?;
      return Ok(true);
    }
    let outcome = self.service.clear_all().await;
    self.report(outcome).await
  }

  /// Print the outcome; after a successful change, print the refreshed list.
  async fn report(&mut self, outcome: Outcome) -> anyhow::Result<bool> {
    render::outcome(&mut self.out, &outcome)?;
    if outcome.is_ok() {
      let tickets = self.service.list(&TicketQuery::default()).await;
      render::tickets(&mut self.out, &tickets)?;
    }
    Ok(outcome.is_ok())
  }

  // ── Reference data ────────────────────────────────────────────────────────

  async fn reference(
    &mut self,
    table: Reference,
    cmd: ReferenceCommand,
  ) -> anyhow::Result<bool> {
    let store = self.service.store().clone();
    match (table, cmd) {
      (Reference::Category, ReferenceCommand::List) => {
        let items = store.list_categories().await.context("listing categories")?;
        render::named(&mut self.out, &items)?;
      }
      (Reference::Employee, ReferenceCommand::List) => {
        let items = store.list_employees().await.context("listing employees")?;
        render::named(&mut self.out, &items)?;
      }
      (table, ReferenceCommand::Add { name }) => {
        let name = name.trim().to_owned();
        if name.is_empty() {
          writeln!(self.out, "Name must not be empty.")?;
          return Ok(false);
        }
        let added = match table {
          Reference::Category => {
            store.add_category(name).await.context("adding category")?.id
          }
          Reference::Employee => {
            store.add_employee(name).await.context("adding employee")?.id
          }
        };
        writeln!(self.out, "Added with id {added}.")?;
      }
    }
    Ok(true)
  }

  // ── Prompt ────────────────────────────────────────────────────────────────

  fn confirm(&mut self, prompt: &str) -> std::io::Result<bool> {
    write!(self.out, "{prompt} [y/N] ")?;
    self.out.flush()?;
    let mut line = String::new();
    self.input.read_line(&mut line)?;
    let answer = line.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
  }
}
