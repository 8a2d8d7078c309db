//! Plain-text and JSON rendering of listings.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use helpdesk_core::{reference::Named, service::Outcome, ticket::TicketView};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

const HEADERS: [&str; 7] =
  ["ID", "Title", "Category", "Assigned", "Status", "Created", "Resolved"];

fn date(dt: Option<DateTime<Utc>>) -> String {
  dt.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

fn cells(t: &TicketView) -> [String; 7] {
  [
    t.id.to_string(),
    t.issue_title.clone(),
    t.category.clone().unwrap_or_default(),
    t.assigned_employee.clone().unwrap_or_default(),
    t.status.to_string(),
    date(Some(t.date_created)),
    date(t.date_resolved),
  ]
}

/// Render `tickets` as an aligned table, or a placeholder line when empty.
pub fn tickets(out: &mut impl Write, tickets: &[TicketView]) -> io::Result<()> {
  if tickets.is_empty() {
    return writeln!(out, "No tickets.");
  }

  let rows: Vec<[String; 7]> = tickets.iter().map(cells).collect();
  let mut widths = HEADERS.map(|h| h.chars().count());
  for row in &rows {
    for (w, cell) in widths.iter_mut().zip(row) {
      *w = (*w).max(cell.chars().count());
    }
  }

  write_row(out, &widths, HEADERS.iter().copied())?;
  for row in &rows {
    write_row(out, &widths, row.iter().map(String::as_str))?;
  }
  Ok(())
}

fn write_row<'a>(
  out: &mut impl Write,
  widths: &[usize; 7],
  cells: impl Iterator<Item = &'a str>,
) -> io::Result<()> {
  let line = cells
    .zip(widths)
    .map(|(cell, w)| format!("{cell:<w$}"))
    .collect::<Vec<_>>()
    .join("  ");
  writeln!(out, "{}", line.trim_end())
}

pub fn tickets_json(out: &mut impl Write, tickets: &[TicketView]) -> io::Result<()> {
  serde_json::to_writer_pretty(&mut *out, tickets)?;
  writeln!(out)
}

/// One `id  name` line per category or employee.
pub fn named<N: Named>(out: &mut impl Write, items: &[N]) -> io::Result<()> {
  for item in items {
    writeln!(out, "{:>4}  {}", item.id(), item.display_name())?;
  }
  Ok(())
}

pub fn outcome(out: &mut impl Write, outcome: &Outcome) -> io::Result<()> {
  writeln!(out, "{}", outcome.message())
}
