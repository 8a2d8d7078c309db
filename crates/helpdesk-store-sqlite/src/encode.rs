//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Statuses are stored as their
//! display text.

use chrono::{DateTime, Utc};
use helpdesk_core::ticket::{Ticket, TicketRecord, TicketStatus};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── TicketStatus ────────────────────────────────────────────────────────────

pub fn encode_status(s: TicketStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<TicketStatus> {
  Ok(TicketStatus::parse(s)?)
}

// ─── Keyword ─────────────────────────────────────────────────────────────────

/// Build a `LIKE … ESCAPE '\'` pattern matching `keyword` anywhere, with the
/// wildcard characters in `keyword` taken literally.
pub fn encode_keyword(keyword: &str) -> String {
  let mut pattern = String::with_capacity(keyword.len() + 2);
  pattern.push('%');
  for c in keyword.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// The column list matching [`RawTicket::from_row`].
pub const TICKET_COLUMNS: &str = "
  t.id, t.issue_title, t.description, t.category_id, t.assigned_employee_id,
  t.status, t.date_created, t.date_resolved, t.resolution_notes,
  c.name      AS category_name,
  e.full_name AS assigned_employee_name";

/// The joins matching [`TICKET_COLUMNS`].
pub const TICKET_JOINS: &str = "
  FROM tickets t
  LEFT JOIN categories c ON c.id = t.category_id
  LEFT JOIN employees  e ON e.id = t.assigned_employee_id";

/// Raw values read directly from a `tickets` row joined with its references.
pub struct RawTicket {
  pub id:                     i64,
  pub issue_title:            String,
  pub description:            Option<String>,
  pub category_id:            i64,
  pub assigned_employee_id:   Option<i64>,
  pub status:                 String,
  pub date_created:           String,
  pub date_resolved:          Option<String>,
  pub resolution_notes:       Option<String>,
  pub category_name:          Option<String>,
  pub assigned_employee_name: Option<String>,
}

impl RawTicket {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                     row.get(0)?,
      issue_title:            row.get(1)?,
      description:            row.get(2)?,
      category_id:            row.get(3)?,
      assigned_employee_id:   row.get(4)?,
      status:                 row.get(5)?,
      date_created:           row.get(6)?,
      date_resolved:          row.get(7)?,
      resolution_notes:       row.get(8)?,
      category_name:          row.get(9)?,
      assigned_employee_name: row.get(10)?,
    })
  }

  pub fn into_record(self) -> Result<TicketRecord> {
    let ticket = Ticket {
      id:                   self.id,
      issue_title:          self.issue_title,
      description:          self.description,
      category_id:          self.category_id,
      assigned_employee_id: self.assigned_employee_id,
      status:               decode_status(&self.status)?,
      date_created:         decode_dt(&self.date_created)?,
      date_resolved:        self.date_resolved.as_deref().map(decode_dt).transpose()?,
      resolution_notes:     self.resolution_notes,
    };

    Ok(TicketRecord {
      ticket,
      category_name:          self.category_name,
      assigned_employee_name: self.assigned_employee_name,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn keyword_wildcards_are_escaped() {
    assert_eq!(encode_keyword("jam"), "%jam%");
    assert_eq!(encode_keyword("50%_off\\"), "%50\\%\\_off\\\\%");
  }

  #[test]
  fn timestamps_roundtrip_through_rfc3339() {
    let dt = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }

  #[test]
  fn unknown_stored_status_is_an_error() {
    assert!(matches!(decode_status("Archived"), Err(Error::Core(_))));
    assert_eq!(decode_status("In Progress").unwrap(), TicketStatus::InProgress);
  }
}
