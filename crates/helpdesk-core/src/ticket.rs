//! Ticket types: the records the help desk creates, updates and displays.
//!
//! A ticket moves through a fixed set of statuses. The two terminal statuses
//! carry a resolution date and resolution notes; the others carry neither.
//! See [`crate::lifecycle`] for the rules that keep those fields in step.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  reference::{CategoryId, EmployeeId},
};

/// Storage-assigned ticket identifier.
pub type TicketId = i64;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a ticket is in its lifecycle.
///
/// The text forms (`Display` / `FromStr`) are the canonical values persisted
/// in the `status` column and shown to users.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::EnumIter,
  strum::IntoStaticStr,
)]
pub enum TicketStatus {
  New,
  #[strum(serialize = "In Progress")]
  #[serde(rename = "In Progress")]
  InProgress,
  Resolved,
  Closed,
}

impl TicketStatus {
  /// `Resolved` and `Closed` require an assignee and resolution notes.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Resolved | Self::Closed)
  }

  pub fn as_str(self) -> &'static str { self.into() }

  /// Parse one of the canonical text forms. Anything else is rejected.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownStatus(s.to_owned()))
  }
}

/// Status filter for listings. `"All"` is the sentinel for "no filter".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
  #[default]
  All,
  Only(TicketStatus),
}

impl StatusFilter {
  pub const ALL: &'static str = "All";

  pub fn status(self) -> Option<TicketStatus> {
    match self {
      Self::All => None,
      Self::Only(s) => Some(s),
    }
  }
}

impl fmt::Display for StatusFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::All => f.write_str(Self::ALL),
      Self::Only(s) => f.write_str(s.as_str()),
    }
  }
}

impl FromStr for StatusFilter {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    if s.is_empty() || s == Self::ALL {
      Ok(Self::All)
    } else {
      TicketStatus::parse(s).map(Self::Only)
    }
  }
}

impl From<Option<TicketStatus>> for StatusFilter {
  fn from(status: Option<TicketStatus>) -> Self {
    status.map_or(Self::All, Self::Only)
  }
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// Untrusted input to [`crate::service::TicketService::create`] and
/// [`crate::service::TicketService::update`].
///
/// `status` is raw text so the service can reject unknown values itself.
/// There is no `date_created`: the service sets it on creation and never
/// accepts one from callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDraft {
  pub issue_title:          String,
  pub description:          Option<String>,
  pub category_id:          Option<CategoryId>,
  pub assigned_employee_id: Option<EmployeeId>,
  pub status:               Option<String>,
  pub resolution_notes:     Option<String>,
}

impl TicketDraft {
  /// Convenience constructor with all optional fields absent.
  pub fn new(
    issue_title: impl Into<String>,
    category_id: CategoryId,
    status: TicketStatus,
  ) -> Self {
    Self {
      issue_title: issue_title.into(),
      category_id: Some(category_id),
      status: Some(status.to_string()),
      ..Self::default()
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn with_assignee(mut self, employee_id: EmployeeId) -> Self {
    self.assigned_employee_id = Some(employee_id);
    self
  }

  pub fn with_resolution_notes(mut self, notes: impl Into<String>) -> Self {
    self.resolution_notes = Some(notes.into());
    self
  }
}

// ─── Persisted shapes ────────────────────────────────────────────────────────

/// A validated ticket that has not been persisted yet; the store assigns
/// the id when the staged insert is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
  pub issue_title:          String,
  pub description:          Option<String>,
  pub category_id:          CategoryId,
  pub assigned_employee_id: Option<EmployeeId>,
  pub status:               TicketStatus,
  pub date_created:         DateTime<Utc>,
  pub date_resolved:        Option<DateTime<Utc>>,
  pub resolution_notes:     Option<String>,
}

/// A persisted ticket row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
  pub id:                   TicketId,
  pub issue_title:          String,
  pub description:          Option<String>,
  pub category_id:          CategoryId,
  pub assigned_employee_id: Option<EmployeeId>,
  pub status:               TicketStatus,
  /// Set once on creation; never changes afterwards.
  pub date_created:         DateTime<Utc>,
  /// Present only while `status` is terminal.
  pub date_resolved:        Option<DateTime<Utc>>,
  /// Present only while `status` is terminal.
  pub resolution_notes:     Option<String>,
}

impl NewTicket {
  /// Attach the storage-assigned id.
  pub fn into_ticket(self, id: TicketId) -> Ticket {
    Ticket {
      id,
      issue_title: self.issue_title,
      description: self.description,
      category_id: self.category_id,
      assigned_employee_id: self.assigned_employee_id,
      status: self.status,
      date_created: self.date_created,
      date_resolved: self.date_resolved,
      resolution_notes: self.resolution_notes,
    }
  }
}

/// A ticket together with the display names of the rows it references;
/// the storage read model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRecord {
  pub ticket:                 Ticket,
  pub category_name:          Option<String>,
  pub assigned_employee_name: Option<String>,
}

// ─── View ────────────────────────────────────────────────────────────────────

/// Read-only display projection. Produced fresh on every read, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketView {
  pub id:                TicketId,
  pub issue_title:       String,
  pub description:       Option<String>,
  pub category:          Option<String>,
  pub assigned_employee: Option<String>,
  pub status:            TicketStatus,
  pub date_created:      DateTime<Utc>,
  pub date_resolved:     Option<DateTime<Utc>>,
  pub resolution_notes:  Option<String>,
}

impl From<TicketRecord> for TicketView {
  fn from(record: TicketRecord) -> Self {
    let TicketRecord { ticket, category_name, assigned_employee_name } = record;
    Self {
      id:                ticket.id,
      issue_title:       ticket.issue_title,
      description:       ticket.description,
      category:          category_name,
      assigned_employee: assigned_employee_name,
      status:            ticket.status,
      date_created:      ticket.date_created,
      date_resolved:     ticket.date_resolved,
      resolution_notes:  ticket.resolution_notes,
    }
  }
}
