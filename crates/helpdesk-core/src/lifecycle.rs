//! The resolution gate: status-dependent field rules.
//!
//! A ticket in a terminal status (`Resolved`, `Closed`) must have an assignee
//! and resolution notes, and is stamped with a resolution date. A ticket in
//! any other status carries neither notes nor a resolution date. Both create
//! and update run every ticket through [`resolution_gate`] before anything is
//! staged in the store.

use chrono::{DateTime, Utc};
use mockable::Clock;
use thiserror::Error;

use crate::{reference::EmployeeId, ticket::TicketStatus};

/// Why a ticket may not enter a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
  #[error("a resolved ticket needs an assignee")]
  MissingAssignee,

  #[error("a resolved ticket needs resolution notes")]
  MissingNotes,

  /// Only reachable when the clock moves backwards between reads.
  #[error("resolution date precedes creation date")]
  ResolvedBeforeCreated,
}

/// The resolution fields a ticket must carry for its status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
  pub date_resolved:    Option<DateTime<Utc>>,
  pub resolution_notes: Option<String>,
}

/// Compute the resolution fields for a ticket entering `status`.
///
/// Checks run in order and the first failure wins: assignee, then notes,
/// then the resolution date against `date_created`. Notes are trimmed.
pub fn resolution_gate<C>(
  status: TicketStatus,
  assignee: Option<EmployeeId>,
  notes: Option<&str>,
  date_created: DateTime<Utc>,
  clock: &C,
) -> Result<Resolution, GateError>
where
  C: Clock + ?Sized,
{
  if !status.is_terminal() {
    return Ok(Resolution::default());
  }

  if assignee.is_none() {
    return Err(GateError::MissingAssignee);
  }

  let notes = notes
    .map(str::trim)
    .filter(|n| !n.is_empty())
    .ok_or(GateError::MissingNotes)?;

  let date_resolved = clock.utc();
  if date_resolved < date_created {
    return Err(GateError::ResolvedBeforeCreated);
  }

  Ok(Resolution {
    date_resolved:    Some(date_resolved),
    resolution_notes: Some(notes.to_owned()),
  })
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, Local, TimeZone as _};

  use super::*;

  struct FixedClock(DateTime<Utc>);

  impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> { self.0.with_timezone(&Local) }

    fn utc(&self) -> DateTime<Utc> { self.0 }
  }

  fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
  }

  #[test]
  fn open_statuses_clear_resolution_fields() {
    let clock = FixedClock(at(10));
    for status in [TicketStatus::New, TicketStatus::InProgress] {
      let res =
        resolution_gate(status, Some(1), Some("stale notes"), at(0), &clock)
          .unwrap();
      assert_eq!(res, Resolution::default());
    }
  }

  #[test]
  fn terminal_status_requires_assignee_first() {
    let clock = FixedClock(at(10));
    let err = resolution_gate(TicketStatus::Resolved, None, None, at(0), &clock)
      .unwrap_err();
    assert_eq!(err, GateError::MissingAssignee);
  }

  #[test]
  fn terminal_status_requires_non_blank_notes() {
    let clock = FixedClock(at(10));
    for notes in [None, Some(""), Some("   ")] {
      let err =
        resolution_gate(TicketStatus::Closed, Some(7), notes, at(0), &clock)
          .unwrap_err();
      assert_eq!(err, GateError::MissingNotes);
    }
  }

  #[test]
  fn terminal_status_stamps_resolution_date_and_trims_notes() {
    let clock = FixedClock(at(10));
    let res = resolution_gate(
      TicketStatus::Resolved,
      Some(7),
      Some("  replaced toner  "),
      at(0),
      &clock,
    )
    .unwrap();
    assert_eq!(res.date_resolved, Some(at(10)));
    assert_eq!(res.resolution_notes.as_deref(), Some("replaced toner"));
  }

  #[test]
  fn resolution_at_creation_instant_is_allowed() {
    let clock = FixedClock(at(0));
    let res =
      resolution_gate(TicketStatus::Closed, Some(1), Some("done"), at(0), &clock)
        .unwrap();
    assert_eq!(res.date_resolved, Some(at(0)));
  }

  #[test]
  fn clock_behind_creation_date_is_rejected() {
    let created = at(0);
    let clock = FixedClock(created - Duration::seconds(1));
    let err = resolution_gate(
      TicketStatus::Resolved,
      Some(1),
      Some("done"),
      created,
      &clock,
    )
    .unwrap_err();
    assert_eq!(err, GateError::ResolvedBeforeCreated);
  }
}
