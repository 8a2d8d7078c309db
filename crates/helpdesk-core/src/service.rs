//! [`TicketService`]: the gatekeeper between untrusted input and the store.
//!
//! Every mutating operation validates its input completely before staging
//! anything, so a rejected call leaves the store untouched. Store faults are
//! caught here and reported as an [`Outcome::Rejected`] carrying the cause;
//! nothing is ever propagated to the caller as an error.

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  lifecycle::{GateError, resolution_gate},
  reference::CategoryId,
  store::{TicketQuery, TicketStore},
  ticket::{NewTicket, Ticket, TicketDraft, TicketId, TicketStatus, TicketView},
};

// ─── Messages ────────────────────────────────────────────────────────────────

mod msg {
  pub const CREATE_EMPTY_TITLE: &str = "Title must not be empty!";
  pub const CREATE_NO_CATEGORY: &str = "Category must be selected!";
  pub const CREATE_NO_STATUS: &str = "Status must be selected!";
  pub const CREATE_NO_ASSIGNEE: &str = "Assigned employee is required.";
  pub const CREATE_NO_NOTES: &str = "Resolution notes cannot be empty.";
  pub const CREATED: &str = "Ticket added successfully.";
  pub const CREATE_FAILED: &str = "Error adding ticket";

  pub const UPDATE_MISSING: &str = "Ticket does not exist or was removed.";
  pub const UPDATE_EMPTY_TITLE: &str = "Title must not be empty.";
  pub const UPDATE_NO_CATEGORY: &str = "Category must be selected.";
  pub const UPDATE_NO_ASSIGNEE: &str =
    "Assigned employee must be selected to resolve ticket.";
  pub const UPDATE_NO_NOTES: &str = "Resolution notes must not be empty.";
  pub const UPDATE_NOOP: &str =
    "Failed to update ticket. It may have been removed.";
  pub const UPDATED: &str = "Ticket updated successfully.";
  pub const UPDATE_FAILED: &str = "Error updating ticket";

  pub const INVALID_STATUS: &str = "Invalid status value.";
  pub const RESOLVED_BEFORE_CREATED: &str =
    "DateResolved cannot be earlier than DateCreated.";

  pub const DELETE_MISSING: &str =
    "Ticket does not exist or was already removed.";
  pub const DELETE_NOOP: &str = "Failed to delete ticket.";
  pub const DELETED: &str = "Ticket deleted successfully.";
  pub const DELETE_FAILED: &str = "Error deleting ticket";

  pub const NOTHING_TO_CLEAR: &str = "No tickets to clear.";
  pub const CLEARED: &str = "All tickets cleared successfully.";
  pub const CLEAR_FAILED: &str = "Error clearing tickets";
}

/// Resolution-gate wording differs between create and update.
struct GateMessages {
  missing_assignee: &'static str,
  missing_notes:    &'static str,
}

impl GateMessages {
  const CREATE: Self = Self {
    missing_assignee: msg::CREATE_NO_ASSIGNEE,
    missing_notes:    msg::CREATE_NO_NOTES,
  };
  const UPDATE: Self = Self {
    missing_assignee: msg::UPDATE_NO_ASSIGNEE,
    missing_notes:    msg::UPDATE_NO_NOTES,
  };

  fn rejection(&self, err: GateError) -> Rejection {
    Rejection::Refused(match err {
      GateError::MissingAssignee => self.missing_assignee,
      GateError::MissingNotes => self.missing_notes,
      GateError::ResolvedBeforeCreated => msg::RESOLVED_BEFORE_CREATED,
    })
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The result of a service operation: a message for the user either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum Outcome {
  Ok(String),
  Rejected(String),
}

impl Outcome {
  pub fn is_ok(&self) -> bool { matches!(self, Self::Ok(_)) }

  pub fn message(&self) -> &str {
    match self {
      Self::Ok(m) | Self::Rejected(m) => m,
    }
  }
}

/// Internal failure taxonomy, flattened into [`Outcome::Rejected`] at the
/// service boundary.
#[derive(Debug, Error)]
enum Rejection {
  /// An expected, user-correctable condition.
  #[error("{0}")]
  Refused(&'static str),

  /// The store failed while the named action was under way.
  #[error("{action}: {source}")]
  Failed {
    action: &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl Rejection {
  fn failed<E>(action: &'static str) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| Self::Failed { action, source: Box::new(e) }
  }
}

type Attempt = Result<&'static str, Rejection>;

// ─── Service ─────────────────────────────────────────────────────────────────

/// Validates ticket payloads, enforces the status rules, and drives a
/// [`TicketStore`].
#[derive(Clone)]
pub struct TicketService<S, C>
where
  S: TicketStore,
  C: Clock + Send + Sync,
{
  store: Arc<S>,
  clock: Arc<C>,
}

impl<S, C> TicketService<S, C>
where
  S: TicketStore,
  C: Clock + Send + Sync,
{
  pub fn new(store: Arc<S>, clock: Arc<C>) -> Self { Self { store, clock } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Tickets matching `query`, projected for display. Never fails: a store
  /// fault is logged and yields an empty list.
  pub async fn list(&self, query: &TicketQuery) -> Vec<TicketView> {
    let query = &query.normalized();
    match self.store.list(query).await {
      Ok(records) => {
        debug!(
          count = records.len(),
          filtered = !query.is_unfiltered(),
          "listed tickets"
        );
        records.into_iter().map(TicketView::from).collect()
      }
      Err(e) => {
        warn!(error = %e, ?query, "failed to list tickets");
        Vec::new()
      }
    }
  }

  // ── Writes ────────────────────────────────────────────────────────────

  pub async fn create(&self, draft: TicketDraft) -> Outcome {
    finish("create", self.try_create(draft).await)
  }

  /// Replace the editable fields of ticket `id` with `draft`. The creation
  /// date is kept.
  pub async fn update(&self, id: TicketId, draft: TicketDraft) -> Outcome {
    finish("update", self.try_update(id, draft).await)
  }

  pub async fn delete(&self, id: TicketId) -> Outcome {
    finish("delete", self.try_delete(id).await)
  }

  pub async fn clear_all(&self) -> Outcome {
    finish("clear_all", self.try_clear_all().await)
  }

  async fn try_create(&self, draft: TicketDraft) -> Attempt {
    let issue_title = title(&draft.issue_title)
      .ok_or(Rejection::Refused(msg::CREATE_EMPTY_TITLE))?;
    let category_id = category(draft.category_id)
      .ok_or(Rejection::Refused(msg::CREATE_NO_CATEGORY))?;
    let status = status_text(draft.status.as_deref())
      .ok_or(Rejection::Refused(msg::CREATE_NO_STATUS))?;
    let status = TicketStatus::parse(status)
      .map_err(|_| Rejection::Refused(msg::INVALID_STATUS))?;

    let date_created = self.clock.utc();
    let resolution = resolution_gate(
      status,
      draft.assigned_employee_id,
      draft.resolution_notes.as_deref(),
      date_created,
      &*self.clock,
    )
    .map_err(|e| GateMessages::CREATE.rejection(e))?;

    let ticket = NewTicket {
      issue_title,
      description: non_blank(draft.description),
      category_id,
      assigned_employee_id: draft.assigned_employee_id,
      status,
      date_created,
      date_resolved: resolution.date_resolved,
      resolution_notes: resolution.resolution_notes,
    };

    self
      .store
      .create(ticket)
      .await
      .map_err(Rejection::failed(msg::CREATE_FAILED))?;
    self
      .store
      .commit()
      .await
      .map_err(Rejection::failed(msg::CREATE_FAILED))?;

    Ok(msg::CREATED)
  }

  async fn try_update(&self, id: TicketId, draft: TicketDraft) -> Attempt {
    let current = self
      .store
      .get_by_id(id)
      .await
      .map_err(Rejection::failed(msg::UPDATE_FAILED))?
      .ok_or(Rejection::Refused(msg::UPDATE_MISSING))?;

    let issue_title = title(&draft.issue_title)
      .ok_or(Rejection::Refused(msg::UPDATE_EMPTY_TITLE))?;
    let category_id = category(draft.category_id)
      .ok_or(Rejection::Refused(msg::UPDATE_NO_CATEGORY))?;
    let status = status_text(draft.status.as_deref())
      .and_then(|s| TicketStatus::parse(s).ok())
      .ok_or(Rejection::Refused(msg::INVALID_STATUS))?;

    let date_created = current.ticket.date_created;
    let resolution = resolution_gate(
      status,
      draft.assigned_employee_id,
      draft.resolution_notes.as_deref(),
      date_created,
      &*self.clock,
    )
    .map_err(|e| GateMessages::UPDATE.rejection(e))?;

    let ticket = Ticket {
      id,
      issue_title,
      description: non_blank(draft.description),
      category_id,
      assigned_employee_id: draft.assigned_employee_id,
      status,
      date_created,
      date_resolved: resolution.date_resolved,
      resolution_notes: resolution.resolution_notes,
    };

    let staged = self
      .store
      .update(ticket)
      .await
      .map_err(Rejection::failed(msg::UPDATE_FAILED))?;
    if !staged {
      return Err(Rejection::Refused(msg::UPDATE_NOOP));
    }

    // Zero rows means another writer removed the row after staging.
    let affected = self
      .store
      .commit()
      .await
      .map_err(Rejection::failed(msg::UPDATE_FAILED))?;
    if affected == 0 {
      return Err(Rejection::Refused(msg::UPDATE_NOOP));
    }

    Ok(msg::UPDATED)
  }

  async fn try_delete(&self, id: TicketId) -> Attempt {
    let exists = self
      .store
      .exists(id)
      .await
      .map_err(Rejection::failed(msg::DELETE_FAILED))?;
    if !exists {
      return Err(Rejection::Refused(msg::DELETE_MISSING));
    }

    let staged = self
      .store
      .delete(id)
      .await
      .map_err(Rejection::failed(msg::DELETE_FAILED))?;
    if !staged {
      return Err(Rejection::Refused(msg::DELETE_NOOP));
    }

    // Zero rows means another writer removed the row after staging.
    let affected = self
      .store
      .commit()
      .await
      .map_err(Rejection::failed(msg::DELETE_FAILED))?;
    if affected == 0 {
      return Err(Rejection::Refused(msg::DELETE_NOOP));
    }

    Ok(msg::DELETED)
  }

  async fn try_clear_all(&self) -> Attempt {
    let existing = self
      .store
      .list(&TicketQuery::default())
      .await
      .map_err(Rejection::failed(msg::CLEAR_FAILED))?;
    if existing.is_empty() {
      return Ok(msg::NOTHING_TO_CLEAR);
    }

    self
      .store
      .clear_all()
      .await
      .map_err(Rejection::failed(msg::CLEAR_FAILED))?;
    self
      .store
      .commit()
      .await
      .map_err(Rejection::failed(msg::CLEAR_FAILED))?;

    Ok(msg::CLEARED)
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn finish(operation: &'static str, attempt: Attempt) -> Outcome {
  match attempt {
    Ok(message) => {
      info!(operation, "{message}");
      Outcome::Ok(message.to_owned())
    }
    Err(rejection @ Rejection::Refused(_)) => {
      debug!(operation, reason = %rejection, "request rejected");
      Outcome::Rejected(rejection.to_string())
    }
    Err(failure) => {
      warn!(operation, error = %failure, "ticket store failure");
      Outcome::Rejected(failure.to_string())
    }
  }
}

/// The trimmed title, or `None` if it is blank.
fn title(raw: &str) -> Option<String> {
  let trimmed = raw.trim();
  (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn category(id: Option<CategoryId>) -> Option<CategoryId> {
  id.filter(|&id| id != 0)
}

/// The status text as given, or `None` if it is blank. Non-blank text is
/// not trimmed: only the exact canonical forms parse.
fn status_text(raw: Option<&str>) -> Option<&str> {
  raw.filter(|s| !s.trim().is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}
