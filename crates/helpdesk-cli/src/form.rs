//! Editable ticket form: the fields a user fills in before submitting.
//!
//! `update` loads the stored row into a form, lets the command-line flags
//! override individual fields, and submits the whole form as a draft.

use helpdesk_core::{
  reference::{CategoryId, EmployeeId},
  ticket::{Ticket, TicketDraft, TicketStatus},
};

use crate::cli::{AddArgs, TicketFields, UpdateArgs};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketForm {
  pub issue_title:          String,
  pub description:          String,
  pub category_id:          Option<CategoryId>,
  pub assigned_employee_id: Option<EmployeeId>,
  pub status:               String,
  pub resolution_notes:     String,
}

impl Default for TicketForm {
  fn default() -> Self {
    Self {
      issue_title:          String::new(),
      description:          String::new(),
      category_id:          None,
      assigned_employee_id: None,
      status:               TicketStatus::New.to_string(),
      resolution_notes:     String::new(),
    }
  }
}

impl From<&Ticket> for TicketForm {
  fn from(t: &Ticket) -> Self {
    Self {
      issue_title:          t.issue_title.clone(),
      description:          t.description.clone().unwrap_or_default(),
      category_id:          Some(t.category_id),
      assigned_employee_id: t.assigned_employee_id,
      status:               t.status.to_string(),
      resolution_notes:     t.resolution_notes.clone().unwrap_or_default(),
    }
  }
}

impl TicketForm {
  pub fn for_add(args: AddArgs) -> Self {
    let mut form = Self {
      issue_title: args.title,
      category_id: Some(args.category),
      ..Self::default()
    };
    form.apply(args.fields);
    form
  }

  /// Start from `current` (or a blank form if the row is gone) and apply
  /// the overrides in `args`.
  pub fn for_update(current: Option<&Ticket>, args: UpdateArgs) -> Self {
    let mut form = current.map(Self::from).unwrap_or_default();
    if let Some(title) = args.title {
      form.issue_title = title;
    }
    if let Some(category) = args.category {
      form.category_id = Some(category);
    }
    if args.no_assignee {
      form.assigned_employee_id = None;
    }
    form.apply(args.fields);
    form
  }

  fn apply(&mut self, fields: TicketFields) {
    let TicketFields { description, assignee, status, notes } = fields;
    if let Some(d) = description {
      self.description = d;
    }
    if assignee.is_some() {
      self.assigned_employee_id = assignee;
    }
    if let Some(s) = status {
      self.status = s;
    }
    if let Some(n) = notes {
      self.resolution_notes = n;
    }
  }

  pub fn into_draft(self) -> TicketDraft {
    TicketDraft {
      issue_title:          self.issue_title,
      description:          some_text(self.description),
      category_id:          self.category_id,
      assigned_employee_id: self.assigned_employee_id,
      status:               some_text(self.status),
      resolution_notes:     some_text(self.resolution_notes),
    }
  }
}

fn some_text(s: String) -> Option<String> { (!s.is_empty()).then_some(s) }
