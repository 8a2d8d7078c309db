//! Reference data: categories and employees a ticket points at.
//!
//! The help desk only needs their identifiers and display names. They are
//! managed outside the ticket lifecycle and read-only from its point of view.

use serde::{Deserialize, Serialize};

pub type CategoryId = i64;
pub type EmployeeId = i64;

/// A ticket category, e.g. "Hardware" or "Network".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id:   CategoryId,
  pub name: String,
}

/// A member of staff tickets can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
  pub id:        EmployeeId,
  pub full_name: String,
}

/// Anything that can populate a selection input: an id and a label.
pub trait Named {
  fn id(&self) -> i64;
  fn display_name(&self) -> &str;
}

impl Named for Category {
  fn id(&self) -> i64 { self.id }

  fn display_name(&self) -> &str { &self.name }
}

impl Named for Employee {
  fn id(&self) -> i64 { self.id }

  fn display_name(&self) -> &str { &self.full_name }
}
