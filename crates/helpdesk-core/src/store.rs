//! The `TicketStore` and `ReferenceStore` traits and supporting query types.
//!
//! The traits are implemented by storage backends (e.g.
//! `helpdesk-store-sqlite`). The service and front ends depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  reference::{Category, CategoryId, Employee},
  ticket::{NewTicket, StatusFilter, Ticket, TicketId, TicketRecord},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`TicketStore::list`]. The default query matches every
/// ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
  pub status:      StatusFilter,
  /// Restrict to one category. Never `Some(0)` when built with [`Self::new`].
  pub category_id: Option<CategoryId>,
  /// Substring matched against the title or the assignee's full name.
  /// Never blank when built with [`Self::new`].
  pub keyword:     Option<String>,
}

impl TicketQuery {
  /// Build a query from loosely-typed filter inputs: a category id of zero
  /// and a blank keyword both mean "no filter". The keyword is trimmed.
  pub fn new(
    status: StatusFilter,
    category_id: Option<CategoryId>,
    keyword: Option<&str>,
  ) -> Self {
    Self {
      status,
      category_id: category_id.filter(|&id| id != 0),
      keyword: keyword
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_owned),
    }
  }

  /// The same query with the "no filter" values of [`Self::new`] applied,
  /// for queries built as struct literals.
  pub fn normalized(&self) -> Self {
    Self::new(self.status, self.category_id, self.keyword.as_deref())
  }

  pub fn is_unfiltered(&self) -> bool {
    self.status == StatusFilter::All
      && self.category_id.is_none()
      && self.keyword.is_none()
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a ticket store backend.
///
/// Writes are staged: `create`, `update`, `delete` and `clear_all` record a
/// pending change, and nothing is durable until [`TicketStore::commit`].
/// Stores apply no business rules and never validate ticket contents.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait TicketStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Return every ticket matching `query`, with references resolved, in
  /// storage-defined order.
  fn list<'a>(
    &'a self,
    query: &'a TicketQuery,
  ) -> impl Future<Output = Result<Vec<TicketRecord>, Self::Error>> + Send + 'a;

  /// Retrieve a single ticket with references resolved. Returns `None` if
  /// not found.
  fn get_by_id(
    &self,
    id: TicketId,
  ) -> impl Future<Output = Result<Option<TicketRecord>, Self::Error>> + Send + '_;

  fn exists(
    &self,
    id: TicketId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Staged writes ─────────────────────────────────────────────────────

  /// Stage a new ticket. The id is assigned on commit.
  fn create(
    &self,
    ticket: NewTicket,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Stage an overwrite of the mutable fields of the row with `ticket.id`:
  /// title, description, category, assignee, status, resolution notes and
  /// resolution date. `date_created` is never touched.
  ///
  /// Returns `false`, staging nothing, if the row no longer exists. Never
  /// creates a row.
  fn update(
    &self,
    ticket: Ticket,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Stage removal of a row. Returns `false` if there was nothing to remove.
  fn delete(
    &self,
    id: TicketId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Stage removal of every row.
  fn clear_all(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Durably apply every staged change and return the number of affected
  /// rows. Two commits touching the same ticket resolve last-commit-wins.
  fn commit(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}

/// Source of the reference data tickets point at.
pub trait ReferenceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  fn list_employees(
    &self,
  ) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send + '_;

  /// Create and persist a category. Takes effect immediately.
  fn add_category(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  /// Create and persist an employee. Takes effect immediately.
  fn add_employee(
    &self,
    full_name: String,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;
}
