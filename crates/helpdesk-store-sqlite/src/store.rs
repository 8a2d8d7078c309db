//! [`SqliteStore`]: the SQLite implementation of [`TicketStore`] and
//! [`ReferenceStore`].

use std::{
  path::Path,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rusqlite::OptionalExtension as _;
use tracing::debug;

use helpdesk_core::{
  reference::{Category, Employee},
  store::{ReferenceStore, TicketQuery, TicketStore},
  ticket::{NewTicket, Ticket, TicketId, TicketRecord},
};

use crate::{
  Result,
  encode::{
    RawTicket, TICKET_COLUMNS, TICKET_JOINS, encode_dt, encode_keyword,
    encode_status,
  },
  schema::SCHEMA,
};

// ─── Staged changes ──────────────────────────────────────────────────────────

/// Column values shared by inserts and updates, already encoded for SQLite.
struct TicketColumns {
  issue_title:          String,
  description:          Option<String>,
  category_id:          i64,
  assigned_employee_id: Option<i64>,
  status:               &'static str,
  date_resolved:        Option<String>,
  resolution_notes:     Option<String>,
}

enum PendingChange {
  Insert { columns: TicketColumns, date_created: String },
  Update { id: TicketId, columns: TicketColumns },
  Delete(TicketId),
  Clear,
}

impl PendingChange {
  /// Whether this change removes row `id` once committed.
  fn removes(&self, id: TicketId) -> bool {
    match self {
      Self::Delete(d) => *d == id,
      Self::Clear => true,
      Self::Insert { .. } | Self::Update { .. } => false,
    }
  }

  /// Execute against an open transaction; returns the affected row count.
  fn apply(&self, tx: &rusqlite::Transaction<'_>) -> rusqlite::Result<usize> {
    match self {
      Self::Insert { columns: c, date_created } => tx.execute(
        "INSERT INTO tickets (
           issue_title, description, category_id, assigned_employee_id,
           status, date_created, date_resolved, resolution_notes
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
          c.issue_title,
          c.description,
          c.category_id,
          c.assigned_employee_id,
          c.status,
          date_created,
          c.date_resolved,
          c.resolution_notes,
        ],
      ),
      Self::Update { id, columns: c } => tx.execute(
        "UPDATE tickets SET
           issue_title          = ?2,
           description          = ?3,
           category_id          = ?4,
           assigned_employee_id = ?5,
           status               = ?6,
           date_resolved        = ?7,
           resolution_notes     = ?8
         WHERE id = ?1",
        rusqlite::params![
          id,
          c.issue_title,
          c.description,
          c.category_id,
          c.assigned_employee_id,
          c.status,
          c.date_resolved,
          c.resolution_notes,
        ],
      ),
      Self::Delete(id) => {
        tx.execute("DELETE FROM tickets WHERE id = ?1", rusqlite::params![id])
      }
      Self::Clear => tx.execute("DELETE FROM tickets", []),
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A help desk store backed by a single SQLite file.
///
/// Ticket writes are staged in memory and applied together by
/// [`TicketStore::commit`]. Reference data writes take effect immediately.
///
/// Clones share the connection and the staging area.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  pending: Arc<Mutex<Vec<PendingChange>>>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, pending: Arc::default() })
  }

  /// Number of changes waiting for the next commit.
  pub fn staged(&self) -> usize { self.pending().len() }

  fn pending(&self) -> MutexGuard<'_, Vec<PendingChange>> {
    self.pending.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn stage(&self, change: PendingChange) { self.pending().push(change); }

  /// Whether row `id` exists and no staged change already removes it.
  async fn is_live(&self, id: TicketId) -> Result<bool> {
    if !self.exists(id).await? {
      return Ok(false);
    }
    Ok(!self.pending().iter().any(|c| c.removes(id)))
  }
}

impl From<NewTicket> for PendingChange {
  fn from(t: NewTicket) -> Self {
    Self::Insert {
      date_created: encode_dt(t.date_created),
      columns:      TicketColumns {
        issue_title:          t.issue_title,
        description:          t.description,
        category_id:          t.category_id,
        assigned_employee_id: t.assigned_employee_id,
        status:               encode_status(t.status),
        date_resolved:        t.date_resolved.map(encode_dt),
        resolution_notes:     t.resolution_notes,
      },
    }
  }
}

/// `date_created` is dropped: updates never touch it.
impl From<Ticket> for PendingChange {
  fn from(t: Ticket) -> Self {
    Self::Update {
      id:      t.id,
      columns: TicketColumns {
        issue_title:          t.issue_title,
        description:          t.description,
        category_id:          t.category_id,
        assigned_employee_id: t.assigned_employee_id,
        status:               encode_status(t.status),
        date_resolved:        t.date_resolved.map(encode_dt),
        resolution_notes:     t.resolution_notes,
      },
    }
  }
}

// ─── TicketStore impl ────────────────────────────────────────────────────────

impl TicketStore for SqliteStore {
  type Error = crate::Error;

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list(&self, query: &TicketQuery) -> Result<Vec<TicketRecord>> {
    let query = query.normalized();
    let status      = query.status.status().map(encode_status);
    let category_id = query.category_id;
    let keyword     = query.keyword.as_deref().map(encode_keyword);

    let raws: Vec<RawTicket> = self
      .conn
      .call(move |conn| {
        // Each filter is disabled by binding NULL.
        let sql = format!(
          "SELECT {TICKET_COLUMNS} {TICKET_JOINS}
           WHERE (?1 IS NULL OR t.status = ?1)
             AND (?2 IS NULL OR t.category_id = ?2)
             AND (?3 IS NULL
                  OR t.issue_title LIKE ?3 ESCAPE '\\'
                  OR e.full_name   LIKE ?3 ESCAPE '\\')
           ORDER BY t.id"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![status, category_id, keyword],
            RawTicket::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTicket::into_record).collect()
  }

  async fn get_by_id(&self, id: TicketId) -> Result<Option<TicketRecord>> {
    let raw: Option<RawTicket> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {TICKET_COLUMNS} {TICKET_JOINS} WHERE t.id = ?1"),
            rusqlite::params![id],
            RawTicket::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawTicket::into_record).transpose()
  }

  async fn exists(&self, id: TicketId) -> Result<bool> {
    let found = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT 1 FROM tickets WHERE id = ?1",
            rusqlite::params![id],
            |_| Ok(()),
          )
          .optional()?)
      })
      .await?;
    Ok(found.is_some())
  }

  // ── Staged writes ─────────────────────────────────────────────────────────

  async fn create(&self, ticket: NewTicket) -> Result<()> {
    self.stage(ticket.into());
    Ok(())
  }

  async fn update(&self, ticket: Ticket) -> Result<bool> {
    if !self.is_live(ticket.id).await? {
      return Ok(false);
    }
    self.stage(ticket.into());
    Ok(true)
  }

  async fn delete(&self, id: TicketId) -> Result<bool> {
    if !self.is_live(id).await? {
      return Ok(false);
    }
    self.stage(PendingChange::Delete(id));
    Ok(true)
  }

  async fn clear_all(&self) -> Result<()> {
    self.stage(PendingChange::Clear);
    Ok(())
  }

  async fn commit(&self) -> Result<usize> {
    // Taken up front: a failed commit rolls back and drops the batch.
    let changes = std::mem::take(&mut *self.pending());
    if changes.is_empty() {
      return Ok(0);
    }
    let staged = changes.len();

    let affected = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut affected = 0;
        for change in &changes {
          affected += change.apply(&tx)?;
        }
        tx.commit()?;
        Ok(affected)
      })
      .await?;

    debug!(staged, affected, "committed ticket changes");
    Ok(affected)
  }
}

// ─── ReferenceStore impl ─────────────────────────────────────────────────────

impl ReferenceStore for SqliteStore {
  type Error = crate::Error;

  async fn list_categories(&self) -> Result<Vec<Category>> {
    let categories = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, name FROM categories ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Category { id: row.get(0)?, name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(categories)
  }

  async fn list_employees(&self) -> Result<Vec<Employee>> {
    let employees = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, full_name FROM employees ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Employee { id: row.get(0)?, full_name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(employees)
  }

  async fn add_category(&self, name: String) -> Result<Category> {
    let category = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO categories (name) VALUES (?1)",
          rusqlite::params![name],
        )?;
        Ok(Category { id: conn.last_insert_rowid(), name })
      })
      .await?;
    Ok(category)
  }

  async fn add_employee(&self, full_name: String) -> Result<Employee> {
    let employee = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO employees (full_name) VALUES (?1)",
          rusqlite::params![full_name],
        )?;
        Ok(Employee { id: conn.last_insert_rowid(), full_name })
      })
      .await?;
    Ok(employee)
  }
}
