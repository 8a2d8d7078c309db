//! SQL schema for the help desk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS categories (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS employees (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name  TEXT NOT NULL
);

-- Status is stored as its display text ('New' | 'In Progress' | 'Resolved' |
-- 'Closed'). The store does not police it; the service does.
CREATE TABLE IF NOT EXISTS tickets (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_title           TEXT NOT NULL,
    description           TEXT,
    category_id           INTEGER NOT NULL REFERENCES categories(id),
    assigned_employee_id  INTEGER REFERENCES employees(id),
    status                TEXT NOT NULL,
    date_created          TEXT NOT NULL,   -- RFC 3339 UTC; set once
    date_resolved         TEXT,            -- RFC 3339 UTC or NULL
    resolution_notes      TEXT
);

CREATE INDEX IF NOT EXISTS tickets_status_idx   ON tickets(status);
CREATE INDEX IF NOT EXISTS tickets_category_idx ON tickets(category_id);

PRAGMA user_version = 1;
";
