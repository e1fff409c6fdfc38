// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed database for ticket storage.
//!
//! The [`Database`] struct owns a single connection and exposes the ticket
//! CRUD operations, all keyed by the ticket's channel id.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

use crate::error::{Error, Result};
use crate::ticket::{Id, NewTicket, Status, Ticket};

/// SQL schema for the ticket database.
pub const SCHEMA: &str = r#"
-- One row per ticket channel
CREATE TABLE IF NOT EXISTS tickets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    channel_id TEXT NOT NULL UNIQUE,
    channel_name TEXT NOT NULL,
    category_id TEXT NOT NULL,
    category_name TEXT NOT NULL,
    opener_id TEXT NOT NULL,
    opener_name TEXT NOT NULL,
    closer_id TEXT,
    closer_name TEXT,
    opened_at TEXT NOT NULL,
    closed_at TEXT,
    status TEXT NOT NULL DEFAULT 'open',
    CHECK (status IN ('open', 'closed'))
);

-- A user holds at most one open ticket
CREATE UNIQUE INDEX IF NOT EXISTS idx_tickets_open_opener
    ON tickets(opener_id) WHERE status = 'open';
CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
"#;

const TICKET_COLUMNS: &str = "channel_id, channel_name, category_id, category_name,
     opener_id, opener_name, closer_id, closer_name, opened_at, closed_at,
     close_reason, status";

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

fn parse_opt<T: std::str::FromStr>(
    value: Option<String>,
    column: &str,
) -> std::result::Result<Option<T>, rusqlite::Error> {
    value.map(|v| parse_db(&v, column)).transpose()
}

fn ticket_from_row(row: &Row<'_>) -> std::result::Result<Ticket, rusqlite::Error> {
    let channel_id: String = row.get(0)?;
    let category_id: String = row.get(2)?;
    let opener_id: String = row.get(4)?;
    let closer_id: Option<String> = row.get(6)?;
    let opened_str: String = row.get(8)?;
    let closed_str: Option<String> = row.get(9)?;
    let status_str: String = row.get(11)?;

    Ok(Ticket {
        channel_id: parse_db(&channel_id, "channel_id")?,
        channel_name: row.get(1)?,
        category_id: parse_db(&category_id, "category_id")?,
        category_name: row.get(3)?,
        opener_id: parse_db(&opener_id, "opener_id")?,
        opener_name: row.get(5)?,
        closer_id: parse_opt(closer_id, "closer_id")?,
        closer_name: row.get(7)?,
        opened_at: parse_timestamp(&opened_str, "opened_at")?,
        closed_at: closed_str
            .map(|s| parse_timestamp(&s, "closed_at"))
            .transpose()?,
        close_reason: row.get(10)?,
        status: parse_db(&status_str, "status")?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

/// Run schema creation and all migrations on a database connection.
///
/// Idempotent: safe to call on every start against new or older files.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    migrate_add_close_reason(conn)?;
    Ok(())
}

/// Migration: Add close_reason column to databases created before it existed.
fn migrate_add_close_reason(conn: &Connection) -> Result<()> {
    let has_column: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM pragma_table_info('tickets') WHERE name = 'close_reason'",
        [],
        |row| row.get(0),
    )?;

    if !has_column {
        conn.execute("ALTER TABLE tickets ADD COLUMN close_reason TEXT", [])?;
    }
    Ok(())
}

/// SQLite database connection with ticket operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Insert a new open ticket.
    ///
    /// Fails with [`Error::AlreadyOpen`] if the opener already holds an open
    /// ticket, or [`Error::DuplicateChannel`] if the channel is already tracked.
    pub fn create_ticket(&self, new: &NewTicket, opened_at: DateTime<Utc>) -> Result<Ticket> {
        let ticket = Ticket::open(new.clone(), opened_at);
        let inserted = self.conn.execute(
            "INSERT INTO tickets (channel_id, channel_name, category_id, category_name,
             opener_id, opener_name, opened_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                ticket.channel_id.to_string(),
                ticket.channel_name,
                ticket.category_id.to_string(),
                ticket.category_name,
                ticket.opener_id.to_string(),
                ticket.opener_name,
                ticket.opened_at.to_rfc3339(),
                ticket.status.as_str(),
            ],
        );

        match inserted {
            Ok(_) => Ok(ticket),
            Err(e) if is_constraint_violation(&e) => {
                if let Some(existing) = self.find_open_by_opener(new.opener_id)? {
                    Err(Error::AlreadyOpen {
                        opener_id: new.opener_id.to_string(),
                        channel_id: existing.channel_id.to_string(),
                    })
                } else {
                    Err(Error::DuplicateChannel(new.channel_id.to_string()))
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get a ticket by channel id.
    pub fn get_ticket(&self, channel_id: Id) -> Result<Ticket> {
        self.find_ticket(channel_id)?
            .ok_or_else(|| Error::TicketNotFound(channel_id.to_string()))
    }

    /// Look up a ticket by channel id, open or closed.
    pub fn find_ticket(&self, channel_id: Id) -> Result<Option<Ticket>> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE channel_id = ?1");
        let ticket = self
            .conn
            .query_row(&sql, params![channel_id.to_string()], ticket_from_row)
            .optional()?;
        Ok(ticket)
    }

    /// Look up the open ticket tracked for a channel.
    pub fn find_open_ticket(&self, channel_id: Id) -> Result<Option<Ticket>> {
        Ok(self.find_ticket(channel_id)?.filter(Ticket::is_open))
    }

    /// Find the open ticket held by a user, if any.
    pub fn find_open_by_opener(&self, opener_id: Id) -> Result<Option<Ticket>> {
        let sql = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE opener_id = ?1 AND status = 'open'"
        );
        let ticket = self
            .conn
            .query_row(&sql, params![opener_id.to_string()], ticket_from_row)
            .optional()?;
        Ok(ticket)
    }

    /// Close an open ticket.
    ///
    /// The status check and the write are one statement, so when two staff
    /// members close the same ticket only one of them succeeds; the other
    /// gets [`Error::AlreadyClosed`].
    pub fn close_ticket(
        &mut self,
        channel_id: Id,
        closer_id: Id,
        closer_name: &str,
        reason: Option<&str>,
        closed_at: DateTime<Utc>,
    ) -> Result<Ticket> {
        let affected = self.conn.execute(
            "UPDATE tickets SET closer_id = ?1, closer_name = ?2, closed_at = ?3,
             close_reason = ?4, status = 'closed'
             WHERE channel_id = ?5 AND status = 'open'",
            params![
                closer_id.to_string(),
                closer_name,
                closed_at.to_rfc3339(),
                reason,
                channel_id.to_string(),
            ],
        )?;

        if affected == 0 {
            return match self.find_ticket(channel_id)? {
                Some(ticket) if !ticket.status.can_transition_to(Status::Closed) => {
                    Err(Error::AlreadyClosed(channel_id.to_string()))
                }
                Some(ticket) => Err(Error::CorruptedData(format!(
                    "ticket {} is {} but could not be closed",
                    channel_id, ticket.status
                ))),
                None => Err(Error::TicketNotFound(channel_id.to_string())),
            };
        }
        self.get_ticket(channel_id)
    }

    /// Rename an open ticket's channel.
    pub fn rename_ticket(&mut self, channel_id: Id, new_name: &str) -> Result<()> {
        if new_name.trim().is_empty() {
            return Err(Error::InvalidInput("ticket name cannot be empty".to_string()));
        }
        let affected = self.conn.execute(
            "UPDATE tickets SET channel_name = ?1 WHERE channel_id = ?2 AND status = 'open'",
            params![new_name, channel_id.to_string()],
        )?;
        self.require_open_update(channel_id, affected)
    }

    /// Move an open ticket to another category.
    pub fn move_ticket(
        &mut self,
        channel_id: Id,
        category_id: Id,
        category_name: &str,
    ) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE tickets SET category_id = ?1, category_name = ?2
             WHERE channel_id = ?3 AND status = 'open'",
            params![category_id.to_string(), category_name, channel_id.to_string()],
        )?;
        self.require_open_update(channel_id, affected)
    }

    fn require_open_update(&self, channel_id: Id, affected: usize) -> Result<()> {
        if affected > 0 {
            return Ok(());
        }
        match self.find_ticket(channel_id)? {
            Some(_) => Err(Error::TicketNotOpen(channel_id.to_string())),
            None => Err(Error::TicketNotFound(channel_id.to_string())),
        }
    }

    /// Delete the row for a channel, but only while the ticket is open.
    ///
    /// Closed rows are the archive and are never removed. Returns true if a
    /// row was deleted.
    pub fn delete_open_ticket(&mut self, channel_id: Id) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM tickets WHERE channel_id = ?1 AND status = 'open'",
            params![channel_id.to_string()],
        )?;
        Ok(affected > 0)
    }

    /// List tickets, newest first, optionally filtered by status.
    pub fn list_tickets(&self, status: Option<Status>) -> Result<Vec<Ticket>> {
        let mut sql = format!("SELECT {TICKET_COLUMNS} FROM tickets");
        let mut params_vec: Vec<String> = Vec::new();

        if let Some(s) = status {
            sql.push_str(" WHERE status = ?");
            params_vec.push(s.as_str().to_string());
        }
        sql.push_str(" ORDER BY opened_at DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec
            .iter()
            .map(|s| s as &dyn rusqlite::ToSql)
            .collect();

        let tickets = stmt
            .query_map(params_refs.as_slice(), ticket_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tickets)
    }

    /// Count tickets as `(open, closed)`.
    pub fn count_by_status(&self) -> Result<(usize, usize)> {
        let (open, closed): (i64, i64) = self.conn.query_row(
            "SELECT
                 COALESCE(SUM(CASE WHEN status = 'open' THEN 1 ELSE 0 END), 0),
                 COALESCE(SUM(CASE WHEN status = 'closed' THEN 1 ELSE 0 END), 0)
             FROM tickets",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok((
            usize::try_from(open).unwrap_or(0),
            usize::try_from(closed).unwrap_or(0),
        ))
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
