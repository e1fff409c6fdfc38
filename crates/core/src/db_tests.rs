// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use chrono::{Duration, TimeZone};

fn new_ticket(channel: u64, opener: u64) -> NewTicket {
    NewTicket {
        channel_id: Id(channel),
        channel_name: format!("ticket-user{opener}"),
        category_id: Id(500),
        category_name: "Assistance".to_string(),
        opener_id: Id(opener),
        opener_name: format!("user{opener}"),
    }
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

#[test]
fn create_and_get_ticket() {
    let db = Database::open_in_memory().unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();

    let ticket = db.get_ticket(Id(10)).unwrap();
    assert_eq!(ticket.channel_name, "ticket-user1");
    assert_eq!(ticket.opener_id, Id(1));
    assert_eq!(ticket.status, Status::Open);
    assert_eq!(ticket.opened_at, at(0));
    assert!(ticket.closer_id.is_none());
}

#[test]
fn get_missing_ticket_is_not_found() {
    let db = Database::open_in_memory().unwrap();
    let err = db.get_ticket(Id(404)).unwrap_err();
    assert!(matches!(err, Error::TicketNotFound(_)));
    assert!(db.find_ticket(Id(404)).unwrap().is_none());
}

#[test]
fn second_open_ticket_for_same_user_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();

    let err = db.create_ticket(&new_ticket(11, 1), at(1)).unwrap_err();
    match err {
        Error::AlreadyOpen {
            opener_id,
            channel_id,
        } => {
            assert_eq!(opener_id, "1");
            assert_eq!(channel_id, "10");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn user_can_open_again_after_close() {
    let mut db = Database::open_in_memory().unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();
    db.close_ticket(Id(10), Id(99), "staff", Some("resolved"), at(5))
        .unwrap();

    db.create_ticket(&new_ticket(11, 1), at(10)).unwrap();
    let open = db.find_open_by_opener(Id(1)).unwrap().unwrap();
    assert_eq!(open.channel_id, Id(11));
}

#[test]
fn duplicate_channel_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();
    let err = db.create_ticket(&new_ticket(10, 2), at(1)).unwrap_err();
    assert!(matches!(err, Error::DuplicateChannel(_)));
}

#[test]
fn close_ticket_records_closer() {
    let mut db = Database::open_in_memory().unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();

    let closed = db
        .close_ticket(Id(10), Id(99), "staff", Some("resolved"), at(60))
        .unwrap();
    assert_eq!(closed.status, Status::Closed);
    assert_eq!(closed.closer_id, Some(Id(99)));
    assert_eq!(closed.closer_name.as_deref(), Some("staff"));
    assert_eq!(closed.closed_at, Some(at(60)));
    assert_eq!(closed.close_reason.as_deref(), Some("resolved"));
}

#[test]
fn second_close_loses_the_race() {
    let mut db = Database::open_in_memory().unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();

    db.close_ticket(Id(10), Id(99), "first", None, at(1)).unwrap();
    let err = db
        .close_ticket(Id(10), Id(98), "second", None, at(2))
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyClosed(_)));

    // First closer is preserved
    let ticket = db.get_ticket(Id(10)).unwrap();
    assert_eq!(ticket.closer_name.as_deref(), Some("first"));
}

#[test]
fn close_missing_ticket_is_not_found() {
    let mut db = Database::open_in_memory().unwrap();
    let err = db
        .close_ticket(Id(10), Id(99), "staff", None, at(0))
        .unwrap_err();
    assert!(matches!(err, Error::TicketNotFound(_)));
}

#[test]
fn rename_only_open_tickets() {
    let mut db = Database::open_in_memory().unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();

    db.rename_ticket(Id(10), "billing-question").unwrap();
    assert_eq!(db.get_ticket(Id(10)).unwrap().channel_name, "billing-question");

    db.close_ticket(Id(10), Id(99), "staff", None, at(1)).unwrap();
    let err = db.rename_ticket(Id(10), "late").unwrap_err();
    assert!(matches!(err, Error::TicketNotOpen(_)));
}

#[test]
fn rename_rejects_empty_name() {
    let mut db = Database::open_in_memory().unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();
    assert!(matches!(
        db.rename_ticket(Id(10), "  ").unwrap_err(),
        Error::InvalidInput(_)
    ));
}

#[test]
fn move_ticket_updates_category() {
    let mut db = Database::open_in_memory().unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();

    db.move_ticket(Id(10), Id(600), "Billing").unwrap();
    let ticket = db.get_ticket(Id(10)).unwrap();
    assert_eq!(ticket.category_id, Id(600));
    assert_eq!(ticket.category_name, "Billing");

    let err = db.move_ticket(Id(77), Id(600), "Billing").unwrap_err();
    assert!(matches!(err, Error::TicketNotFound(_)));
}

#[test]
fn delete_open_ticket_keeps_closed_archive() {
    let mut db = Database::open_in_memory().unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();
    db.create_ticket(&new_ticket(11, 2), at(1)).unwrap();
    db.close_ticket(Id(11), Id(99), "staff", None, at(2)).unwrap();

    assert!(db.delete_open_ticket(Id(10)).unwrap());
    assert!(!db.delete_open_ticket(Id(11)).unwrap());
    assert!(!db.delete_open_ticket(Id(12)).unwrap());

    assert!(db.find_ticket(Id(10)).unwrap().is_none());
    assert!(db.find_ticket(Id(11)).unwrap().is_some());
}

#[test]
fn find_open_ticket_ignores_closed() {
    let mut db = Database::open_in_memory().unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();
    assert!(db.find_open_ticket(Id(10)).unwrap().is_some());

    db.close_ticket(Id(10), Id(99), "staff", None, at(1)).unwrap();
    assert!(db.find_open_ticket(Id(10)).unwrap().is_none());
    assert!(db.find_open_by_opener(Id(1)).unwrap().is_none());
}

#[test]
fn list_tickets_filters_and_orders_newest_first() {
    let mut db = Database::open_in_memory().unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();
    db.create_ticket(&new_ticket(11, 2), at(100)).unwrap();
    db.create_ticket(&new_ticket(12, 3), at(200)).unwrap();
    db.close_ticket(Id(11), Id(99), "staff", None, at(300)).unwrap();

    let all = db.list_tickets(None).unwrap();
    let ids: Vec<Id> = all.iter().map(|t| t.channel_id).collect();
    assert_eq!(ids, vec![Id(12), Id(11), Id(10)]);

    let open = db.list_tickets(Some(Status::Open)).unwrap();
    assert_eq!(open.len(), 2);
    assert!(open.iter().all(Ticket::is_open));

    let closed = db.list_tickets(Some(Status::Closed)).unwrap();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].channel_id, Id(11));
}

#[test]
fn count_by_status_on_empty_and_mixed() {
    let mut db = Database::open_in_memory().unwrap();
    assert_eq!(db.count_by_status().unwrap(), (0, 0));

    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();
    db.create_ticket(&new_ticket(11, 2), at(0) + Duration::seconds(1))
        .unwrap();
    db.close_ticket(Id(10), Id(99), "staff", None, at(5)).unwrap();
    assert_eq!(db.count_by_status().unwrap(), (1, 1));
}

#[test]
fn migrations_are_idempotent() {
    let db = Database::open_in_memory().unwrap();
    run_migrations(&db.conn).unwrap();
    run_migrations(&db.conn).unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();
}

#[test]
fn migration_reports_unreadable_database() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("tickets.db");
    std::fs::write(&path, vec![b'x'; 4096]).unwrap();
    let conn = Connection::open(&path).unwrap();

    let err = migrate_add_close_reason(&conn).unwrap_err();

    match err {
        Error::Database(e) => assert!(!e.to_string().contains("duplicate column")),
        other => panic!("expected database error, got {other:?}"),
    }
}

#[test]
fn migration_adds_close_reason_to_old_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE tickets (
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
            status TEXT NOT NULL DEFAULT 'open'
        );",
    )
    .unwrap();

    run_migrations(&conn).unwrap();
    let has_column: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM pragma_table_info('tickets') WHERE name = 'close_reason'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(has_column);
}

#[test]
fn open_creates_parent_directories() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("nested/dir/tickets.db");

    {
        let db = Database::open(&path).unwrap();
        db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();
    }

    let reopened = Database::open(&path).unwrap();
    assert_eq!(reopened.get_ticket(Id(10)).unwrap().opener_id, Id(1));
}

#[test]
fn corrupted_timestamp_surfaces_as_error() {
    let db = Database::open_in_memory().unwrap();
    db.create_ticket(&new_ticket(10, 1), at(0)).unwrap();
    db.conn
        .execute(
            "UPDATE tickets SET opened_at = 'yesterday' WHERE channel_id = '10'",
            [],
        )
        .unwrap();
    assert!(db.get_ticket(Id(10)).is_err());
}
