//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone as _, Utc};
use helpdesk_core::{
  reference::{CategoryId, EmployeeId},
  service::{Outcome, TicketService},
  store::{ReferenceStore, TicketQuery, TicketStore},
  ticket::{NewTicket, StatusFilter, TicketDraft, TicketId, TicketStatus},
};
use mockable::DefaultClock;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

struct Seeded {
  store:    SqliteStore,
  hardware: CategoryId,
  network:  CategoryId,
  jamie:    EmployeeId,
  priya:    EmployeeId,
}

async fn seeded() -> Seeded {
  let store = store().await;
  let hardware = store.add_category("Hardware".into()).await.unwrap().id;
  let network = store.add_category("Network".into()).await.unwrap().id;
  let jamie = store.add_employee("Jamie Rivera".into()).await.unwrap().id;
  let priya = store.add_employee("Priya Jamison".into()).await.unwrap().id;
  Seeded { store, hardware, network, jamie, priya }
}

fn at(secs: i64) -> DateTime<Utc> {
  Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn new_ticket(
  title: &str,
  category_id: CategoryId,
  assignee: Option<EmployeeId>,
  status: TicketStatus,
) -> NewTicket {
  let terminal = status.is_terminal();
  NewTicket {
    issue_title:          title.into(),
    description:          None,
    category_id,
    assigned_employee_id: assignee,
    status,
    date_created:         at(0),
    date_resolved:        terminal.then(|| at(60)),
    resolution_notes:     terminal.then(|| "fixed".to_owned()),
  }
}

async fn insert(store: &SqliteStore, ticket: NewTicket) -> TicketId {
  store.create(ticket).await.unwrap();
  store.commit().await.unwrap();
  store
    .list(&TicketQuery::default())
    .await
    .unwrap()
    .last()
    .map(|r| r.ticket.id)
    .expect("inserted ticket")
}

fn titles(records: &[helpdesk_core::ticket::TicketRecord]) -> Vec<&str> {
  records.iter().map(|r| r.ticket.issue_title.as_str()).collect()
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn reference_data_roundtrip() {
  let s = seeded().await;

  let categories = s.store.list_categories().await.unwrap();
  assert_eq!(
    categories.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
    ["Hardware", "Network"]
  );
  assert_eq!(categories[0].id, s.hardware);

  let employees = s.store.list_employees().await.unwrap();
  assert_eq!(employees.len(), 2);
  assert_eq!(employees[1].full_name, "Priya Jamison");
}

#[tokio::test]
async fn duplicate_category_name_errors() {
  let s = seeded().await;
  assert!(s.store.add_category("Hardware".into()).await.is_err());
}

// ─── Staging and commit ──────────────────────────────────────────────────────

#[tokio::test]
async fn create_is_invisible_until_commit() {
  let s = seeded().await;

  s.store
    .create(new_ticket("Printer jam", s.hardware, None, TicketStatus::New))
    .await
    .unwrap();
  assert_eq!(s.store.staged(), 1);
  assert!(s.store.list(&TicketQuery::default()).await.unwrap().is_empty());

  assert_eq!(s.store.commit().await.unwrap(), 1);
  assert_eq!(s.store.staged(), 0);

  let all = s.store.list(&TicketQuery::default()).await.unwrap();
  assert_eq!(all.len(), 1);
  assert!(all[0].ticket.id > 0);
  assert_eq!(all[0].ticket.date_created, at(0));
}

#[tokio::test]
async fn commit_assigns_distinct_ids() {
  let s = seeded().await;

  for title in ["A", "B", "C"] {
    s.store
      .create(new_ticket(title, s.hardware, None, TicketStatus::New))
      .await
      .unwrap();
  }
  assert_eq!(s.store.commit().await.unwrap(), 3);

  let all = s.store.list(&TicketQuery::default()).await.unwrap();
  let ids: Vec<_> = all.iter().map(|r| r.ticket.id).collect();
  assert_eq!(titles(&all), ["A", "B", "C"]);
  assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn commit_with_nothing_staged_affects_nothing() {
  let s = store().await;
  assert_eq!(s.commit().await.unwrap(), 0);
}

#[tokio::test]
async fn failed_commit_rolls_back_and_discards_batch() {
  let s = seeded().await;

  s.store
    .create(new_ticket("Good", s.hardware, None, TicketStatus::New))
    .await
    .unwrap();
  s.store
    .create(new_ticket("Orphan", 999, None, TicketStatus::New))
    .await
    .unwrap();

  let err = s.store.commit().await.unwrap_err();
  assert!(err.to_string().contains("FOREIGN KEY"), "{err}");
  assert_eq!(s.store.staged(), 0);
  assert!(s.store.list(&TicketQuery::default()).await.unwrap().is_empty());
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_by_id_resolves_reference_names() {
  let s = seeded().await;
  let id = insert(
    &s.store,
    new_ticket("Printer jam", s.hardware, Some(s.jamie), TicketStatus::Resolved),
  )
  .await;

  let record = s.store.get_by_id(id).await.unwrap().unwrap();
  assert_eq!(record.category_name.as_deref(), Some("Hardware"));
  assert_eq!(record.assigned_employee_name.as_deref(), Some("Jamie Rivera"));
  assert_eq!(record.ticket.status, TicketStatus::Resolved);
  assert_eq!(record.ticket.date_resolved, Some(at(60)));
  assert_eq!(record.ticket.resolution_notes.as_deref(), Some("fixed"));

  assert!(s.store.get_by_id(id + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn unassigned_ticket_has_no_employee_name() {
  let s = seeded().await;
  let id = insert(
    &s.store,
    new_ticket("VPN down", s.network, None, TicketStatus::New),
  )
  .await;

  let record = s.store.get_by_id(id).await.unwrap().unwrap();
  assert_eq!(record.assigned_employee_name, None);
  assert_eq!(record.ticket.date_resolved, None);
}

#[tokio::test]
async fn exists_reflects_committed_rows() {
  let s = seeded().await;
  let id = insert(
    &s.store,
    new_ticket("VPN down", s.network, None, TicketStatus::New),
  )
  .await;

  assert!(s.store.exists(id).await.unwrap());
  assert!(!s.store.exists(id + 1).await.unwrap());
}

// ─── Filtering ───────────────────────────────────────────────────────────────

async fn filter_fixture() -> Seeded {
  let s = seeded().await;
  let rows = [
    ("Printer jam", s.hardware, Some(s.jamie), TicketStatus::New),
    ("Paper JAM in tray 2", s.hardware, None, TicketStatus::InProgress),
    ("VPN down", s.network, Some(s.priya), TicketStatus::Resolved),
    ("Wi-Fi slow", s.network, None, TicketStatus::Closed),
    ("100% CPU on kiosk", s.hardware, None, TicketStatus::New),
  ];
  for (title, category, assignee, status) in rows {
    s.store
      .create(new_ticket(title, category, assignee, status))
      .await
      .unwrap();
  }
  s.store.commit().await.unwrap();
  s
}

#[tokio::test]
async fn list_without_filters_returns_everything_in_id_order() {
  let s = filter_fixture().await;
  let all = s.store.list(&TicketQuery::default()).await.unwrap();
  assert_eq!(
    titles(&all),
    [
      "Printer jam",
      "Paper JAM in tray 2",
      "VPN down",
      "Wi-Fi slow",
      "100% CPU on kiosk",
    ]
  );
}

#[tokio::test]
async fn list_filters_by_status() {
  let s = filter_fixture().await;
  let q = TicketQuery::new(StatusFilter::Only(TicketStatus::New), None, None);
  let hits = s.store.list(&q).await.unwrap();
  assert_eq!(titles(&hits), ["Printer jam", "100% CPU on kiosk"]);
}

#[tokio::test]
async fn list_filters_by_category() {
  let s = filter_fixture().await;
  let q = TicketQuery::new(StatusFilter::All, Some(s.network), None);
  let hits = s.store.list(&q).await.unwrap();
  assert_eq!(titles(&hits), ["VPN down", "Wi-Fi slow"]);
}

#[tokio::test]
async fn keyword_matches_title_or_assignee_case_insensitively() {
  let s = filter_fixture().await;

  // "Priya Jamison" matches through the assignee name only.
  let q = TicketQuery::new(StatusFilter::All, None, Some("jam"));
  let hits = s.store.list(&q).await.unwrap();
  assert_eq!(titles(&hits), ["Printer jam", "Paper JAM in tray 2", "VPN down"]);
}

#[tokio::test]
async fn keyword_wildcards_are_literal() {
  let s = filter_fixture().await;

  let q = TicketQuery::new(StatusFilter::All, None, Some("100%"));
  assert_eq!(titles(&s.store.list(&q).await.unwrap()), ["100% CPU on kiosk"]);

  let q = TicketQuery::new(StatusFilter::All, None, Some("_"));
  assert!(s.store.list(&q).await.unwrap().is_empty());
}

#[tokio::test]
async fn filters_combine() {
  let s = filter_fixture().await;
  let q = TicketQuery::new(
    StatusFilter::Only(TicketStatus::InProgress),
    Some(s.hardware),
    Some("jam"),
  );
  assert_eq!(titles(&s.store.list(&q).await.unwrap()), ["Paper JAM in tray 2"]);
}

// ─── Update / delete / clear ─────────────────────────────────────────────────

#[tokio::test]
async fn update_overwrites_mutable_fields_only() {
  let s = seeded().await;
  let id = insert(
    &s.store,
    new_ticket("Printer jam", s.hardware, None, TicketStatus::New),
  )
  .await;

  let mut ticket = s.store.get_by_id(id).await.unwrap().unwrap().ticket;
  ticket.issue_title = "Printer jam (floor 3)".into();
  ticket.description = Some("Tray 2".into());
  ticket.category_id = s.network;
  ticket.assigned_employee_id = Some(s.priya);
  ticket.status = TicketStatus::Closed;
  ticket.date_resolved = Some(at(90));
  ticket.resolution_notes = Some("Cleared".into());
  ticket.date_created = at(5000);

  assert!(s.store.update(ticket).await.unwrap());
  assert_eq!(s.store.commit().await.unwrap(), 1);

  let record = s.store.get_by_id(id).await.unwrap().unwrap();
  assert_eq!(record.ticket.issue_title, "Printer jam (floor 3)");
  assert_eq!(record.ticket.description.as_deref(), Some("Tray 2"));
  assert_eq!(record.category_name.as_deref(), Some("Network"));
  assert_eq!(record.assigned_employee_name.as_deref(), Some("Priya Jamison"));
  assert_eq!(record.ticket.status, TicketStatus::Closed);
  assert_eq!(record.ticket.date_resolved, Some(at(90)));
  assert_eq!(record.ticket.resolution_notes.as_deref(), Some("Cleared"));
  assert_eq!(record.ticket.date_created, at(0));
}

#[tokio::test]
async fn update_of_missing_row_is_a_no_op() {
  let s = seeded().await;
  let id = insert(
    &s.store,
    new_ticket("Printer jam", s.hardware, None, TicketStatus::New),
  )
  .await;
  let mut ticket = s.store.get_by_id(id).await.unwrap().unwrap().ticket;
  ticket.id += 1;

  assert!(!s.store.update(ticket).await.unwrap());
  assert_eq!(s.store.staged(), 0);
  assert_eq!(s.store.list(&TicketQuery::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_removes_row_and_reports_missing() {
  let s = seeded().await;
  let id = insert(
    &s.store,
    new_ticket("Printer jam", s.hardware, None, TicketStatus::New),
  )
  .await;

  assert!(!s.store.delete(id + 1).await.unwrap());
  assert!(s.store.delete(id).await.unwrap());
  // A second delete in the same batch finds nothing left to remove.
  assert!(!s.store.delete(id).await.unwrap());
  assert_eq!(s.store.commit().await.unwrap(), 1);

  assert!(!s.store.exists(id).await.unwrap());
}

#[tokio::test]
async fn staged_clear_hides_rows_from_later_updates() {
  let s = seeded().await;
  let id = insert(
    &s.store,
    new_ticket("Printer jam", s.hardware, None, TicketStatus::New),
  )
  .await;
  let ticket = s.store.get_by_id(id).await.unwrap().unwrap().ticket;

  s.store.clear_all().await.unwrap();
  assert!(!s.store.update(ticket).await.unwrap());
  assert_eq!(s.store.commit().await.unwrap(), 1);
}

#[tokio::test]
async fn clear_all_removes_every_row() {
  let s = filter_fixture().await;

  s.store.clear_all().await.unwrap();
  assert_eq!(s.store.commit().await.unwrap(), 5);
  assert!(s.store.list(&TicketQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn store_reopens_from_file() {
  let path = std::env::temp_dir().join(format!(
    "helpdesk-store-test-{}-{}.db",
    std::process::id(),
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
  ));

  {
    let store = SqliteStore::open(&path).await.unwrap();
    let cat = store.add_category("Hardware".into()).await.unwrap();
    insert(&store, new_ticket("Printer jam", cat.id, None, TicketStatus::New))
      .await;
  }

  let store = SqliteStore::open(&path).await.unwrap();
  let all = store.list(&TicketQuery::default()).await.unwrap();
  assert_eq!(titles(&all), ["Printer jam"]);

  drop(store);
  for suffix in ["", "-wal", "-shm"] {
    let mut p = path.clone().into_os_string();
    p.push(suffix);
    let _ = std::fs::remove_file(p);
  }
}

// ─── Service over SQLite ─────────────────────────────────────────────────────

fn service(store: &SqliteStore) -> TicketService<SqliteStore, DefaultClock> {
  TicketService::new(Arc::new(store.clone()), Arc::new(DefaultClock))
}

#[tokio::test]
async fn service_creates_printer_jam_ticket() {
  let s = seeded().await;
  let svc = service(&s.store);

  let before = Utc::now();
  let out = svc
    .create(TicketDraft::new("Printer jam", s.hardware, TicketStatus::New))
    .await;
  let after = Utc::now();

  assert_eq!(out, Outcome::Ok("Ticket added successfully.".into()));

  let views = svc.list(&TicketQuery::default()).await;
  assert_eq!(views.len(), 1);
  let view = &views[0];
  assert_eq!(view.category.as_deref(), Some("Hardware"));
  assert!(view.date_created >= before - Duration::seconds(1));
  assert!(view.date_created <= after);
  assert_eq!(view.date_resolved, None);
  assert_eq!(view.resolution_notes, None);
}

#[tokio::test]
async fn service_resolves_and_reopens_ticket() {
  let s = seeded().await;
  let svc = service(&s.store);

  let draft = TicketDraft::new("Printer jam", s.hardware, TicketStatus::InProgress)
    .with_assignee(s.jamie);
  assert!(svc.create(draft.clone()).await.is_ok());
  let id = svc.list(&TicketQuery::default()).await[0].id;

  let mut resolve = draft.clone().with_resolution_notes("Replaced roller");
  resolve.status = Some("Resolved".into());
  assert_eq!(
    svc.update(id, resolve).await,
    Outcome::Ok("Ticket updated successfully.".into())
  );

  let row = s.store.get_by_id(id).await.unwrap().unwrap().ticket;
  let resolved = row.date_resolved.expect("resolution date");
  assert!(resolved >= row.date_created);
  assert_eq!(row.resolution_notes.as_deref(), Some("Replaced roller"));

  let reopen = draft.with_resolution_notes("Replaced roller");
  assert!(svc.update(id, reopen).await.is_ok());

  let row = s.store.get_by_id(id).await.unwrap().unwrap().ticket;
  assert_eq!(row.status, TicketStatus::InProgress);
  assert_eq!(row.date_resolved, None);
  assert_eq!(row.resolution_notes, None);
}

#[tokio::test]
async fn service_reports_unknown_category_as_storage_failure() {
  let s = seeded().await;
  let svc = service(&s.store);

  let out = svc
    .create(TicketDraft::new("Printer jam", 999, TicketStatus::New))
    .await;

  assert!(!out.is_ok());
  assert!(out.message().starts_with("Error adding ticket: "), "{out:?}");
  assert!(svc.list(&TicketQuery::default()).await.is_empty());
  assert_eq!(s.store.staged(), 0);
}

#[tokio::test]
async fn service_list_ignores_zero_category_and_blank_keyword() {
  let s = filter_fixture().await;
  let svc = service(&s.store);

  let zero_category = TicketQuery { category_id: Some(0), ..TicketQuery::default() };
  assert_eq!(svc.list(&zero_category).await.len(), 5);

  let blank_keyword = TicketQuery { keyword: Some("  ".into()), ..TicketQuery::default() };
  assert_eq!(svc.list(&blank_keyword).await.len(), 5);
  assert_eq!(s.store.list(&blank_keyword).await.unwrap().len(), 5);
}

#[tokio::test]
async fn service_delete_and_clear_all() {
  let s = filter_fixture().await;
  let svc = service(&s.store);

  let first = svc.list(&TicketQuery::default()).await[0].id;
  assert!(svc.delete(first).await.is_ok());
  assert_eq!(
    svc.delete(first).await,
    Outcome::Rejected("Ticket does not exist or was already removed.".into())
  );

  assert_eq!(
    svc.clear_all().await,
    Outcome::Ok("All tickets cleared successfully.".into())
  );
  assert_eq!(
    svc.clear_all().await,
    Outcome::Ok("No tickets to clear.".into())
  );
}
