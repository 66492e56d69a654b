mod common;

use common::{customer, order, phone, schedule};
use rusqlite::Connection;
use sellbook_core::db::{open_db, open_db_in_memory};
use sellbook_core::model::schedule::parse_schedule_time;
use sellbook_core::repo::model_store::{CUSTOMER_BOOK, ORDER_BOOK};
use sellbook_core::{
    BookRepository, Customer, ModelError, ModelService, ModelStore, Order, Record, RepoError,
    Schedule,
};

fn sample_model() -> ModelService {
    let mut model = ModelService::new();
    let alice = customer("Alice");
    let bob = customer("Bob");
    let iphone = phone("iPhone");
    model.add_customer(alice.clone()).unwrap();
    model.add_customer(bob.clone()).unwrap();
    model.add_phone(iphone.clone()).unwrap();
    let scheduled = order(&alice, &iphone);
    model.add_order(scheduled.clone()).unwrap();
    model
        .schedule_order(schedule(&scheduled, "CBD", "2024-01-01 10:00"))
        .unwrap();
    let done = order(&bob, &iphone);
    model.add_order(done.clone()).unwrap();
    model.complete_order(&done).unwrap();
    model
}

fn save_customers(conn: &Connection, customers: &[Customer]) {
    ModelStore::new(conn)
        .repository::<Customer>(CUSTOMER_BOOK)
        .save(customers)
        .unwrap();
}

fn assert_data_format(err: RepoError, expected_book: &str) {
    match err {
        RepoError::DataFormat { book, .. } => assert_eq!(book, expected_book),
        other => panic!("expected data format error, got {other}"),
    }
}

#[test]
fn model_survives_a_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sellbook.sqlite3");
    let model = sample_model();

    {
        let conn = open_db(&path).unwrap();
        ModelStore::new(&conn).save_model(&model).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let loaded = ModelStore::new(&conn).load_model().unwrap();
    assert_eq!(loaded.snapshot(), model.snapshot());
    assert_eq!(loaded.archived_orders().len(), 1);
}

#[test]
fn saving_twice_replaces_the_previous_contents() {
    let conn = open_db_in_memory().unwrap();
    let store = ModelStore::new(&conn);
    let mut model = sample_model();
    store.save_model(&model).unwrap();

    model.clear_customers();
    store.save_model(&model).unwrap();

    let loaded = store.load_model().unwrap();
    assert!(loaded.customers().is_empty());
    assert!(loaded.orders().is_empty());
    assert_eq!(loaded.phones().len(), 1);
}

#[test]
fn never_saved_database_loads_an_empty_model() {
    let conn = open_db_in_memory().unwrap();
    let store = ModelStore::new(&conn);

    assert!(store
        .repository::<Customer>(CUSTOMER_BOOK)
        .load()
        .unwrap()
        .is_none());
    assert_eq!(store.load_model().unwrap(), ModelService::new());
}

#[test]
fn single_book_round_trip_keeps_order() {
    let conn = open_db_in_memory().unwrap();
    let customers = vec![customer("Carl"), customer("Alice"), customer("Bob")];
    save_customers(&conn, &customers);

    let loaded = ModelStore::new(&conn)
        .repository::<Customer>(CUSTOMER_BOOK)
        .load()
        .unwrap();
    assert_eq!(loaded, Some(customers));
}

#[test]
fn saving_duplicate_identities_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let alice = customer("Alice");
    let err = ModelStore::new(&conn)
        .repository::<Customer>(CUSTOMER_BOOK)
        .save(&[alice.clone(), alice])
        .unwrap_err();

    assert_data_format(err, CUSTOMER_BOOK);
    let stored: i64 = conn
        .query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, 0);
}

#[test]
fn mismatched_uuid_column_is_a_data_format_error() {
    let conn = open_db_in_memory().unwrap();
    save_customers(&conn, &[customer("Alice")]);
    conn.execute(
        "UPDATE book_records SET uuid = ?1 WHERE book = ?2;",
        [uuid::Uuid::new_v4().to_string(), CUSTOMER_BOOK.to_string()],
    )
    .unwrap();

    let err = ModelStore::new(&conn).load_model().unwrap_err();
    assert_data_format(err, CUSTOMER_BOOK);
}

#[test]
fn malformed_payload_is_a_data_format_error() {
    let conn = open_db_in_memory().unwrap();
    save_customers(&conn, &[customer("Alice")]);
    conn.execute(
        "UPDATE book_records SET payload = '{not json' WHERE book = ?1;",
        [CUSTOMER_BOOK],
    )
    .unwrap();

    let err = ModelStore::new(&conn).load_model().unwrap_err();
    assert_data_format(err, CUSTOMER_BOOK);
}

#[test]
fn invalid_field_value_is_a_data_format_error() {
    let conn = open_db_in_memory().unwrap();
    save_customers(&conn, &[customer("Alice")]);
    let payload: String = conn
        .query_row(
            "SELECT payload FROM book_records WHERE book = ?1;",
            [CUSTOMER_BOOK],
            |row| row.get(0),
        )
        .unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    value["email"] = serde_json::Value::String("not-an-email".to_string());
    conn.execute(
        "UPDATE book_records SET payload = ?1 WHERE book = ?2;",
        [value.to_string(), CUSTOMER_BOOK.to_string()],
    )
    .unwrap();

    let err = ModelStore::new(&conn).load_model().unwrap_err();
    assert_data_format(err, CUSTOMER_BOOK);
}

#[test]
fn record_count_mismatch_is_a_data_format_error() {
    let conn = open_db_in_memory().unwrap();
    save_customers(&conn, &[customer("Alice"), customer("Bob")]);
    conn.execute(
        "UPDATE books SET record_count = 5 WHERE name = ?1;",
        [CUSTOMER_BOOK],
    )
    .unwrap();

    let err = ModelStore::new(&conn).load_model().unwrap_err();
    assert_data_format(err, CUSTOMER_BOOK);
}

#[test]
fn scheduled_order_without_schedule_is_a_data_format_error() {
    let conn = open_db_in_memory().unwrap();
    let snapshot = sample_model().snapshot();
    ModelStore::new(&conn)
        .repository::<Order>(ORDER_BOOK)
        .save(&snapshot.orders)
        .unwrap();
    assert!(snapshot.orders.iter().any(|o| o.schedule().is_some()));

    let err = ModelStore::new(&conn).load_model().unwrap_err();
    assert_data_format(err, ORDER_BOOK);
}

#[test]
fn loaded_records_keep_their_identity() {
    let conn = open_db_in_memory().unwrap();
    let model = sample_model();
    ModelStore::new(&conn).save_model(&model).unwrap();

    let loaded = ModelStore::new(&conn).load_model().unwrap();
    for original in model.customers().records() {
        assert_eq!(loaded.customers().get(original.id()), Some(original));
    }
}

#[test]
fn schedule_links_cannot_be_forged_and_model_still_reloads() {
    let conn = open_db_in_memory().unwrap();
    let mut model = sample_model();
    let alice = model.customers().records()[0].clone();
    let iphone = model.phones().records()[0].clone();
    let open_order = order(&alice, &iphone);
    model.add_order(open_order.clone()).unwrap();
    let booked = model
        .orders()
        .records()
        .into_iter()
        .find(|o| o.schedule().is_some())
        .unwrap();
    let booking = model.schedules().records()[0].clone();
    let before = model.snapshot();

    let forged = order(&alice, &iphone).scheduled(uuid::Uuid::new_v4());
    assert_eq!(
        model.add_order(forged.clone()).unwrap_err(),
        ModelError::ScheduleLinkChanged(forged.id())
    );
    let finished = order(&alice, &iphone).completed();
    assert_eq!(
        model.add_order(finished.clone()).unwrap_err(),
        ModelError::ScheduleLinkChanged(finished.id())
    );
    assert_eq!(
        model
            .set_order(&open_order, open_order.scheduled(booking.id()))
            .unwrap_err(),
        ModelError::ScheduleLinkChanged(open_order.id())
    );
    assert_eq!(
        model.set_order(&booked, booked.unscheduled()).unwrap_err(),
        ModelError::ScheduleLinkChanged(booked.id())
    );
    let moved = Schedule::new(
        open_order.id(),
        parse_schedule_time("2024-03-01 12:00").unwrap(),
        booking.venue().clone(),
        [],
    );
    assert_eq!(
        model.set_schedule(&booking, moved).unwrap_err(),
        ModelError::ScheduleOwnerChanged(booking.id())
    );
    assert_eq!(model.snapshot(), before);

    let store = ModelStore::new(&conn);
    store.save_model(&model).unwrap();
    assert_eq!(store.load_model().unwrap().snapshot(), before);
}
