mod common;

use common::{customer, index, order, phone, price, schedule, venue};
use sellbook_core::command::{
    AddCustomer, AddOrder, AddPhone, AddSchedule, ClearCustomers, ClearOrders, ClearPhones,
    ClearSchedules, CompleteOrder, DeleteCustomer, DeleteOrder, DeletePhone, DeleteSchedule,
    Direction, EditCustomer, EditOrder, EditPhone, EditSchedule, FindRecords, ListPanel,
    SwitchPanel,
};
use sellbook_core::model::customer::CustomerChanges;
use sellbook_core::model::fields::Name;
use sellbook_core::model::order::OrderChanges;
use sellbook_core::model::phone::PhoneChanges;
use sellbook_core::model::schedule::{parse_schedule_time, ScheduleChanges};
use sellbook_core::{
    Command, CommandAction, CommandError, ModelError, ModelService, OrderStatus, Panel, Record,
    Session,
};

/// Two customers, two phones, one scheduled and one unscheduled order.
fn populated_session() -> Session {
    let mut model = ModelService::new();
    let alice = customer("Alice");
    let bob = customer("Bob");
    let iphone = phone("iPhone");
    let pixel = phone("Pixel");
    model.add_customer(alice.clone()).unwrap();
    model.add_customer(bob.clone()).unwrap();
    model.add_phone(iphone.clone()).unwrap();
    model.add_phone(pixel.clone()).unwrap();
    let scheduled = order(&alice, &iphone);
    model.add_order(scheduled.clone()).unwrap();
    model.add_order(order(&bob, &pixel)).unwrap();
    model
        .schedule_order(schedule(&scheduled, "CBD", "2024-01-01 10:00"))
        .unwrap();
    Session::new(model)
}

fn reversible_commands() -> Vec<(&'static str, Command)> {
    vec![
        ("add-c", Command::AddCustomer(AddCustomer::new(customer("Carl")))),
        ("delete-c 1", Command::DeleteCustomer(DeleteCustomer::new(index(1)))),
        (
            "edit-c 2 n/Robert",
            Command::EditCustomer(EditCustomer::new(
                index(2),
                CustomerChanges {
                    name: Some(Name::parse("Robert").unwrap()),
                    ..Default::default()
                },
            )),
        ),
        ("clear-c", Command::ClearCustomers(ClearCustomers::new())),
        ("add-p", Command::AddPhone(AddPhone::new(phone("Galaxy")))),
        ("delete-p 2", Command::DeletePhone(DeletePhone::new(index(2)))),
        (
            "edit-p 1",
            Command::EditPhone(EditPhone::new(
                index(1),
                PhoneChanges {
                    name: Some(Name::parse("iPhone 15").unwrap()),
                    ..Default::default()
                },
            )),
        ),
        ("clear-p", Command::ClearPhones(ClearPhones::new())),
        (
            "add-o 2 1 $900",
            Command::AddOrder(AddOrder::new(index(2), index(1), price("$900"), [])),
        ),
        ("delete-o 1", Command::DeleteOrder(DeleteOrder::new(index(1)))),
        (
            "edit-o 2 pr/$1",
            Command::EditOrder(EditOrder::new(
                index(2),
                OrderChanges {
                    price: Some(price("$1")),
                    ..Default::default()
                },
            )),
        ),
        ("complete-o 1", Command::CompleteOrder(CompleteOrder::new(index(1)))),
        ("clear-o", Command::ClearOrders(ClearOrders::new())),
        (
            "add-s 2",
            Command::AddSchedule(AddSchedule::new(
                index(2),
                parse_schedule_time("2024-01-02 09:30").unwrap(),
                venue("Jurong"),
                [],
            )),
        ),
        ("delete-s 1", Command::DeleteSchedule(DeleteSchedule::new(index(1)))),
        (
            "edit-s 1",
            Command::EditSchedule(EditSchedule::new(
                index(1),
                ScheduleChanges {
                    duration_minutes: Some(Some(45)),
                    ..Default::default()
                },
            )),
        ),
        ("clear-s", Command::ClearSchedules(ClearSchedules::new())),
    ]
}

#[test]
fn every_reversible_command_round_trips_through_undo_and_redo() {
    for (text, command) in reversible_commands() {
        let mut session = populated_session();
        let before = session.model().snapshot();

        session
            .execute(text, command)
            .unwrap_or_else(|err| panic!("`{text}` failed: {err}"));
        let after = session.model().snapshot();
        assert_ne!(after, before, "`{text}` changed nothing");

        session.undo().unwrap();
        assert_eq!(session.model().snapshot(), before, "undo of `{text}`");

        session.redo().unwrap();
        assert_eq!(session.model().snapshot(), after, "redo of `{text}`");

        session.undo().unwrap();
        assert_eq!(session.model().snapshot(), before, "second undo of `{text}`");
    }
}

#[test]
fn add_order_undo_then_redo_keeps_identity() {
    let mut session = populated_session();
    let before = session.model().orders().records();

    session
        .execute(
            "add-o 1 2 $500",
            Command::AddOrder(AddOrder::new(index(1), index(2), price("$500"), [])),
        )
        .unwrap();
    let added = session
        .model()
        .orders()
        .records()
        .last()
        .cloned()
        .unwrap();

    session.undo().unwrap();
    assert_eq!(session.model().orders().records(), before);

    session.redo().unwrap();
    let redone = session.model().orders().get(added.id()).unwrap();
    assert_eq!(redone, added);
}

#[test]
fn undo_on_empty_stack_reports_no_history_and_keeps_log() {
    let mut session = Session::default();
    assert_eq!(
        session.undo().unwrap_err(),
        CommandError::NoHistory(Direction::Undo)
    );
    assert_eq!(
        session.redo().unwrap_err(),
        CommandError::NoHistory(Direction::Redo)
    );

    session
        .execute("add-c n/Alice", Command::AddCustomer(AddCustomer::new(customer("Alice"))))
        .unwrap();
    session.undo().unwrap();
    session.redo().unwrap();

    let log: Vec<&str> = session.history().newest_first().collect();
    assert_eq!(log, vec!["add-c n/Alice"]);
}

#[test]
fn new_command_invalidates_redo() {
    let mut session = Session::default();
    session
        .execute("add-c n/Alice", Command::AddCustomer(AddCustomer::new(customer("Alice"))))
        .unwrap();
    session.undo().unwrap();
    session
        .execute("add-c n/Bob", Command::AddCustomer(AddCustomer::new(customer("Bob"))))
        .unwrap();

    assert_eq!(
        session.redo().unwrap_err(),
        CommandError::NoHistory(Direction::Redo)
    );
    assert_eq!(session.model().customers().len(), 1);
}

#[test]
fn undo_and_redo_dispatched_as_commands_are_logged() {
    let mut session = Session::default();
    session
        .execute("add-c n/Alice", Command::AddCustomer(AddCustomer::new(customer("Alice"))))
        .unwrap();
    let outcome = session.execute("undo", Command::Undo).unwrap();
    assert_eq!(outcome.feedback, "Undo success!");
    assert!(session.model().customers().is_empty());

    session.execute("redo", Command::Redo).unwrap();
    assert_eq!(session.model().customers().len(), 1);

    let outcome = session.execute("history", Command::History).unwrap();
    assert_eq!(
        outcome.feedback,
        "Entered commands (from most recent to earliest):\nredo\nundo\nadd-c n/Alice"
    );
    assert_eq!(session.history().len(), 4);
}

#[test]
fn failed_commands_touch_neither_history_nor_stack() {
    let mut session = populated_session();
    let before = session.model().snapshot();

    let err = session
        .execute("delete-c 9", Command::DeleteCustomer(DeleteCustomer::new(index(9))))
        .unwrap_err();

    assert!(matches!(
        err,
        CommandError::InvalidIndex {
            panel: Panel::Customers,
            len: 2,
            ..
        }
    ));
    assert!(session.history().is_empty());
    assert!(!session.stack().can_undo());
    assert_eq!(session.model().snapshot(), before);
}

#[test]
fn adding_a_clashing_schedule_is_refused_unless_allowed() {
    let mut session = populated_session();
    let existing = session.model().schedules().records()[0].clone();
    let before = session.model().snapshot();
    let clash = || {
        AddSchedule::new(
            index(2),
            parse_schedule_time("2024-01-01 10:00").unwrap(),
            venue("CBD"),
            [],
        )
    };

    let err = session
        .execute("add-s 2", Command::AddSchedule(clash()))
        .unwrap_err();
    assert_eq!(
        err,
        CommandError::ScheduleConflict {
            conflicts: vec![existing.id()]
        }
    );
    assert_eq!(session.model().snapshot(), before);

    session
        .execute("add-s 2 --force", Command::AddSchedule(clash().allow_conflicts()))
        .unwrap();
    assert_eq!(session.model().schedules().len(), 2);
    let second = session.model().orders().records()[1].clone();
    assert_eq!(second.status(), OrderStatus::Scheduled);
}

#[test]
fn adding_a_schedule_with_invalid_duration_fails_validation() {
    let mut session = populated_session();
    let err = session
        .execute(
            "add-s 2",
            Command::AddSchedule(
                AddSchedule::new(
                    index(2),
                    parse_schedule_time("2024-02-01 10:00").unwrap(),
                    venue("Jurong"),
                    [],
                )
                .with_duration(0),
            ),
        )
        .unwrap_err();
    assert!(matches!(err, CommandError::Validation(_)));
}

#[test]
fn find_filters_the_panel_used_for_indexes() {
    let mut session = populated_session();
    let outcome = session
        .execute("find-c bob", Command::Find(FindRecords::new(Panel::Customers, ["bob"]).unwrap()))
        .unwrap();
    assert_eq!(outcome.feedback, "1 customers listed!");
    assert_eq!(outcome.panel, Some(Panel::Customers));

    session
        .execute("delete-c 1", Command::DeleteCustomer(DeleteCustomer::new(index(1))))
        .unwrap();
    let names: Vec<String> = session
        .model()
        .customers()
        .records()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(names, vec!["Alice".to_string()]);

    session
        .execute("list-c", Command::List(ListPanel(Panel::Customers)))
        .unwrap();
    assert_eq!(session.model().filtered_customers().len(), 1);
}

#[test]
fn panel_commands_are_not_undoable() {
    let mut session = populated_session();
    let outcome = session
        .execute("switch-p", Command::Switch(SwitchPanel(Panel::Phones)))
        .unwrap();
    assert_eq!(outcome.panel, Some(Panel::Phones));
    assert!(!session.stack().can_undo());
    assert_eq!(
        session.undo().unwrap_err(),
        CommandError::NoHistory(Direction::Undo)
    );
}

#[test]
fn completing_an_order_moves_it_to_the_archive() {
    let mut session = populated_session();
    let target = session.model().filtered_orders().get(0).unwrap();

    let outcome = session
        .execute("complete-o 1", Command::CompleteOrder(CompleteOrder::new(index(1))))
        .unwrap();

    assert_eq!(outcome.panel, Some(Panel::ArchivedOrders));
    assert!(!session.model().has_order(&target));
    let archived = session.model().archived_orders().get(target.id()).unwrap();
    assert_eq!(archived.status(), OrderStatus::Completed);
    assert!(session
        .model()
        .schedules()
        .records()
        .iter()
        .all(|s| s.order_id() != target.id()));
}

#[test]
fn session_only_commands_cannot_run_standalone() {
    let mut model = ModelService::new();
    let err = Command::Undo.execute(&mut model).unwrap_err();
    assert_eq!(err, CommandError::RequiresSession("undo"));
    assert!(!Command::History.is_reversible());
}

#[test]
fn scheduling_an_already_scheduled_order_reports_it_before_conflicts() {
    let mut session = populated_session();
    let booked = session.model().orders().records()[0].clone();
    let before = session.model().snapshot();

    let err = session
        .execute(
            "add-s 1",
            Command::AddSchedule(AddSchedule::new(
                index(1),
                parse_schedule_time("2024-01-01 10:00").unwrap(),
                venue("CBD"),
                [],
            )),
        )
        .unwrap_err();

    assert_eq!(err, CommandError::Model(ModelError::AlreadyScheduled(booked.id())));
    assert_eq!(session.model().snapshot(), before);
}

#[test]
fn editing_a_schedule_onto_another_is_refused_unless_allowed() {
    let mut session = populated_session();
    session
        .execute(
            "add-s 2",
            Command::AddSchedule(AddSchedule::new(
                index(2),
                parse_schedule_time("2024-01-01 10:00").unwrap(),
                venue("Jurong"),
                [],
            )),
        )
        .unwrap();
    let first = session.model().schedules().records()[0].clone();
    let before = session.model().snapshot();
    let move_to_cbd = || {
        EditSchedule::new(
            index(2),
            ScheduleChanges {
                venue: Some(venue("CBD")),
                ..Default::default()
            },
        )
    };

    let err = session
        .execute("edit-s 2 v/CBD", Command::EditSchedule(move_to_cbd()))
        .unwrap_err();
    assert_eq!(
        err,
        CommandError::ScheduleConflict {
            conflicts: vec![first.id()]
        }
    );
    assert_eq!(session.model().snapshot(), before);

    session
        .execute(
            "edit-s 2 v/CBD --force",
            Command::EditSchedule(move_to_cbd().allow_conflicts()),
        )
        .unwrap();
    let edited = session.model().schedules().records()[1].clone();
    assert_eq!(edited.venue().as_str(), "CBD");
    assert_eq!(session.model().conflicting_schedules(&edited), vec![first]);

    session.undo().unwrap();
    assert_eq!(session.model().snapshot(), before);
}

#[test]
fn find_without_keywords_cannot_be_built() {
    let err = FindRecords::new(Panel::Customers, ["  "]).unwrap_err();
    assert_eq!(
        CommandError::from(err),
        CommandError::Validation(sellbook_core::ValidationError::EmptyKeywords)
    );
}
