//! Model coordinator over the customer, phone, order and schedule books.
//!
//! # Responsibility
//! - Own one `RecordBook` per entity type plus the completed-order archive.
//! - Keep orders consistent with the customers and phones they embed, and
//!   schedules consistent with the orders they belong to.
//! - Report every mutation as a `ChangeSet` so callers can revert it.
//!
//! # Invariants
//! - A failing primary step performs no cascade and changes nothing.
//! - After `delete_customer(c)` no order embeds a customer that is the
//!   same as `c`; symmetric for phones.
//! - After `set_customer(t, e)` every order that embedded `t` embeds `e`,
//!   other order fields unchanged; symmetric for phones.
//! - An order carries a schedule reference iff its status is `Scheduled`
//!   and the referenced schedule is stored.
//! - Archived orders are historical snapshots and are never cascaded.

use log::{debug, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::book::{ensure_unique, show_all, BookError, BookView, RecordBook, RecordPredicate};
use crate::conflict::find_conflicts;
use crate::model::customer::Customer;
use crate::model::order::{Order, OrderId, OrderStatus};
use crate::model::phone::Phone;
use crate::model::record::{Record, RecordKind};
use crate::model::schedule::{Schedule, ScheduleId};
use crate::service::change::{BookChange, Books, Change, ChangeSet};

pub type ModelResult<T> = Result<T, ModelError>;

/// Failure of a model operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Identity-level failure from one of the books.
    Book(BookError),
    /// The order already has a schedule attached.
    AlreadyScheduled(OrderId),
    /// An order's status or schedule reference was changed outside the
    /// schedule operations.
    ScheduleLinkChanged(OrderId),
    /// A schedule edit would move it to a different order.
    ScheduleOwnerChanged(ScheduleId),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Book(err) => write!(f, "{err}"),
            Self::AlreadyScheduled(order_id) => {
                write!(f, "order {order_id} is already scheduled")
            }
            Self::ScheduleLinkChanged(order_id) => write!(
                f,
                "order {order_id} can only change its schedule through schedule operations"
            ),
            Self::ScheduleOwnerChanged(schedule_id) => {
                write!(f, "schedule {schedule_id} cannot move to another order")
            }
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Book(err) => Some(err),
            Self::AlreadyScheduled(_)
            | Self::ScheduleLinkChanged(_)
            | Self::ScheduleOwnerChanged(_) => None,
        }
    }
}

impl From<BookError> for ModelError {
    fn from(value: BookError) -> Self {
        Self::Book(value)
    }
}

/// Plain copy of every book, used for persistence and equality checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSnapshot {
    pub customers: Vec<Customer>,
    pub phones: Vec<Phone>,
    pub orders: Vec<Order>,
    pub schedules: Vec<Schedule>,
    pub archived_orders: Vec<Order>,
}

/// In-memory model of the application.
pub struct ModelService {
    customers: RecordBook<Customer>,
    phones: RecordBook<Phone>,
    orders: RecordBook<Order>,
    schedules: RecordBook<Schedule>,
    archived_orders: RecordBook<Order>,
    customer_view: BookView<Customer>,
    phone_view: BookView<Phone>,
    order_view: BookView<Order>,
    schedule_view: BookView<Schedule>,
    archived_order_view: BookView<Order>,
}

impl ModelService {
    pub fn new() -> Self {
        Self::from_books(
            RecordBook::new(),
            RecordBook::new(),
            RecordBook::new(),
            RecordBook::new(),
            RecordBook::new(),
        )
    }

    pub fn from_books(
        customers: RecordBook<Customer>,
        phones: RecordBook<Phone>,
        orders: RecordBook<Order>,
        schedules: RecordBook<Schedule>,
        archived_orders: RecordBook<Order>,
    ) -> Self {
        let customer_view = customers.view();
        let phone_view = phones.view();
        let order_view = orders.view();
        let schedule_view = schedules.view();
        let archived_order_view = archived_orders.view();
        Self {
            customers,
            phones,
            orders,
            schedules,
            archived_orders,
            customer_view,
            phone_view,
            order_view,
            schedule_view,
            archived_order_view,
        }
    }

    /// Builds a model from a snapshot, rejecting duplicate identities.
    pub fn from_snapshot(snapshot: ModelSnapshot) -> ModelResult<Self> {
        let mut model = Self::new();
        model.restore(snapshot)?;
        Ok(model)
    }

    pub fn customers(&self) -> &RecordBook<Customer> {
        &self.customers
    }

    pub fn phones(&self) -> &RecordBook<Phone> {
        &self.phones
    }

    pub fn orders(&self) -> &RecordBook<Order> {
        &self.orders
    }

    pub fn schedules(&self) -> &RecordBook<Schedule> {
        &self.schedules
    }

    pub fn archived_orders(&self) -> &RecordBook<Order> {
        &self.archived_orders
    }

    pub fn has_customer(&self, customer: &Customer) -> bool {
        self.customers.contains(customer)
    }

    pub fn has_phone(&self, phone: &Phone) -> bool {
        self.phones.contains(phone)
    }

    pub fn has_order(&self, order: &Order) -> bool {
        self.orders.contains(order)
    }

    pub fn has_schedule(&self, schedule: &Schedule) -> bool {
        self.schedules.contains(schedule)
    }

    pub fn has_archived_order(&self, order: &Order) -> bool {
        self.archived_orders.contains(order)
    }

    // ---- customers ----

    pub fn add_customer(&mut self, customer: Customer) -> ModelResult<ChangeSet> {
        let id = customer.id();
        self.customers.add(customer.clone())?;
        debug!("event=customer_add module=model status=ok customer_id={id}");
        Ok(single(Change::Customer(BookChange::Added(customer))))
    }

    /// Removes `customer` and every order embedding it, with their schedules.
    pub fn delete_customer(&mut self, customer: &Customer) -> ModelResult<ChangeSet> {
        let removed = self.customers.remove(customer)?;
        let mut changes = single(Change::Customer(BookChange::Removed(vec![removed])));
        changes.extend(self.remove_orders_where(|order| order.customer().is_same(customer)));
        debug!(
            "event=customer_delete module=model status=ok customer_id={} orders_removed={}",
            customer.id(),
            changes.removed_orders()
        );
        Ok(changes)
    }

    /// Replaces `target` with `edited` and rewrites every order embedding it.
    pub fn set_customer(&mut self, target: &Customer, edited: Customer) -> ModelResult<ChangeSet> {
        let previous = self.customers.replace(target, edited.clone())?;
        let rewritten = self.orders.rewrite_where(
            |order| order.customer().is_same(target),
            |order| order.with_customer(edited.clone()),
        );
        debug!(
            "event=customer_set module=model status=ok customer_id={} orders_rewritten={}",
            target.id(),
            rewritten.len()
        );
        let mut changes = single(Change::Customer(BookChange::Replaced {
            previous,
            current: edited,
        }));
        if !rewritten.is_empty() {
            changes.push(Change::Order(BookChange::Rewritten(rewritten)));
        }
        Ok(changes)
    }

    /// Empties the customer book and cascades to their orders.
    pub fn clear_customers(&mut self) -> ChangeSet {
        let cleared = self.customers.clear();
        let ids: HashSet<_> = cleared.iter().map(Record::id).collect();
        let mut changes = single(Change::Customer(BookChange::Cleared(cleared)));
        changes.extend(self.remove_orders_where(|order| ids.contains(&order.customer().id())));
        debug!(
            "event=customer_clear module=model status=ok customers_removed={} orders_removed={}",
            ids.len(),
            changes.removed_orders()
        );
        changes
    }

    // ---- phones ----

    pub fn add_phone(&mut self, phone: Phone) -> ModelResult<ChangeSet> {
        let id = phone.id();
        self.phones.add(phone.clone())?;
        debug!("event=phone_add module=model status=ok phone_id={id}");
        Ok(single(Change::Phone(BookChange::Added(phone))))
    }

    /// Removes `phone` and every order embedding it, with their schedules.
    pub fn delete_phone(&mut self, phone: &Phone) -> ModelResult<ChangeSet> {
        let removed = self.phones.remove(phone)?;
        let mut changes = single(Change::Phone(BookChange::Removed(vec![removed])));
        changes.extend(self.remove_orders_where(|order| order.phone().is_same(phone)));
        debug!(
            "event=phone_delete module=model status=ok phone_id={} orders_removed={}",
            phone.id(),
            changes.removed_orders()
        );
        Ok(changes)
    }

    /// Replaces `target` with `edited` and rewrites every order embedding it.
    pub fn set_phone(&mut self, target: &Phone, edited: Phone) -> ModelResult<ChangeSet> {
        let previous = self.phones.replace(target, edited.clone())?;
        let rewritten = self.orders.rewrite_where(
            |order| order.phone().is_same(target),
            |order| order.with_phone(edited.clone()),
        );
        debug!(
            "event=phone_set module=model status=ok phone_id={} orders_rewritten={}",
            target.id(),
            rewritten.len()
        );
        let mut changes = single(Change::Phone(BookChange::Replaced {
            previous,
            current: edited,
        }));
        if !rewritten.is_empty() {
            changes.push(Change::Order(BookChange::Rewritten(rewritten)));
        }
        Ok(changes)
    }

    pub fn clear_phones(&mut self) -> ChangeSet {
        let cleared = self.phones.clear();
        let ids: HashSet<_> = cleared.iter().map(Record::id).collect();
        let mut changes = single(Change::Phone(BookChange::Cleared(cleared)));
        changes.extend(self.remove_orders_where(|order| ids.contains(&order.phone().id())));
        debug!(
            "event=phone_clear module=model status=ok phones_removed={} orders_removed={}",
            ids.len(),
            changes.removed_orders()
        );
        changes
    }

    // ---- orders ----

    /// Adds a new, unscheduled order.
    ///
    /// Orders gain a schedule only through `schedule_order`.
    pub fn add_order(&mut self, order: Order) -> ModelResult<ChangeSet> {
        let id = order.id();
        if order.status() != OrderStatus::Unscheduled || order.schedule().is_some() {
            warn!("event=order_add module=model status=error order_id={id} error_code=schedule_link");
            return Err(ModelError::ScheduleLinkChanged(id));
        }
        self.orders.add(order.clone())?;
        debug!("event=order_add module=model status=ok order_id={id}");
        Ok(single(Change::Order(BookChange::Added(order))))
    }

    /// Removes `order` together with its schedule.
    pub fn delete_order(&mut self, order: &Order) -> ModelResult<ChangeSet> {
        let removed = self.orders.remove(order)?;
        let order_id = removed.record.id();
        let schedules = self
            .schedules
            .remove_where(|schedule| schedule.order_id() == order_id);
        debug!(
            "event=order_delete module=model status=ok order_id={order_id} schedules_removed={}",
            schedules.len()
        );
        let mut changes = single(Change::Order(BookChange::Removed(vec![removed])));
        if !schedules.is_empty() {
            changes.push(Change::Schedule(BookChange::Removed(schedules)));
        }
        Ok(changes)
    }

    /// Replaces `target` with `edited`; status and schedule reference must
    /// stay as stored.
    pub fn set_order(&mut self, target: &Order, edited: Order) -> ModelResult<ChangeSet> {
        if let Some(stored) = self.orders.get(target.id()) {
            if edited.status() != stored.status() || edited.schedule() != stored.schedule() {
                warn!(
                    "event=order_set module=model status=error order_id={} error_code=schedule_link",
                    target.id()
                );
                return Err(ModelError::ScheduleLinkChanged(target.id()));
            }
        }
        let previous = self.orders.replace(target, edited.clone())?;
        debug!(
            "event=order_set module=model status=ok order_id={}",
            target.id()
        );
        Ok(single(Change::Order(BookChange::Replaced {
            previous,
            current: edited,
        })))
    }

    /// Moves `order` into the archive with status `Completed`.
    ///
    /// Its schedule, if any, is removed.
    pub fn complete_order(&mut self, order: &Order) -> ModelResult<ChangeSet> {
        let current = self
            .orders
            .get(order.id())
            .ok_or(BookError::IdentityNotFound {
                kind: RecordKind::Order,
                id: order.id(),
            })?;
        let archived = current.completed();
        if self.archived_orders.contains(&archived) {
            return Err(BookError::DuplicateIdentity {
                kind: RecordKind::Order,
                id: archived.id(),
            }
            .into());
        }

        let removed = self.orders.remove(&current)?;
        let order_id = current.id();
        let schedules = self
            .schedules
            .remove_where(|schedule| schedule.order_id() == order_id);
        self.archived_orders.add(archived.clone())?;
        debug!(
            "event=order_complete module=model status=ok order_id={order_id} schedules_removed={}",
            schedules.len()
        );

        let mut changes = single(Change::Order(BookChange::Removed(vec![removed])));
        if !schedules.is_empty() {
            changes.push(Change::Schedule(BookChange::Removed(schedules)));
        }
        changes.push(Change::ArchivedOrder(BookChange::Added(archived)));
        Ok(changes)
    }

    pub fn clear_orders(&mut self) -> ChangeSet {
        let cleared = self.orders.clear();
        let ids: HashSet<_> = cleared.iter().map(Record::id).collect();
        let schedules = self
            .schedules
            .remove_where(|schedule| ids.contains(&schedule.order_id()));
        debug!(
            "event=order_clear module=model status=ok orders_removed={} schedules_removed={}",
            ids.len(),
            schedules.len()
        );
        let mut changes = single(Change::Order(BookChange::Cleared(cleared)));
        if !schedules.is_empty() {
            changes.push(Change::Schedule(BookChange::Removed(schedules)));
        }
        changes
    }

    // ---- schedules ----

    /// Stores `schedule` and marks its order as scheduled.
    pub fn schedule_order(&mut self, schedule: Schedule) -> ModelResult<ChangeSet> {
        let order = self
            .orders
            .get(schedule.order_id())
            .ok_or(BookError::IdentityNotFound {
                kind: RecordKind::Order,
                id: schedule.order_id(),
            })?;
        if order.schedule().is_some() {
            return Err(ModelError::AlreadyScheduled(order.id()));
        }

        self.schedules.add(schedule.clone())?;
        let scheduled = order.scheduled(schedule.id());
        let previous = self.orders.replace(&order, scheduled.clone())?;
        debug!(
            "event=schedule_add module=model status=ok schedule_id={} order_id={}",
            schedule.id(),
            order.id()
        );

        let mut changes = single(Change::Schedule(BookChange::Added(schedule)));
        changes.push(Change::Order(BookChange::Replaced {
            previous,
            current: scheduled,
        }));
        Ok(changes)
    }

    /// Alias of `schedule_order`; a schedule is never stored without its
    /// order being marked.
    pub fn add_schedule(&mut self, schedule: Schedule) -> ModelResult<ChangeSet> {
        self.schedule_order(schedule)
    }

    /// Removes `schedule` and reverts its order to unscheduled.
    pub fn delete_schedule(&mut self, schedule: &Schedule) -> ModelResult<ChangeSet> {
        let removed = self.schedules.remove(schedule)?;
        let schedule_id = removed.record.id();
        let owners = self.orders.rewrite_where(
            |order| order.schedule() == Some(schedule_id),
            Order::unscheduled,
        );
        debug!(
            "event=schedule_delete module=model status=ok schedule_id={schedule_id} orders_unscheduled={}",
            owners.len()
        );
        let mut changes = single(Change::Schedule(BookChange::Removed(vec![removed])));
        if !owners.is_empty() {
            changes.push(Change::Order(BookChange::Rewritten(owners)));
        }
        Ok(changes)
    }

    /// Replaces `target` with `edited`; the owning order stays attached.
    pub fn set_schedule(&mut self, target: &Schedule, edited: Schedule) -> ModelResult<ChangeSet> {
        if let Some(stored) = self.schedules.get(target.id()) {
            if edited.order_id() != stored.order_id() {
                warn!(
                    "event=schedule_set module=model status=error schedule_id={} error_code=owner_changed",
                    target.id()
                );
                return Err(ModelError::ScheduleOwnerChanged(target.id()));
            }
        }
        let previous = self.schedules.replace(target, edited.clone())?;
        let mut changes = ChangeSet::new();
        changes.push(Change::Schedule(BookChange::Replaced {
            previous,
            current: edited.clone(),
        }));
        if !target.is_same(&edited) {
            let old_id = target.id();
            let new_id = edited.id();
            let owners = self.orders.rewrite_where(
                |order| order.schedule() == Some(old_id),
                |order| order.scheduled(new_id),
            );
            if !owners.is_empty() {
                changes.push(Change::Order(BookChange::Rewritten(owners)));
            }
        }
        debug!(
            "event=schedule_set module=model status=ok schedule_id={}",
            target.id()
        );
        Ok(changes)
    }

    pub fn clear_schedules(&mut self) -> ChangeSet {
        let cleared = self.schedules.clear();
        let owners = self
            .orders
            .rewrite_where(|order| order.schedule().is_some(), Order::unscheduled);
        debug!(
            "event=schedule_clear module=model status=ok schedules_removed={} orders_unscheduled={}",
            cleared.len(),
            owners.len()
        );
        let mut changes = single(Change::Schedule(BookChange::Cleared(cleared)));
        if !owners.is_empty() {
            changes.push(Change::Order(BookChange::Rewritten(owners)));
        }
        changes
    }

    /// Stored schedules that clash with `candidate`, in book order.
    pub fn conflicting_schedules(&self, candidate: &Schedule) -> Vec<Schedule> {
        find_conflicts(candidate, &self.schedules.records())
    }

    // ---- views ----

    /// Live customer list as currently filtered.
    pub fn filtered_customers(&self) -> BookView<Customer> {
        self.customer_view.clone()
    }

    pub fn filtered_phones(&self) -> BookView<Phone> {
        self.phone_view.clone()
    }

    pub fn filtered_orders(&self) -> BookView<Order> {
        self.order_view.clone()
    }

    pub fn filtered_schedules(&self) -> BookView<Schedule> {
        self.schedule_view.clone()
    }

    pub fn filtered_archived_orders(&self) -> BookView<Order> {
        self.archived_order_view.clone()
    }

    pub fn update_customer_filter(&mut self, predicate: RecordPredicate<Customer>) {
        self.customer_view.set_predicate(predicate);
    }

    pub fn update_phone_filter(&mut self, predicate: RecordPredicate<Phone>) {
        self.phone_view.set_predicate(predicate);
    }

    pub fn update_order_filter(&mut self, predicate: RecordPredicate<Order>) {
        self.order_view.set_predicate(predicate);
    }

    pub fn update_schedule_filter(&mut self, predicate: RecordPredicate<Schedule>) {
        self.schedule_view.set_predicate(predicate);
    }

    pub fn update_archived_order_filter(&mut self, predicate: RecordPredicate<Order>) {
        self.archived_order_view.set_predicate(predicate);
    }

    /// Resets every panel filter to show-all.
    pub fn reset_filters(&mut self) {
        self.update_customer_filter(show_all());
        self.update_phone_filter(show_all());
        self.update_order_filter(show_all());
        self.update_schedule_filter(show_all());
        self.update_archived_order_filter(show_all());
    }

    /// Fresh live view over customers matching `predicate`.
    ///
    /// Independent of the panel filter set by `update_customer_filter`.
    pub fn customers_matching(&self, predicate: RecordPredicate<Customer>) -> BookView<Customer> {
        self.customers.filtered(predicate)
    }

    pub fn phones_matching(&self, predicate: RecordPredicate<Phone>) -> BookView<Phone> {
        self.phones.filtered(predicate)
    }

    pub fn orders_matching(&self, predicate: RecordPredicate<Order>) -> BookView<Order> {
        self.orders.filtered(predicate)
    }

    pub fn schedules_matching(&self, predicate: RecordPredicate<Schedule>) -> BookView<Schedule> {
        self.schedules.filtered(predicate)
    }

    // ---- snapshots / undo ----

    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            customers: self.customers.records(),
            phones: self.phones.records(),
            orders: self.orders.records(),
            schedules: self.schedules.records(),
            archived_orders: self.archived_orders.records(),
        }
    }

    /// Replaces every book with the snapshot contents.
    ///
    /// Either all books are replaced or none is. Existing views keep
    /// observing the restored data.
    pub fn restore(&mut self, snapshot: ModelSnapshot) -> ModelResult<()> {
        ensure_unique(&snapshot.customers)?;
        ensure_unique(&snapshot.phones)?;
        ensure_unique(&snapshot.orders)?;
        ensure_unique(&snapshot.schedules)?;
        ensure_unique(&snapshot.archived_orders)?;

        self.customers.set_records(snapshot.customers)?;
        self.phones.set_records(snapshot.phones)?;
        self.orders.set_records(snapshot.orders)?;
        self.schedules.set_records(snapshot.schedules)?;
        self.archived_orders.set_records(snapshot.archived_orders)?;
        debug!(
            "event=model_restore module=model status=ok customers={} phones={} orders={} schedules={} archived_orders={}",
            self.customers.len(),
            self.phones.len(),
            self.orders.len(),
            self.schedules.len(),
            self.archived_orders.len()
        );
        Ok(())
    }

    /// Undoes `changes`, restoring the exact prior state.
    ///
    /// On failure the model is left as it was before the call.
    pub fn revert(&mut self, changes: &ChangeSet) -> ModelResult<()> {
        let before = self.snapshot();
        let result = self.books().revert(changes);
        if let Err(err) = result {
            warn!(
                "event=model_revert module=model status=error changes={}",
                changes.changes().len()
            );
            self.restore(before)?;
            return Err(err.into());
        }
        debug!(
            "event=model_revert module=model status=ok touched={}",
            changes.touched()
        );
        Ok(())
    }

    fn books(&mut self) -> Books<'_> {
        Books {
            customers: &mut self.customers,
            phones: &mut self.phones,
            orders: &mut self.orders,
            schedules: &mut self.schedules,
            archived_orders: &mut self.archived_orders,
        }
    }

    /// Removes orders matching `predicate` together with their schedules.
    fn remove_orders_where(&mut self, predicate: impl Fn(&Order) -> bool) -> ChangeSet {
        let mut changes = ChangeSet::new();
        let orders = self.orders.remove_where(predicate);
        if orders.is_empty() {
            return changes;
        }
        let order_ids: HashSet<OrderId> = orders.iter().map(|entry| entry.record.id()).collect();
        let schedules = self
            .schedules
            .remove_where(|schedule| order_ids.contains(&schedule.order_id()));
        changes.push(Change::Order(BookChange::Removed(orders)));
        if !schedules.is_empty() {
            changes.push(Change::Schedule(BookChange::Removed(schedules)));
        }
        changes
    }
}

impl Default for ModelService {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ModelService {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}

impl std::fmt::Debug for ModelService {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelService")
            .field("customers", &self.customers.len())
            .field("phones", &self.phones.len())
            .field("orders", &self.orders.len())
            .field("schedules", &self.schedules.len())
            .field("archived_orders", &self.archived_orders.len())
            .finish()
    }
}

fn single(change: Change) -> ChangeSet {
    let mut changes = ChangeSet::new();
    changes.push(change);
    changes
}
