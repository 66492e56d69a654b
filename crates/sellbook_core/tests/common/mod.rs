#![allow(dead_code)]

use sellbook_core::model::fields::{
    Brand, Capacity, Colour, ContactNumber, Cost, Email, Name, Price, Tag, Venue,
};
use sellbook_core::model::schedule::parse_schedule_time;
use sellbook_core::{Customer, Index, Order, Phone, Record, Schedule};

pub fn customer(name: &str) -> Customer {
    Customer::new(
        Name::parse(name).unwrap(),
        ContactNumber::parse("91234567").unwrap(),
        Email::parse("buyer@example.com").unwrap(),
        [Tag::parse("friend").unwrap()],
    )
}

pub fn phone(name: &str) -> Phone {
    Phone::new(
        Name::parse(name).unwrap(),
        Brand::parse("Apple").unwrap(),
        Capacity::Size128Gb,
        Colour::parse("Black").unwrap(),
        Cost::parse("$400").unwrap(),
        [],
    )
}

pub fn price(value: &str) -> Price {
    Price::parse(value).unwrap()
}

pub fn order(customer: &Customer, phone: &Phone) -> Order {
    Order::new(customer.clone(), phone.clone(), price("$500"), [])
}

pub fn venue(value: &str) -> Venue {
    Venue::parse(value).unwrap()
}

pub fn schedule(order: &Order, place: &str, time: &str) -> Schedule {
    Schedule::new(order.id(), parse_schedule_time(time).unwrap(), venue(place), [])
}

pub fn index(one_based: usize) -> Index {
    Index::from_one_based(one_based).unwrap()
}
