//! Test fixtures: dates, orders and order lines.

use chrono::{NaiveDate, NaiveDateTime};
use report_core::{DateRange, Order, OrderLine};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).unwrap()
}

pub fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end).unwrap()
}

/// One order on 2020-01-05 with two lines, 10.00 and 5.00.
pub fn single_order_sample() -> (Vec<Order>, Vec<OrderLine>) {
    let orders = vec![Order::new(1, at(2020, 1, 5, 10, 30), 100)];
    let lines = vec![
        OrderLine::new(1, 1, 501, dec!(10.00)),
        OrderLine::new(2, 1, 502, dec!(5.00)),
    ];
    (orders, lines)
}

/// Orders on both sides of the January/February 2020 boundary.
///
/// January: 3 lines, 27.50 total. February: 2 lines, 8.25 total.
pub fn month_boundary_sample() -> (Vec<Order>, Vec<OrderLine>) {
    let orders = vec![
        Order::new(10, at(2020, 1, 30, 9, 0), 100),
        Order::new(11, at(2020, 1, 31, 23, 59), 101),
        Order::new(12, at(2020, 2, 1, 0, 0), 102),
        Order::new(13, at(2020, 2, 3, 14, 15), 100),
    ];
    let lines = vec![
        OrderLine::new(100, 10, 501, dec!(12.00)),
        OrderLine::new(101, 10, 502, dec!(3.50)),
        OrderLine::new(102, 11, 503, dec!(12.00)),
        OrderLine::new(103, 12, 501, dec!(4.25)),
        OrderLine::new(104, 13, 504, dec!(4.00)),
    ];
    (orders, lines)
}

/// One order per day of `range`, day `i` carrying `i % 4` lines of 1.50.
pub fn daily_orders(range: DateRange) -> (Vec<Order>, Vec<OrderLine>) {
    let mut orders = Vec::new();
    let mut lines = Vec::new();
    let mut line_id = 1;

    for (i, day) in range.iter().enumerate() {
        let order_id = i as u64 + 1;
        orders.push(Order::new(order_id, day.and_hms_opt(12, 0, 0).unwrap(), 100));
        for _ in 0..(i % 4) {
            lines.push(OrderLine::new(line_id, order_id, 500 + line_id, dec!(1.50)));
            line_id += 1;
        }
    }
    (orders, lines)
}

/// `count` orders on one day, one line each at `price`.
pub fn bulk_orders(day: NaiveDate, count: u64, price: Decimal) -> (Vec<Order>, Vec<OrderLine>) {
    let orders = (1..=count)
        .map(|id| Order::new(id, day.and_hms_opt(8, 0, 0).unwrap(), 100))
        .collect();
    let lines = (1..=count)
        .map(|id| OrderLine::new(id, id, 501, price))
        .collect();
    (orders, lines)
}
