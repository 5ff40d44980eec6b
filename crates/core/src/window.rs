//! Single-pass window helpers: month-partitioned running sums and a
//! fixed-offset lag.

use std::collections::VecDeque;

use rust_decimal::Decimal;

/// Rows back for the week-over-week comparison.
pub const LAG_ROWS: usize = 7;

/// Running sum partitioned by (year, month), restarting on key change.
#[derive(Debug, Default)]
pub struct MonthToDate {
    key: Option<(i32, u32)>,
    line_count: u64,
    total_price: Decimal,
}

impl MonthToDate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one day's totals and returns the running values including it.
    ///
    /// Rows must arrive in date order.
    pub fn push(&mut self, key: (i32, u32), line_count: u64, total_price: Decimal) -> (u64, Decimal) {
        if self.key != Some(key) {
            self.key = Some(key);
            self.line_count = 0;
            self.total_price = Decimal::ZERO;
        }
        self.line_count += line_count;
        self.total_price += total_price;
        (self.line_count, self.total_price)
    }
}

/// Trailing buffer that yields the value pushed `offset` rows earlier.
#[derive(Debug)]
pub struct LagBuffer<T> {
    offset: usize,
    buf: VecDeque<T>,
}

impl<T> LagBuffer<T> {
    pub fn new(offset: usize) -> Self {
        Self {
            offset,
            buf: VecDeque::with_capacity(offset),
        }
    }

    /// Pushes the current row's value and returns the lagged one, or `None`
    /// while fewer than `offset` rows precede it.
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.offset == 0 {
            return Some(value);
        }
        let lagged = if self.buf.len() == self.offset {
            self.buf.pop_front()
        } else {
            None
        };
        self.buf.push_back(value);
        lagged
    }
}
