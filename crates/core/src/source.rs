//! Data source traits and in-memory implementations.
//!
//! The ClickHouse client implements both traits for production use. The
//! in-memory versions back tests and local runs.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::calendar::{CalendarDay, DateRange};
use crate::error::Result;
use crate::orders::{Order, OrderLine};

/// Storage for the calendar dimension table.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Replaces the whole calendar with `days` in one atomic step.
    ///
    /// Returns the number of rows now stored.
    async fn replace_calendar(&self, days: Vec<CalendarDay>) -> Result<usize>;

    /// First and last stored date, or `None` when the table is empty.
    async fn calendar_bounds(&self) -> Result<Option<DateRange>>;

    /// Stored rows inside `range`, ascending by date.
    async fn load_calendar(&self, range: DateRange) -> Result<Vec<CalendarDay>>;
}

/// Read access to orders and their lines.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Orders whose date (timestamp truncated to day) is inside `range`.
    async fn orders_between(&self, range: DateRange) -> Result<Vec<Order>>;

    /// Lines belonging to any of `order_ids`.
    async fn lines_for_orders(&self, order_ids: &[u64]) -> Result<Vec<OrderLine>>;

    /// Earliest and latest order date, or `None` when there are no orders.
    async fn order_date_bounds(&self) -> Result<Option<DateRange>>;

    /// Number of orders dated outside `range`.
    async fn count_orders_outside(&self, range: DateRange) -> Result<u64>;
}

/// Calendar held in memory behind a swappable snapshot.
///
/// `replace_calendar` builds the new vector first and then swaps the `Arc`,
/// so a reader holding a snapshot keeps the old table intact.
#[derive(Debug, Default)]
pub struct MemoryCalendarStore {
    days: RwLock<Arc<Vec<CalendarDay>>>,
}

impl MemoryCalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current calendar snapshot.
    pub fn snapshot(&self) -> Arc<Vec<CalendarDay>> {
        self.days.read().clone()
    }
}

#[async_trait]
impl CalendarStore for MemoryCalendarStore {
    async fn replace_calendar(&self, mut days: Vec<CalendarDay>) -> Result<usize> {
        days.sort_by_key(|d| d.date);
        days.dedup_by_key(|d| d.date);
        let count = days.len();
        *self.days.write() = Arc::new(days);
        Ok(count)
    }

    async fn calendar_bounds(&self) -> Result<Option<DateRange>> {
        let days = self.snapshot();
        match (days.first(), days.last()) {
            (Some(first), Some(last)) => Ok(Some(DateRange::new(first.date, last.date)?)),
            _ => Ok(None),
        }
    }

    async fn load_calendar(&self, range: DateRange) -> Result<Vec<CalendarDay>> {
        Ok(self
            .snapshot()
            .iter()
            .filter(|d| range.contains(d.date))
            .cloned()
            .collect())
    }
}

/// Orders and lines held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryOrderSource {
    orders: Vec<Order>,
    lines: Vec<OrderLine>,
}

impl MemoryOrderSource {
    pub fn new(orders: Vec<Order>, lines: Vec<OrderLine>) -> Self {
        Self { orders, lines }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }
}

#[async_trait]
impl OrderSource for MemoryOrderSource {
    async fn orders_between(&self, range: DateRange) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| range.contains(o.day()))
            .cloned()
            .collect();
        orders.sort_by_key(|o| (o.order_date, o.order_id));
        Ok(orders)
    }

    async fn lines_for_orders(&self, order_ids: &[u64]) -> Result<Vec<OrderLine>> {
        let wanted: std::collections::HashSet<u64> = order_ids.iter().copied().collect();
        Ok(self
            .lines
            .iter()
            .filter(|l| wanted.contains(&l.order_id))
            .cloned()
            .collect())
    }

    async fn order_date_bounds(&self) -> Result<Option<DateRange>> {
        let min = self.orders.iter().map(Order::day).min();
        let max = self.orders.iter().map(Order::day).max();
        match (min, max) {
            (Some(min), Some(max)) => Ok(Some(DateRange::new(min, max)?)),
            _ => Ok(None),
        }
    }

    async fn count_orders_outside(&self, range: DateRange) -> Result<u64> {
        Ok(self
            .orders
            .iter()
            .filter(|o| !range.contains(o.day()))
            .count() as u64)
    }
}
