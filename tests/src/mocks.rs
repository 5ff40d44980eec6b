//! Mock implementations for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use report_core::{
    CalendarDay, CalendarStore, DataErrorCode, DateRange, Error, MemoryCalendarStore,
    MemoryOrderSource, Order, OrderLine, OrderSource, Result,
};
use std::sync::Arc;

/// Calendar store that can be told to fail writes.
///
/// Reads always go to the wrapped in-memory store, so tests can check
/// what a failed rebuild left behind.
#[derive(Clone, Default)]
pub struct FlakyCalendarStore {
    inner: Arc<MemoryCalendarStore>,
    should_fail: Arc<Mutex<bool>>,
    replace_calls: Arc<Mutex<usize>>,
}

impl FlakyCalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    /// Number of `replace_calendar` calls, failed ones included.
    pub fn replace_calls(&self) -> usize {
        *self.replace_calls.lock()
    }

    pub fn snapshot(&self) -> Arc<Vec<CalendarDay>> {
        self.inner.snapshot()
    }
}

#[async_trait]
impl CalendarStore for FlakyCalendarStore {
    async fn replace_calendar(&self, days: Vec<CalendarDay>) -> Result<usize> {
        *self.replace_calls.lock() += 1;
        if *self.should_fail.lock() {
            return Err(Error::data(
                DataErrorCode::WriteFailed,
                "mock calendar write failure",
            ));
        }
        self.inner.replace_calendar(days).await
    }

    async fn calendar_bounds(&self) -> Result<Option<DateRange>> {
        self.inner.calendar_bounds().await
    }

    async fn load_calendar(&self, range: DateRange) -> Result<Vec<CalendarDay>> {
        self.inner.load_calendar(range).await
    }
}

/// Calendar store serving a fixed row set under fixed bounds.
///
/// Lets tests hand `run_report` a calendar whose rows disagree with the
/// bounds it reports, the way a damaged table would.
#[derive(Clone)]
pub struct FixedCalendarStore {
    bounds: DateRange,
    days: Vec<CalendarDay>,
}

impl FixedCalendarStore {
    pub fn new(bounds: DateRange, days: Vec<CalendarDay>) -> Self {
        Self { bounds, days }
    }
}

#[async_trait]
impl CalendarStore for FixedCalendarStore {
    async fn replace_calendar(&self, _days: Vec<CalendarDay>) -> Result<usize> {
        Err(Error::data(
            DataErrorCode::WriteFailed,
            "fixed calendar is read-only",
        ))
    }

    async fn calendar_bounds(&self) -> Result<Option<DateRange>> {
        Ok(Some(self.bounds))
    }

    async fn load_calendar(&self, range: DateRange) -> Result<Vec<CalendarDay>> {
        Ok(self
            .days
            .iter()
            .filter(|d| range.contains(d.date))
            .cloned()
            .collect())
    }
}

/// Order source that can be told to fail every read.
#[derive(Clone, Default)]
pub struct FlakyOrderSource {
    inner: MemoryOrderSource,
    should_fail: Arc<Mutex<bool>>,
}

impl FlakyOrderSource {
    pub fn new(orders: Vec<Order>, lines: Vec<OrderLine>) -> Self {
        Self {
            inner: MemoryOrderSource::new(orders, lines),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    fn check(&self) -> Result<()> {
        if *self.should_fail.lock() {
            return Err(Error::data(
                DataErrorCode::Unavailable,
                "mock order source unavailable",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderSource for FlakyOrderSource {
    async fn orders_between(&self, range: DateRange) -> Result<Vec<Order>> {
        self.check()?;
        self.inner.orders_between(range).await
    }

    async fn lines_for_orders(&self, order_ids: &[u64]) -> Result<Vec<OrderLine>> {
        self.check()?;
        self.inner.lines_for_orders(order_ids).await
    }

    async fn order_date_bounds(&self) -> Result<Option<DateRange>> {
        self.check()?;
        self.inner.order_date_bounds().await
    }

    async fn count_orders_outside(&self, range: DateRange) -> Result<u64> {
        self.check()?;
        self.inner.count_orders_outside(range).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, range};
    use report_core::generate_calendar;

    #[tokio::test]
    async fn test_flaky_store_counts_calls() {
        let store = FlakyCalendarStore::new();
        let days = generate_calendar(range(date(2020, 1, 1), date(2020, 1, 3)));

        store.replace_calendar(days.clone()).await.unwrap();
        store.set_should_fail(true);
        assert!(store.replace_calendar(days).await.is_err());

        assert_eq!(store.replace_calls(), 2);
        assert_eq!(store.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn test_flaky_source_failure() {
        let source = FlakyOrderSource::default();
        assert_eq!(source.order_date_bounds().await.unwrap(), None);

        source.set_should_fail(true);
        let err = source.order_date_bounds().await.unwrap_err();
        assert_eq!(err.error_code(), Some("DATA_001"));
    }
}
