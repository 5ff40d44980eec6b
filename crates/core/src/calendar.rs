//! Calendar dimension generation.
//!
//! One `CalendarDay` per date in an inclusive range, every attribute derived
//! from the date alone. The table is always rebuilt in full: rows are
//! computed in memory and handed to a `CalendarStore` that swaps them in
//! atomically.

use std::time::Instant;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use telemetry::metrics;
use tracing::{debug, info};

use crate::error::{DataErrorCode, Error, Result};
use crate::source::CalendarStore;

/// English weekday names, Monday first.
const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// English month names, January first.
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Inclusive range of calendar dates.
///
/// Always `start <= end`; deserialization goes through [`DateRange::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = Error;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::invalid_range(start, end));
        }
        Ok(Self { start, end })
    }

    /// A range covering a single day.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, both ends included.
    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether `other` lies entirely inside this range.
    pub fn covers(&self, other: &DateRange) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }

    /// Ascending iterator over every day in the range.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.len_days())
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// One row of the calendar dimension table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day_of_month: u32,
    pub month: u32,
    /// Quarter number, 1-4.
    pub quarter: u32,
    /// "{year}Q{quarter}", e.g. "2020Q1".
    pub quarter_label: String,
    pub year: i32,
    /// Sunday = 1 ... Saturday = 7.
    pub weekday_number: u32,
    pub weekday_name: String,
    /// "YYYYMMDD".
    pub date_key: String,
    pub month_abbrev: String,
    pub month_name: String,
    pub holiday_name: Option<String>,
    pub is_holiday: bool,
}

impl CalendarDay {
    /// Derives every calendar attribute from the date.
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        let month = date.month();
        let quarter = quarter_of(month);
        let month_name = MONTH_NAMES[month0(month)];
        let weekday = date.weekday();

        Self {
            date,
            day_of_month: date.day(),
            month,
            quarter,
            quarter_label: format!("{}Q{}", year, quarter),
            year,
            weekday_number: weekday.number_from_sunday(),
            weekday_name: WEEKDAY_NAMES[weekday.num_days_from_monday() as usize].to_string(),
            date_key: date.format("%Y%m%d").to_string(),
            month_abbrev: month_name.chars().take(3).collect(),
            month_name: month_name.to_string(),
            holiday_name: None,
            is_holiday: false,
        }
    }

    /// (year, month) key used to partition month-to-date sums.
    pub fn month_key(&self) -> (i32, u32) {
        (self.year, self.month)
    }
}

/// Quarter number for a 1-based month.
pub fn quarter_of(month: u32) -> u32 {
    (month + 2) / 3
}

fn month0(month: u32) -> usize {
    (month as usize).saturating_sub(1).min(11)
}

/// Fixed annual holiday, matched by month and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub month: u32,
    pub day: u32,
    pub name: String,
}

impl Holiday {
    pub fn new(month: u32, day: u32, name: impl Into<String>) -> Self {
        Self {
            month,
            day,
            name: name.into(),
        }
    }

    fn matches(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.day() == self.day
    }
}

/// Generates one calendar row per day in the range, ascending.
pub fn generate_calendar(range: DateRange) -> Vec<CalendarDay> {
    range.iter().map(CalendarDay::from_date).collect()
}

/// Generates the calendar and marks configured holidays.
pub fn generate_calendar_with_holidays(range: DateRange, holidays: &[Holiday]) -> Vec<CalendarDay> {
    let mut days = generate_calendar(range);
    apply_holidays(&mut days, holidays);
    days
}

/// Marks days matching a holiday. Returns the number of days marked.
///
/// When two holidays share a date the first one listed wins.
pub fn apply_holidays(days: &mut [CalendarDay], holidays: &[Holiday]) -> usize {
    if holidays.is_empty() {
        return 0;
    }

    let mut marked = 0;
    for day in days.iter_mut() {
        if let Some(holiday) = holidays.iter().find(|h| h.matches(day.date)) {
            day.holiday_name = Some(holiday.name.clone());
            day.is_holiday = true;
            marked += 1;
        }
    }
    marked
}

/// Checks that rows are strictly ascending with no missing days.
pub fn verify_contiguous(days: &[CalendarDay]) -> Result<()> {
    for pair in days.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if prev.date.succ_opt() != Some(next.date) {
            return Err(Error::data(
                DataErrorCode::Malformed,
                format!(
                    "calendar is not contiguous: {} followed by {}",
                    prev.date, next.date
                ),
            ));
        }
    }
    Ok(())
}

/// Outcome of a calendar rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    pub range: DateRange,
    pub rows_written: usize,
    pub holidays_marked: usize,
}

/// Rebuilds the calendar table for `range`.
///
/// The full row set is computed before the store is touched; the store
/// replaces its contents in one step.
pub async fn rebuild_calendar(
    store: &dyn CalendarStore,
    range: DateRange,
    holidays: &[Holiday],
) -> Result<RebuildSummary> {
    let start = Instant::now();

    let mut days = generate_calendar(range);
    let holidays_marked = apply_holidays(&mut days, holidays);
    debug!(
        range = %range,
        rows = days.len(),
        holidays_marked,
        "Generated calendar rows"
    );

    let rows_written = match store.replace_calendar(days).await {
        Ok(n) => n,
        Err(e) => {
            metrics().calendar_rebuild_errors.inc();
            return Err(e);
        }
    };

    metrics().calendar_rebuilds.inc();
    metrics().calendar_rows_written.inc_by(rows_written as u64);
    metrics()
        .rebuild_latency_ms
        .observe(start.elapsed().as_millis() as u64);

    info!(
        range = %range,
        rows_written,
        holidays_marked,
        "Calendar rebuilt"
    );

    Ok(RebuildSummary {
        range,
        rows_written,
        holidays_marked,
    })
}
