//! Daily order report.
//!
//! Every calendar day in the requested range yields one row, including days
//! without orders. Totals for a day come from a left join calendar → orders
//! → lines; the running month-to-date sums and the 7-row lag are computed in
//! a single pass over the date-ordered rows.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use telemetry::metrics;
use tracing::{debug, info, warn};

use crate::calendar::{verify_contiguous, CalendarDay, DateRange};
use crate::error::{CoverageErrorCode, DataErrorCode, Error, Result};
use crate::orders::{Order, OrderLine};
use crate::source::{CalendarStore, OrderSource};
use crate::window::{LagBuffer, MonthToDate, LAG_ROWS};

/// What to do with orders dated outside the calendar table.
///
/// Parsed case-insensitively from the CLI, config files and environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CoveragePolicy {
    /// Fail the report.
    #[default]
    Strict,
    /// Leave them out of the report, logging and counting them.
    Exclude,
}

impl FromStr for CoveragePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "exclude" => Ok(Self::Exclude),
            other => Err(format!(
                "unknown coverage policy '{}', expected 'strict' or 'exclude'",
                other
            )),
        }
    }
}

impl TryFrom<String> for CoveragePolicy {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Per-day totals before window calculations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub weekday_name: String,
    pub order_count: u64,
    pub line_count: u64,
    pub total_price: Decimal,
}

/// One output row of the daily report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedDayMetric {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub weekday_name: String,
    pub order_count: u64,
    pub line_count: u64,
    pub total_price: Decimal,
    /// Month-to-date line count including this day.
    pub rolling_line_count: u64,
    /// Month-to-date total price including this day.
    pub rolling_total_price: Decimal,
    /// Line count 7 rows earlier; `None` for the first 7 rows.
    pub lagged_line_count: Option<u64>,
}

/// Month summary derived from the report rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub days: usize,
    pub order_count: u64,
    pub line_count: u64,
    pub total_price: Decimal,
}

#[derive(Default)]
struct DayAccumulator {
    order_ids: HashSet<u64>,
    line_count: u64,
    total_price: Decimal,
}

/// Joins calendar days to orders and lines, grouped by day.
///
/// Orders whose date is not among `days` contribute nothing. Lines whose
/// order is not among the joined orders are ignored.
pub fn aggregate_daily(days: &[CalendarDay], orders: &[Order], lines: &[OrderLine]) -> Vec<DailyTotals> {
    let day_index: HashMap<NaiveDate, usize> =
        days.iter().enumerate().map(|(i, d)| (d.date, i)).collect();

    let mut accs: Vec<DayAccumulator> = days.iter().map(|_| DayAccumulator::default()).collect();

    // order_id -> joined day slots (one per matching order row)
    let mut order_slots: HashMap<u64, Vec<usize>> = HashMap::new();
    for order in orders {
        if let Some(&idx) = day_index.get(&order.day()) {
            accs[idx].order_ids.insert(order.order_id);
            order_slots.entry(order.order_id).or_default().push(idx);
        }
    }

    for line in lines {
        if let Some(slots) = order_slots.get(&line.order_id) {
            for &idx in slots {
                accs[idx].line_count += 1;
                accs[idx].total_price += line.price;
            }
        }
    }

    days.iter()
        .zip(accs)
        .map(|(day, acc)| DailyTotals {
            date: day.date,
            year: day.year,
            month: day.month,
            weekday_name: day.weekday_name.clone(),
            order_count: acc.order_ids.len() as u64,
            line_count: acc.line_count,
            total_price: acc.total_price,
        })
        .collect()
}

/// Adds month-to-date sums and the 7-row lag. Input must be date-ordered.
pub fn apply_windows(totals: Vec<DailyTotals>) -> Vec<AggregatedDayMetric> {
    let mut mtd = MonthToDate::new();
    let mut lag = LagBuffer::new(LAG_ROWS);

    totals
        .into_iter()
        .map(|t| {
            let (rolling_line_count, rolling_total_price) =
                mtd.push((t.year, t.month), t.line_count, t.total_price);
            let lagged_line_count = lag.push(t.line_count);

            AggregatedDayMetric {
                date: t.date,
                year: t.year,
                month: t.month,
                weekday_name: t.weekday_name,
                order_count: t.order_count,
                line_count: t.line_count,
                total_price: t.total_price,
                rolling_line_count,
                rolling_total_price,
                lagged_line_count,
            }
        })
        .collect()
}

/// Builds report rows from already-loaded data.
pub fn build_report(days: &[CalendarDay], orders: &[Order], lines: &[OrderLine]) -> Vec<AggregatedDayMetric> {
    apply_windows(aggregate_daily(days, orders, lines))
}

/// Parameters for a report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRequest {
    pub range: DateRange,
    pub coverage: CoveragePolicy,
}

impl ReportRequest {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            coverage: CoveragePolicy::default(),
        }
    }

    pub fn with_coverage(mut self, coverage: CoveragePolicy) -> Self {
        self.coverage = coverage;
        self
    }
}

/// Result of a report run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub range: DateRange,
    pub rows: Vec<AggregatedDayMetric>,
    /// Orders dated outside the calendar and left out under `Exclude`.
    pub excluded_orders: u64,
}

impl Report {
    /// Per-month totals in date order.
    pub fn month_totals(&self) -> Vec<MonthTotal> {
        let mut totals: Vec<MonthTotal> = Vec::new();
        for row in &self.rows {
            match totals.last_mut() {
                Some(t) if t.year == row.year && t.month == row.month => {
                    t.days += 1;
                    t.order_count += row.order_count;
                    t.line_count += row.line_count;
                    t.total_price += row.total_price;
                }
                _ => totals.push(MonthTotal {
                    year: row.year,
                    month: row.month,
                    days: 1,
                    order_count: row.order_count,
                    line_count: row.line_count,
                    total_price: row.total_price,
                }),
            }
        }
        totals
    }
}

/// Loads calendar and order data for the request and builds the report.
pub async fn run_report(
    calendar: &dyn CalendarStore,
    orders: &dyn OrderSource,
    request: &ReportRequest,
) -> Result<Report> {
    let start = Instant::now();
    let range = request.range;

    let bounds = calendar.calendar_bounds().await?.ok_or_else(|| {
        Error::coverage(
            CoverageErrorCode::RequestOutsideCalendar,
            "calendar table is empty; rebuild it first",
        )
    })?;

    if !bounds.covers(&range) {
        return Err(Error::coverage(
            CoverageErrorCode::RequestOutsideCalendar,
            format!("requested range {} is not covered by calendar {}", range, bounds),
        ));
    }

    let days = calendar.load_calendar(range).await?;
    verify_contiguous(&days)?;
    if days.len() != range.len_days() {
        return Err(Error::data(
            DataErrorCode::Malformed,
            format!(
                "calendar returned {} rows for {} ({} days)",
                days.len(),
                range,
                range.len_days()
            ),
        ));
    }

    let excluded_orders = check_order_coverage(orders, bounds, request.coverage).await?;

    let order_rows = orders.orders_between(range).await?;
    let order_ids: Vec<u64> = order_rows.iter().map(|o| o.order_id).collect();
    let lines = if order_ids.is_empty() {
        Vec::new()
    } else {
        orders.lines_for_orders(&order_ids).await?
    };
    debug!(
        range = %range,
        orders = order_rows.len(),
        lines = lines.len(),
        "Loaded order data"
    );

    let rows = build_report(&days, &order_rows, &lines);

    metrics().reports_built.inc();
    metrics().report_rows.inc_by(rows.len() as u64);
    metrics()
        .report_latency_ms
        .observe(start.elapsed().as_millis() as u64);

    info!(
        range = %range,
        rows = rows.len(),
        excluded_orders,
        "Report built"
    );

    Ok(Report {
        range,
        rows,
        excluded_orders,
    })
}

/// Applies the coverage policy to orders dated outside the calendar.
///
/// Returns the number of orders excluded.
async fn check_order_coverage(
    orders: &dyn OrderSource,
    calendar: DateRange,
    policy: CoveragePolicy,
) -> Result<u64> {
    let outside = match orders.order_date_bounds().await? {
        Some(order_bounds) if !calendar.covers(&order_bounds) => {
            orders.count_orders_outside(calendar).await?
        }
        _ => 0,
    };

    if outside == 0 {
        return Ok(0);
    }

    match policy {
        CoveragePolicy::Strict => Err(Error::coverage(
            CoverageErrorCode::OrdersOutsideCalendar,
            format!("{} orders are dated outside calendar {}", outside, calendar),
        )),
        CoveragePolicy::Exclude => {
            warn!(
                excluded_orders = outside,
                calendar = %calendar,
                "Orders dated outside the calendar are excluded from the report"
            );
            metrics().orders_excluded.inc_by(outside);
            Ok(outside)
        }
    }
}
