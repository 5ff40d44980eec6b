//! Row types and conversions between domain records and ClickHouse columns.
//!
//! - `Date` travels as `u16` days since 1970-01-01
//! - `DateTime64(3)` travels as `i64` milliseconds since epoch
//! - `Decimal(10, 2)` travels as the `i64` mantissa at scale 2
//! - Booleans travel as `UInt8`

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clickhouse::Row;
use report_core::{CalendarDay, DataErrorCode, Error, Order, OrderLine, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Scale of the `price` column.
const PRICE_SCALE: u32 = 2;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn malformed(msg: String) -> Error {
    Error::data(DataErrorCode::Malformed, msg)
}

/// Converts a date to ClickHouse `Date` representation.
pub fn date_to_days(date: NaiveDate) -> Result<u16> {
    let days = (date - epoch()).num_days();
    u16::try_from(days).map_err(|_| malformed(format!("date {} is outside ClickHouse Date range", date)))
}

/// Converts a ClickHouse `Date` value back to a date.
pub fn days_to_date(days: u16) -> NaiveDate {
    epoch() + chrono::Days::new(days as u64)
}

pub fn datetime_to_millis(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}

pub fn millis_to_datetime(ms: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| malformed(format!("timestamp {}ms is out of range", ms)))
}

/// Converts a price to its scaled integer mantissa, rounding to cents.
pub fn price_to_scaled(price: Decimal) -> Result<i64> {
    let mut scaled = price;
    scaled.rescale(PRICE_SCALE);
    i64::try_from(scaled.mantissa()).map_err(|_| malformed(format!("price {} overflows Decimal(10, 2)", price)))
}

pub fn scaled_to_price(raw: i64) -> Decimal {
    Decimal::new(raw, PRICE_SCALE)
}

/// Row for the calendar_days table.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct CalendarDayRow {
    pub calendar_date: u16,
    pub day_of_month: u8,
    pub month: u8,
    pub quarter: u8,
    pub quarter_label: String,
    pub year: u16,
    pub weekday_number: u8,
    pub weekday_name: String,
    pub date_key: String,
    pub month_abbrev: String,
    pub month_name: String,
    pub holiday_name: Option<String>,
    pub is_holiday: u8,
}

impl CalendarDayRow {
    pub fn from_day(day: CalendarDay) -> Result<Self> {
        let year = u16::try_from(day.year)
            .map_err(|_| malformed(format!("year {} is out of range", day.year)))?;

        Ok(Self {
            calendar_date: date_to_days(day.date)?,
            day_of_month: day.day_of_month as u8,
            month: day.month as u8,
            quarter: day.quarter as u8,
            quarter_label: day.quarter_label,
            year,
            weekday_number: day.weekday_number as u8,
            weekday_name: day.weekday_name,
            date_key: day.date_key,
            month_abbrev: day.month_abbrev,
            month_name: day.month_name,
            holiday_name: day.holiday_name,
            is_holiday: u8::from(day.is_holiday),
        })
    }
}

impl From<CalendarDayRow> for CalendarDay {
    fn from(row: CalendarDayRow) -> Self {
        Self {
            date: days_to_date(row.calendar_date),
            day_of_month: row.day_of_month as u32,
            month: row.month as u32,
            quarter: row.quarter as u32,
            quarter_label: row.quarter_label,
            year: row.year as i32,
            weekday_number: row.weekday_number as u32,
            weekday_name: row.weekday_name,
            date_key: row.date_key,
            month_abbrev: row.month_abbrev,
            month_name: row.month_name,
            holiday_name: row.holiday_name,
            is_holiday: row.is_holiday != 0,
        }
    }
}

/// Row for the cust_order table (columns read by the reporter).
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct OrderRow {
    pub order_id: u64,
    pub order_date: i64,
    pub dest_address_id: u64,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id,
            order_date: datetime_to_millis(order.order_date),
            dest_address_id: order.dest_address_id,
        }
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = Error;

    fn try_from(row: OrderRow) -> Result<Self> {
        Ok(Order::new(
            row.order_id,
            millis_to_datetime(row.order_date)?,
            row.dest_address_id,
        ))
    }
}

/// Row for the order_line table.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct OrderLineRow {
    pub line_id: u64,
    pub order_id: u64,
    pub book_id: u64,
    pub price: i64,
}

impl OrderLineRow {
    pub fn from_line(line: &OrderLine) -> Result<Self> {
        Ok(Self {
            line_id: line.line_id,
            order_id: line.order_id,
            book_id: line.book_id,
            price: price_to_scaled(line.price)?,
        })
    }
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine::new(row.line_id, row.order_id, row.book_id, scaled_to_price(row.price))
    }
}

/// Min/max dates plus row count, used for bounds queries.
#[derive(Debug, Clone, Row, Deserialize)]
pub struct DateBoundsRow {
    pub min_day: u16,
    pub max_day: u16,
    pub total: u64,
}
