//! Output formatting for report and calendar rows.
//!
//! - Table: aligned text table (default)
//! - JSON: pretty-printed array of records
//! - CSV: header plus one line per record

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::ValueEnum;
use report_core::{AggregatedDayMetric, CalendarDay, MonthTotal, RebuildSummary};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Writes records to stdout in the configured format.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Prints `records`; table output goes through `to_row`, JSON and CSV
    /// serialize the records themselves.
    pub fn print<D, T, F>(&self, records: &[D], to_row: F) -> Result<()>
    where
        D: Serialize,
        T: Tabled,
        F: Fn(&D) -> T,
    {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let rendered = self.render(records, to_row)?;
        out.write_all(rendered.as_bytes())
            .context("Failed to write output")?;
        Ok(())
    }

    fn render<D, T, F>(&self, records: &[D], to_row: F) -> Result<String>
    where
        D: Serialize,
        T: Tabled,
        F: Fn(&D) -> T,
    {
        match self.format {
            OutputFormat::Table => {
                if records.is_empty() {
                    return Ok("No rows\n".to_string());
                }
                let rows: Vec<T> = records.iter().map(to_row).collect();
                let mut table = Table::new(rows);
                table.with(Style::psql());
                Ok(format!("{}\n", table))
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(records).context("Failed to encode JSON")?;
                Ok(format!("{}\n", json))
            }
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                for record in records {
                    writer.serialize(record).context("Failed to encode CSV row")?;
                }
                let bytes = writer.into_inner().context("Failed to flush CSV")?;
                String::from_utf8(bytes).context("CSV output is not UTF-8")
            }
        }
    }
}

/// Table view of a report row.
#[derive(Tabled)]
pub struct DayMetricView {
    date: NaiveDate,
    year: i32,
    month: u32,
    weekday: String,
    orders: u64,
    lines: u64,
    #[tabled(rename = "total price")]
    total_price: String,
    #[tabled(rename = "mtd lines")]
    rolling_line_count: u64,
    #[tabled(rename = "mtd price")]
    rolling_total_price: String,
    #[tabled(rename = "lines 7 rows back")]
    lagged_line_count: String,
}

impl From<&AggregatedDayMetric> for DayMetricView {
    fn from(m: &AggregatedDayMetric) -> Self {
        Self {
            date: m.date,
            year: m.year,
            month: m.month,
            weekday: m.weekday_name.clone(),
            orders: m.order_count,
            lines: m.line_count,
            total_price: format!("{:.2}", m.total_price),
            rolling_line_count: m.rolling_line_count,
            rolling_total_price: format!("{:.2}", m.rolling_total_price),
            lagged_line_count: m
                .lagged_line_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Table view of a calendar row.
#[derive(Tabled)]
pub struct CalendarView {
    date: NaiveDate,
    key: String,
    weekday: String,
    #[tabled(rename = "dow")]
    weekday_number: u32,
    month: String,
    quarter: String,
    holiday: String,
}

impl From<&CalendarDay> for CalendarView {
    fn from(d: &CalendarDay) -> Self {
        Self {
            date: d.date,
            key: d.date_key.clone(),
            weekday: d.weekday_name.clone(),
            weekday_number: d.weekday_number,
            month: d.month_abbrev.clone(),
            quarter: d.quarter_label.clone(),
            holiday: d.holiday_name.clone().unwrap_or_default(),
        }
    }
}

/// Table view of a month summary.
#[derive(Tabled)]
pub struct MonthTotalView {
    year: i32,
    month: u32,
    days: usize,
    orders: u64,
    lines: u64,
    #[tabled(rename = "total price")]
    total_price: String,
}

impl From<&MonthTotal> for MonthTotalView {
    fn from(t: &MonthTotal) -> Self {
        Self {
            year: t.year,
            month: t.month,
            days: t.days,
            orders: t.order_count,
            lines: t.line_count,
            total_price: format!("{:.2}", t.total_price),
        }
    }
}

/// Flat view of a rebuild summary, used for every format.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RebuildView {
    start: NaiveDate,
    end: NaiveDate,
    rows_written: usize,
    holidays_marked: usize,
}

impl From<&RebuildSummary> for RebuildView {
    fn from(s: &RebuildSummary) -> Self {
        Self {
            start: s.range.start(),
            end: s.range.end(),
            rows_written: s.rows_written,
            holidays_marked: s.holidays_marked,
        }
    }
}
