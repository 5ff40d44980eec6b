//! Calendar table storage.
//!
//! A rebuild writes every row into a staging table and then swaps it with
//! the live table using `EXCHANGE TABLES`, which is atomic. Readers see
//! either the old calendar or the new one. If anything fails before the
//! exchange, the staging table is dropped and the live table is untouched.

use async_trait::async_trait;
use report_core::{CalendarDay, CalendarStore, DateRange, Result};
use tracing::{debug, warn};

use crate::client::{query_error, write_error, ClickHouseClient};
use crate::rows::{days_to_date, CalendarDayRow, DateBoundsRow};
use crate::schema::{CALENDAR_STAGING_TABLE, CALENDAR_TABLE, CREATE_CALENDAR_TABLE};

const CALENDAR_COLUMNS: &str = "calendar_date, day_of_month, month, quarter, quarter_label, year, \
     weekday_number, weekday_name, date_key, month_abbrev, month_name, holiday_name, is_holiday";

impl ClickHouseClient {
    async fn execute(&self, sql: &str) -> Result<()> {
        self.inner().query(sql).execute().await.map_err(write_error)
    }

    async fn write_staging(&self, rows: Vec<CalendarDayRow>) -> Result<()> {
        self.execute(&format!("DROP TABLE IF EXISTS {}", CALENDAR_STAGING_TABLE))
            .await?;
        self.execute(&format!(
            "CREATE TABLE {} AS {}",
            CALENDAR_STAGING_TABLE, CALENDAR_TABLE
        ))
        .await?;

        let mut insert = self
            .inner()
            .insert(CALENDAR_STAGING_TABLE)
            .map_err(write_error)?;
        for row in &rows {
            insert.write(row).await.map_err(write_error)?;
        }
        insert.end().await.map_err(write_error)?;

        Ok(())
    }

    async fn drop_staging(&self) {
        if let Err(e) = self
            .execute(&format!("DROP TABLE IF EXISTS {}", CALENDAR_STAGING_TABLE))
            .await
        {
            warn!(error = %e, "Failed to drop calendar staging table");
        }
    }
}

#[async_trait]
impl CalendarStore for ClickHouseClient {
    async fn replace_calendar(&self, days: Vec<CalendarDay>) -> Result<usize> {
        let rows = days
            .into_iter()
            .map(CalendarDayRow::from_day)
            .collect::<Result<Vec<_>>>()?;
        let count = rows.len();

        // The live table must exist for the exchange
        self.execute(CREATE_CALENDAR_TABLE).await?;

        if let Err(e) = self.write_staging(rows).await {
            self.drop_staging().await;
            return Err(e);
        }

        if let Err(e) = self
            .execute(&format!(
                "EXCHANGE TABLES {} AND {}",
                CALENDAR_STAGING_TABLE, CALENDAR_TABLE
            ))
            .await
        {
            self.drop_staging().await;
            return Err(e);
        }

        // Staging now holds the previous calendar
        self.drop_staging().await;

        debug!(rows = count, "Calendar table swapped");
        Ok(count)
    }

    async fn calendar_bounds(&self) -> Result<Option<DateRange>> {
        let sql = format!(
            "SELECT min(calendar_date) AS min_day, max(calendar_date) AS max_day, count() AS total FROM {}",
            CALENDAR_TABLE
        );
        let bounds: DateBoundsRow = self
            .inner()
            .query(&sql)
            .fetch_one()
            .await
            .map_err(query_error)?;

        if bounds.total == 0 {
            return Ok(None);
        }
        Ok(Some(DateRange::new(
            days_to_date(bounds.min_day),
            days_to_date(bounds.max_day),
        )?))
    }

    async fn load_calendar(&self, range: DateRange) -> Result<Vec<CalendarDay>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE calendar_date >= toDate(?) AND calendar_date <= toDate(?) ORDER BY calendar_date",
            CALENDAR_COLUMNS, CALENDAR_TABLE
        );
        let rows: Vec<CalendarDayRow> = self
            .inner()
            .query(&sql)
            .bind(range.start().to_string())
            .bind(range.end().to_string())
            .fetch_all()
            .await
            .map_err(query_error)?;

        Ok(rows.into_iter().map(CalendarDay::from).collect())
    }
}
