//! Calendar rebuild against ClickHouse.
//!
//! Requires Docker to be running for testcontainers.

use clickhouse_client::health::check_connection;
use clickhouse_client::schema::{CALENDAR_STAGING_TABLE, CALENDAR_TABLE};
use integration_tests::fixtures::{date, range};
use integration_tests::setup::TestContext;
use report_core::{rebuild_calendar, CalendarDay, CalendarStore, Holiday};

#[tokio::test]
async fn test_connection_healthy() {
    let ctx = TestContext::new().await;
    assert!(!ctx.clickhouse_url().is_empty());
    assert!(check_connection(&ctx.clickhouse).await);
}

#[tokio::test]
async fn test_rebuild_stores_derived_rows() {
    let ctx = TestContext::new().await;
    let span = range(date(2019, 12, 25), date(2020, 1, 10));

    let summary = rebuild_calendar(ctx.clickhouse.as_ref(), span, &[])
        .await
        .expect("Rebuild failed");
    assert_eq!(summary.rows_written, 17);

    assert_eq!(ctx.clickhouse.calendar_bounds().await.unwrap(), Some(span));

    let days = ctx.clickhouse.load_calendar(span).await.unwrap();
    assert_eq!(days.len(), 17);
    for day in &days {
        assert_eq!(*day, CalendarDay::from_date(day.date));
    }

    let jan_5 = days.iter().find(|d| d.date == date(2020, 1, 5)).unwrap();
    assert_eq!(jan_5.weekday_name, "Sunday");
    assert_eq!(jan_5.weekday_number, 1);
    assert_eq!(jan_5.quarter_label, "2020Q1");
}

#[tokio::test]
async fn test_rebuild_replaces_previous_calendar() {
    let ctx = TestContext::new().await;

    let first = range(date(2019, 1, 1), date(2019, 12, 31));
    rebuild_calendar(ctx.clickhouse.as_ref(), first, &[]).await.unwrap();

    let second = range(date(2020, 6, 1), date(2020, 6, 30));
    let summary = rebuild_calendar(ctx.clickhouse.as_ref(), second, &[])
        .await
        .unwrap();

    assert_eq!(summary.rows_written, 30);
    assert_eq!(ctx.clickhouse.calendar_bounds().await.unwrap(), Some(second));
    assert!(ctx.clickhouse.load_calendar(first).await.unwrap().is_empty());

    // Staging table is gone once the swap is done
    assert_eq!(ctx.table_count(CALENDAR_TABLE).await, 1);
    assert_eq!(ctx.table_count(CALENDAR_STAGING_TABLE).await, 0);
}

#[tokio::test]
async fn test_rebuild_is_repeatable() {
    let ctx = TestContext::new().await;
    let span = range(date(2020, 2, 1), date(2020, 3, 31));

    rebuild_calendar(ctx.clickhouse.as_ref(), span, &[]).await.unwrap();
    let before = ctx.clickhouse.load_calendar(span).await.unwrap();

    rebuild_calendar(ctx.clickhouse.as_ref(), span, &[]).await.unwrap();
    let after = ctx.clickhouse.load_calendar(span).await.unwrap();

    assert_eq!(before, after);
    assert_eq!(after.len(), 60);
}

#[tokio::test]
async fn test_holidays_persisted() {
    let ctx = TestContext::new().await;
    let span = range(date(2020, 12, 20), date(2021, 1, 5));
    let holidays = vec![
        Holiday::new(12, 25, "Christmas Day"),
        Holiday::new(1, 1, "New Year's Day"),
    ];

    let summary = rebuild_calendar(ctx.clickhouse.as_ref(), span, &holidays)
        .await
        .unwrap();
    assert_eq!(summary.holidays_marked, 2);

    let days = ctx.clickhouse.load_calendar(span).await.unwrap();
    let marked: Vec<_> = days.iter().filter(|d| d.is_holiday).collect();
    assert_eq!(marked.len(), 2);
    assert_eq!(marked[0].date, date(2020, 12, 25));
    assert_eq!(marked[1].holiday_name.as_deref(), Some("New Year's Day"));
}

#[tokio::test]
async fn test_failed_rebuild_drops_staging_and_keeps_live_table() {
    let ctx = TestContext::new().await;
    let client = ctx.clickhouse.as_ref();

    // A live table missing the calendar columns makes the staging insert fail
    for sql in [
        format!("DROP TABLE IF EXISTS {}", CALENDAR_TABLE),
        format!(
            "CREATE TABLE {} (calendar_date Date) ENGINE = MergeTree ORDER BY calendar_date",
            CALENDAR_TABLE
        ),
        format!("INSERT INTO {} VALUES ('2020-01-01')", CALENDAR_TABLE),
    ] {
        client.inner().query(&sql).execute().await.unwrap();
    }

    let err = rebuild_calendar(client, range(date(2021, 1, 1), date(2021, 1, 31)), &[])
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), Some("DATA_003"));

    assert_eq!(ctx.table_count(CALENDAR_STAGING_TABLE).await, 0);
    let live_rows = client
        .inner()
        .query(&format!("SELECT count() FROM {}", CALENDAR_TABLE))
        .fetch_one::<u64>()
        .await
        .unwrap();
    assert_eq!(live_rows, 1);
}
