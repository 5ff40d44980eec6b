//! ClickHouse table schemas.
//!
//! Statements are unqualified and run against the configured database.
//! The bookstore tables are owned by the order-management side; creating
//! them here only serves development and test databases.

use crate::client::{write_error, ClickHouseClient};
use report_core::Result;
use tracing::debug;

/// Live calendar dimension table.
pub const CALENDAR_TABLE: &str = "calendar_days";

/// Staging table swapped with the live table on rebuild.
pub const CALENDAR_STAGING_TABLE: &str = "calendar_days_staging";

/// SQL for creating the calendar dimension table.
pub const CREATE_CALENDAR_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS calendar_days (
    calendar_date Date,
    day_of_month UInt8,
    month UInt8,
    quarter UInt8,
    quarter_label LowCardinality(String),
    year UInt16,
    weekday_number UInt8,
    weekday_name LowCardinality(String),
    date_key String,
    month_abbrev LowCardinality(String),
    month_name LowCardinality(String),
    holiday_name Nullable(String),
    is_holiday UInt8 DEFAULT 0
)
ENGINE = MergeTree()
ORDER BY calendar_date
"#;

/// SQL for creating the orders table.
pub const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS cust_order (
    order_id UInt64,
    order_date DateTime64(3, 'UTC'),
    customer_id UInt64 DEFAULT 0,
    shipping_method_id UInt64 DEFAULT 0,
    dest_address_id UInt64
)
ENGINE = MergeTree()
ORDER BY (order_date, order_id)
"#;

/// SQL for creating the order lines table.
pub const CREATE_ORDER_LINES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS order_line (
    line_id UInt64,
    order_id UInt64,
    book_id UInt64,
    price Decimal(10, 2)
)
ENGINE = MergeTree()
ORDER BY (order_id, line_id)
"#;

/// SQL for creating the books table.
pub const CREATE_BOOKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS book (
    book_id UInt64,
    title String,
    isbn13 String DEFAULT '',
    language_id UInt64 DEFAULT 0,
    num_pages UInt32 DEFAULT 0,
    publication_date Nullable(Date),
    publisher_id UInt64 DEFAULT 0
)
ENGINE = MergeTree()
ORDER BY book_id
"#;

/// SQL for creating the authors table.
pub const CREATE_AUTHORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS author (
    author_id UInt64,
    author_name String
)
ENGINE = MergeTree()
ORDER BY author_id
"#;

/// SQL for creating the book/author association table.
pub const CREATE_BOOK_AUTHORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS book_author (
    book_id UInt64,
    author_id UInt64
)
ENGINE = MergeTree()
ORDER BY (book_id, author_id)
"#;

/// SQL for creating the addresses table.
pub const CREATE_ADDRESSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS address (
    address_id UInt64,
    street_number String,
    street_name String,
    city String,
    country_id UInt64
)
ENGINE = MergeTree()
ORDER BY address_id
"#;

/// SQL for creating the countries table.
pub const CREATE_COUNTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS country (
    country_id UInt64,
    country_name String
)
ENGINE = MergeTree()
ORDER BY country_id
"#;

/// All table creation statements.
pub fn all_tables() -> Vec<&'static str> {
    vec![
        CREATE_CALENDAR_TABLE,
        // Bookstore source tables
        CREATE_ORDERS_TABLE,
        CREATE_ORDER_LINES_TABLE,
        CREATE_BOOKS_TABLE,
        CREATE_AUTHORS_TABLE,
        CREATE_BOOK_AUTHORS_TABLE,
        CREATE_ADDRESSES_TABLE,
        CREATE_COUNTRIES_TABLE,
    ]
}

/// Initialize the database schema.
///
/// Creates the database and all tables if they don't exist.
pub async fn init_schema(client: &ClickHouseClient) -> Result<()> {
    let create_db = format!(
        "CREATE DATABASE IF NOT EXISTS {}",
        client.config().database
    );
    client
        .server()
        .query(&create_db)
        .execute()
        .await
        .map_err(write_error)?;

    for sql in all_tables() {
        client
            .inner()
            .query(sql)
            .execute()
            .await
            .map_err(write_error)?;
    }

    debug!(database = %client.config().database, "ClickHouse schema initialized");
    Ok(())
}
