//! ClickHouse data source for bookstore calendar and order reports.
//!
//! `ClickHouseClient` implements both `CalendarStore` and `OrderSource`.

pub mod calendar;
pub mod client;
pub mod config;
pub mod health;
pub mod insert;
pub mod query;
pub mod rows;
pub mod schema;

pub use client::*;
pub use config::*;
pub use query::*;
