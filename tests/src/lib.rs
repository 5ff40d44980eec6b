//! Shared helpers for the integration tests.
//!
//! The ClickHouse suites need Docker (or `BOOKSTORE_TEST_CLICKHOUSE_URL`);
//! `report_memory` runs without either.

pub mod containers;
pub mod fixtures;
pub mod mocks;
pub mod setup;
