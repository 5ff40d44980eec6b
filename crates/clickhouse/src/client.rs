//! ClickHouse client wrapper.

use crate::config::ClickHouseConfig;
use clickhouse::Client;
use report_core::{DataErrorCode, Error, Result};
use telemetry::metrics;
use tracing::info;

/// ClickHouse client bound to the bookstore database.
#[derive(Clone)]
pub struct ClickHouseClient {
    inner: Client,
    config: ClickHouseConfig,
}

impl ClickHouseClient {
    /// Creates a new ClickHouse client.
    pub fn new(config: ClickHouseConfig) -> Result<Self> {
        if config.database.is_empty() {
            return Err(Error::config("clickhouse.database must not be empty"));
        }

        let mut client = Client::default()
            .with_url(&config.url)
            .with_database(&config.database)
            .with_option("max_execution_time", config.timeout_secs.to_string());

        if let Some(ref user) = config.username {
            client = client.with_user(user);
        }

        if let Some(ref pass) = config.password {
            client = client.with_password(pass);
        }

        info!(
            url = %config.url,
            database = %config.database,
            "Created ClickHouse client"
        );

        Ok(Self {
            inner: client,
            config,
        })
    }

    /// Returns the inner clickhouse client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClickHouseConfig {
        &self.config
    }

    /// Client pointed at the `default` database, for statements that must
    /// run before the configured database exists.
    pub(crate) fn server(&self) -> Client {
        self.inner.clone().with_database("default")
    }
}

/// Maps a driver error on a read path.
pub(crate) fn query_error(e: clickhouse::error::Error) -> Error {
    metrics().data_access_errors.inc();
    Error::data(DataErrorCode::Unavailable, format!("Query error: {}", e))
}

/// Maps a driver error on a write path.
pub(crate) fn write_error(e: clickhouse::error::Error) -> Error {
    metrics().data_access_errors.inc();
    Error::data(DataErrorCode::WriteFailed, format!("Write error: {}", e))
}
