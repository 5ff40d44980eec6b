//! Common test setup functions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use clickhouse_client::{
    insert::{insert_order_lines, insert_orders},
    schema::init_schema,
    ClickHouseClient, ClickHouseConfig,
};
use report_core::{Order, OrderLine, Result};

use crate::containers::TestContainers;

static DATABASE_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Test context with a real ClickHouse and a freshly created schema.
///
/// Each context gets its own database so tests sharing one server do not
/// see each other's rows.
pub struct TestContext {
    pub containers: TestContainers,
    pub clickhouse: Arc<ClickHouseClient>,
}

impl TestContext {
    /// Create a new test context with the schema initialized.
    pub async fn new() -> Self {
        let containers = TestContainers::start().await;

        let database = format!(
            "bookstore_test_{}_{}",
            std::process::id(),
            DATABASE_SEQ.fetch_add(1, Ordering::SeqCst)
        );

        let ch_config = ClickHouseConfig {
            url: containers.clickhouse_url.clone(),
            database,
            username: containers.clickhouse_username.clone(),
            password: containers.clickhouse_password.clone(),
            timeout_secs: 30,
        };
        let clickhouse =
            Arc::new(ClickHouseClient::new(ch_config).expect("Failed to create ClickHouse client"));

        init_schema(&clickhouse)
            .await
            .expect("Failed to initialize schema");

        Self {
            containers,
            clickhouse,
        }
    }

    /// Insert orders and their lines.
    pub async fn seed(&self, orders: &[Order], lines: &[OrderLine]) -> Result<()> {
        insert_orders(&self.clickhouse, orders).await?;
        insert_order_lines(&self.clickhouse, lines).await?;
        Ok(())
    }

    /// Number of tables named `name` in the test database.
    pub async fn table_count(&self, name: &str) -> u64 {
        self.clickhouse
            .inner()
            .query("SELECT count() FROM system.tables WHERE database = ? AND name = ?")
            .bind(self.clickhouse.config().database.as_str())
            .bind(name)
            .fetch_one::<u64>()
            .await
            .expect("Failed to query system.tables")
    }

    /// Get the ClickHouse URL.
    pub fn clickhouse_url(&self) -> &str {
        &self.containers.clickhouse_url
    }
}
