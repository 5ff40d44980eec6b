//! ClickHouse reachability probe, run before every database command.

use crate::client::ClickHouseClient;
use tracing::{debug, error};

/// Returns true when the server answers `SELECT 1`.
pub async fn check_connection(client: &ClickHouseClient) -> bool {
    let config = client.config();
    match client.server().query("SELECT 1").fetch_one::<u8>().await {
        Ok(_) => {
            debug!(url = %config.url, "ClickHouse reachable");
            true
        }
        Err(e) => {
            error!(url = %config.url, error = %e, "ClickHouse unreachable");
            false
        }
    }
}
