//! Batch insert helpers for the bookstore tables.
//!
//! The reporter never writes orders; these seed development and test
//! databases.

use crate::client::{write_error, ClickHouseClient};
use crate::rows::{OrderLineRow, OrderRow};
use report_core::{Order, OrderLine, Result};
use tracing::debug;

/// Insert orders into cust_order.
pub async fn insert_orders(client: &ClickHouseClient, orders: &[Order]) -> Result<usize> {
    if orders.is_empty() {
        return Ok(0);
    }

    let mut insert = client.inner().insert("cust_order").map_err(write_error)?;
    for order in orders {
        insert.write(&OrderRow::from(order)).await.map_err(write_error)?;
    }
    insert.end().await.map_err(write_error)?;

    debug!(count = orders.len(), "Inserted orders");
    Ok(orders.len())
}

/// Insert order lines into order_line.
pub async fn insert_order_lines(client: &ClickHouseClient, lines: &[OrderLine]) -> Result<usize> {
    if lines.is_empty() {
        return Ok(0);
    }

    let rows = lines
        .iter()
        .map(OrderLineRow::from_line)
        .collect::<Result<Vec<_>>>()?;

    let mut insert = client.inner().insert("order_line").map_err(write_error)?;
    for row in &rows {
        insert.write(row).await.map_err(write_error)?;
    }
    insert.end().await.map_err(write_error)?;

    debug!(count = rows.len(), "Inserted order lines");
    Ok(rows.len())
}
