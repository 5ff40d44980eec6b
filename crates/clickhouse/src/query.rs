//! Order and order-line reads.

use async_trait::async_trait;
use report_core::{DateRange, Order, OrderLine, OrderSource, Result};
use tracing::debug;

use crate::client::{query_error, ClickHouseClient};
use crate::rows::{days_to_date, DateBoundsRow, OrderLineRow, OrderRow};

/// Maximum order ids per `IN (...)` list.
const ORDER_ID_CHUNK: usize = 10_000;

#[async_trait]
impl OrderSource for ClickHouseClient {
    async fn orders_between(&self, range: DateRange) -> Result<Vec<Order>> {
        let rows: Vec<OrderRow> = self
            .inner()
            .query(
                "SELECT order_id, order_date, dest_address_id FROM cust_order \
                 WHERE toDate(order_date) >= toDate(?) AND toDate(order_date) <= toDate(?) \
                 ORDER BY order_date, order_id",
            )
            .bind(range.start().to_string())
            .bind(range.end().to_string())
            .fetch_all()
            .await
            .map_err(query_error)?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn lines_for_orders(&self, order_ids: &[u64]) -> Result<Vec<OrderLine>> {
        let mut lines = Vec::new();

        for chunk in order_ids.chunks(ORDER_ID_CHUNK) {
            let ids = chunk
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let sql = format!(
                "SELECT line_id, order_id, book_id, price FROM order_line \
                 WHERE order_id IN ({}) ORDER BY order_id, line_id",
                ids
            );

            let rows: Vec<OrderLineRow> = self
                .inner()
                .query(&sql)
                .fetch_all()
                .await
                .map_err(query_error)?;
            lines.extend(rows.into_iter().map(OrderLine::from));
        }

        debug!(orders = order_ids.len(), lines = lines.len(), "Fetched order lines");
        Ok(lines)
    }

    async fn order_date_bounds(&self) -> Result<Option<DateRange>> {
        let bounds: DateBoundsRow = self
            .inner()
            .query(
                "SELECT toDate(min(order_date)) AS min_day, toDate(max(order_date)) AS max_day, \
                 count() AS total FROM cust_order",
            )
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

    async fn count_orders_outside(&self, range: DateRange) -> Result<u64> {
        self.inner()
            .query(
                "SELECT count() FROM cust_order \
                 WHERE toDate(order_date) < toDate(?) OR toDate(order_date) > toDate(?)",
            )
            .bind(range.start().to_string())
            .bind(range.end().to_string())
            .fetch_one::<u64>()
            .await
            .map_err(query_error)
    }
}

/// Count all orders (for testing).
pub async fn count_orders(client: &ClickHouseClient) -> Result<u64> {
    client
        .inner()
        .query("SELECT count() FROM cust_order")
        .fetch_one()
        .await
        .map_err(query_error)
}
