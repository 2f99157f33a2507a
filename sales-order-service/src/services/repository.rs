//! Storage seam for sales orders.

use crate::models::{NewSalesOrder, SalesOrderDraft, SalesOrderSummary, SalesOrderWithLines};
use async_trait::async_trait;
use order_engine::ListQuery;
use service_core::error::AppError;

/// Persistence operations the order service relies on.
///
/// `create` and `update` must write the header and the full line set
/// atomically.
#[async_trait]
pub trait SalesOrderRepository: Send + Sync + 'static {
    async fn create(&self, order: &NewSalesOrder) -> Result<SalesOrderWithLines, AppError>;

    async fn find_with_lines(&self, id: i64) -> Result<Option<SalesOrderWithLines>, AppError>;

    /// Replace the header fields and every line. `None` when the order does not exist.
    async fn update(
        &self,
        id: i64,
        draft: &SalesOrderDraft,
    ) -> Result<Option<SalesOrderWithLines>, AppError>;

    /// Returns whether a row was deleted. Lines go with it.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// One page of summaries plus the total number of matching orders.
    async fn paginate(&self, query: &ListQuery) -> Result<(Vec<SalesOrderSummary>, u64), AppError>;

    /// Highest id among stored orders, if any.
    async fn latest_id(&self) -> Result<Option<i64>, AppError>;
}
