//! Domain models for sales-order-service.

pub mod order_line;
pub mod sales_order;

pub use order_line::{NewOrderLine, SalesOrderLine};
pub use sales_order::{
    NewSalesOrder, SalesOrder, SalesOrderDraft, SalesOrderHeader, SalesOrderSummary,
    SalesOrderWithLines,
};
