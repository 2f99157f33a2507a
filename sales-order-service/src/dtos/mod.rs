//! Request and response bodies for the HTTP API.

pub mod sales_order;

pub use sales_order::{
    OrderLineRequest, OrderNumberResponse, OrderSubmission, PreviewRequest, PreviewResponse,
    SalesOrderRequest,
};
