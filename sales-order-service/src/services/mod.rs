pub mod database;
pub mod metrics;
pub mod order_service;
pub mod repository;

pub use database::Database;
pub use metrics::{get_metrics, http_metrics_middleware, init_metrics};
pub use order_service::SalesOrderService;
pub use repository::SalesOrderRepository;
