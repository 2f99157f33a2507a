//! sales-order-service: sales order management over HTTP/JSON.
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod reference;
pub mod services;
pub mod startup;
