//! Test helpers for sales-order-service integration tests.
//!
//! HTTP tests need `TEST_DATABASE_URL`; without it `TestApp::spawn` returns
//! `None` and the test exits early. Each spawned app gets its own schema.

#![allow(dead_code)]

pub mod memory;

use sales_order_service::config::{DatabaseConfig, ListingConfig, SalesOrderConfig};
use sales_order_service::startup::Application;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();
static SCHEMA_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,sales_order_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn test_database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL")
        .ok()
        .filter(|s| !s.is_empty())
}

fn unique_schema_name() -> String {
    let counter = SCHEMA_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("test_sales_orders_{}_{}", std::process::id(), counter)
}

/// Minimal valid create/update body with the given lines.
pub fn order_body(details: Value) -> Value {
    json!({
        "order_date": "2025-09-20",
        "customer_id": 1,
        "currency_id": "IDR",
        "order_type_id": 1,
        "status_type_id": 1,
        "remarks": "integration test",
        "details": details,
    })
}

pub fn line(product_id: i64, qty: i32, unit_price: &str) -> Value {
    json!({
        "product_id": product_id,
        "product_name": format!("Product {}", product_id),
        "qty": qty,
        "unit_price": unit_price,
    })
}

/// Test application wrapper for HTTP tests.
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    schema_name: String,
    base_url: String,
    schema_url: String,
}

impl TestApp {
    /// Spawn the service on a random port against a fresh schema.
    pub async fn spawn() -> Option<Self> {
        init_tracing();

        let Some(base_url) = test_database_url() else {
            eprintln!("TEST_DATABASE_URL not set; skipping HTTP test");
            return None;
        };
        let schema_name = unique_schema_name();

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&base_url)
            .await
            .expect("Failed to connect to test database");
        sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", schema_name))
            .execute(&pool)
            .await
            .ok();
        sqlx::query(&format!("CREATE SCHEMA {}", schema_name))
            .execute(&pool)
            .await
            .expect("Failed to create test schema");
        pool.close().await;

        let separator = if base_url.contains('?') { "&" } else { "?" };
        let url = format!(
            "{}{}options=-c search_path%3D{}",
            base_url, separator, schema_name
        );

        let config = SalesOrderConfig {
            common: CoreConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            service_name: "sales-order-service-test".to_string(),
            service_version: "test".to_string(),
            log_level: "debug".to_string(),
            otlp_endpoint: None,
            database: DatabaseConfig {
                url: url.clone(),
                max_connections: 4,
                min_connections: 1,
            },
            listing: ListingConfig::default(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.http_port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(format!("{}/health", address)).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        Some(Self {
            address,
            client,
            schema_name,
            base_url,
            schema_url: url,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// POST an order and return the created JSON body.
    pub async fn create_order(&self, body: &Value) -> Value {
        let response = self
            .client
            .post(self.url("/sales-orders"))
            .json(body)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Invalid JSON body")
    }

    /// Count rows in one of the service tables, bypassing the API.
    pub async fn count_rows(&self, table: &str) -> i64 {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&self.schema_url)
            .await
            .expect("Failed to connect to test schema");
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&pool)
            .await
            .expect("Failed to count rows");
        pool.close().await;
        count
    }

    /// Run raw SQL statements inside the test schema, bypassing the API.
    pub async fn execute(&self, statements: &[&str]) {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&self.schema_url)
            .await
            .expect("Failed to connect to test schema");
        for statement in statements {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .expect("Failed to execute statement");
        }
        pool.close().await;
    }

    /// Drop the test schema.
    pub async fn cleanup(&self) {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&self.base_url)
            .await
            .ok();

        if let Some(pool) = pool {
            let _ = sqlx::query(&format!(
                "DROP SCHEMA IF EXISTS {} CASCADE",
                self.schema_name
            ))
            .execute(&pool)
            .await;
            pool.close().await;
        }
    }
}
