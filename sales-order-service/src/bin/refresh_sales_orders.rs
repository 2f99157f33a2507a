//! Wipe the sales order tables and seed them with sample orders.
//!
//! Reads the same environment as the service (`DATABASE_URL`, ...).
//! `SEED_ORDER_COUNT` overrides the number of orders (default 15).

use chrono::{Duration, Local, NaiveDate};
use order_engine::{format_order_number, Discount, PricingError, PricingLine};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use sales_order_service::config::SalesOrderConfig;
use sales_order_service::models::{NewSalesOrder, SalesOrderDraft, SalesOrderHeader};
use sales_order_service::reference::{
    CURRENCIES, CUSTOMERS, ORDER_TYPES, PRODUCTS, STATUSES, VAT_CODES, WITHHOLDING_TAXES,
};
use sales_order_service::services::{Database, SalesOrderRepository};
use service_core::observability::init_tracing;

const DEFAULT_ORDER_COUNT: usize = 15;

const SAMPLE_REMARKS: &[&str] = &[
    "Urgent delivery",
    "Regular order",
    "Bulk purchase",
    "Repeat customer",
    "Quarterly restock",
];

fn sample_discount(rng: &mut impl Rng) -> Discount {
    if !rng.gen_bool(0.3) {
        return Discount::None;
    }
    if rng.gen_bool(0.5) {
        Discount::Percentage(Decimal::from(rng.gen_range(5..=25i64)))
    } else {
        Discount::Amount(Decimal::from(rng.gen_range(50..=500i64)))
    }
}

fn pick_id(rng: &mut impl Rng, table: &[sales_order_service::reference::Lookup]) -> i64 {
    table.choose(rng).map(|l| l.id).unwrap_or(1)
}

/// Build the `index`-th (1-based) sample order.
fn sample_order(
    rng: &mut impl Rng,
    index: usize,
    today: NaiveDate,
) -> Result<NewSalesOrder, PricingError> {
    let order_date = today - Duration::days(rng.gen_range(0..30));

    let line_count = rng.gen_range(1..=5);
    let mut items = Vec::with_capacity(line_count);
    for _ in 0..line_count {
        let product = PRODUCTS.choose(rng).copied().unwrap_or(PRODUCTS[0]);
        let line = PricingLine::new(
            rng.gen_range(1..=10),
            Decimal::from(rng.gen_range(100..=10_000i64)),
            sample_discount(rng),
        )?;
        items.push((product.id, product.name.to_string(), line));
    }

    let header = SalesOrderHeader {
        order_date,
        customer_id: pick_id(rng, CUSTOMERS),
        currency_code: CURRENCIES
            .choose(rng)
            .map(|c| c.code)
            .unwrap_or("IDR")
            .to_string(),
        order_type_id: pick_id(rng, ORDER_TYPES),
        status_id: pick_id(rng, STATUSES),
        remarks: SAMPLE_REMARKS.choose(rng).map(|r| r.to_string()),
        withholding_tax_id: rng
            .gen_bool(0.5)
            .then(|| pick_id(rng, WITHHOLDING_TAXES)),
        vat_id: rng.gen_bool(0.5).then(|| pick_id(rng, VAT_CODES)),
    };

    Ok(NewSalesOrder {
        order_number: format_order_number(order_date, index as i64),
        draft: SalesOrderDraft::price(header, items),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = SalesOrderConfig::from_env()?;
    init_tracing(
        "refresh-sales-orders",
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    let count = std::env::var("SEED_ORDER_COUNT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_ORDER_COUNT);

    let db = Database::new(&config.database.url, 2, 1).await?;
    db.run_migrations().await?;
    db.truncate_all().await?;

    let today = Local::now().date_naive();
    let mut rng = rand::thread_rng();

    for index in 1..=count {
        let order = sample_order(&mut rng, index, today)?;
        let created = db.create(&order).await?;
        tracing::info!(
            order_number = %created.order.order_number,
            lines = created.lines.len(),
            total_amount = %created.order.total_amount,
            "Seeded sales order"
        );
    }

    tracing::info!(count = count, "Sales order data refreshed");
    Ok(())
}
