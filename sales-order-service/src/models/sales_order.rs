//! Sales order header model.

use crate::models::{NewOrderLine, SalesOrderLine};
use chrono::{DateTime, NaiveDate, Utc};
use order_engine::{price_order, OrderTotals, PricingLine};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored order header.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct SalesOrder {
    pub id: i64,
    pub order_number: String,
    pub order_date: NaiveDate,
    pub customer_id: i64,
    pub currency_code: String,
    pub order_type_id: i64,
    pub status_id: i64,
    pub remarks: Option<String>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub withholding_tax_id: Option<i64>,
    pub vat_id: Option<i64>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// List row: the header plus its line count.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct SalesOrderSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: SalesOrder,
    pub line_count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SalesOrderWithLines {
    #[serde(flatten)]
    pub order: SalesOrder,
    #[serde(rename = "details")]
    pub lines: Vec<SalesOrderLine>,
}

/// Editable header fields, shared by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesOrderHeader {
    pub order_date: NaiveDate,
    pub customer_id: i64,
    pub currency_code: String,
    pub order_type_id: i64,
    pub status_id: i64,
    pub remarks: Option<String>,
    pub withholding_tax_id: Option<i64>,
    pub vat_id: Option<i64>,
}

/// Header and lines with totals already computed.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesOrderDraft {
    pub header: SalesOrderHeader,
    pub lines: Vec<NewOrderLine>,
    pub totals: OrderTotals,
}

impl SalesOrderDraft {
    /// Price every line and aggregate the order.
    pub fn price(header: SalesOrderHeader, items: Vec<(i64, String, PricingLine)>) -> Self {
        let pricing_lines: Vec<PricingLine> = items.iter().map(|(_, _, line)| *line).collect();
        let priced = price_order(&pricing_lines);

        let lines = items
            .into_iter()
            .zip(priced.lines)
            .map(|((product_id, product_name, pricing), computed)| NewOrderLine {
                product_id,
                product_name,
                pricing,
                computed,
            })
            .collect();

        Self {
            header,
            lines,
            totals: priced.totals,
        }
    }
}

/// A draft with its assigned order number.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSalesOrder {
    pub order_number: String,
    pub draft: SalesOrderDraft,
}
