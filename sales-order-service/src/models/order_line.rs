//! Sales order line item model.

use chrono::{DateTime, Utc};
use order_engine::{LinePricing, PricingLine};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored line item.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct SalesOrderLine {
    pub id: i64,
    pub sales_order_id: i64,
    pub line_no: i32,
    pub product_id: i64,
    /// Product name as it was when the line was written.
    pub product_name: String,
    pub qty: i32,
    pub unit_price: Decimal,
    /// `percentage`, `amount`, or absent for no discount.
    pub discount_type: Option<String>,
    pub discount_value: Decimal,
    pub total_price: Decimal,
    pub created_utc: DateTime<Utc>,
}

/// A priced line ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderLine {
    pub product_id: i64,
    pub product_name: String,
    pub pricing: PricingLine,
    pub computed: LinePricing,
}

impl NewOrderLine {
    pub fn qty(&self) -> i32 {
        self.pricing.quantity()
    }

    pub fn unit_price(&self) -> Decimal {
        self.pricing.unit_price()
    }

    pub fn discount_type(&self) -> Option<&'static str> {
        self.pricing.discount().kind().map(|k| k.as_str())
    }

    pub fn discount_value(&self) -> Decimal {
        self.pricing.discount().value()
    }

    pub fn total_price(&self) -> Decimal {
        self.computed.total_price
    }
}
