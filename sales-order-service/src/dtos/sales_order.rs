//! Sales order payloads.
//!
//! Validation runs in two passes: the `validator` derive checks presence and
//! simple ranges field by field, then each line is handed to the pricing
//! engine, whose rejections are reported under `details` with the line index.

use crate::models::{SalesOrderDraft, SalesOrderHeader};
use chrono::NaiveDate;
use order_engine::pricing::MAX_MONEY;
use order_engine::{
    parse_order_number, Discount, DiscountKind, LinePricing, OrderTotals, PricingError,
    PricingLine,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// Create/update body. `order_number` is honoured on create only.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SalesOrderRequest {
    #[serde(default, alias = "so_number")]
    #[validate(length(min = 1, max = 32))]
    pub order_number: Option<String>,

    #[serde(default, alias = "so_date")]
    #[validate(required)]
    pub order_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(required, range(min = 1))]
    pub customer_id: Option<i64>,

    #[serde(default)]
    #[validate(required, length(equal = 3))]
    pub currency_id: Option<String>,

    #[serde(default)]
    #[validate(required, range(min = 1))]
    pub order_type_id: Option<i64>,

    #[serde(default)]
    #[validate(required, range(min = 1))]
    pub status_type_id: Option<i64>,

    #[serde(default)]
    #[validate(length(max = 2000))]
    pub remarks: Option<String>,

    #[serde(default, alias = "pph_id")]
    #[validate(range(min = 1))]
    pub withholding_tax_id: Option<i64>,

    #[serde(default, alias = "ppn_id")]
    #[validate(range(min = 1))]
    pub vat_id: Option<i64>,

    #[serde(default)]
    #[validate(length(min = 1), nested)]
    pub details: Vec<OrderLineRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderLineRequest {
    #[serde(default)]
    #[validate(required, range(min = 1))]
    pub product_id: Option<i64>,

    #[serde(default)]
    #[validate(required, length(min = 1, max = 255))]
    pub product_name: Option<String>,

    #[serde(default)]
    #[validate(required, range(min = 1))]
    pub qty: Option<i32>,

    #[serde(default)]
    #[validate(required)]
    pub unit_price: Option<Decimal>,

    #[serde(default)]
    pub discount_type: Option<String>,

    #[serde(default)]
    pub discount_value: Option<Decimal>,
}

/// A validated request: the optional client-supplied number plus the priced draft.
#[derive(Debug, Clone)]
pub struct OrderSubmission {
    pub order_number: Option<String>,
    pub draft: SalesOrderDraft,
}

fn line_error(index: usize, err: &PricingError) -> ValidationError {
    let mut error = ValidationError::new(err.field());
    error.message = Some(Cow::Owned(err.to_string()));
    error.add_param(Cow::Borrowed("index"), &index);
    error
}

fn totals_error(totals: &OrderTotals) -> Option<ValidationError> {
    if totals.subtotal <= MAX_MONEY && totals.discount_amount <= MAX_MONEY {
        return None;
    }
    let mut error = ValidationError::new("order_total_too_large");
    error.message = Some(Cow::Owned(format!(
        "order totals exceed the maximum of {}",
        MAX_MONEY
    )));
    Some(error)
}

impl OrderLineRequest {
    /// Turn a structurally valid line into a pricing line.
    fn to_pricing_line(&self) -> Result<PricingLine, PricingError> {
        let kind = self
            .discount_type
            .as_deref()
            .map(|s| s.trim().parse::<DiscountKind>())
            .transpose()?;
        let discount = Discount::from_parts(kind, self.discount_value)?;

        PricingLine::new(
            self.qty.unwrap_or_default(),
            self.unit_price.unwrap_or_default(),
            discount,
        )
    }
}

/// Price every line, collecting one error per rejected line.
fn price_lines(details: &[OrderLineRequest]) -> Result<Vec<PricingLine>, Vec<ValidationError>> {
    let mut lines = Vec::with_capacity(details.len());
    let mut errors = Vec::new();

    for (index, detail) in details.iter().enumerate() {
        match detail.to_pricing_line() {
            Ok(line) => lines.push(line),
            Err(e) => errors.push(line_error(index, &e)),
        }
    }

    if errors.is_empty() {
        Ok(lines)
    } else {
        Err(errors)
    }
}

fn details_errors(line_errors: Vec<ValidationError>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for error in line_errors {
        errors.add("details", error);
    }
    errors
}

impl SalesOrderRequest {
    /// Validate and price a body for create. A blank `order_number` means
    /// "generate one"; anything else must match the order number format.
    pub fn into_submission(mut self) -> Result<OrderSubmission, ValidationErrors> {
        self.order_number = self
            .order_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self.validate()?;

        let mut errors = ValidationErrors::new();
        let order_number = self.order_number.take();
        if let Some(number) = &order_number {
            if parse_order_number(number).is_none() {
                let mut error = ValidationError::new("format");
                error.message = Some(Cow::Borrowed("order_number must look like SOYYYYMMDD0001"));
                errors.add("order_number", error);
            }
        }

        let draft = self.into_draft(errors)?;
        Ok(OrderSubmission {
            order_number,
            draft,
        })
    }

    /// Validate and price a body for update. The stored order number is
    /// never rewritten, so whatever the body carries is not checked.
    pub fn into_update(mut self) -> Result<SalesOrderDraft, ValidationErrors> {
        self.order_number = None;
        self.validate()?;
        self.into_draft(ValidationErrors::new())
    }

    fn into_draft(self, mut errors: ValidationErrors) -> Result<SalesOrderDraft, ValidationErrors> {
        let pricing_lines = match price_lines(&self.details) {
            Ok(lines) => lines,
            Err(line_errors) => {
                for error in line_errors {
                    errors.add("details", error);
                }
                return Err(errors);
            }
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let header = SalesOrderHeader {
            // `required` has passed, so these are all present.
            order_date: self.order_date.unwrap_or_default(),
            customer_id: self.customer_id.unwrap_or_default(),
            currency_code: self
                .currency_id
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_default(),
            order_type_id: self.order_type_id.unwrap_or_default(),
            status_id: self.status_type_id.unwrap_or_default(),
            remarks: self.remarks.filter(|r| !r.trim().is_empty()),
            withholding_tax_id: self.withholding_tax_id,
            vat_id: self.vat_id,
        };

        let items = self
            .details
            .into_iter()
            .zip(pricing_lines)
            .map(|(detail, line)| {
                (
                    detail.product_id.unwrap_or_default(),
                    detail.product_name.unwrap_or_default(),
                    line,
                )
            })
            .collect();

        let draft = SalesOrderDraft::price(header, items);
        if let Some(error) = totals_error(&draft.totals) {
            errors.add("details", error);
            return Err(errors);
        }

        Ok(draft)
    }

    /// Whether the body carries a non-blank order number.
    pub fn has_order_number(&self) -> bool {
        self.order_number
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty())
    }
}

/// Live pricing preview body: just the lines.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PreviewRequest {
    #[serde(default)]
    #[validate(length(min = 1), nested)]
    pub details: Vec<OrderLineRequest>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PreviewResponse {
    pub details: Vec<LinePricing>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
}

impl PreviewRequest {
    pub fn pricing_lines(&self) -> Result<Vec<PricingLine>, ValidationErrors> {
        self.validate()?;
        price_lines(&self.details).map_err(details_errors)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderNumberResponse {
    pub order_number: String,
}
