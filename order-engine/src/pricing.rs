//! Line and order total computation.
//!
//! Per line: `gross = qty × unit_price`, the discount is either a percentage
//! of `gross` or a per-unit amount times `qty`, and the stored line total is
//! `max(0, gross − discount)`.
//!
//! Per order the raw figures are aggregated, not the clamped line totals:
//! `subtotal = Σ gross`, `discount_amount = Σ discount` and
//! `total_amount = subtotal − discount_amount`. When a discount exceeds its
//! line, the order total therefore differs from the sum of line totals and
//! may go negative. That divergence is kept as-is.

use crate::error::PricingError;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Monetary precision (2 decimal places, half away from zero).
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Largest value a `NUMERIC(15,2)` money column holds (9,999,999,999,999.99).
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xA4C6_7FFF, 0x0003_8D7E, 0, false, 2);

const ONE_HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Round to money precision and pin the scale so `270` renders as `270.00`.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value
        .round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DECIMAL_PLACES);
    rounded
}

/// Discount type as it appears on the wire and in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percentage,
    Amount,
    None,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Percentage => "percentage",
            DiscountKind::Amount => "amount",
            DiscountKind::None => "none",
        }
    }
}

impl FromStr for DiscountKind {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountKind::Percentage),
            "amount" => Ok(DiscountKind::Amount),
            "none" | "" => Ok(DiscountKind::None),
            other => Err(PricingError::UnknownDiscountType(other.to_string())),
        }
    }
}

/// Per-line discount. A value only exists for the variants that use one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Discount {
    #[default]
    None,
    /// Percent of the line's gross value (10 means 10%).
    Percentage(Decimal),
    /// Fixed amount taken off every unit.
    Amount(Decimal),
}

impl Discount {
    /// Build a discount from the loose `discount_type` / `discount_value` pair.
    ///
    /// A missing value counts as zero. The value is ignored (and not checked)
    /// when there is no discount type.
    pub fn from_parts(
        kind: Option<DiscountKind>,
        value: Option<Decimal>,
    ) -> Result<Self, PricingError> {
        let kind = match kind {
            None | Some(DiscountKind::None) => return Ok(Discount::None),
            Some(kind) => kind,
        };

        let value = value.unwrap_or(Decimal::ZERO);
        if value < Decimal::ZERO {
            return Err(PricingError::NegativeDiscount(value));
        }
        let value = value.abs();
        if value > MAX_MONEY {
            return Err(PricingError::DiscountTooLarge {
                value,
                max: MAX_MONEY,
            });
        }

        Ok(match kind {
            DiscountKind::Percentage => Discount::Percentage(value),
            _ => Discount::Amount(value),
        })
    }

    /// Storage form of the type; `None` is stored as absent.
    pub fn kind(&self) -> Option<DiscountKind> {
        match self {
            Discount::None => None,
            Discount::Percentage(_) => Some(DiscountKind::Percentage),
            Discount::Amount(_) => Some(DiscountKind::Amount),
        }
    }

    pub fn value(&self) -> Decimal {
        match self {
            Discount::None => Decimal::ZERO,
            Discount::Percentage(v) | Discount::Amount(v) => *v,
        }
    }
}

/// A validated line ready for pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingLine {
    quantity: i32,
    unit_price: Decimal,
    discount: Discount,
}

impl PricingLine {
    /// Validate a line. Inputs keep their full precision; only computed
    /// figures are rounded.
    pub fn new(quantity: i32, unit_price: Decimal, discount: Discount) -> Result<Self, PricingError> {
        if quantity < 1 {
            return Err(PricingError::QuantityTooSmall(quantity));
        }

        if unit_price < Decimal::ZERO {
            return Err(PricingError::NegativeUnitPrice(unit_price));
        }

        // Bounding the gross value keeps every later multiplication in range.
        let gross = Decimal::from(quantity).checked_mul(unit_price);
        match gross {
            Some(gross) if gross <= MAX_MONEY => {}
            _ => {
                return Err(PricingError::UnitPriceTooLarge {
                    value: unit_price,
                    max: MAX_MONEY,
                })
            }
        }

        Ok(Self {
            quantity,
            unit_price: unit_price.abs(),
            discount,
        })
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn discount(&self) -> Discount {
        self.discount
    }

    /// `qty × unit_price`, before any discount.
    pub fn gross(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }

    /// This line's discount contribution, unclamped.
    pub fn discount_amount(&self) -> Decimal {
        match self.discount {
            Discount::Percentage(v) if v > Decimal::ZERO => self.gross() * (v / ONE_HUNDRED),
            Discount::Amount(v) if v > Decimal::ZERO => v * Decimal::from(self.quantity),
            _ => Decimal::ZERO,
        }
    }
}

/// Computed figures for one line.
///
/// Each field is rounded on its own. The order aggregates round the raw sums
/// instead, so per-line `discount_amount` values need not add up to the
/// order's `discount_amount` (two lines discounted by 0.005 show 0.01 each
/// while the order shows 0.01).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinePricing {
    /// `qty × unit_price`.
    pub line_total: Decimal,
    /// The line's own discount contribution, rounded for display only.
    pub discount_amount: Decimal,
    /// `max(0, line_total − discount)`; what gets stored as the line total.
    pub total_price: Decimal,
}

/// Order-level aggregates. `total_amount == subtotal − discount_amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
}

impl OrderTotals {
    fn from_sums(subtotal: Decimal, discount_amount: Decimal) -> Self {
        let subtotal = round_money(subtotal);
        let discount_amount = round_money(discount_amount);
        Self {
            subtotal,
            discount_amount,
            total_amount: subtotal - discount_amount,
        }
    }
}

/// Per-line results plus aggregates, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPricing {
    pub lines: Vec<LinePricing>,
    pub totals: OrderTotals,
}

pub fn price_line(line: &PricingLine) -> LinePricing {
    let gross = line.gross();
    let discount = line.discount_amount();

    LinePricing {
        line_total: round_money(gross),
        discount_amount: round_money(discount),
        total_price: round_money((gross - discount).max(Decimal::ZERO)),
    }
}

/// Aggregate raw gross values and raw discounts, then subtract.
pub fn compute_totals<'a, I>(lines: I) -> OrderTotals
where
    I: IntoIterator<Item = &'a PricingLine>,
{
    let (subtotal, discount) = lines
        .into_iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(subtotal, discount), line| {
            (subtotal + line.gross(), discount + line.discount_amount())
        });

    OrderTotals::from_sums(subtotal, discount)
}

pub fn price_order(lines: &[PricingLine]) -> OrderPricing {
    OrderPricing {
        lines: lines.iter().map(price_line).collect(),
        totals: compute_totals(lines),
    }
}
