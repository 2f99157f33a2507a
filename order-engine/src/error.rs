use rust_decimal::Decimal;
use thiserror::Error;

/// Rejections raised while building a priceable line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("quantity must be at least 1, got {0}")]
    QuantityTooSmall(i32),

    #[error("unit_price must be non-negative, got {0}")]
    NegativeUnitPrice(Decimal),

    #[error("unit_price exceeds the maximum of {max}, got {value}")]
    UnitPriceTooLarge { value: Decimal, max: Decimal },

    #[error("discount_value must be non-negative, got {0}")]
    NegativeDiscount(Decimal),

    #[error("discount_value exceeds the maximum of {max}, got {value}")]
    DiscountTooLarge { value: Decimal, max: Decimal },

    #[error("unknown discount_type '{0}'")]
    UnknownDiscountType(String),
}

impl PricingError {
    /// Name of the input field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            PricingError::QuantityTooSmall(_) => "qty",
            PricingError::NegativeUnitPrice(_) | PricingError::UnitPriceTooLarge { .. } => {
                "unit_price"
            }
            PricingError::NegativeDiscount(_) | PricingError::DiscountTooLarge { .. } => {
                "discount_value"
            }
            PricingError::UnknownDiscountType(_) => "discount_type",
        }
    }
}
