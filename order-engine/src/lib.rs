//! order-engine: the arithmetic and query rules behind sales orders.
//!
//! Nothing in this crate performs I/O. The service uses it when persisting
//! orders and the preview endpoint (or any client build of this crate) uses
//! the exact same code, so previewed and stored totals cannot drift apart.

pub mod error;
pub mod listing;
pub mod numbering;
pub mod pricing;

pub use error::PricingError;
pub use listing::{
    ListParams, ListQuery, OrderFilters, PageLimits, PageLinks, PageMeta, Paginated, Sort,
    SortColumn, SortDirection,
};
pub use numbering::{format_order_number, next_sequence, parse_order_number};
pub use pricing::{
    compute_totals, price_line, price_order, Discount, DiscountKind, LinePricing, OrderPricing,
    OrderTotals, PricingLine,
};
