//! Read-only lookup tables served to clients building order forms.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Lookup {
    pub id: i64,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReferenceData {
    pub customers: &'static [Lookup],
    pub currencies: &'static [Currency],
    pub order_types: &'static [Lookup],
    pub statuses: &'static [Lookup],
    pub products: &'static [Lookup],
    pub withholding_taxes: &'static [Lookup],
    pub vat_codes: &'static [Lookup],
}

const fn lookup(id: i64, name: &'static str) -> Lookup {
    Lookup { id, name }
}

pub const CUSTOMERS: &[Lookup] = &[
    lookup(1, "Customer A"),
    lookup(2, "Customer B"),
    lookup(3, "Customer C"),
];

pub const CURRENCIES: &[Currency] = &[
    Currency { code: "IDR", name: "Indonesian Rupiah" },
    Currency { code: "USD", name: "US Dollar" },
    Currency { code: "SGD", name: "Singapore Dollar" },
];

pub const ORDER_TYPES: &[Lookup] = &[
    lookup(1, "Sales"),
    lookup(2, "Sewa"),
    lookup(3, "Maintenance"),
];

pub const STATUSES: &[Lookup] = &[
    lookup(1, "Open"),
    lookup(2, "Closed"),
    lookup(3, "Cancelled"),
];

pub const PRODUCTS: &[Lookup] = &[
    lookup(1, "PC Server"),
    lookup(2, "Laptop"),
    lookup(3, "Printer"),
    lookup(4, "Monitor"),
    lookup(5, "Keyboard"),
];

pub const WITHHOLDING_TAXES: &[Lookup] = &[
    lookup(1, "PPH 21"),
    lookup(2, "PPH 23"),
    lookup(3, "PPH 25"),
];

pub const VAT_CODES: &[Lookup] = &[lookup(1, "PPN 11%"), lookup(2, "PPN 10%")];

pub const REFERENCE_DATA: ReferenceData = ReferenceData {
    customers: CUSTOMERS,
    currencies: CURRENCIES,
    order_types: ORDER_TYPES,
    statuses: STATUSES,
    products: PRODUCTS,
    withholding_taxes: WITHHOLDING_TAXES,
    vat_codes: VAT_CODES,
};
