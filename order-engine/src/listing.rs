//! Filter, sort and pagination rules for order listings.
//!
//! Raw query parameters come in as [`ListParams`] and are normalised into a
//! [`ListQuery`]: empty values mean "no filter", unknown sort columns fall
//! back to order date descending, and page numbers and sizes are clamped.
//! Every active parameter is echoed into the pagination links.

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PER_PAGE: u32 = 15;
pub const MAX_PER_PAGE: u32 = 100;

/// Treat absent and blank parameters alike.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

/// Like [`empty_as_none`] but unparseable values are dropped instead of rejected.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse::<T>().ok()))
}

/// Listing parameters exactly as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub customer_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub currency_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub order_type_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status_type_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_by: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_direction: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub per_page: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub page: Option<u32>,
}

/// Sortable columns. Serialised names are the query-string values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortColumn {
    #[serde(rename = "so_number")]
    OrderNumber,
    #[serde(rename = "so_date")]
    OrderDate,
    #[serde(rename = "customer_id")]
    CustomerId,
    #[serde(rename = "total_amount")]
    TotalAmount,
    #[serde(rename = "created_at")]
    CreatedAt,
}

impl SortColumn {
    /// Allow-list lookup; anything unknown yields `None`.
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "so_number" | "order_number" => Some(SortColumn::OrderNumber),
            "so_date" | "order_date" => Some(SortColumn::OrderDate),
            "customer_id" => Some(SortColumn::CustomerId),
            "total_amount" => Some(SortColumn::TotalAmount),
            "created_at" => Some(SortColumn::CreatedAt),
            _ => None,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            SortColumn::OrderNumber => "so_number",
            SortColumn::OrderDate => "so_date",
            SortColumn::CustomerId => "customer_id",
            SortColumn::TotalAmount => "total_amount",
            SortColumn::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `asc` in any case sorts ascending; everything else sorts descending.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sort {
    #[serde(rename = "sort_by")]
    pub column: SortColumn,
    #[serde(rename = "sort_direction")]
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            column: SortColumn::OrderDate,
            direction: SortDirection::Desc,
        }
    }
}

impl Sort {
    /// Resolve the requested sort. An unknown column resets both column and
    /// direction to the default.
    pub fn resolve(sort_by: Option<&str>, direction: Option<&str>) -> Self {
        match sort_by {
            None => Self {
                column: SortColumn::OrderDate,
                direction: SortDirection::from_param(direction),
            },
            Some(param) => match SortColumn::from_param(param) {
                Some(column) => Self {
                    column,
                    direction: SortDirection::from_param(direction),
                },
                None => Self::default(),
            },
        }
    }
}

/// Active filters. `search` matches order number or remarks, case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
        }
    }
}

/// A normalised listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: OrderFilters,
    pub sort: Sort,
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::from_params(ListParams::default(), PageLimits::default())
    }
}

/// Query-string form of a [`ListQuery`] for one page.
#[derive(Serialize)]
struct LinkParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_to: Option<String>,
    sort_by: &'static str,
    sort_direction: &'static str,
    per_page: u32,
    page: u32,
}

impl ListQuery {
    pub fn from_params(params: ListParams, limits: PageLimits) -> Self {
        let max_per_page = limits.max_per_page.max(1);
        let per_page = params
            .per_page
            .unwrap_or(limits.default_per_page)
            .clamp(1, max_per_page);

        Self {
            sort: Sort::resolve(params.sort_by.as_deref(), params.sort_direction.as_deref()),
            filters: OrderFilters {
                search: params.search,
                customer_id: params.customer_id,
                currency_id: params.currency_id,
                order_type_id: params.order_type_id,
                status_type_id: params.status_type_id,
                date_from: params.date_from,
                date_to: params.date_to,
            },
            page: params.page.unwrap_or(1).max(1),
            per_page,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }

    /// Query string (without the leading `?`) that reproduces this query on `page`.
    pub fn query_string(&self, page: u32) -> String {
        let filters = &self.filters;
        let params = LinkParams {
            search: filters.search.as_deref(),
            customer_id: filters.customer_id,
            currency_id: filters.currency_id.as_deref(),
            order_type_id: filters.order_type_id,
            status_type_id: filters.status_type_id,
            date_from: filters.date_from.map(|d| d.to_string()),
            date_to: filters.date_to.map(|d| d.to_string()),
            sort_by: self.sort.column.as_param(),
            sort_direction: self.sort.direction.as_param(),
            per_page: self.per_page,
            page,
        };
        serde_urlencoded::to_string(&params).unwrap_or_default()
    }
}

/// Pagination metadata. `from`/`to` are 1-based item positions and are
/// absent when the page is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl PageMeta {
    pub fn new(page: u32, per_page: u32, total: u64, items_on_page: usize) -> Self {
        let per_page_wide = u64::from(per_page.max(1));
        let last_page = total.div_ceil(per_page_wide).max(1);
        let last_page = u32::try_from(last_page).unwrap_or(u32::MAX);

        let (from, to) = if items_on_page == 0 {
            (None, None)
        } else {
            let from = u64::from(page.saturating_sub(1)) * per_page_wide + 1;
            (Some(from), Some(from + items_on_page as u64 - 1))
        };

        Self {
            current_page: page,
            last_page,
            per_page,
            total,
            from,
            to,
        }
    }
}

/// Links to neighbouring pages, each carrying every active parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl PageLinks {
    pub fn new(query: &ListQuery, meta: &PageMeta) -> Self {
        let link = |page: u32| format!("?{}", query.query_string(page));

        Self {
            first: link(1),
            last: link(meta.last_page),
            prev: (meta.current_page > 1).then(|| link(meta.current_page - 1)),
            next: (meta.current_page < meta.last_page).then(|| link(meta.current_page + 1)),
        }
    }
}

/// One page of results. An empty `data` is a normal outcome, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
    pub links: PageLinks,
    pub filters: OrderFilters,
    #[serde(flatten)]
    pub sort: Sort,
}

impl<T> Paginated<T> {
    pub fn new(query: &ListQuery, data: Vec<T>, total: u64) -> Self {
        let meta = PageMeta::new(query.page, query.per_page, total, data.len());
        let links = PageLinks::new(query, &meta);

        Self {
            data,
            meta,
            links,
            filters: query.filters.clone(),
            sort: query.sort,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
            links: self.links,
            filters: self.filters,
            sort: self.sort,
        }
    }
}
