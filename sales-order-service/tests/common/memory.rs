//! In-memory `SalesOrderRepository` for service-level tests.

use async_trait::async_trait;
use chrono::Utc;
use order_engine::{ListQuery, SortColumn, SortDirection};
use sales_order_service::models::{
    NewOrderLine, NewSalesOrder, SalesOrder, SalesOrderDraft, SalesOrderLine, SalesOrderSummary,
    SalesOrderWithLines,
};
use sales_order_service::services::SalesOrderRepository;
use service_core::error::AppError;
use std::cmp::Ordering;
use std::sync::Mutex;

#[derive(Default)]
struct Store {
    orders: Vec<SalesOrder>,
    lines: Vec<SalesOrderLine>,
    next_order_id: i64,
    next_line_id: i64,
}

impl Store {
    fn write_lines(&mut self, sales_order_id: i64, lines: &[NewOrderLine]) -> Vec<SalesOrderLine> {
        let mut written = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            self.next_line_id += 1;
            let row = SalesOrderLine {
                id: self.next_line_id,
                sales_order_id,
                line_no: i as i32 + 1,
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                qty: line.qty(),
                unit_price: line.unit_price(),
                discount_type: line.discount_type().map(str::to_string),
                discount_value: line.discount_value(),
                total_price: line.total_price(),
                created_utc: Utc::now(),
            };
            self.lines.push(row.clone());
            written.push(row);
        }
        written
    }

    fn lines_of(&self, sales_order_id: i64) -> Vec<SalesOrderLine> {
        self.lines
            .iter()
            .filter(|l| l.sales_order_id == sales_order_id)
            .cloned()
            .collect()
    }
}

fn apply_draft(order: &mut SalesOrder, draft: &SalesOrderDraft) {
    let header = &draft.header;
    order.order_date = header.order_date;
    order.customer_id = header.customer_id;
    order.currency_code = header.currency_code.clone();
    order.order_type_id = header.order_type_id;
    order.status_id = header.status_id;
    order.remarks = header.remarks.clone();
    order.withholding_tax_id = header.withholding_tax_id;
    order.vat_id = header.vat_id;
    order.subtotal = draft.totals.subtotal;
    order.discount_amount = draft.totals.discount_amount;
    order.total_amount = draft.totals.total_amount;
}

fn matches(order: &SalesOrder, query: &ListQuery) -> bool {
    let f = &query.filters;
    let search_ok = f.search.as_deref().map_or(true, |term| {
        let term = term.to_lowercase();
        order.order_number.to_lowercase().contains(&term)
            || order
                .remarks
                .as_deref()
                .is_some_and(|r| r.to_lowercase().contains(&term))
    });

    search_ok
        && f.customer_id.map_or(true, |v| order.customer_id == v)
        && f
            .currency_id
            .as_deref()
            .map_or(true, |v| order.currency_code.eq_ignore_ascii_case(v))
        && f.order_type_id.map_or(true, |v| order.order_type_id == v)
        && f.status_type_id.map_or(true, |v| order.status_id == v)
        && f.date_from.map_or(true, |d| order.order_date >= d)
        && f.date_to.map_or(true, |d| order.order_date <= d)
}

fn compare(a: &SalesOrder, b: &SalesOrder, column: SortColumn) -> Ordering {
    let primary = match column {
        SortColumn::OrderNumber => a.order_number.cmp(&b.order_number),
        SortColumn::OrderDate => a.order_date.cmp(&b.order_date),
        SortColumn::CustomerId => a.customer_id.cmp(&b.customer_id),
        SortColumn::TotalAmount => a.total_amount.cmp(&b.total_amount),
        SortColumn::CreatedAt => a.created_utc.cmp(&b.created_utc),
    };
    primary.then(a.id.cmp(&b.id))
}

#[derive(Default)]
pub struct InMemoryRepository {
    store: Mutex<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line_count(&self) -> usize {
        self.store.lock().unwrap().lines.len()
    }
}

#[async_trait]
impl SalesOrderRepository for InMemoryRepository {
    async fn create(&self, order: &NewSalesOrder) -> Result<SalesOrderWithLines, AppError> {
        let mut store = self.store.lock().unwrap();
        if store
            .orders
            .iter()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Sales order '{}' already exists",
                order.order_number
            )));
        }

        store.next_order_id += 1;
        let now = Utc::now();
        let header = &order.draft.header;
        let mut created = SalesOrder {
            id: store.next_order_id,
            order_number: order.order_number.clone(),
            order_date: header.order_date,
            customer_id: header.customer_id,
            currency_code: header.currency_code.clone(),
            order_type_id: header.order_type_id,
            status_id: header.status_id,
            remarks: None,
            subtotal: Default::default(),
            discount_amount: Default::default(),
            total_amount: Default::default(),
            withholding_tax_id: None,
            vat_id: None,
            created_utc: now,
            updated_utc: now,
        };
        apply_draft(&mut created, &order.draft);

        let lines = store.write_lines(created.id, &order.draft.lines);
        store.orders.push(created.clone());

        Ok(SalesOrderWithLines {
            order: created,
            lines,
        })
    }

    async fn find_with_lines(&self, id: i64) -> Result<Option<SalesOrderWithLines>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .map(|order| SalesOrderWithLines {
                lines: store.lines_of(id),
                order,
            }))
    }

    async fn update(
        &self,
        id: i64,
        draft: &SalesOrderDraft,
    ) -> Result<Option<SalesOrderWithLines>, AppError> {
        let mut store = self.store.lock().unwrap();
        let Some(position) = store.orders.iter().position(|o| o.id == id) else {
            return Ok(None);
        };

        let mut order = store.orders[position].clone();
        apply_draft(&mut order, draft);
        order.updated_utc = Utc::now();
        store.orders[position] = order.clone();

        store.lines.retain(|l| l.sales_order_id != id);
        let lines = store.write_lines(id, &draft.lines);

        Ok(Some(SalesOrderWithLines { order, lines }))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut store = self.store.lock().unwrap();
        let before = store.orders.len();
        store.orders.retain(|o| o.id != id);
        let deleted = store.orders.len() != before;
        if deleted {
            store.lines.retain(|l| l.sales_order_id != id);
        }
        Ok(deleted)
    }

    async fn paginate(&self, query: &ListQuery) -> Result<(Vec<SalesOrderSummary>, u64), AppError> {
        let store = self.store.lock().unwrap();
        let mut matching: Vec<&SalesOrder> =
            store.orders.iter().filter(|o| matches(o, query)).collect();

        matching.sort_by(|a, b| {
            let ordering = compare(a, b, query.sort.column);
            match query.sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total = matching.len() as u64;
        let rows = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .map(|order| SalesOrderSummary {
                line_count: store.lines_of(order.id).len() as i64,
                order: order.clone(),
            })
            .collect();

        Ok((rows, total))
    }

    async fn latest_id(&self) -> Result<Option<i64>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.orders.iter().map(|o| o.id).max())
    }
}
