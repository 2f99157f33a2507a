//! Sales order use cases: validation, pricing, numbering and persistence.

use crate::dtos::{OrderSubmission, PreviewRequest, PreviewResponse, SalesOrderRequest};
use crate::models::{NewSalesOrder, SalesOrderSummary, SalesOrderWithLines};
use crate::services::metrics::{record_order_amount, ERRORS_TOTAL, SALES_ORDERS_TOTAL};
use crate::services::repository::SalesOrderRepository;
use chrono::{Local, NaiveDate};
use order_engine::{
    format_order_number, next_sequence, price_order, ListParams, ListQuery, PageLimits, Paginated,
};
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument, warn};

fn track_error(err: &AppError) {
    ERRORS_TOTAL.with_label_values(&[err.kind()]).inc();
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Sales order {} not found", id))
}

#[derive(Clone)]
pub struct SalesOrderService {
    repo: Arc<dyn SalesOrderRepository>,
    limits: PageLimits,
}

impl SalesOrderService {
    pub fn new(repo: Arc<dyn SalesOrderRepository>, limits: PageLimits) -> Self {
        Self { repo, limits }
    }

    /// Filtered, sorted page of orders. An empty page is not an error.
    #[instrument(skip(self, params))]
    pub async fn list(&self, params: ListParams) -> Result<Paginated<SalesOrderSummary>, AppError> {
        let query = ListQuery::from_params(params, self.limits);
        let (rows, total) = self.repo.paginate(&query).await.inspect_err(track_error)?;
        Ok(Paginated::new(&query, rows, total))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<SalesOrderWithLines, AppError> {
        self.repo
            .find_with_lines(id)
            .await
            .inspect_err(track_error)?
            .ok_or_else(|| not_found(id))
    }

    /// Next order number for `date`: one past the highest stored id.
    pub async fn order_number_for(&self, date: NaiveDate) -> Result<String, AppError> {
        let latest = self.repo.latest_id().await.inspect_err(track_error)?;
        Ok(format_order_number(date, next_sequence(latest)))
    }

    /// Next order number for today (local time).
    #[instrument(skip(self))]
    pub async fn generate_order_number(&self) -> Result<String, AppError> {
        self.order_number_for(Local::now().date_naive()).await
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, request: SalesOrderRequest) -> Result<SalesOrderWithLines, AppError> {
        let OrderSubmission {
            order_number,
            draft,
        } = request
            .into_submission()
            .map_err(AppError::from)
            .inspect_err(track_error)?;

        let order_number = match order_number {
            Some(number) => number,
            None => self.generate_order_number().await?,
        };

        let created = self
            .repo
            .create(&NewSalesOrder {
                order_number,
                draft,
            })
            .await
            .inspect_err(track_error)?;

        SALES_ORDERS_TOTAL.with_label_values(&["create"]).inc();
        record_order_amount(&created.order.currency_code, created.order.total_amount);

        info!(
            order_id = created.order.id,
            order_number = %created.order.order_number,
            "Sales order accepted"
        );

        Ok(created)
    }

    /// Replace the header fields and the whole line set. The order number is kept.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: SalesOrderRequest,
    ) -> Result<SalesOrderWithLines, AppError> {
        if request.has_order_number() {
            warn!(order_id = id, "Ignoring order_number on update");
        }

        let draft = match request.into_update() {
            Ok(draft) => draft,
            Err(errors) => {
                // A missing order wins over an invalid body.
                let err = match self.repo.find_with_lines(id).await? {
                    Some(_) => AppError::from(errors),
                    None => not_found(id),
                };
                track_error(&err);
                return Err(err);
            }
        };

        let updated = self
            .repo
            .update(id, &draft)
            .await
            .inspect_err(track_error)?
            .ok_or_else(|| not_found(id))
            .inspect_err(track_error)?;

        SALES_ORDERS_TOTAL.with_label_values(&["update"]).inc();

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete(id).await.inspect_err(track_error)? {
            let err = not_found(id);
            track_error(&err);
            return Err(err);
        }

        SALES_ORDERS_TOTAL.with_label_values(&["delete"]).inc();
        Ok(())
    }

    /// Price lines without storing anything.
    pub fn preview(&self, request: &PreviewRequest) -> Result<PreviewResponse, AppError> {
        let lines = request.pricing_lines()?;
        let priced = price_order(&lines);

        Ok(PreviewResponse {
            details: priced.lines,
            subtotal: priced.totals.subtotal,
            discount_amount: priced.totals.discount_amount,
            total_amount: priced.totals.total_amount,
        })
    }
}
