//! Database service for sales-order-service.

use crate::models::{
    NewOrderLine, NewSalesOrder, SalesOrder, SalesOrderDraft, SalesOrderLine, SalesOrderSummary,
    SalesOrderWithLines,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::repository::SalesOrderRepository;
use async_trait::async_trait;
use order_engine::{ListQuery, OrderFilters, Sort, SortColumn, SortDirection};
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::time::Duration;
use tracing::{info, instrument};

const ORDER_COLUMNS: &str = "so.id, so.order_number, so.order_date, so.customer_id, \
    so.currency_code, so.order_type_id, so.status_id, so.remarks, so.subtotal, \
    so.discount_amount, so.total_amount, so.withholding_tax_id, so.vat_id, \
    so.created_utc, so.updated_utc";

const LINE_COLUMNS: &str = "id, sales_order_id, line_no, product_id, product_name, qty, \
    unit_price, discount_type, discount_value, total_price, created_utc";

/// Shared WHERE clause for listing; every filter is skipped when its bind is NULL.
const LIST_FILTERS: &str = r#"
    WHERE ($1::text IS NULL OR so.order_number ILIKE $1 ESCAPE '\' OR so.remarks ILIKE $1 ESCAPE '\')
      AND ($2::bigint IS NULL OR so.customer_id = $2)
      AND ($3::varchar IS NULL OR so.currency_code = UPPER($3))
      AND ($4::bigint IS NULL OR so.order_type_id = $4)
      AND ($5::bigint IS NULL OR so.status_id = $5)
      AND ($6::date IS NULL OR so.order_date >= $6)
      AND ($7::date IS NULL OR so.order_date <= $7)
"#;

/// `%term%` with LIKE wildcards in the term escaped.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// ORDER BY for an allow-listed sort, with `id` as tie-breaker for stable pages.
fn order_clause(sort: &Sort) -> String {
    let column = match sort.column {
        SortColumn::OrderNumber => "so.order_number",
        SortColumn::OrderDate => "so.order_date",
        SortColumn::CustomerId => "so.customer_id",
        SortColumn::TotalAmount => "so.total_amount",
        SortColumn::CreatedAt => "so.created_utc",
    };
    let direction = match sort.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    format!("{column} {direction}, so.id {direction}")
}

fn map_write_error(order_number: &str, action: &str, e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => AppError::Conflict(
            anyhow::anyhow!("Sales order '{}' already exists", order_number),
        ),
        _ => AppError::DatabaseError(anyhow::anyhow!("Failed to {}: {}", action, e)),
    }
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "sales-order-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Remove every order and line and restart id sequences.
    #[instrument(skip(self))]
    pub async fn truncate_all(&self) -> Result<(), AppError> {
        sqlx::query("TRUNCATE sales_order_lines, sales_orders RESTART IDENTITY")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to truncate: {}", e)))?;
        info!("Sales order tables truncated");
        Ok(())
    }

    async fn insert_lines(
        tx: &mut Transaction<'_, Postgres>,
        sales_order_id: i64,
        lines: &[NewOrderLine],
    ) -> Result<Vec<SalesOrderLine>, AppError> {
        let mut inserted = Vec::with_capacity(lines.len());

        for (i, line) in lines.iter().enumerate() {
            let row = sqlx::query_as::<_, SalesOrderLine>(&format!(
                r#"
                INSERT INTO sales_order_lines (sales_order_id, line_no, product_id, product_name, qty,
                    unit_price, discount_type, discount_value, total_price)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING {LINE_COLUMNS}
                "#
            ))
            .bind(sales_order_id)
            .bind(i as i32 + 1)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.qty())
            .bind(line.unit_price())
            .bind(line.discount_type())
            .bind(line.discount_value())
            .bind(line.total_price())
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to insert order line: {}", e))
            })?;

            inserted.push(row);
        }

        Ok(inserted)
    }

    async fn fetch_lines(&self, sales_order_id: i64) -> Result<Vec<SalesOrderLine>, AppError> {
        sqlx::query_as::<_, SalesOrderLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM sales_order_lines WHERE sales_order_id = $1 ORDER BY line_no"
        ))
        .bind(sales_order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get order lines: {}", e)))
    }
}

/// Bind the seven [`LIST_FILTERS`] parameters in order.
macro_rules! bind_filters {
    ($query:expr, $filters:expr, $pattern:expr) => {
        $query
            .bind($pattern)
            .bind($filters.customer_id)
            .bind($filters.currency_id.as_deref())
            .bind($filters.order_type_id)
            .bind($filters.status_type_id)
            .bind($filters.date_from)
            .bind($filters.date_to)
    };
}

#[async_trait]
impl SalesOrderRepository for Database {
    #[instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn create(&self, order: &NewSalesOrder) -> Result<SalesOrderWithLines, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_sales_order"])
            .start_timer();

        let draft = &order.draft;
        let header = &draft.header;

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let created = sqlx::query_as::<_, SalesOrder>(&format!(
            r#"
            INSERT INTO sales_orders AS so (order_number, order_date, customer_id, currency_code,
                order_type_id, status_id, remarks, subtotal, discount_amount, total_amount,
                withholding_tax_id, vat_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(&order.order_number)
        .bind(header.order_date)
        .bind(header.customer_id)
        .bind(&header.currency_code)
        .bind(header.order_type_id)
        .bind(header.status_id)
        .bind(&header.remarks)
        .bind(draft.totals.subtotal)
        .bind(draft.totals.discount_amount)
        .bind(draft.totals.total_amount)
        .bind(header.withholding_tax_id)
        .bind(header.vat_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(&order.order_number, "create sales order", e))?;

        let lines = Self::insert_lines(&mut tx, created.id, &draft.lines).await?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(
            order_id = created.id,
            order_number = %created.order_number,
            line_count = lines.len(),
            total_amount = %created.total_amount,
            "Sales order created"
        );

        Ok(SalesOrderWithLines {
            order: created,
            lines,
        })
    }

    #[instrument(skip(self), fields(order_id = id))]
    async fn find_with_lines(&self, id: i64) -> Result<Option<SalesOrderWithLines>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_sales_order"])
            .start_timer();

        let order = sqlx::query_as::<_, SalesOrder>(&format!(
            "SELECT {ORDER_COLUMNS} FROM sales_orders so WHERE so.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get sales order: {}", e)))?;

        let result = match order {
            Some(order) => {
                let lines = self.fetch_lines(order.id).await?;
                Some(SalesOrderWithLines { order, lines })
            }
            None => None,
        };

        timer.observe_duration();

        Ok(result)
    }

    #[instrument(skip(self, draft), fields(order_id = id))]
    async fn update(
        &self,
        id: i64,
        draft: &SalesOrderDraft,
    ) -> Result<Option<SalesOrderWithLines>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_sales_order"])
            .start_timer();

        let header = &draft.header;

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let updated = sqlx::query_as::<_, SalesOrder>(&format!(
            r#"
            UPDATE sales_orders so
            SET order_date = $2, customer_id = $3, currency_code = $4, order_type_id = $5,
                status_id = $6, remarks = $7, subtotal = $8, discount_amount = $9,
                total_amount = $10, withholding_tax_id = $11, vat_id = $12, updated_utc = NOW()
            WHERE so.id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(header.order_date)
        .bind(header.customer_id)
        .bind(&header.currency_code)
        .bind(header.order_type_id)
        .bind(header.status_id)
        .bind(&header.remarks)
        .bind(draft.totals.subtotal)
        .bind(draft.totals.discount_amount)
        .bind(draft.totals.total_amount)
        .bind(header.withholding_tax_id)
        .bind(header.vat_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update sales order: {}", e))
        })?;

        let Some(updated) = updated else {
            tx.rollback().await.ok();
            timer.observe_duration();
            return Ok(None);
        };

        sqlx::query("DELETE FROM sales_order_lines WHERE sales_order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to clear order lines: {}", e))
            })?;

        let lines = Self::insert_lines(&mut tx, id, &draft.lines).await?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(
            order_id = id,
            line_count = lines.len(),
            total_amount = %updated.total_amount,
            "Sales order updated"
        );

        Ok(Some(SalesOrderWithLines {
            order: updated,
            lines,
        }))
    }

    #[instrument(skip(self), fields(order_id = id))]
    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_sales_order"])
            .start_timer();

        let result = sqlx::query("DELETE FROM sales_orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete sales order: {}", e))
            })?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(order_id = id, "Sales order deleted");
        }

        Ok(deleted)
    }

    #[instrument(skip(self, query), fields(page = query.page, per_page = query.per_page))]
    async fn paginate(&self, query: &ListQuery) -> Result<(Vec<SalesOrderSummary>, u64), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_sales_orders"])
            .start_timer();

        let filters: &OrderFilters = &query.filters;
        let pattern = filters.search.as_deref().map(like_pattern);

        let total: i64 = bind_filters!(
            sqlx::query_scalar::<_, i64>(&format!(
                "SELECT COUNT(*) FROM sales_orders so {LIST_FILTERS}"
            )),
            filters,
            pattern.as_deref()
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to count sales orders: {}", e)))?;

        let rows = bind_filters!(
            sqlx::query_as::<_, SalesOrderSummary>(&format!(
                r#"
                SELECT {ORDER_COLUMNS},
                    (SELECT COUNT(*) FROM sales_order_lines l WHERE l.sales_order_id = so.id) AS line_count
                FROM sales_orders so
                {LIST_FILTERS}
                ORDER BY {}
                LIMIT $8 OFFSET $9
                "#,
                order_clause(&query.sort)
            )),
            filters,
            pattern.as_deref()
        )
        .bind(query.limit() as i64)
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list sales orders: {}", e)))?;

        timer.observe_duration();

        Ok((rows, total.max(0) as u64))
    }

    #[instrument(skip(self))]
    async fn latest_id(&self) -> Result<Option<i64>, AppError> {
        sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(id) FROM sales_orders")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get latest id: {}", e)))
    }
}
