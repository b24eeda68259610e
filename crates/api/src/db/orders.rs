//! Order and line-item repository.
//!
//! Implements the [`OrderStore`] contract consumed by the composer/
//! decomposer, plus the read-only query views (list with user name, full
//! detail join, per-user history, aggregates).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use cartwheel_core::{CategoryId, LineItemId, OrderId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Category, LineItemDetail, Order, OrderDetail, OrderSummary, Product};
use crate::services::orders::{NewOrder, OrderStore};

const ORDER_COLUMNS: &str = r"
    o.id, o.order_item_ids, o.shipping_address1, o.shipping_address2,
    o.city, o.zip, o.country, o.phone, o.status, o.total_price,
    o.user_id, o.date_created
";

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_item_ids: Vec<i32>,
    shipping_address1: String,
    shipping_address2: String,
    city: String,
    zip: String,
    country: String,
    phone: String,
    status: String,
    total_price: Decimal,
    user_id: i32,
    date_created: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            order_item_ids: row.order_item_ids.into_iter().map(LineItemId::new).collect(),
            shipping_address1: row.shipping_address1,
            shipping_address2: row.shipping_address2,
            city: row.city,
            zip: row.zip,
            country: row.country,
            phone: row.phone,
            status: row.status,
            total_price: row.total_price,
            user_id: UserId::new(row.user_id),
            date_created: row.date_created,
        }
    }
}

/// Internal row type for order queries with the user's name joined.
#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    #[sqlx(flatten)]
    order: OrderRow,
    user_name: Option<String>,
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        Self {
            order: row.order.into(),
            user_name: row.user_name,
        }
    }
}

/// Internal row type for the line-item detail join. Product columns are
/// nullable: the product may have been deleted after the order was placed.
#[derive(Debug, sqlx::FromRow)]
struct LineItemDetailRow {
    id: i32,
    quantity: i32,
    product_id: Option<i32>,
    product_name: Option<String>,
    product_description: Option<String>,
    product_rich_description: Option<String>,
    product_image: Option<String>,
    product_brand: Option<String>,
    product_price: Option<Decimal>,
    product_count_in_stock: Option<i32>,
    product_rating: Option<f32>,
    product_num_reviews: Option<i32>,
    product_is_featured: Option<bool>,
    product_date_created: Option<DateTime<Utc>>,
    category_id: Option<i32>,
    category_name: Option<String>,
    category_icon: Option<String>,
    category_color: Option<String>,
}

impl LineItemDetailRow {
    fn into_detail(self) -> LineItemDetail {
        let product = match (
            self.product_id,
            self.product_name,
            self.product_description,
            self.product_price,
            self.category_id,
            self.category_name,
        ) {
            (
                Some(id),
                Some(name),
                Some(description),
                Some(price),
                Some(category_id),
                Some(category_name),
            ) => Some(Product {
                id: ProductId::new(id),
                name,
                description,
                rich_description: self.product_rich_description.unwrap_or_default(),
                image: self.product_image.unwrap_or_default(),
                brand: self.product_brand.unwrap_or_default(),
                price,
                category: Category {
                    id: CategoryId::new(category_id),
                    name: category_name,
                    icon: self.category_icon.unwrap_or_default(),
                    color: self.category_color.unwrap_or_default(),
                },
                count_in_stock: self.product_count_in_stock.unwrap_or_default(),
                rating: self.product_rating.unwrap_or_default(),
                num_reviews: self.product_num_reviews.unwrap_or_default(),
                is_featured: self.product_is_featured.unwrap_or_default(),
                date_created: self.product_date_created.unwrap_or_default(),
            }),
            _ => None,
        };

        LineItemDetail {
            id: LineItemId::new(self.id),
            quantity: self.quantity,
            product,
        }
    }
}

/// Repository for order and line-item database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all orders with the purchasing user's name, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_users(&self) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}, u.name AS user_name
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            ORDER BY o.date_created DESC
            "
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Fetch one order with line items resolved to product and category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn detail(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderSummaryRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}, u.name AS user_name
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            WHERE o.id = $1
            "
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let summary: OrderSummary = row.into();
        let items = self.line_item_details(&summary.order.order_item_ids).await?;

        Ok(Some(OrderDetail {
            order: summary.order,
            user_name: summary.user_name,
            items,
        }))
    }

    /// List one user's orders with full item detail, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderDetail>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}, u.name AS user_name
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            WHERE o.user_id = $1
            ORDER BY o.date_created DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let mut details = Vec::with_capacity(rows.len());
        for row in rows {
            let summary: OrderSummary = row.into();
            let items = self.line_item_details(&summary.order.order_item_ids).await?;
            details.push(OrderDetail {
                order: summary.order,
                user_name: summary.user_name,
                items,
            });
        }

        Ok(details)
    }

    /// Update an order's status. Returns `None` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE orders
            SET status = $2
            WHERE id = $1
            RETURNING id, order_item_ids, shipping_address1, shipping_address2,
                      city, zip, country, phone, status, total_price, user_id,
                      date_created
            ",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Sum of all order totals. Returns literal zero when there are no
    /// orders - an empty shop is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_sales(&self) -> Result<Decimal, RepositoryError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(total_price), 0) FROM orders",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(total)
    }

    /// Count all orders. Zero is a valid answer, not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Resolve line items to product/category detail, preserving the order
    /// of `ids` (which is the submission order stored on the order).
    async fn line_item_details(
        &self,
        ids: &[LineItemId],
    ) -> Result<Vec<LineItemDetail>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let rows = sqlx::query_as::<_, LineItemDetailRow>(
            r"
            SELECT li.id, li.quantity,
                   p.id AS product_id, p.name AS product_name,
                   p.description AS product_description,
                   p.rich_description AS product_rich_description,
                   p.image AS product_image, p.brand AS product_brand,
                   p.price AS product_price,
                   p.count_in_stock AS product_count_in_stock,
                   p.rating AS product_rating,
                   p.num_reviews AS product_num_reviews,
                   p.is_featured AS product_is_featured,
                   p.date_created AS product_date_created,
                   c.id AS category_id, c.name AS category_name,
                   c.icon AS category_icon, c.color AS category_color
            FROM order_items li
            LEFT JOIN products p ON p.id = li.product_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE li.id = ANY($1)
            ",
        )
        .bind(raw)
        .fetch_all(self.pool)
        .await?;

        let mut by_id: std::collections::HashMap<LineItemId, LineItemDetail> = rows
            .into_iter()
            .map(|row| {
                let detail = row.into_detail();
                (detail.id, detail)
            })
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

impl OrderStore for OrderRepository<'_> {
    async fn create_line_item(
        &self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<LineItemId, RepositoryError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO order_items (product_id, quantity) VALUES ($1, $2) RETURNING id",
        )
        .bind(product_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(LineItemId::new(id))
    }

    async fn product_price(&self, id: ProductId) -> Result<Option<Decimal>, RepositoryError> {
        let price = sqlx::query_scalar::<_, Decimal>("SELECT price FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(price)
    }

    async fn create_order(&self, new_order: NewOrder) -> Result<Order, RepositoryError> {
        let item_ids: Vec<i32> = new_order
            .order_item_ids
            .iter()
            .map(|id| id.as_i32())
            .collect();

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders
                (order_item_ids, shipping_address1, shipping_address2, city,
                 zip, country, phone, status, total_price, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, order_item_ids, shipping_address1, shipping_address2,
                      city, zip, country, phone, status, total_price, user_id,
                      date_created
            ",
        )
        .bind(item_ids)
        .bind(&new_order.shipping_address1)
        .bind(&new_order.shipping_address2)
        .bind(&new_order.city)
        .bind(&new_order.zip)
        .bind(&new_order.country)
        .bind(&new_order.phone)
        .bind(&new_order.status)
        .bind(new_order.total_price)
        .bind(new_order.user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_line_item(&self, id: LineItemId) -> Result<(), RepositoryError> {
        // Zero rows affected is fine: cleanup is idempotent.
        sqlx::query("DELETE FROM order_items WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
