//! Product repository.
//!
//! Every read joins the category row, matching what the storefront renders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use cartwheel_core::{CategoryId, ProductId};

use super::RepositoryError;
use crate::models::{Category, Product};

/// Columns shared by every product query.
const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.name, p.description, p.rich_description, p.image, p.brand,
           p.price, p.count_in_stock, p.rating, p.num_reviews, p.is_featured,
           p.date_created,
           c.id AS category_id, c.name AS category_name,
           c.icon AS category_icon, c.color AS category_color
    FROM products p
    JOIN categories c ON c.id = p.category_id
";

/// Internal row type for product queries (category joined).
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    rich_description: String,
    image: String,
    brand: String,
    price: Decimal,
    count_in_stock: i32,
    rating: f32,
    num_reviews: i32,
    is_featured: bool,
    date_created: DateTime<Utc>,
    category_id: i32,
    category_name: String,
    category_icon: String,
    category_color: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            rich_description: row.rich_description,
            image: row.image,
            brand: row.brand,
            price: row.price,
            category: Category {
                id: CategoryId::new(row.category_id),
                name: row.category_name,
                icon: row.category_icon,
                color: row.category_color,
            },
            count_in_stock: row.count_in_stock,
            rating: row.rating,
            num_reviews: row.num_reviews,
            is_featured: row.is_featured,
            date_created: row.date_created,
        }
    }
}

/// Fields accepted when creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub rich_description: String,
    pub image: String,
    pub brand: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    pub count_in_stock: i32,
    pub rating: f32,
    pub num_reviews: i32,
    pub is_featured: bool,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, optionally restricted to a set of categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        categories: Option<&[CategoryId]>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = match categories {
            Some(ids) => {
                let raw: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
                sqlx::query_as::<_, ProductRow>(&format!(
                    "{PRODUCT_SELECT} WHERE p.category_id = ANY($1) ORDER BY p.id"
                ))
                .bind(raw)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} ORDER BY p.id"))
                    .fetch_all(self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Create a product.
    ///
    /// The caller is expected to have validated that `fields.category_id`
    /// exists; a dangling reference still fails here on the foreign key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, fields: &ProductFields) -> Result<Product, RepositoryError> {
        let id = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO products
                (name, description, rich_description, image, brand, price,
                 category_id, count_in_stock, rating, num_reviews, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            ",
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.rich_description)
        .bind(&fields.image)
        .bind(&fields.brand)
        .bind(fields.price)
        .bind(fields.category_id)
        .bind(fields.count_in_stock)
        .bind(fields.rating)
        .bind(fields.num_reviews)
        .bind(fields.is_featured)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(ProductId::new(id)).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("product {id} vanished after insert"))
        })
    }

    /// Update a product. Returns `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        fields: &ProductFields,
    ) -> Result<Option<Product>, RepositoryError> {
        let updated = sqlx::query(
            r"
            UPDATE products
            SET name = $2, description = $3, rich_description = $4, image = $5,
                brand = $6, price = $7, category_id = $8, count_in_stock = $9,
                rating = $10, num_reviews = $11, is_featured = $12
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.rich_description)
        .bind(&fields.image)
        .bind(&fields.brand)
        .bind(fields.price)
        .bind(fields.category_id)
        .bind(fields.count_in_stock)
        .bind(fields.rating)
        .bind(fields.num_reviews)
        .bind(fields.is_featured)
        .execute(self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Delete a product. Returns `true` if a row was removed.
    ///
    /// Historical line items referencing this product are untouched; order
    /// totals are snapshots and do not depend on the product surviving.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all products. Zero is a valid answer, not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// List up to `limit` featured products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{PRODUCT_SELECT} WHERE p.is_featured ORDER BY p.id LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
