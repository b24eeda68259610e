//! Seed the catalog with demo data.
//!
//! Inserts a small set of categories and products for local development.
//! Refuses to run against a non-empty catalog.
//!
//! # Usage
//!
//! ```bash
//! cw-cli seed
//! ```

use cartwheel_api::db::create_pool;
use sqlx::PgPool;

use super::CommandError;

const CATEGORIES: &[(&str, &str, &str)] = &[
    ("Electronics", "devices", "#4f46e5"),
    ("Clothing", "shirt", "#059669"),
    ("Home & Garden", "home", "#d97706"),
];

/// (name, description, brand, price, category index, stock, featured)
const PRODUCTS: &[(&str, &str, &str, &str, usize, i32, bool)] = &[
    (
        "Wireless Headphones",
        "Over-ear wireless headphones with noise cancellation",
        "Auralite",
        "129.99",
        0,
        42,
        true,
    ),
    (
        "Mechanical Keyboard",
        "Tenkeyless mechanical keyboard, brown switches",
        "KeyForge",
        "89.50",
        0,
        17,
        false,
    ),
    (
        "Linen Shirt",
        "Relaxed-fit linen shirt",
        "Coastline",
        "39.00",
        1,
        80,
        true,
    ),
    (
        "Ceramic Planter",
        "Hand-glazed ceramic planter, 20cm",
        "Terra",
        "24.75",
        2,
        25,
        false,
    ),
];

/// Seed demo categories and products.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the catalog is not
/// empty.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        tracing::warn!("Catalog already has {existing} categories; nothing to do");
        return Ok(());
    }

    let category_ids = seed_categories(&pool).await?;
    seed_products(&pool, &category_ids).await?;

    tracing::info!(
        "Seeded {} categories and {} products",
        CATEGORIES.len(),
        PRODUCTS.len()
    );
    Ok(())
}

async fn seed_categories(pool: &PgPool) -> Result<Vec<i32>, CommandError> {
    let mut ids = Vec::with_capacity(CATEGORIES.len());
    for (name, icon, color) in CATEGORIES {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO categories (name, icon, color) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(icon)
        .bind(color)
        .fetch_one(pool)
        .await?;
        ids.push(id);
    }
    Ok(ids)
}

async fn seed_products(pool: &PgPool, category_ids: &[i32]) -> Result<(), CommandError> {
    for (name, description, brand, price, category_index, stock, featured) in PRODUCTS {
        let category_id = category_ids
            .get(*category_index)
            .copied()
            .expect("seed product references an unknown category index");

        sqlx::query(
            r"
            INSERT INTO products
                (name, description, brand, price, category_id, count_in_stock, is_featured)
            VALUES ($1, $2, $3, $4::numeric, $5, $6, $7)
            ",
        )
        .bind(name)
        .bind(description)
        .bind(brand)
        .bind(price)
        .bind(category_id)
        .bind(stock)
        .bind(featured)
        .execute(pool)
        .await?;
    }
    Ok(())
}
