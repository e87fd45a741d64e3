//! SQLite-backed [`ProductStore`] implementation.
//!
//! Prices and ratings are stored as fixed-scale decimal text (`"900.00"`,
//! `"4.5"`) so the (title, price) lookup is an exact string comparison.
//! `created_at` is Unix milliseconds.

use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use product_scout_core::models::{normalize_price, NewProduct, ProductRecord};
use product_scout_core::store::ProductStore;

/// SQLite implementation of the [`ProductStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, title, price, rating, is_prime, product_url, image_url, created_at FROM products";

fn row_to_record(row: &SqliteRow) -> Result<ProductRecord> {
    let price: String = row.get("price");
    let rating: String = row.get("rating");
    let created_ms: i64 = row.get("created_at");

    Ok(ProductRecord {
        id: row.get("id"),
        title: row.get("title"),
        price: Decimal::from_str(&price).with_context(|| format!("corrupt price {:?}", price))?,
        rating: Decimal::from_str(&rating)
            .with_context(|| format!("corrupt rating {:?}", rating))?,
        is_prime: row.get::<i64, _>("is_prime") != 0,
        product_url: row.get("product_url"),
        image_url: row.get("image_url"),
        created_at: DateTime::from_timestamp_millis(created_ms)
            .with_context(|| format!("corrupt created_at {}", created_ms))?,
    })
}

#[async_trait]
impl ProductStore for SqliteStore {
    async fn find_by_title_and_price(
        &self,
        title: &str,
        price: Decimal,
    ) -> Result<Option<ProductRecord>> {
        let row = sqlx::query(&format!(
            "{} WHERE title = ? AND price = ? ORDER BY id ASC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(title)
        .bind(normalize_price(price).to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn insert(&self, product: NewProduct) -> Result<ProductRecord> {
        let product = product.normalized();
        let created_at = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO products (title, price, rating, is_prime, product_url, image_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.title)
        .bind(product.price.to_string())
        .bind(product.rating.to_string())
        .bind(product.is_prime)
        .bind(&product.product_url)
        .bind(&product.image_url)
        .bind(created_at.timestamp_millis())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        // Round-trip through millisecond precision, as stored.
        let created_at = DateTime::from_timestamp_millis(created_at.timestamp_millis())
            .unwrap_or(created_at);
        Ok(ProductRecord::from_new(id, product, created_at))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ProductRecord>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn list_recent_distinct_titles(&self, limit: usize) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT title
            FROM products
            GROUP BY title
            ORDER BY MAX(created_at) DESC, MAX(id) DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|r| r.get("title")).collect())
    }
}
