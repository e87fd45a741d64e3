//! Product retrieval by id, and the recent-titles listing.
//!
//! Used by the `scout get` and `scout recent` CLI commands. The HTTP
//! server answers the same lookups through the [`ProductStore`] trait.

use anyhow::{bail, Result};

use product_scout_core::models::ProductRecord;
use product_scout_core::store::{ProductStore, RECENT_TITLES_LIMIT};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

pub async fn get_product(config: &Config, id: i64) -> Result<ProductRecord> {
    let pool = db::connect(config).await?;
    migrate::migrate_pool(&pool).await?;
    let store = SqliteStore::new(pool.clone());
    let found = store.get_by_id(id).await;
    pool.close().await;

    match found? {
        Some(record) => Ok(record),
        None => bail!("Product not found: {}", id),
    }
}

/// CLI entry point: looks up one product and prints it to stdout.
pub async fn run_get(config: &Config, id: i64) -> Result<()> {
    let p = get_product(config, id).await?;

    println!("--- Product ---");
    println!("id:          {}", p.id);
    println!("title:       {}", p.title);
    println!("price:       {}", p.price);
    println!("rating:      {}", p.rating);
    println!("is_prime:    {}", p.is_prime);
    println!("product_url: {}", p.product_url);
    println!("image_url:   {}", p.image_url);
    println!("created_at:  {}", p.created_at.format("%Y-%m-%dT%H:%M:%SZ"));

    Ok(())
}

/// CLI entry point: prints the most recently captured distinct titles.
pub async fn run_recent(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::migrate_pool(&pool).await?;
    let store = SqliteStore::new(pool.clone());
    let titles = store.list_recent_distinct_titles(RECENT_TITLES_LIMIT).await;
    pool.close().await;

    let titles = titles?;
    if titles.is_empty() {
        println!("No products captured yet.");
    }
    for (i, title) in titles.iter().enumerate() {
        println!("{:>2}. {}", i + 1, title);
    }
    Ok(())
}
