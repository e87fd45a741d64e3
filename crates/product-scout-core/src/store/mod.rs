//! Storage abstraction for Product Scout.
//!
//! The [`ProductStore`] trait defines the four operations the search
//! pipeline and the read endpoints need, so persistence can be swapped
//! (SQLite in the native host, [`memory::InMemoryStore`] in tests).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{Listing, NewProduct, ProductRecord};

/// Number of titles returned by the recent-searches lookup.
pub const RECENT_TITLES_LIMIT: usize = 10;

/// Abstract product repository.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`find_by_title_and_price`](ProductStore::find_by_title_and_price) | Dedup lookup on the (title, price) key |
/// | [`insert`](ProductStore::insert) | Create a record, assigning id and timestamp |
/// | [`get_by_id`](ProductStore::get_by_id) | Fetch one record |
/// | [`list_recent_distinct_titles`](ProductStore::list_recent_distinct_titles) | Most recent distinct titles |
///
/// The (title, price) key is not enforced as unique: two writers that
/// both miss the lookup will both insert.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Returns the oldest record whose title and price match exactly.
    async fn find_by_title_and_price(
        &self,
        title: &str,
        price: Decimal,
    ) -> Result<Option<ProductRecord>>;

    async fn insert(&self, product: NewProduct) -> Result<ProductRecord>;

    async fn get_by_id(&self, id: i64) -> Result<Option<ProductRecord>>;

    /// Distinct titles ordered by their most recent creation time,
    /// newest first, at most `limit` entries.
    async fn list_recent_distinct_titles(&self, limit: usize) -> Result<Vec<String>>;
}

/// Persists filtered listings, reusing records that share a (title, price).
///
/// Runs sequentially with no enclosing transaction; an error part-way
/// leaves earlier inserts in place. The result has one record per input
/// listing, in input order.
pub async fn persist(store: &dyn ProductStore, listings: Vec<Listing>) -> Result<Vec<ProductRecord>> {
    let mut records = Vec::with_capacity(listings.len());
    let mut inserted = 0usize;

    for listing in listings {
        let product = NewProduct::from(listing);
        let record = match store
            .find_by_title_and_price(&product.title, product.price)
            .await?
        {
            Some(existing) => existing,
            None => {
                inserted += 1;
                store.insert(product).await?
            }
        };
        records.push(record);
    }

    debug!(
        total = records.len(),
        inserted,
        reused = records.len() - inserted,
        "persisted listings"
    );
    Ok(records)
}
