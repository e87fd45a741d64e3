//! In-memory [`ProductStore`] implementation for testing and embedding.
//!
//! Records live in a `Vec` behind `std::sync::RwLock`, in insertion
//! order. Ids start at 1.

use std::collections::HashSet;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{normalize_price, NewProduct, ProductRecord};

use super::ProductStore;

pub struct InMemoryStore {
    records: RwLock<Vec<ProductRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts with an explicit creation time. Tests use this to control
    /// recent-title ordering.
    pub fn insert_at(&self, product: NewProduct, created_at: DateTime<Utc>) -> Result<ProductRecord> {
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        let id = records.last().map_or(1, |r| r.id + 1);
        let record = ProductRecord::from_new(id, product.normalized(), created_at);
        records.push(record.clone());
        Ok(record)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn find_by_title_and_price(
        &self,
        title: &str,
        price: Decimal,
    ) -> Result<Option<ProductRecord>> {
        let price = normalize_price(price);
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        Ok(records
            .iter()
            .find(|r| r.title == title && r.price == price)
            .cloned())
    }

    async fn insert(&self, product: NewProduct) -> Result<ProductRecord> {
        self.insert_at(product, Utc::now())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ProductRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn list_recent_distinct_titles(&self, limit: usize) -> Result<Vec<String>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;

        let mut ordered: Vec<&ProductRecord> = records.iter().collect();
        // Newest first; later ids break timestamp ties.
        ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let mut seen = HashSet::new();
        Ok(ordered
            .into_iter()
            .filter(|r| seen.insert(r.title.as_str()))
            .take(limit)
            .map(|r| r.title.clone())
            .collect())
    }
}
