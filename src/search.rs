//! One-shot search from the command line.
//!
//! Builds the same pipeline the server uses (SQLite store, HTTP fetcher,
//! configured selectors and export) and prints the persisted records.

use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;

use product_scout_core::extract::Extractor;
use product_scout_core::filter::SearchFilter;
use product_scout_core::models::ProductRecord;

use crate::config::Config;
use crate::db;
use crate::fetch::HttpFetcher;
use crate::migrate;
use crate::pipeline::SearchPipeline;
use crate::sqlite_store::SqliteStore;
use crate::throttle::Unthrottled;

/// Search options as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<Decimal>,
    pub prime_only: bool,
}

impl SearchArgs {
    pub fn to_filter(&self) -> SearchFilter {
        SearchFilter {
            min_price: self.min_price.unwrap_or(Decimal::ZERO),
            max_price: self.max_price,
            min_rating: self.min_rating.unwrap_or(Decimal::ZERO),
            prime_only: self.prime_only,
        }
    }
}

pub async fn search_products(
    config: &Config,
    keyword: &str,
    args: &SearchArgs,
) -> Result<Vec<ProductRecord>> {
    let pool = db::connect(config).await?;
    migrate::migrate_pool(&pool).await?;

    let extractor = Extractor::new(&config.selectors, &config.storefront.base_url)?;
    let fetcher = HttpFetcher::new(&config.storefront, &config.fetch)?;
    // One request per run.
    let pipeline = SearchPipeline::new(
        Arc::new(fetcher),
        Arc::new(Unthrottled),
        Arc::new(extractor),
        Arc::new(SqliteStore::new(pool.clone())),
    )
    .with_export(config.export.path.clone());

    let result = pipeline.run(keyword, &args.to_filter()).await;
    pool.close().await;
    Ok(result?)
}

/// CLI entry point: runs a search and prints the results to stdout.
pub async fn run_search(config: &Config, keyword: &str, args: &SearchArgs) -> Result<()> {
    let records = search_products(config, keyword, args).await?;

    if records.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for r in &records {
        let prime = if r.is_prime { " [prime]" } else { "" };
        println!(
            "#{:<6} {:>10}  {} ({} stars){}",
            r.id, r.price, r.title, r.rating, prime
        );
        println!("        {}", r.product_url);
    }
    println!();
    println!("{} result(s)", records.len());

    Ok(())
}
