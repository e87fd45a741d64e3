//! The search pipeline: throttle → fetch → extract → filter → export →
//! persist.
//!
//! One call runs one outbound fetch, one parse pass, and one sequential
//! persistence loop. Collaborators are injected as trait objects so the
//! pipeline can run against a fixture fetcher and an in-memory store.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use product_scout_core::extract::Extractor;
use product_scout_core::filter::SearchFilter;
use product_scout_core::models::ProductRecord;
use product_scout_core::store::{persist, ProductStore};

use crate::error::{ScoutError, ScoutResult};
use crate::export::export_listings;
use crate::fetch::Fetcher;
use crate::throttle::Throttle;

pub struct SearchPipeline {
    fetcher: Arc<dyn Fetcher>,
    throttle: Arc<dyn Throttle>,
    extractor: Arc<Extractor>,
    store: Arc<dyn ProductStore>,
    export_path: Option<PathBuf>,
}

impl SearchPipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        throttle: Arc<dyn Throttle>,
        extractor: Arc<Extractor>,
        store: Arc<dyn ProductStore>,
    ) -> Self {
        Self {
            fetcher,
            throttle,
            extractor,
            store,
            export_path: None,
        }
    }

    pub fn with_export(mut self, path: Option<PathBuf>) -> Self {
        self.export_path = path;
        self
    }

    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.store
    }

    /// Runs a full search and returns the persisted records in result
    /// order.
    pub async fn run(&self, keyword: &str, filter: &SearchFilter) -> ScoutResult<Vec<ProductRecord>> {
        filter.validate()?;

        let span = info_span!("search", keyword = %keyword);
        let result: ScoutResult<Vec<ProductRecord>> = async move {
            self.throttle.acquire().await;
            let html = self.fetcher.fetch_search_page(keyword).await?;

            let extraction = self.extractor.extract(&html);
            if extraction.listings.is_empty() && extraction.skipped > 0 {
                return Err(ScoutError::Parse {
                    blocks: extraction.blocks(),
                });
            }
            let extracted = extraction.listings.len();

            let matched = filter.apply(extraction.listings);

            if let Some(path) = &self.export_path {
                export_listings(path, &matched)
                    .await
                    .map_err(ScoutError::Internal)?;
            }

            let matched_count = matched.len();
            let records = persist(self.store.as_ref(), matched)
                .await
                .map_err(ScoutError::Storage)?;

            info!(
                extracted,
                skipped = extraction.skipped,
                matched = matched_count,
                "search complete"
            );
            Ok(records)
        }
        .instrument(span)
        .await;
        result
    }
}
