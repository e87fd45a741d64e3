//! Storefront search-page fetching.
//!
//! One GET per search, with a fixed browser-like header bundle. Non-2xx
//! responses and transport errors both surface as [`ScoutError::Fetch`].
//! Nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use tracing::{debug, warn};

use crate::config::{FetchConfig, StorefrontConfig};
use crate::error::{ScoutError, ScoutResult};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Source of storefront search-result pages.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the raw markup of the search page for `keyword`.
    async fn fetch_search_page(&self, keyword: &str) -> ScoutResult<String>;
}

/// Builds the search URL for `keyword`: spaces become `+` and the result
/// is substituted into the storefront's search path template.
pub fn search_url(storefront: &StorefrontConfig, keyword: &str) -> String {
    let query = keyword.trim().replace(' ', "+");
    format!(
        "{}{}",
        storefront.base_url.trim_end_matches('/'),
        storefront.search_path.replace("{keyword}", &query)
    )
}

/// [`Fetcher`] backed by a shared `reqwest::Client`.
pub struct HttpFetcher {
    client: reqwest::Client,
    storefront: StorefrontConfig,
}

impl HttpFetcher {
    pub fn new(storefront: &StorefrontConfig, fetch: &FetchConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&fetch.user_agent)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&fetch.accept_language)?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            storefront: storefront.clone(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_search_page(&self, keyword: &str) -> ScoutResult<String> {
        let url = search_url(&self.storefront, keyword);
        debug!(%url, "fetching search page");

        let resp = self.client.get(&url).send().await.map_err(|e| {
            warn!(%url, error = %e, "storefront request failed");
            ScoutError::Fetch(e.to_string())
        })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "storefront returned an error status");
            return Err(ScoutError::Fetch(format!(
                "storefront returned HTTP {}",
                status.as_u16()
            )));
        }

        resp.text().await.map_err(|e| {
            warn!(%url, error = %e, "failed to read storefront response body");
            ScoutError::Fetch(e.to_string())
        })
    }
}
