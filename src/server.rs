//! HTTP API server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/search/` | Fetch, filter, persist, and return a page of products |
//! | `GET`  | `/products/{id}/` | One stored product |
//! | `GET`  | `/recent-searches/` | Up to 10 most recently captured distinct titles |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Search request
//!
//! ```json
//! { "keyword": "laptop", "minPrice": 500, "maxPrice": 1500, "minRating": 4.0, "isPrime": true }
//! ```
//!
//! Every field is optional: `keyword` defaults to `""`, price bounds to
//! `[0, ∞)`, `minRating` to `0`, `isPrime` to `false`. Numbers may also be
//! sent as numeric strings. Paging uses the `page` and `page_size` query
//! parameters.
//!
//! # Error Contract
//!
//! ```json
//! { "error": "Product not found" }
//! ```
//!
//! Status codes: `400` validation, `404` unknown product or page,
//! `502` storefront fetch/parse failure, `500` storage or internal error.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser frontend
//! on another origin can call the API.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{OriginalUri, Path, Query, State},
    http::{header::HOST, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use url::Url;

use product_scout_core::extract::Extractor;
use product_scout_core::filter::SearchFilter;
use product_scout_core::models::ProductRecord;
use product_scout_core::pagination::{paginate, Page, PageRequest};
use product_scout_core::store::{ProductStore, RECENT_TITLES_LIMIT};

use crate::config::Config;
use crate::db;
use crate::error::{ScoutError, ScoutResult};
use crate::fetch::HttpFetcher;
use crate::migrate;
use crate::pipeline::SearchPipeline;
use crate::sqlite_store::SqliteStore;
use crate::throttle::GovernorThrottle;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<SearchPipeline>,
    store: Arc<dyn ProductStore>,
}

impl AppState {
    pub fn new(pipeline: SearchPipeline) -> Self {
        let store = pipeline.store().clone();
        Self {
            pipeline: Arc::new(pipeline),
            store,
        }
    }

    /// Wires the production collaborators from configuration: SQLite
    /// store (migrated), HTTP fetcher, and the shared governor throttle.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let pool = db::connect(config).await?;
        migrate::migrate_pool(&pool).await?;

        let extractor = Extractor::new(&config.selectors, &config.storefront.base_url)?;
        let fetcher = HttpFetcher::new(&config.storefront, &config.fetch)?;
        let throttle = GovernorThrottle::new(config.fetch.requests_per_minute);

        let pipeline = SearchPipeline::new(
            Arc::new(fetcher),
            Arc::new(throttle),
            Arc::new(extractor),
            Arc::new(SqliteStore::new(pool)),
        )
        .with_export(config.export.path.clone());

        Ok(Self::new(pipeline))
    }
}

/// Starts the HTTP server on `[server].bind`.
///
/// Runs until the process is terminated. Returns an error if the
/// database cannot be opened or the address cannot be bound.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(addr = %listener.local_addr()?, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search/", post(handle_search))
        .route("/products/{id}/", get(handle_get_product))
        .route("/recent-searches/", get(handle_recent_searches))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /search/ ============

/// A number sent either as JSON number or as a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
}

/// Raw search body. Field names follow the frontend's camelCase.
#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct SearchRequest {
    keyword: Option<String>,
    min_price: Option<NumberLike>,
    max_price: Option<NumberLike>,
    min_rating: Option<NumberLike>,
    is_prime: Option<bool>,
}

fn is_infinity(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "inf" | "+inf" | "infinity" | "+infinity"
    )
}

fn to_decimal(field: &str, value: &NumberLike) -> ScoutResult<Decimal> {
    let invalid = || ScoutError::Validation(format!("{} must be a number", field));
    match value {
        NumberLike::Number(n) => Decimal::try_from(*n).map_err(|_| invalid()),
        NumberLike::Text(s) => Decimal::from_str(s.trim()).map_err(|_| invalid()),
    }
}

impl SearchRequest {
    fn keyword(&self) -> &str {
        self.keyword.as_deref().unwrap_or("")
    }

    fn filter(&self) -> ScoutResult<SearchFilter> {
        let min_price = match &self.min_price {
            Some(v) => to_decimal("minPrice", v)?,
            None => Decimal::ZERO,
        };
        let max_price = match &self.max_price {
            Some(NumberLike::Text(s)) if is_infinity(s) => None,
            Some(v) => Some(to_decimal("maxPrice", v)?),
            None => None,
        };
        let min_rating = match &self.min_rating {
            Some(v) => to_decimal("minRating", v)?,
            None => Decimal::ZERO,
        };

        Ok(SearchFilter {
            min_price,
            max_price,
            min_rating,
            prime_only: self.is_prime.unwrap_or(false),
        })
    }
}

fn parse_search_body(body: &[u8]) -> ScoutResult<SearchRequest> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(SearchRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ScoutError::Validation(format!("invalid request body: {}", e)))
}

/// Reconstructs the absolute request URL used for `next`/`previous` links.
fn request_url(headers: &HeaderMap, uri: &axum::http::Uri) -> ScoutResult<Url> {
    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    Url::parse(&format!("http://{}{}", host, uri))
        .map_err(|e| ScoutError::Validation(format!("invalid request URL: {}", e)))
}

/// Handler for `POST /search/`.
async fn handle_search(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> ScoutResult<Json<Page<ProductRecord>>> {
    let req = parse_search_body(&body)?;
    let filter = req.filter()?;
    let page_req = PageRequest::from_params(
        params.get("page").map(String::as_str),
        params.get("page_size").map(String::as_str),
    )?;
    let base = request_url(&headers, &uri)?;

    let records = state.pipeline.run(req.keyword(), &filter).await?;
    let page = paginate(records, page_req, &base)?;
    Ok(Json(page))
}

// ============ GET /products/{id}/ ============

/// Handler for `GET /products/{id}/`. Non-numeric ids are treated as
/// unknown.
async fn handle_get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ScoutResult<Json<ProductRecord>> {
    let id: i64 = id.parse().map_err(|_| ScoutError::product_not_found())?;
    let record = state
        .store
        .get_by_id(id)
        .await
        .map_err(ScoutError::Storage)?
        .ok_or_else(ScoutError::product_not_found)?;
    Ok(Json(record))
}

// ============ GET /recent-searches/ ============

async fn handle_recent_searches(State(state): State<AppState>) -> ScoutResult<Json<Vec<String>>> {
    let titles = state
        .store
        .list_recent_distinct_titles(RECENT_TITLES_LIMIT)
        .await
        .map_err(ScoutError::Storage)?;
    Ok(Json(titles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_uses_defaults() {
        let req = parse_search_body(b"").unwrap();
        assert_eq!(req.keyword(), "");
        assert_eq!(req.filter().unwrap(), SearchFilter::default());
    }

    #[test]
    fn test_camel_case_fields() {
        let req = parse_search_body(
            br#"{"keyword":"laptop","minPrice":500,"maxPrice":1500,"minRating":4.0,"isPrime":true}"#,
        )
        .unwrap();
        let f = req.filter().unwrap();
        assert_eq!(req.keyword(), "laptop");
        assert_eq!(f.min_price, Decimal::new(500, 0));
        assert_eq!(f.max_price, Some(Decimal::new(1500, 0)));
        assert_eq!(f.min_rating, Decimal::new(4, 0));
        assert!(f.prime_only);
    }

    #[test]
    fn test_numeric_strings_and_infinity() {
        let req =
            parse_search_body(br#"{"minPrice":"19.99","maxPrice":"Infinity","minRating":"3"}"#)
                .unwrap();
        let f = req.filter().unwrap();
        assert_eq!(f.min_price, Decimal::new(1999, 2));
        assert_eq!(f.max_price, None);
        assert_eq!(f.min_rating, Decimal::new(3, 0));
    }

    #[test]
    fn test_null_bounds_use_defaults() {
        let req = parse_search_body(br#"{"maxPrice":null}"#).unwrap();
        assert_eq!(req.filter().unwrap().max_price, None);
    }

    #[test]
    fn test_null_keyword_and_prime_use_defaults() {
        let req =
            parse_search_body(br#"{"keyword":null,"isPrime":null,"minRating":null}"#).unwrap();
        assert_eq!(req.keyword(), "");
        assert_eq!(req.filter().unwrap(), SearchFilter::default());
    }

    #[test]
    fn test_non_numeric_bound_is_validation_error() {
        let req = parse_search_body(br#"{"minPrice":"cheap"}"#).unwrap();
        let err = req.filter().unwrap_err();
        assert!(matches!(err, ScoutError::Validation(ref m) if m.contains("minPrice")));
    }

    #[test]
    fn test_malformed_json_is_validation_error() {
        assert!(matches!(
            parse_search_body(b"{not json"),
            Err(ScoutError::Validation(_))
        ));
    }

    #[test]
    fn test_request_url_uses_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, "api.test:8000".parse().unwrap());
        let uri: axum::http::Uri = "/search/?page=2".parse().unwrap();
        let url = request_url(&headers, &uri).unwrap();
        assert_eq!(url.as_str(), "http://api.test:8000/search/?page=2");
    }
}
