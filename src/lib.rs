//! # Product Scout
//!
//! Searches a third-party storefront for a keyword, filters the listings
//! by price, rating, and prime eligibility, stores them de-duplicated on
//! (title, price), and serves paginated results over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌──────────┐
//! │ Throttle │──▶│  Fetcher  │──▶│ Extractor│──▶│  Filter  │
//! │ governor │   │  reqwest  │   │ scraper  │   │          │
//! └──────────┘   └───────────┘   └──────────┘   └────┬─────┘
//!                                                    ▼
//!                 ┌──────────┐                 ┌──────────┐
//!                 │   HTTP   │◀────────────────│ Persister│──▶ SQLite
//!                 │  (axum)  │                 │ (dedup)  │
//!                 └──────────┘                 └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! scout init                         # create database
//! scout search "laptop" --min-price 500 --max-price 1500 --prime
//! scout recent                       # recently captured titles
//! scout serve                        # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Error type and HTTP status mapping |
//! | [`fetch`] | Storefront search-page fetcher |
//! | [`throttle`] | Outbound request pacing |
//! | [`pipeline`] | Fetch → extract → filter → persist |
//! | [`export`] | JSON dump of filtered listings |
//! | [`get`] | CLI product lookup and recent titles |
//! | [`search`] | CLI one-shot search |
//! | [`logging`] | Tracing subscriber setup |
//! | [`sqlite_store`] | SQLite product repository |
//! | [`server`] | HTTP API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//!
//! Models, extraction, filtering, the repository trait, and pagination
//! live in the `product-scout-core` crate.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod fetch;
pub mod get;
pub mod logging;
pub mod migrate;
pub mod pipeline;
pub mod search;
pub mod server;
pub mod sqlite_store;
pub mod throttle;
