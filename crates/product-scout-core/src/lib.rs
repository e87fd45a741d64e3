//! # Product Scout Core
//!
//! Shared, network-free logic for Product Scout: the listing and record
//! models, the search-result extractor, the price/rating/prime filter,
//! the repository abstraction, and page slicing.
//!
//! This crate contains no tokio, sqlx, or HTTP client dependencies. The
//! native host (`product-scout`) supplies fetching, throttling, SQLite
//! storage, and the HTTP surface.

pub mod extract;
pub mod filter;
pub mod models;
pub mod pagination;
pub mod store;
