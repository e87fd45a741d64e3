//! Core data models used throughout Product Scout.
//!
//! A [`Listing`] is what the extractor pulls out of one search-result
//! block. Listings that survive filtering become [`NewProduct`]s and are
//! persisted as [`ProductRecord`]s.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places kept for prices.
pub const PRICE_SCALE: u32 = 2;
/// Decimal places kept for ratings.
pub const RATING_SCALE: u32 = 1;

/// One product listing extracted from a storefront search page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub price: Decimal,
    pub rating: Decimal,
    pub is_prime: bool,
    pub product_url: String,
    pub image_url: String,
}

impl Listing {
    /// Rescales price and rating to their stored precision.
    pub fn normalized(mut self) -> Self {
        self.price = normalize_price(self.price);
        self.rating = normalize_rating(self.rating);
        self
    }
}

/// Fields of a product about to be inserted. The store assigns the id
/// and the creation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub title: String,
    pub price: Decimal,
    pub rating: Decimal,
    pub is_prime: bool,
    pub product_url: String,
    pub image_url: String,
}

impl NewProduct {
    pub fn normalized(mut self) -> Self {
        self.price = normalize_price(self.price);
        self.rating = normalize_rating(self.rating);
        self
    }
}

impl From<Listing> for NewProduct {
    fn from(listing: Listing) -> Self {
        let listing = listing.normalized();
        Self {
            title: listing.title,
            price: listing.price,
            rating: listing.rating,
            is_prime: listing.is_prime,
            product_url: listing.product_url,
            image_url: listing.image_url,
        }
    }
}

/// A persisted product, as returned by the API.
///
/// `price` and `rating` serialize as decimal strings (`"900.00"`,
/// `"4.5"`); `created_at` as RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub title: String,
    pub price: Decimal,
    pub rating: Decimal,
    pub is_prime: bool,
    pub product_url: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl ProductRecord {
    pub fn from_new(id: i64, product: NewProduct, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: product.title,
            price: product.price,
            rating: product.rating,
            is_prime: product.is_prime,
            product_url: product.product_url,
            image_url: product.image_url,
            created_at,
        }
    }
}

pub fn normalize_price(price: Decimal) -> Decimal {
    let mut p = price.round_dp(PRICE_SCALE);
    p.rescale(PRICE_SCALE);
    p
}

pub fn normalize_rating(rating: Decimal) -> Decimal {
    let mut r = rating.round_dp(RATING_SCALE);
    r.rescale(RATING_SCALE);
    r
}
