//! Price, rating, and prime-eligibility filtering.
//!
//! A listing passes when
//! `min_price <= price <= max_price && rating >= min_rating && (!prime_only || is_prime)`.
//! All bounds are inclusive. A `None` maximum price is unbounded.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::Listing;

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("{0} must not be negative")]
    Negative(&'static str),

    #[error("minPrice ({min}) must not exceed maxPrice ({max})")]
    InvertedPriceRange { min: Decimal, max: Decimal },
}

/// Search criteria applied to extracted listings.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub min_price: Decimal,
    pub max_price: Option<Decimal>,
    pub min_rating: Decimal,
    pub prime_only: bool,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            min_price: Decimal::ZERO,
            max_price: None,
            min_rating: Decimal::ZERO,
            prime_only: false,
        }
    }
}

impl SearchFilter {
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.min_price.is_sign_negative() {
            return Err(FilterError::Negative("minPrice"));
        }
        if self.min_rating.is_sign_negative() {
            return Err(FilterError::Negative("minRating"));
        }
        if let Some(max) = self.max_price {
            if max.is_sign_negative() {
                return Err(FilterError::Negative("maxPrice"));
            }
            if self.min_price > max {
                return Err(FilterError::InvertedPriceRange {
                    min: self.min_price,
                    max,
                });
            }
        }
        Ok(())
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        let within_max = self.max_price.map_or(true, |max| listing.price <= max);
        self.min_price <= listing.price
            && within_max
            && listing.rating >= self.min_rating
            && (!self.prime_only || listing.is_prime)
    }

    /// Keeps matching listings in their original order.
    pub fn apply(&self, listings: Vec<Listing>) -> Vec<Listing> {
        listings.into_iter().filter(|l| self.matches(l)).collect()
    }
}
