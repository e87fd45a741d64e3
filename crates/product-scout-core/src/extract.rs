//! Search-result extraction.
//!
//! Parses a storefront search page, locates the repeated result blocks,
//! and pulls one [`Listing`] out of each block using fixed selectors.
//!
//! # Field rules
//!
//! | Field | Selector (default) | Missing | Unparseable |
//! |-------|--------------------|---------|-------------|
//! | title | `h2.a-size-mini` | block dropped | — |
//! | price | `span.a-price > span.a-offscreen` | `0.00` | block dropped |
//! | rating | `span.a-icon-alt` (first token) | `0.0` | block dropped |
//! | product_url | `a.a-link-normal` `href` | block dropped | — |
//! | is_prime | `i.a-icon-prime` present | `false` | — |
//! | image_url | `img.s-image` `src` | block dropped | — |
//!
//! Blocks are extracted independently: a failure inside one block drops
//! that block only.

use std::str::FromStr;

use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Listing;

/// Errors raised while compiling selectors or extracting a single block.
#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid {field} value: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid selector for {name}: {reason}")]
    InvalidSelector { name: &'static str, reason: String },
}

/// CSS selectors used to locate result blocks and their fields.
///
/// Every field has a default matching the storefront's current markup,
/// so a `[selectors]` table in the config only needs the overrides.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Selectors {
    pub result: String,
    pub title: String,
    pub price: String,
    pub rating: String,
    pub link: String,
    pub prime: String,
    pub image: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            result: r#"div[data-component-type="s-search-result"]"#.to_string(),
            title: "h2.a-size-mini".to_string(),
            price: "span.a-price > span.a-offscreen".to_string(),
            rating: "span.a-icon-alt".to_string(),
            link: "a.a-link-normal".to_string(),
            prime: "i.a-icon-prime".to_string(),
            image: "img.s-image".to_string(),
        }
    }
}

/// Outcome of one extraction pass.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Listings in document order.
    pub listings: Vec<Listing>,
    /// Number of result blocks dropped because extraction failed.
    pub skipped: usize,
}

impl Extraction {
    /// Total result blocks found on the page.
    pub fn blocks(&self) -> usize {
        self.listings.len() + self.skipped
    }
}

/// Compiled selector set plus the storefront origin used to absolutize
/// product links.
#[derive(Debug, Clone)]
pub struct Extractor {
    result: Selector,
    title: Selector,
    price: Selector,
    rating: Selector,
    link: Selector,
    prime: Selector,
    image: Selector,
    base_origin: String,
}

fn compile(name: &'static str, css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
        name,
        reason: e.to_string(),
    })
}

impl Extractor {
    pub fn new(selectors: &Selectors, base_origin: &str) -> Result<Self, ExtractError> {
        Ok(Self {
            result: compile("result", &selectors.result)?,
            title: compile("title", &selectors.title)?,
            price: compile("price", &selectors.price)?,
            rating: compile("rating", &selectors.rating)?,
            link: compile("link", &selectors.link)?,
            prime: compile("prime", &selectors.prime)?,
            image: compile("image", &selectors.image)?,
            base_origin: base_origin.trim_end_matches('/').to_string(),
        })
    }

    /// Extracts every result block from `html`.
    pub fn extract(&self, html: &str) -> Extraction {
        let doc = Html::parse_document(html);
        let mut out = Extraction::default();

        for (index, block) in doc.select(&self.result).enumerate() {
            match self.extract_block(block) {
                Ok(listing) => out.listings.push(listing),
                Err(e) => {
                    warn!(index, error = %e, "skipping result block");
                    out.skipped += 1;
                }
            }
        }

        debug!(
            extracted = out.listings.len(),
            skipped = out.skipped,
            "extraction finished"
        );
        out
    }

    fn extract_block(&self, block: ElementRef<'_>) -> Result<Listing, ExtractError> {
        let title = first_text(block, &self.title)
            .filter(|t| !t.is_empty())
            .ok_or(ExtractError::MissingField("title"))?;

        let price = match first_text(block, &self.price) {
            Some(raw) => parse_price(&raw)?,
            None => Decimal::ZERO,
        };

        let rating = match first_text(block, &self.rating) {
            Some(raw) => parse_rating(&raw)?,
            None => Decimal::ZERO,
        };

        let href = first_attr(block, &self.link, "href")
            .ok_or(ExtractError::MissingField("product_url"))?;
        let product_url = self.absolutize(&href);

        let is_prime = block.select(&self.prime).next().is_some();

        let image_url =
            first_attr(block, &self.image, "src").ok_or(ExtractError::MissingField("image_url"))?;

        Ok(Listing {
            title,
            price,
            rating,
            is_prime,
            product_url,
            image_url,
        }
        .normalized())
    }

    fn absolutize(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.base_origin, href)
        } else {
            format!("{}/{}", self.base_origin, href)
        }
    }
}

fn first_text(block: ElementRef<'_>, selector: &Selector) -> Option<String> {
    block
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

fn first_attr(block: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    block
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a display price such as `"$1,299.99"`.
///
/// Currency symbols, thousands separators, and whitespace are dropped; a
/// trailing `.` left by split whole/fraction markup is tolerated.
pub fn parse_price(raw: &str) -> Result<Decimal, ExtractError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let cleaned = cleaned.trim_end_matches('.');

    Decimal::from_str(cleaned).map_err(|_| ExtractError::InvalidNumber {
        field: "price",
        value: raw.to_string(),
    })
}

/// Parses a rating label such as `"4.5 out of 5 stars"` by reading its
/// leading numeral token.
pub fn parse_rating(raw: &str) -> Result<Decimal, ExtractError> {
    let token = raw.split_whitespace().next().unwrap_or("");
    Decimal::from_str(token).map_err(|_| ExtractError::InvalidNumber {
        field: "rating",
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(title: &str, price: Option<&str>, rating: Option<&str>, prime: bool) -> String {
        let price = price
            .map(|p| {
                format!(r#"<span class="a-price"><span class="a-offscreen">{p}</span></span>"#)
            })
            .unwrap_or_default();
        let rating = rating
            .map(|r| format!(r#"<span class="a-icon-alt">{r}</span>"#))
            .unwrap_or_default();
        let prime = if prime {
            r#"<i class="a-icon a-icon-prime"></i>"#
        } else {
            ""
        };
        format!(
            r#"<div data-component-type="s-search-result">
                 <img class="s-image" src="https://img.test/{title}.jpg">
                 <a class="a-link-normal s-no-outline" href="/dp/{title}">
                   <h2 class="a-size-mini a-spacing-none"><span>{title}</span></h2>
                 </a>
                 {price}{rating}{prime}
               </div>"#
        )
    }

    fn page(blocks: &[String]) -> String {
        format!("<html><body>{}</body></html>", blocks.join("\n"))
    }

    fn extractor() -> Extractor {
        Extractor::new(&Selectors::default(), "https://shop.test/").unwrap()
    }

    #[test]
    fn test_extracts_all_fields() {
        let html = page(&[block("widget", Some("$1,299.99"), Some("4.5 out of 5 stars"), true)]);
        let out = extractor().extract(&html);

        assert_eq!(out.skipped, 0);
        assert_eq!(out.listings.len(), 1);
        let l = &out.listings[0];
        assert_eq!(l.title, "widget");
        assert_eq!(l.price.to_string(), "1299.99");
        assert_eq!(l.rating.to_string(), "4.5");
        assert!(l.is_prime);
        assert_eq!(l.product_url, "https://shop.test/dp/widget");
        assert_eq!(l.image_url, "https://img.test/widget.jpg");
    }

    #[test]
    fn test_missing_price_and_rating_default_to_zero() {
        let html = page(&[block("bare", None, None, false)]);
        let out = extractor().extract(&html);

        let l = &out.listings[0];
        assert_eq!(l.price.to_string(), "0.00");
        assert_eq!(l.rating.to_string(), "0.0");
        assert!(!l.is_prime);
    }

    #[test]
    fn test_failing_block_does_not_affect_siblings() {
        let html = page(&[
            block("first", Some("$10.00"), Some("4.0 out of 5 stars"), false),
            block("broken", Some("call for price"), Some("4.0"), false),
            r#"<div data-component-type="s-search-result"><span>no title</span></div>"#
                .to_string(),
            block("last", Some("$20.00"), Some("3.0 out of 5 stars"), true),
        ]);
        let out = extractor().extract(&html);

        let titles: Vec<&str> = out.listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "last"]);
        assert_eq!(out.skipped, 2);
        assert_eq!(out.blocks(), 4);
    }

    #[test]
    fn test_page_without_blocks_is_empty() {
        let out = extractor().extract("<html><body><p>No results</p></body></html>");
        assert!(out.listings.is_empty());
        assert_eq!(out.blocks(), 0);
    }

    #[test]
    fn test_absolute_links_are_kept() {
        let html = page(&[block("abs", Some("$1"), None, false)])
            .replace("/dp/abs", "https://other.test/dp/abs");
        let out = extractor().extract(&html);
        assert_eq!(out.listings[0].product_url, "https://other.test/dp/abs");
    }

    #[test]
    fn test_parse_price_strips_symbols_and_separators() {
        assert_eq!(parse_price("$1,234.50").unwrap(), Decimal::new(123450, 2));
        assert_eq!(parse_price(" 899. ").unwrap(), Decimal::new(899, 0));
        assert!(matches!(
            parse_price("N/A"),
            Err(ExtractError::InvalidNumber { field: "price", .. })
        ));
    }

    #[test]
    fn test_parse_rating_reads_leading_token() {
        assert_eq!(
            parse_rating("4.7 out of 5 stars").unwrap(),
            Decimal::new(47, 1)
        );
        assert!(parse_rating("").is_err());
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let selectors = Selectors {
            title: "h2[[".to_string(),
            ..Selectors::default()
        };
        let err = Extractor::new(&selectors, "https://shop.test").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::InvalidSelector { name: "title", .. }
        ));
    }
}
