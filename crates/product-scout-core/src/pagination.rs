//! Page-number pagination for result lists.
//!
//! Pages are 1-based. `page_size` defaults to 12 and is capped at 100.
//! `next` and `previous` are absolute links built from the request URL
//! with only the `page` parameter replaced; the link back to page 1
//! drops `page` entirely. Query keys in generated links are sorted.

use serde::Serialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Error, PartialEq)]
pub enum PageError {
    #[error("Invalid page.")]
    InvalidPage,
}

/// A validated page selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Builds a request from raw `page` / `page_size` query values.
    ///
    /// A malformed or zero `page` is an error; a malformed or zero
    /// `page_size` falls back to the default.
    pub fn from_params(page: Option<&str>, page_size: Option<&str>) -> Result<Self, PageError> {
        let page = match page {
            None => 1,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(PageError::InvalidPage),
            },
        };

        let page_size = page_size
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .map_or(DEFAULT_PAGE_SIZE, |n| n.min(MAX_PAGE_SIZE));

        Ok(Self { page, page_size })
    }
}

/// One page of results in the `{count, next, previous, results}` shape.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Slices `items` to the requested page.
///
/// An empty list still has a (empty) first page; any page past the last
/// is [`PageError::InvalidPage`].
pub fn paginate<T>(items: Vec<T>, req: PageRequest, request_url: &Url) -> Result<Page<T>, PageError> {
    let count = items.len();
    let num_pages = count.div_ceil(req.page_size).max(1);
    if req.page > num_pages {
        return Err(PageError::InvalidPage);
    }

    let start = (req.page - 1) * req.page_size;
    let results: Vec<T> = items.into_iter().skip(start).take(req.page_size).collect();

    let next = (req.page < num_pages).then(|| link_to(request_url, Some(req.page + 1)));
    let previous = (req.page > 1).then(|| {
        let target = req.page - 1;
        link_to(request_url, (target > 1).then_some(target))
    });

    Ok(Page {
        count,
        next,
        previous,
        results,
    })
}

fn link_to(request_url: &Url, page: Option<usize>) -> String {
    let mut url = request_url.clone();
    let mut pairs: Vec<(String, String)> = request_url
        .query_pairs()
        .filter(|(k, _)| k != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if let Some(p) = page {
        pairs.push(("page".to_string(), p.to_string()));
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url.to_string()
}
