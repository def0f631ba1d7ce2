//! Category filtering, search, and offset pagination over normalized products.
//!
//! Filters run before pagination and never reorder: the page is a contiguous
//! slice of the filtered collection in upstream order.

use std::ops::Range;

use crate::categories::{is_catch_all, CategorySet};
use crate::products::NormalizedProduct;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

/// Caller-supplied query parameters, before clamping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductQuery<'a> {
    pub category: Option<&'a str>,
    pub search: Option<&'a str>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Effective page/limit after clamping.
///
/// Values below 1 become 1; `limit` is additionally capped at [`MAX_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Pagination {
    #[must_use]
    pub fn clamped(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.map_or(DEFAULT_PAGE, |p| usize::try_from(p.max(1)).unwrap_or(usize::MAX));
        let limit = limit.map_or(DEFAULT_LIMIT, |l| {
            usize::try_from(l.clamp(1, MAX_LIMIT as i64)).unwrap_or(MAX_LIMIT)
        });
        Self { page, limit }
    }

    /// Half-open index range of this page within a collection of `len` items.
    #[must_use]
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = (self.page - 1).saturating_mul(self.limit).min(len);
        let end = start.saturating_add(self.limit).min(len);
        start..end
    }

    #[must_use]
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of query results plus the post-filter total.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub items: Vec<NormalizedProduct>,
    pub total: usize,
    pub pagination: Pagination,
}

impl ProductPage {
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.total)
    }
}

/// Filters, searches, and paginates `products`.
///
/// Blank `category`/`search` values are treated as absent.
#[must_use]
pub fn query_products(
    products: Vec<NormalizedProduct>,
    categories: &CategorySet,
    query: &ProductQuery<'_>,
) -> ProductPage {
    let category = non_blank(query.category).map(CategoryFilter::parse);
    let search = non_blank(query.search).map(str::to_lowercase);

    let filtered: Vec<NormalizedProduct> = products
        .into_iter()
        .filter(|p| {
            category
                .as_ref()
                .is_none_or(|filter| filter.matches(p, categories))
        })
        .filter(|p| search.as_deref().is_none_or(|needle| matches_search(p, needle)))
        .collect();

    let total = filtered.len();
    let pagination = Pagination::clamped(query.page, query.limit);
    let range = pagination.range(total);
    let items = filtered
        .into_iter()
        .skip(range.start)
        .take(range.len())
        .collect();

    ProductPage {
        items,
        total,
        pagination,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CategoryFilter {
    /// Non-empty categories outside the known set.
    CatchAll,
    /// Case-folded exact label.
    Exact(String),
}

impl CategoryFilter {
    fn parse(raw: &str) -> Self {
        if is_catch_all(raw) {
            CategoryFilter::CatchAll
        } else {
            CategoryFilter::Exact(raw.to_lowercase())
        }
    }

    fn matches(&self, product: &NormalizedProduct, categories: &CategorySet) -> bool {
        match self {
            CategoryFilter::CatchAll => {
                !product.category.is_empty() && !categories.contains(&product.category)
            }
            CategoryFilter::Exact(folded) => product.category.to_lowercase() == *folded,
        }
    }
}

/// `needle` must already be lower-cased.
fn matches_search(product: &NormalizedProduct, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
