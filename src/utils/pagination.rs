use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Raw `page`/`limit` query parameters. Kept as strings so that garbage
/// values fall back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number, starting at 1
    pub page: Option<String>,
    /// Items per page, at most 100
    pub limit: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn meta(&self, total_items: u64) -> PaginationMeta {
        PaginationMeta::new(total_items, self.limit, self.page)
    }
}

impl From<&PaginationQuery> for Pagination {
    fn from(query: &PaginationQuery) -> Self {
        let page = match query.page.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_PAGE,
            Some(raw) => match raw.parse::<u32>() {
                Ok(p) if p >= 1 => p,
                _ => {
                    warn!(page_query = raw, "Invalid page query parameter, using default");
                    DEFAULT_PAGE
                }
            },
        };

        let limit = match query.limit.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_LIMIT,
            Some(raw) => match raw.parse::<u32>() {
                Ok(l) if l > MAX_LIMIT => {
                    warn!(requested_limit = l, max_limit = MAX_LIMIT, "Requested limit exceeds maximum, capping");
                    MAX_LIMIT
                }
                Ok(l) if l >= 1 => l,
                _ => {
                    warn!(limit_query = raw, "Invalid limit query parameter, using default");
                    DEFAULT_LIMIT
                }
            },
        };

        Self::new(page, limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    #[schema(example = 1)]
    pub current_page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total_items: u64,
    #[schema(example = 5)]
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(total_items: u64, limit: u32, page: u32) -> Self {
        let total_pages = if total_items > 0 && limit > 0 {
            total_items.div_ceil(u64::from(limit))
        } else {
            0
        };

        Self {
            current_page: page,
            per_page: limit,
            total_items,
            total_pages,
        }
    }
}

/// Applies a page window to an already filtered and ordered sequence.
#[cfg(test)]
pub fn page_of<T: Clone>(items: &[T], pagination: Pagination) -> Vec<T> {
    items
        .iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit as usize)
        .cloned()
        .collect()
}
