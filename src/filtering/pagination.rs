use axum::http::header::HeaderMap;
use sea_orm::{
    Order, QueryOrder, QuerySelect,
    sea_query::{Alias, Expr, SimpleExpr},
};

use crate::config::QueryConfig;
use crate::errors::QueryError;
use crate::schema::EntitySchema;

/// Column every page is sorted by; the sort parameter is not consulted.
pub const DEFAULT_SORT_COLUMN: &str = "id";

/// Page size when the request names none: everything on one page.
pub const DEFAULT_PAGE_SIZE: u64 = u64::MAX;

/// Zero-based page number, page size and the fixed sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// # Panics
    ///
    /// Panics if `size` is zero.
    #[must_use]
    pub fn new(page: u64, size: u64) -> Self {
        assert!(size > 0, "page size must be positive");
        Self { page, size }
    }

    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub fn sort(&self) -> &'static str {
        DEFAULT_SORT_COLUMN
    }

    /// Whether no page size was requested
    #[must_use]
    pub fn is_unpaged(&self) -> bool {
        self.size == DEFAULT_PAGE_SIZE
    }

    /// Rows to skip before this page
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    /// Order by the root entity's `id` ascending and select this page.
    ///
    /// An unpaged request sets no LIMIT, which some backends reject when
    /// given `u64::MAX`.
    #[must_use]
    pub fn apply<Q>(&self, query: Q, schema: &EntitySchema) -> Q
    where
        Q: QueryOrder + QuerySelect,
    {
        let sort: SimpleExpr =
            Expr::col((Alias::new(schema.table()), Alias::new(self.sort()))).into();
        let query = query.order_by(sort, Order::Asc);
        if self.is_unpaged() {
            return query;
        }
        query.offset(self.offset()).limit(self.size)
    }

    /// `Content-Range` header for this page out of `total_count` rows.
    #[must_use]
    pub fn content_range(&self, total_count: u64, resource_name: &str) -> HeaderMap {
        calculate_content_range(self.offset(), self.size, total_count, resource_name)
    }
}

/// Read the page number and page size parameters.
///
/// Missing page number is `0`; missing page size is [`DEFAULT_PAGE_SIZE`].
/// When a key repeats, the last value wins. The sort parameter is ignored.
///
/// # Errors
///
/// [`QueryError::InvalidPagination`] when the page number is not a
/// non-negative integer or the page size is not a positive integer.
pub fn extract_page_request<K, V>(
    config: &QueryConfig,
    params: &[(K, V)],
) -> Result<PageRequest, QueryError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut request = PageRequest::default();

    for (key, value) in params {
        let (key, value) = (key.as_ref(), value.as_ref());
        let invalid = || QueryError::InvalidPagination {
            key: key.to_string(),
            value: value.to_string(),
        };

        if key == config.page_number_param() {
            request.page = value.parse::<u64>().map_err(|_| invalid())?;
        } else if key == config.page_size_param() {
            request.size = value
                .parse::<u64>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or_else(invalid)?;
        }
    }

    Ok(request)
}

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Build a `Content-Range` header (`items 0-9/100`).
///
/// The resource name is stripped of control and non-ASCII characters so it
/// cannot inject headers.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    limit: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let last = offset
        .saturating_add(limit)
        .saturating_sub(1)
        .min(total_count.saturating_sub(1));
    let safe_name = sanitize_resource_name(resource_name);
    let content_range = format!("{safe_name} {offset}-{last}/{total_count}");

    let mut headers = HeaderMap::new();
    if let Ok(value) = content_range.parse() {
        headers.insert("Content-Range", value);
    } else if let Ok(value) = format!("items {offset}-{last}/{total_count}").parse() {
        headers.insert("Content-Range", value);
    }
    headers
}
