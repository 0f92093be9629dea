//! # Filtering & Pagination
//!
//! Translates flat query parameters into a Sea-ORM condition and a page
//! request, without writing SQL by hand.
//!
//! ## Key Features
//!
//! - **Suffix operators**: `field_lt`, `field_in`, ... decoded with configurable tokens
//! - **Typed values**: raw strings coerced to the column's declared type
//! - **One-level joins**: `relation.field` keys join the related table once
//! - **Pagination**: zero-based page number and page size, always ordered by `id`
//!
//! ## Query Parameter Examples
//!
//! ```rust,ignore
//! // Equality
//! GET /customers?name=Ann&isActive=true
//!
//! // Comparisons
//! GET /customers?age_lt=30&visits_ge=5
//!
//! // Lists
//! GET /customers?age_in=18,21,30
//!
//! // Related entity
//! GET /customers?department.name=Sales
//!
//! // Second page of ten
//! GET /customers?_number=1&_size=10
//! ```

pub mod conditions;
pub mod operator;
pub mod pagination;
pub mod value;

pub use conditions::{FieldFilter, Filter, build_filter, parse_filters};
pub use operator::{DecodedKey, Operator, decode_key};
pub use pagination::{
    DEFAULT_PAGE_SIZE, DEFAULT_SORT_COLUMN, PageRequest, calculate_content_range,
    extract_page_request,
};
pub use value::{FilterValue, coerce};
