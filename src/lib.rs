//! # paramquery
//!
//! Turn flat HTTP query parameters into Sea-ORM filters and page requests.
//!
//! ```rust,ignore
//! use paramquery::{EntitySchema, QueryConfig, QueryProcessor};
//!
//! let schema = EntitySchema::from_entity::<customer::Entity>();
//! let processor = QueryProcessor::new(QueryConfig::default())?;
//!
//! // ?name=Ann&age_lt=30&_number=0&_size=20
//! let (filter, page) = processor.process(&schema, params)?;
//! let rows = page
//!     .apply(filter.apply(customer::Entity::find()), &schema)
//!     .all(&db)
//!     .await?;
//! ```

pub mod config;
pub mod errors;
pub mod filtering;
pub mod processor;
pub mod schema;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::{BetweenBehavior, OperatorTokens, QueryConfig, UnknownOperatorPolicy};
pub use errors::{ConfigError, QueryError};
pub use filtering::{FieldFilter, Filter, FilterValue, Operator, PageRequest};
pub use processor::{PreProcess, QueryParams, QueryProcessor};
pub use schema::{EntitySchema, FieldType};
