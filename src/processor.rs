//! Request-level entry point tying the pieces together.
//!
//! ```rust,ignore
//! let processor = QueryProcessor::new(QueryConfig::default())?
//!     .with_pre_process(|params| params.push(("tenant_id".into(), "7".into())));
//!
//! async fn list(
//!     State(app): State<AppState>,
//!     Query(params): Query<Vec<(String, String)>>,
//! ) -> Result<Json<Vec<customer::Model>>, ApiError> {
//!     let (filter, page) = app.processor.process(&app.customer_schema, params)?;
//!     let query = page.apply(filter.apply(customer::Entity::find()), &app.customer_schema);
//!     Ok(Json(query.all(&app.db).await?))
//! }
//! ```

use std::{fmt, sync::Arc};

use crate::config::QueryConfig;
use crate::errors::{ConfigError, QueryError};
use crate::filtering::conditions::{Filter, build_filter};
use crate::filtering::pagination::{PageRequest, extract_page_request};
use crate::schema::EntitySchema;

/// Hook run on every request's parameters before parsing.
pub type PreProcess = Arc<dyn Fn(&mut Vec<(String, String)>) + Send + Sync>;

/// Request parameters split into pagination and filter entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub pagination: Vec<(String, String)>,
    pub filters: Vec<(String, String)>,
}

/// Turns request parameters into a [`Filter`] and a [`PageRequest`].
///
/// Holds an immutable configuration, so one processor can serve concurrent
/// requests. Caller-owned parameters are never mutated.
#[derive(Clone)]
pub struct QueryProcessor {
    config: Arc<QueryConfig>,
    pre_process: Option<PreProcess>,
}

impl fmt::Debug for QueryProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryProcessor")
            .field("config", &self.config)
            .field("pre_process", &self.pre_process.is_some())
            .finish()
    }
}

impl Default for QueryProcessor {
    fn default() -> Self {
        Self {
            config: Arc::new(QueryConfig::default()),
            pre_process: None,
        }
    }
}

impl QueryProcessor {
    /// # Errors
    ///
    /// Rejects ambiguous configurations, see [`QueryConfig::validate`].
    pub fn new(config: QueryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            pre_process: None,
        })
    }

    /// Run `hook` on a copy of every request's parameters before parsing,
    /// e.g. to inject a tenant filter.
    #[must_use]
    pub fn with_pre_process<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Vec<(String, String)>) + Send + Sync + 'static,
    {
        self.pre_process = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Run the pre-process hook, then split reserved pagination keys from
    /// filter keys. Order within each half is preserved.
    pub fn partition<I, K, V>(&self, params: I) -> QueryParams
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();

        if let Some(hook) = &self.pre_process {
            hook(&mut params);
        }

        let (pagination, filters) = params
            .into_iter()
            .partition(|(key, _)| self.config.is_pagination_key(key));
        QueryParams {
            pagination,
            filters,
        }
    }

    /// Filter for the non-pagination parameters.
    ///
    /// # Errors
    ///
    /// Any [`QueryError`] from parsing; the whole filter is abandoned.
    pub fn process_query<I, K, V>(&self, schema: &EntitySchema, params: I) -> Result<Filter, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = self.partition(params);
        build_filter(schema, &self.config, &params.filters)
    }

    /// Page request from the pagination parameters.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidPagination`] for malformed page number or size.
    pub fn process_pageable<I, K, V>(&self, params: I) -> Result<PageRequest, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = self.partition(params);
        extract_page_request(&self.config, &params.pagination)
    }

    /// Filter and page request from one pass over the parameters.
    ///
    /// # Errors
    ///
    /// The first [`QueryError`] from either half.
    pub fn process<I, K, V>(
        &self,
        schema: &EntitySchema,
        params: I,
    ) -> Result<(Filter, PageRequest), QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = self.partition(params);
        let page = extract_page_request(&self.config, &params.pagination)?;
        let filter = build_filter(schema, &self.config, &params.filters)?;
        Ok((filter, page))
    }
}
