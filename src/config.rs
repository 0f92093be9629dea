//! Tokens and switches that control how query parameter keys are decoded.
//!
//! A [`QueryConfig`] is built once (literal, builder or deserialized from the
//! host application's settings) and then only read. Every construction path
//! goes through [`QueryConfig::validate`], which rejects configurations whose
//! tokens would make key decoding ambiguous.
//!
//! ```rust,ignore
//! let config = QueryConfig::builder()
//!     .multi_value_separator(";")
//!     .operator_token(Operator::In, "any")
//!     .build()?;
//! ```

use serde::Deserialize;
use std::collections::HashMap;

use crate::errors::ConfigError;
use crate::filtering::operator::Operator;

/// What to do with a key that carries the `between` operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetweenBehavior {
    /// Stop parsing: the between key and every key after it emit nothing.
    #[default]
    Truncate,
    /// Two values separated by the multi-value separator form an inclusive range.
    Range,
}

/// What to do with a key whose operator suffix matches no token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownOperatorPolicy {
    /// Fail the whole parse with a bad request.
    #[default]
    Reject,
    /// Skip the parameter and keep going.
    Ignore,
}

/// One textual token per operator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OperatorTokens {
    pub equal: String,
    pub less_than: String,
    pub less_equal: String,
    pub greater_than: String,
    pub greater_equal: String,
    #[serde(rename = "in")]
    pub in_list: String,
    pub between: String,
}

impl Default for OperatorTokens {
    fn default() -> Self {
        Self {
            equal: "=".to_string(),
            less_than: "lt".to_string(),
            less_equal: "le".to_string(),
            greater_than: "gt".to_string(),
            greater_equal: "ge".to_string(),
            in_list: "in".to_string(),
            between: "bt".to_string(),
        }
    }
}

impl OperatorTokens {
    /// Token configured for `operator`
    #[must_use]
    pub fn token(&self, operator: Operator) -> &str {
        match operator {
            Operator::Equal => &self.equal,
            Operator::LessThan => &self.less_than,
            Operator::LessEqual => &self.less_equal,
            Operator::GreaterThan => &self.greater_than,
            Operator::GreaterEqual => &self.greater_equal,
            Operator::In => &self.in_list,
            Operator::Between => &self.between,
        }
    }

    fn token_mut(&mut self, operator: Operator) -> &mut String {
        match operator {
            Operator::Equal => &mut self.equal,
            Operator::LessThan => &mut self.less_than,
            Operator::LessEqual => &mut self.less_equal,
            Operator::GreaterThan => &mut self.greater_than,
            Operator::GreaterEqual => &mut self.greater_equal,
            Operator::In => &mut self.in_list,
            Operator::Between => &mut self.between,
        }
    }

    /// Operator whose token is exactly `token`
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<Operator> {
        Operator::ALL
            .into_iter()
            .find(|operator| self.token(*operator) == token)
    }
}

/// Decoding configuration shared by every request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    separator: String,
    multi_value_separator: String,
    operators: OperatorTokens,
    page_size_param: String,
    page_number_param: String,
    sort_param: String,
    boolean_prefix: Option<String>,
    between: BetweenBehavior,
    unknown_operator: UnknownOperatorPolicy,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            separator: "_".to_string(),
            multi_value_separator: ",".to_string(),
            operators: OperatorTokens::default(),
            page_size_param: "_size".to_string(),
            page_number_param: "_number".to_string(),
            sort_param: "_sort".to_string(),
            boolean_prefix: Some("is".to_string()),
            between: BetweenBehavior::default(),
            unknown_operator: UnknownOperatorPolicy::default(),
        }
    }
}

impl QueryConfig {
    #[must_use]
    pub fn builder() -> QueryConfigBuilder {
        QueryConfigBuilder::default()
    }

    /// Separator between field name and operator suffix (`age_lt`)
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Separator between the values of `in` and `between` (`1,2,3`)
    #[must_use]
    pub fn multi_value_separator(&self) -> &str {
        &self.multi_value_separator
    }

    #[must_use]
    pub fn operators(&self) -> &OperatorTokens {
        &self.operators
    }

    #[must_use]
    pub fn page_size_param(&self) -> &str {
        &self.page_size_param
    }

    #[must_use]
    pub fn page_number_param(&self) -> &str {
        &self.page_number_param
    }

    /// Reserved and stripped, never read: results always sort by `id`.
    #[must_use]
    pub fn sort_param(&self) -> &str {
        &self.sort_param
    }

    /// Field name prefix that forces boolean coercion (`isActive`)
    #[must_use]
    pub fn boolean_prefix(&self) -> Option<&str> {
        self.boolean_prefix.as_deref()
    }

    #[must_use]
    pub fn between(&self) -> BetweenBehavior {
        self.between
    }

    #[must_use]
    pub fn unknown_operator(&self) -> UnknownOperatorPolicy {
        self.unknown_operator
    }

    /// Whether `key` is one of the three reserved pagination keys
    #[must_use]
    pub fn is_pagination_key(&self, key: &str) -> bool {
        key == self.page_size_param || key == self.page_number_param || key == self.sort_param
    }

    /// Check that every token can be told apart from every other.
    ///
    /// Operator tokens, the field separator and the multi-value separator
    /// must be non-empty and mutually distinct, and no operator token may
    /// contain the field separator. The three pagination keys must be
    /// non-empty and distinct from each other.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut decoding: Vec<(&'static str, &str)> = vec![
            ("separator", self.separator.as_str()),
            ("multi_value_separator", self.multi_value_separator.as_str()),
        ];
        for operator in Operator::ALL {
            decoding.push((operator.name(), self.operators.token(operator)));
        }
        check_distinct(&decoding)?;

        for operator in Operator::ALL {
            let token = self.operators.token(operator);
            if token.contains(self.separator.as_str()) {
                return Err(ConfigError::TokenContainsSeparator {
                    name: operator.name(),
                    token: token.to_string(),
                });
            }
        }

        check_distinct(&[
            ("page_size_param", self.page_size_param.as_str()),
            ("page_number_param", self.page_number_param.as_str()),
            ("sort_param", self.sort_param.as_str()),
        ])
    }
}

fn check_distinct(entries: &[(&'static str, &str)]) -> Result<(), ConfigError> {
    let mut seen: HashMap<&str, &'static str> = HashMap::new();
    for &(name, token) in entries {
        if token.is_empty() {
            return Err(ConfigError::EmptyToken { name });
        }
        if let Some(first) = seen.insert(token, name) {
            return Err(ConfigError::DuplicateToken {
                token: token.to_string(),
                first,
                second: name,
            });
        }
    }
    Ok(())
}

/// Builder for [`QueryConfig`], starting from the defaults.
#[derive(Debug, Clone, Default)]
pub struct QueryConfigBuilder {
    config: QueryConfig,
}

impl QueryConfigBuilder {
    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.config.separator = separator.into();
        self
    }

    #[must_use]
    pub fn multi_value_separator(mut self, separator: impl Into<String>) -> Self {
        self.config.multi_value_separator = separator.into();
        self
    }

    #[must_use]
    pub fn operator_token(mut self, operator: Operator, token: impl Into<String>) -> Self {
        *self.config.operators.token_mut(operator) = token.into();
        self
    }

    #[must_use]
    pub fn page_size_param(mut self, key: impl Into<String>) -> Self {
        self.config.page_size_param = key.into();
        self
    }

    #[must_use]
    pub fn page_number_param(mut self, key: impl Into<String>) -> Self {
        self.config.page_number_param = key.into();
        self
    }

    #[must_use]
    pub fn sort_param(mut self, key: impl Into<String>) -> Self {
        self.config.sort_param = key.into();
        self
    }

    /// `None` disables the prefix convention entirely
    #[must_use]
    pub fn boolean_prefix(mut self, prefix: Option<&str>) -> Self {
        self.config.boolean_prefix = prefix.map(str::to_string);
        self
    }

    #[must_use]
    pub fn between(mut self, behavior: BetweenBehavior) -> Self {
        self.config.between = behavior;
        self
    }

    #[must_use]
    pub fn unknown_operator(mut self, policy: UnknownOperatorPolicy) -> Self {
        self.config.unknown_operator = policy;
        self
    }

    /// # Errors
    ///
    /// Fails when the tokens are ambiguous, see [`QueryConfig::validate`].
    pub fn build(self) -> Result<QueryConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
