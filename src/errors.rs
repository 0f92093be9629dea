//! # Errors for Query Parameter Parsing
//!
//! Every failure raised while turning request parameters into a filter is a
//! client mistake: an unknown field, a value that does not parse as the
//! field's type, an operator that does not apply to the field. All of them
//! are reported as `400 Bad Request` and abort the whole parse; no partial
//! filter is ever returned.
//!
//! ```rust,ignore
//! async fn list(Query(params): Query<Vec<(String, String)>>) -> Result<Json<Vec<Customer>>, QueryError> {
//!     let (filter, page) = processor.process(&schema, params)?;
//!     // ...
//! }
//! ```
//!
//! Configuration mistakes (ambiguous operator tokens) are a separate
//! [`ConfigError`], raised once at startup.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// A query parameter could not be turned into a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The field is not declared on the resolved entity
    UnknownField {
        /// Raw parameter key
        key: String,
        /// Field name that failed to resolve
        field: String,
    },

    /// The relation in a dotted key is not declared on the root entity
    UnknownRelation {
        /// Raw parameter key
        key: String,
        /// Relation name that failed to resolve
        relation: String,
    },

    /// The key walks more than one relation (`a.b.c`)
    NestedPath {
        /// Raw parameter key
        key: String,
    },

    /// The key carries an operator suffix that no operator token matches
    UnknownOperator {
        /// Raw parameter key
        key: String,
        /// The unmatched suffix
        token: String,
    },

    /// The raw value does not parse as the field's declared type
    InvalidValue {
        /// Raw parameter key
        key: String,
        /// Offending value
        value: String,
        /// What the field expected
        expected: String,
    },

    /// The operator cannot be applied to the field's type
    UnsupportedOperator {
        /// Raw parameter key
        key: String,
        /// Operator name
        operator: &'static str,
        /// Declared type of the field
        field_type: String,
    },

    /// A page number or page size parameter is not a valid count
    InvalidPagination {
        /// Reserved key that held the value
        key: String,
        /// Offending value
        value: String,
    },
}

impl QueryError {
    /// The parameter key that caused the failure
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::UnknownField { key, .. }
            | Self::UnknownRelation { key, .. }
            | Self::NestedPath { key }
            | Self::UnknownOperator { key, .. }
            | Self::InvalidValue { key, .. }
            | Self::UnsupportedOperator { key, .. }
            | Self::InvalidPagination { key, .. } => key,
        }
    }

    /// HTTP status reported to the client. Always a bad request.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { key, field } => {
                write!(f, "Invalid parameter '{key}': unknown field '{field}'")
            }
            Self::UnknownRelation { key, relation } => {
                write!(f, "Invalid parameter '{key}': unknown relation '{relation}'")
            }
            Self::NestedPath { key } => write!(
                f,
                "Invalid parameter '{key}': only one level of relation is supported"
            ),
            Self::UnknownOperator { key, token } => {
                write!(f, "Invalid parameter '{key}': unknown operator '{token}'")
            }
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(
                f,
                "Invalid parameter '{key}': '{value}' is not a valid {expected}"
            ),
            Self::UnsupportedOperator {
                key,
                operator,
                field_type,
            } => write!(
                f,
                "Invalid parameter '{key}': operator '{operator}' does not apply to {field_type} fields"
            ),
            Self::InvalidPagination { key, value } => {
                write!(f, "Invalid pagination parameter '{key}': '{value}'")
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// Error body sent to clients
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    parameter: String,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        tracing::debug!(
            parameter = %self.key(),
            error = %self,
            "Rejected query parameter"
        );

        let body = ErrorResponse {
            error: self.to_string(),
            parameter: self.key().to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// The query configuration is ambiguous and cannot decode keys reliably.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A token is empty
    EmptyToken {
        /// Name of the configuration entry
        name: &'static str,
    },

    /// Two entries share the same token
    DuplicateToken {
        /// The shared token
        token: String,
        /// First entry using it
        first: &'static str,
        /// Second entry using it
        second: &'static str,
    },

    /// An operator token contains the field separator and could never be decoded
    TokenContainsSeparator {
        /// Name of the operator entry
        name: &'static str,
        /// The offending token
        token: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyToken { name } => write!(f, "'{name}' must not be empty"),
            Self::DuplicateToken {
                token,
                first,
                second,
            } => write!(f, "'{first}' and '{second}' both use the token '{token}'"),
            Self::TokenContainsSeparator { name, token } => write!(
                f,
                "operator '{name}' token '{token}' contains the field separator"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
