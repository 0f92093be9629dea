//! Typed filter values and the string coercer.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::Value;
use std::str::FromStr;
use uuid::Uuid;

use crate::config::QueryConfig;
use crate::errors::QueryError;
use crate::schema::FieldType;

/// A raw parameter value converted to its field's native type.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float(f64),
    Decimal(Decimal),
    /// Name of an enumeration variant
    Enum(String),
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl FilterValue {
    /// Whether the value supports ordering comparisons
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        matches!(
            self,
            Self::Int32(_)
                | Self::Int64(_)
                | Self::Float(_)
                | Self::Decimal(_)
                | Self::Date(_)
                | Self::DateTime(_)
        )
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int32(_) => "32-bit integer",
            Self::Int64(_) => "64-bit integer",
            Self::Float(_) => "floating point number",
            Self::Decimal(_) => "decimal",
            Self::Enum(_) => "enumeration",
            Self::Text(_) => "text",
            Self::Uuid(_) => "UUID",
            Self::Date(_) => "date",
            Self::DateTime(_) => "timestamp",
        }
    }
}

impl From<FilterValue> for Value {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::Bool(v) => v.into(),
            FilterValue::Int32(v) => v.into(),
            FilterValue::Int64(v) => v.into(),
            FilterValue::Float(v) => v.into(),
            FilterValue::Decimal(v) => v.into(),
            FilterValue::Enum(v) | FilterValue::Text(v) => v.into(),
            FilterValue::Uuid(v) => v.into(),
            FilterValue::Date(v) => v.into(),
            FilterValue::DateTime(v) => v.into(),
        }
    }
}

/// Convert `raw` to the type declared for `field`.
///
/// Fields whose name starts with the configured boolean prefix (`isActive`)
/// are booleans regardless of their declared type, and only the exact string
/// `"true"` is true: `"TRUE"` and `"1"` are false, never an error. Fields
/// declared boolean without the prefix accept exactly `"true"` or `"false"`.
///
/// # Errors
///
/// [`QueryError::InvalidValue`] when `raw` does not parse as the declared
/// type or names no variant of an enumeration.
pub fn coerce(
    key: &str,
    field: &str,
    field_type: &FieldType,
    raw: &str,
    config: &QueryConfig,
) -> Result<FilterValue, QueryError> {
    if config
        .boolean_prefix()
        .is_some_and(|prefix| field.starts_with(prefix))
    {
        return Ok(FilterValue::Bool(raw == "true"));
    }

    let invalid = || QueryError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        expected: field_type.describe().to_string(),
    };

    let value = match field_type {
        FieldType::Bool => match raw {
            "true" => FilterValue::Bool(true),
            "false" => FilterValue::Bool(false),
            _ => return Err(invalid()),
        },
        FieldType::Enum(variants) => {
            if !variants.iter().any(|variant| variant == raw) {
                return Err(invalid());
            }
            FilterValue::Enum(raw.to_string())
        }
        FieldType::Int64 => FilterValue::Int64(raw.parse().map_err(|_| invalid())?),
        FieldType::Int32 => FilterValue::Int32(raw.parse().map_err(|_| invalid())?),
        FieldType::Float => FilterValue::Float(raw.parse().map_err(|_| invalid())?),
        FieldType::Decimal => FilterValue::Decimal(
            Decimal::from_str(raw)
                .or_else(|_| Decimal::from_scientific(raw))
                .map_err(|_| invalid())?,
        ),
        FieldType::Uuid => FilterValue::Uuid(Uuid::parse_str(raw).map_err(|_| invalid())?),
        FieldType::Date => FilterValue::Date(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?,
        ),
        FieldType::DateTime => FilterValue::DateTime(
            DateTime::parse_from_rfc3339(raw)
                .map_err(|_| invalid())?
                .with_timezone(&Utc),
        ),
        FieldType::Text => FilterValue::Text(raw.to_string()),
    };
    Ok(value)
}
