//! Operators and the key decoder.
//!
//! A parameter key is `field`, `relation.field`, or either of those followed
//! by the configured separator and an operator token (`age_lt`,
//! `department.name_in`).

use crate::config::QueryConfig;

/// Comparison operators a parameter key can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equality (=), the default when a key carries no suffix
    Equal,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterEqual,
    /// Set membership (IN)
    In,
    /// Inclusive range (BETWEEN)
    Between,
}

impl Operator {
    pub const ALL: [Self; 7] = [
        Self::Equal,
        Self::LessThan,
        Self::LessEqual,
        Self::GreaterThan,
        Self::GreaterEqual,
        Self::In,
        Self::Between,
    ];

    /// Stable name used in configuration and error messages
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::LessThan => "less_than",
            Self::LessEqual => "less_equal",
            Self::GreaterThan => "greater_than",
            Self::GreaterEqual => "greater_equal",
            Self::In => "in",
            Self::Between => "between",
        }
    }

    /// Operators that only make sense on ordered (numeric or temporal) values
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessEqual | Self::GreaterThan | Self::GreaterEqual | Self::Between
        )
    }

    /// Operators that take several values split by the multi-value separator
    #[must_use]
    pub const fn is_multi_valued(self) -> bool {
        matches!(self, Self::In | Self::Between)
    }
}

/// Result of splitting a key into field path and operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedKey<'a> {
    /// The key names a field path and a known operator
    Known { path: &'a str, operator: Operator },
    /// The key ends in a suffix that matches no operator token.
    ///
    /// The suffix may still be part of the field name (`first_name`), so the
    /// caller decides whether the whole key resolves as a plain field.
    Unrecognized { key: &'a str, token: &'a str },
}

/// Split `key` on the last separator.
///
/// - `age` -> (`age`, Equal)
/// - `age_lt` -> (`age`, `LessThan`)
/// - `department.name_in` -> (`department.name`, In)
/// - `first_name` -> Unrecognized (`name` is not an operator token)
#[must_use]
pub fn decode_key<'a>(key: &'a str, config: &QueryConfig) -> DecodedKey<'a> {
    let Some((path, token)) = key.rsplit_once(config.separator()) else {
        return DecodedKey::Known {
            path: key,
            operator: Operator::Equal,
        };
    };

    match config.operators().lookup(token) {
        Some(operator) => DecodedKey::Known { path, operator },
        None => DecodedKey::Unrecognized { key, token },
    }
}
