use sea_orm::{
    Condition, JoinType, QueryFilter, QuerySelect,
    sea_query::{Alias, Expr, SimpleExpr},
};

use crate::config::{BetweenBehavior, QueryConfig, UnknownOperatorPolicy};
use crate::errors::QueryError;
use crate::filtering::operator::{DecodedKey, Operator, decode_key};
use crate::filtering::value::{FilterValue, coerce};
use crate::schema::{EntitySchema, RelationSchema};

/// One parsed parameter: a typed comparison against one column.
///
/// Only [`parse_filters`] builds these, so the value count always matches
/// the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// Raw parameter key
    pub(crate) key: String,
    /// Relation joined to reach the column, `None` for root columns
    pub(crate) relation: Option<String>,
    /// Table or join alias qualifying the column
    pub(crate) table: String,
    pub(crate) column: String,
    pub(crate) operator: Operator,
    /// One value, except `In` (one or more) and `Between` (exactly two)
    pub(crate) values: Vec<FilterValue>,
}

impl FieldFilter {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn values(&self) -> &[FilterValue] {
        &self.values
    }

    /// Sea-query predicate for this filter
    #[must_use]
    pub fn to_expr(&self) -> SimpleExpr {
        let column = Expr::col((Alias::new(&self.table), Alias::new(&self.column)));
        let value = |value: &FilterValue| sea_orm::Value::from(value.clone());
        match (self.operator, self.values.as_slice()) {
            (Operator::In, values) if !values.is_empty() => column.is_in(values.iter().map(value)),
            (Operator::Between, [low, high]) => column.between(value(low), value(high)),
            (Operator::Equal, [single]) => column.eq(value(single)),
            (Operator::LessThan, [single]) => column.lt(value(single)),
            (Operator::LessEqual, [single]) => column.lte(value(single)),
            (Operator::GreaterThan, [single]) => column.gt(value(single)),
            (Operator::GreaterEqual, [single]) => column.gte(value(single)),
            // Wrong arity cannot come out of parse_filters; match nothing
            _ => Expr::value(false),
        }
    }
}

/// Parse filter parameters into typed field filters, in iteration order.
///
/// Unknown fields, unparsable values and ordering operators on unordered
/// fields fail the whole parse. A `between` key either stops parsing (it and
/// every later key are dropped) or becomes a range, depending on
/// [`BetweenBehavior`].
///
/// # Errors
///
/// The first [`QueryError`] hit; no partial result is returned.
pub fn parse_filters<K, V>(
    schema: &EntitySchema,
    config: &QueryConfig,
    params: &[(K, V)],
) -> Result<Vec<FieldFilter>, QueryError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut filters = Vec::with_capacity(params.len());

    for (index, (key, raw)) in params.iter().enumerate() {
        let (key, raw) = (key.as_ref(), raw.as_ref());

        let (path, operator) = match decode_key(key, config) {
            // `check_in` is a field, not `check` with the `in` operator
            DecodedKey::Known { path, .. }
                if schema.resolve(key, path).is_err() && schema.resolve(key, key).is_ok() =>
            {
                (key, Operator::Equal)
            }
            DecodedKey::Known { path, operator } => (path, operator),
            // The suffix may belong to the field name itself (`first_name`)
            DecodedKey::Unrecognized { key: path, .. } if schema.resolve(key, path).is_ok() => {
                (path, Operator::Equal)
            }
            DecodedKey::Unrecognized { token, .. } => match config.unknown_operator() {
                UnknownOperatorPolicy::Reject => {
                    return Err(QueryError::UnknownOperator {
                        key: key.to_string(),
                        token: token.to_string(),
                    });
                }
                UnknownOperatorPolicy::Ignore => {
                    // Only a real field with an unknown suffix is skipped
                    if let Some((head, _)) = key.rsplit_once(config.separator()) {
                        schema.resolve(key, head)?;
                    }
                    tracing::warn!(parameter = %key, token = %token, "Ignoring unknown filter operator");
                    continue;
                }
            },
        };

        let resolved = schema.resolve(key, path)?;

        if operator == Operator::Between && config.between() == BetweenBehavior::Truncate {
            tracing::warn!(
                parameter = %key,
                dropped = params.len() - index,
                "Between operator stops filter parsing"
            );
            break;
        }

        let field = path.rsplit('.').next().unwrap_or(path);

        let tokens: Vec<&str> = if operator.is_multi_valued() {
            raw.split(config.multi_value_separator()).collect()
        } else {
            vec![raw]
        };
        if operator == Operator::Between && tokens.len() != 2 {
            return Err(QueryError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
                expected: format!("range 'low{}high'", config.multi_value_separator()),
            });
        }

        let values = tokens
            .into_iter()
            .map(|token| coerce(key, field, resolved.field_type, token, config))
            .collect::<Result<Vec<_>, _>>()?;

        if operator.is_ordering()
            && let Some(unordered) = values.iter().find(|value| !value.is_ordered())
        {
            return Err(QueryError::UnsupportedOperator {
                key: key.to_string(),
                operator: operator.name(),
                field_type: unordered.type_name().to_string(),
            });
        }

        tracing::debug!(
            parameter = %key,
            operator = operator.name(),
            values = values.len(),
            "Parsed filter parameter"
        );

        filters.push(FieldFilter {
            key: key.to_string(),
            relation: resolved.relation.map(str::to_string),
            table: resolved.table.to_string(),
            column: resolved.column.to_string(),
            operator,
            values,
        });
    }

    Ok(filters)
}

/// Parse filter parameters and AND them into a [`Filter`].
///
/// # Errors
///
/// See [`parse_filters`].
pub fn build_filter<K, V>(
    schema: &EntitySchema,
    config: &QueryConfig,
    params: &[(K, V)],
) -> Result<Filter, QueryError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let filters = parse_filters(schema, config, params)?;
    Ok(Filter::from_field_filters(schema, &filters))
}

#[derive(Debug, Clone)]
struct Join {
    alias: String,
    relation: RelationSchema,
}

/// Conjunction of predicates plus the joins they need.
///
/// An empty filter matches every row.
#[derive(Debug, Clone)]
pub struct Filter {
    condition: Condition,
    joins: Vec<Join>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            condition: Condition::all(),
            joins: Vec::new(),
        }
    }
}

impl Filter {
    /// Filter that matches everything
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// AND every field filter together, joining each relation once.
    #[must_use]
    pub fn from_field_filters(schema: &EntitySchema, filters: &[FieldFilter]) -> Self {
        let mut filter = Self::all();
        for field_filter in filters {
            if let Some(relation) = &field_filter.relation {
                filter.add_join(schema, relation);
            }
            filter.condition = filter.condition.add(field_filter.to_expr());
        }
        filter
    }

    fn add_join(&mut self, schema: &EntitySchema, relation: &str) {
        if self.joins.iter().any(|join| join.alias == relation) {
            return;
        }
        if let Some(relation_schema) = schema.relation_schema(relation) {
            self.joins.push(Join {
                alias: relation.to_string(),
                relation: relation_schema.clone(),
            });
        }
    }

    #[must_use]
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Aliases of the relations this filter joins, in join order
    pub fn joined_relations(&self) -> impl Iterator<Item = &str> {
        self.joins.iter().map(|join| join.alias.as_str())
    }

    /// Whether the filter matches everything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.condition.is_empty()
    }

    /// AND another filter into this one
    #[must_use]
    pub fn and(mut self, other: Self) -> Self {
        self.condition = self.condition.add(other.condition);
        for join in other.joins {
            if !self.joins.iter().any(|existing| existing.alias == join.alias) {
                self.joins.push(join);
            }
        }
        self
    }

    /// Add the joins and the condition to a Sea-ORM query
    #[must_use]
    pub fn apply<Q>(&self, query: Q) -> Q
    where
        Q: QueryFilter + QuerySelect,
    {
        let query = self.joins.iter().fold(query, |query, join| {
            query.join_as(JoinType::InnerJoin, join.relation.def(), Alias::new(&join.alias))
        });
        query.filter(self.condition.clone())
    }
}
