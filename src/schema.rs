//! Field and relation registry for an entity.
//!
//! An [`EntitySchema`] is built once at startup, either by introspecting a
//! Sea-ORM entity's column definitions or by declaring fields by hand, and
//! answers the one question key parsing needs: what is the declared type of
//! `field` or `relation.field`, and which column does it live in.
//!
//! ```rust,ignore
//! let department = Arc::new(EntitySchema::from_entity::<department::Entity>());
//! let customer = EntitySchema::from_entity::<customer::Entity>()
//!     .field("status", FieldType::enumeration(["Active", "Archived"]))
//!     .relation("department", || customer::Relation::Department.def(), department);
//! ```

use sea_orm::{
    ColumnTrait, ColumnType, EntityTrait, IdenStatic, Iterable, RelationDef,
    sea_query::{Alias, Expr},
};
use std::{collections::HashMap, fmt, sync::Arc};

use crate::errors::QueryError;

/// Declared type of a filterable field; drives value coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int32,
    Int64,
    Float,
    Decimal,
    /// Enumeration with its accepted variant names
    Enum(Vec<String>),
    Text,
    Uuid,
    Date,
    DateTime,
}

impl FieldType {
    /// Enumeration type from variant names
    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(variants.into_iter().map(Into::into).collect())
    }

    /// Map a Sea-ORM column type to a field type.
    ///
    /// Types with no dedicated coercion (JSON, binary, time of day, ...)
    /// are treated as text and compared with the raw string.
    #[must_use]
    pub fn from_column_type(column_type: &ColumnType) -> Self {
        match column_type {
            ColumnType::Boolean => Self::Bool,
            ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::TinyUnsigned
            | ColumnType::SmallUnsigned => Self::Int32,
            ColumnType::BigInteger | ColumnType::Unsigned | ColumnType::BigUnsigned => Self::Int64,
            ColumnType::Float | ColumnType::Double => Self::Float,
            ColumnType::Decimal(_) | ColumnType::Money(_) => Self::Decimal,
            ColumnType::Uuid => Self::Uuid,
            ColumnType::Date => Self::Date,
            ColumnType::DateTime | ColumnType::Timestamp | ColumnType::TimestampWithTimeZone => {
                Self::DateTime
            }
            ColumnType::Enum { variants, .. } => Self::Enum(
                variants
                    .iter()
                    .map(|variant| {
                        let mut name = String::new();
                        variant.unquoted(&mut name);
                        name
                    })
                    .collect(),
            ),
            _ => Self::Text,
        }
    }

    /// Whether values of this type support `<`, `<=`, `>`, `>=` and ranges
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        matches!(
            self,
            Self::Int32 | Self::Int64 | Self::Float | Self::Decimal | Self::Date | Self::DateTime
        )
    }

    /// Human readable name used in error messages
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Int32 => "32-bit integer",
            Self::Int64 => "64-bit integer",
            Self::Float => "floating point number",
            Self::Decimal => "decimal",
            Self::Enum(_) => "enumeration",
            Self::Text => "text",
            Self::Uuid => "UUID",
            Self::Date => "date (YYYY-MM-DD)",
            Self::DateTime => "RFC 3339 timestamp",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A relation one join away from the root entity.
#[derive(Debug, Clone)]
pub struct RelationSchema {
    def: fn() -> RelationDef,
    target: Arc<EntitySchema>,
}

impl RelationSchema {
    /// Sea-ORM relation used to join the target table
    #[must_use]
    pub fn def(&self) -> RelationDef {
        (self.def)()
    }

    #[must_use]
    pub fn target(&self) -> &EntitySchema {
        &self.target
    }
}

/// Filterable fields and joinable relations of one entity.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    table: String,
    fields: HashMap<String, FieldType>,
    relations: HashMap<String, RelationSchema>,
}

impl EntitySchema {
    /// Empty schema for `table`; add fields with [`field`](Self::field).
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: HashMap::new(),
            relations: HashMap::new(),
        }
    }

    /// Schema with one field per column of a Sea-ORM entity.
    #[must_use]
    pub fn from_entity<E: EntityTrait>() -> Self {
        let mut schema = Self::new(E::default().table_name());
        for column in E::Column::iter() {
            let field_type = FieldType::from_column_type(column.def().get_column_type());
            schema.fields.insert(column.as_str().to_string(), field_type);
        }
        schema
    }

    /// Declare or override a field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    /// Declare a relation reachable with `name.field` keys
    #[must_use]
    pub fn relation(
        mut self,
        name: impl Into<String>,
        def: fn() -> RelationDef,
        target: Arc<EntitySchema>,
    ) -> Self {
        self.relations
            .insert(name.into(), RelationSchema { def, target });
        self
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn field_type(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn relation_schema(&self, name: &str) -> Option<&RelationSchema> {
        self.relations.get(name)
    }

    /// Resolve a field path (`field` or `relation.field`) taken from `key`.
    ///
    /// # Errors
    ///
    /// - [`QueryError::NestedPath`] for paths with more than one dot
    /// - [`QueryError::UnknownRelation`] when the relation is not declared
    /// - [`QueryError::UnknownField`] when the field is not declared on the
    ///   entity the path lands on
    pub fn resolve<'s>(&'s self, key: &str, path: &str) -> Result<ResolvedPath<'s>, QueryError> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let second = segments.next();
        if segments.next().is_some() {
            return Err(QueryError::NestedPath {
                key: key.to_string(),
            });
        }

        let Some(field) = second else {
            let (column, field_type) = self.lookup_field(key, first)?;
            return Ok(ResolvedPath {
                relation: None,
                table: &self.table,
                column,
                field_type,
            });
        };

        let (relation, relation_schema) =
            self.relations
                .get_key_value(first)
                .ok_or_else(|| QueryError::UnknownRelation {
                    key: key.to_string(),
                    relation: first.to_string(),
                })?;
        let relation = relation.as_str();
        let (column, field_type) = relation_schema.target.lookup_field(key, field)?;

        // Joined columns are addressed through the relation name, which is
        // also the alias the join is registered under.
        Ok(ResolvedPath {
            relation: Some(relation),
            table: relation,
            column,
            field_type,
        })
    }

    fn lookup_field<'s>(
        &'s self,
        key: &str,
        field: &str,
    ) -> Result<(&'s str, &'s FieldType), QueryError> {
        self.fields
            .get_key_value(field)
            .map(|(name, field_type)| (name.as_str(), field_type))
            .ok_or_else(|| QueryError::UnknownField {
                key: key.to_string(),
                field: field.to_string(),
            })
    }
}

/// Where a field path points: column reference plus declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPath<'s> {
    /// Relation to join, `None` for root fields
    pub relation: Option<&'s str>,
    /// Table or join alias that qualifies the column
    pub table: &'s str,
    pub column: &'s str,
    pub field_type: &'s FieldType,
}

impl ResolvedPath<'_> {
    /// Qualified column expression (`"table"."column"`)
    #[must_use]
    pub fn column_expr(&self) -> Expr {
        Expr::col((Alias::new(self.table), Alias::new(self.column)))
    }
}
