use sea_orm::RelationTrait;
use std::sync::Arc;

use crate::schema::{EntitySchema, FieldType};

pub mod customer {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "customer")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub age: i32,
        pub visits: i64,
        pub balance: Decimal,
        pub is_active: bool,
        pub external_ref: Uuid,
        pub joined_on: Date,
        pub status: String,
        pub department_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::department::Entity",
            from = "Column::DepartmentId",
            to = "super::department::Column::Id"
        )]
        Department,
    }

    impl Related<super::department::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Department.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod department {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "department")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub budget: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Customer schema with an enumerated `status` and the `department` relation
pub fn customer_schema() -> EntitySchema {
    EntitySchema::from_entity::<customer::Entity>()
        .field("status", FieldType::enumeration(["Active", "Archived"]))
        .relation(
            "department",
            || customer::Relation::Department.def(),
            Arc::new(EntitySchema::from_entity::<department::Entity>()),
        )
}
