#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use paramquery::{EntitySchema, FieldType, QueryConfig, QueryProcessor};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue::Set, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryTrait, RelationTrait, Schema,
};
use tower::ServiceExt;
use uuid::Uuid;

pub mod customer;
pub mod department;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();

    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    // Single connection so the in-memory database outlives each query
    opt.max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .sqlx_logging(false);
    let db = Database::connect(opt).await?;

    let schema = Schema::new(db.get_database_backend());
    db.execute(
        db.get_database_backend()
            .build(&schema.create_table_from_entity(department::Entity)),
    )
    .await?;
    db.execute(
        db.get_database_backend()
            .build(&schema.create_table_from_entity(customer::Entity)),
    )
    .await?;

    seed(&db).await?;
    Ok(db)
}

fn department(id: i32, name: &str, budget: i64) -> department::ActiveModel {
    department::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        budget: Set(budget),
    }
}

#[allow(clippy::too_many_arguments)]
fn customer(
    id: i32,
    name: &str,
    age: i32,
    visits: i64,
    balance: Decimal,
    is_active: bool,
    joined_on: (i32, u32, u32),
    status: &str,
    department_id: i32,
) -> customer::ActiveModel {
    let (year, month, day) = joined_on;
    customer::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        age: Set(age),
        visits: Set(visits),
        balance: Set(balance),
        is_active: Set(is_active),
        external_ref: Set(Uuid::from_u128(u128::from(id.unsigned_abs()))),
        joined_on: Set(NaiveDate::from_ymd_opt(year, month, day).unwrap()),
        status: Set(status.to_string()),
        department_id: Set(department_id),
    }
}

/// Two departments and five customers:
///
/// | id | name | age | visits | active | joined     | status   | department  |
/// |----|------|-----|--------|--------|------------|----------|-------------|
/// | 1  | Ann  | 25  | 3      | yes    | 2024-01-15 | Active   | Sales       |
/// | 2  | Bob  | 35  | 12     | no     | 2023-06-01 | Archived | Engineering |
/// | 3  | Cara | 30  | 7      | yes    | 2024-03-10 | Active   | Engineering |
/// | 4  | Dan  | 18  | 0      | yes    | 2022-12-31 | Active   | Sales       |
/// | 5  | Eve  | 42  | 20     | no     | 2021-05-05 | Archived | Sales       |
async fn seed(db: &DatabaseConnection) -> Result<(), DbErr> {
    department::Entity::insert_many([
        department(1, "Sales", 5_000),
        department(2, "Engineering", 20_000),
    ])
    .exec(db)
    .await?;

    customer::Entity::insert_many([
        customer(1, "Ann", 25, 3, Decimal::new(1050, 2), true, (2024, 1, 15), "Active", 1),
        customer(2, "Bob", 35, 12, Decimal::new(250, 0), false, (2023, 6, 1), "Archived", 2),
        customer(3, "Cara", 30, 7, Decimal::new(9999, 2), true, (2024, 3, 10), "Active", 2),
        customer(4, "Dan", 18, 0, Decimal::ZERO, true, (2022, 12, 31), "Active", 1),
        customer(5, "Eve", 42, 20, Decimal::new(1000, 0), false, (2021, 5, 5), "Archived", 1),
    ])
    .exec(db)
    .await?;
    Ok(())
}

pub fn customer_schema() -> EntitySchema {
    EntitySchema::from_entity::<customer::Entity>()
        .field("status", FieldType::enumeration(["Active", "Archived"]))
        .relation(
            "department",
            || customer::Relation::Department.def(),
            Arc::new(EntitySchema::from_entity::<department::Entity>()),
        )
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub schema: Arc<EntitySchema>,
    pub processor: QueryProcessor,
}

fn internal_error(err: DbErr) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}

/// Lists matching customer ids, with a `Content-Range` header
async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, Response> {
    let (filter, page) = state
        .processor
        .process(&state.schema, params)
        .map_err(IntoResponse::into_response)?;

    let query = filter.apply(customer::Entity::find());
    let total = query.clone().count(&state.db).await.map_err(internal_error)?;
    let rows = page
        .apply(query, &state.schema)
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    Ok((page.content_range(total, "customers"), Json(ids)))
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    setup_test_app_with(db, QueryProcessor::default())
}

pub fn setup_test_app_with(db: DatabaseConnection, processor: QueryProcessor) -> Router {
    let state = AppState {
        db,
        schema: Arc::new(customer_schema()),
        processor,
    };
    Router::new()
        .route("/customers", get(list_customers))
        .with_state(state)
}

pub fn processor_with(config: QueryConfig) -> QueryProcessor {
    QueryProcessor::new(config).unwrap()
}

/// SQL the filter and page would run, for asserting on query shape
pub fn customer_sql(processor: &QueryProcessor, params: &[(&str, &str)]) -> String {
    let schema = customer_schema();
    let (filter, page) = processor.process(&schema, params.iter().copied()).unwrap();
    page.apply(filter.apply(customer::Entity::find()), &schema)
        .build(sea_orm::DatabaseBackend::Sqlite)
        .to_string()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl TestResponse {
    pub fn ids(&self) -> Vec<i64> {
        self.body
            .as_array()
            .unwrap_or_else(|| panic!("expected id list, got {}", self.body))
            .iter()
            .map(|id| id.as_i64().unwrap())
            .collect()
    }

    pub fn content_range(&self) -> &str {
        self.headers
            .get("Content-Range")
            .unwrap()
            .to_str()
            .unwrap()
    }
}

pub async fn get_uri(app: &Router, uri: &str) -> TestResponse {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
    };

    TestResponse {
        status,
        headers,
        body,
    }
}
