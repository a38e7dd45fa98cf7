#![allow(dead_code)]

use chrono::{Duration, NaiveDateTime, Utc};
use reqwest::Client;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex, MutexGuard, Once, PoisonError,
};

static INIT: Once = Once::new();
static MIGRATIONS_RAN: AtomicBool = AtomicBool::new(false);
static CATEGORY_COUNTER: AtomicUsize = AtomicUsize::new(0);

// Tests share one database; the tables are truncated per test, so tests in
// one binary must not overlap. The guard lives inside TestApp.
static DB_LOCK: Mutex<()> = Mutex::new(());

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        // Rate limits off: tests hammer the API from one address
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        let config = blogicum::config::jwt::JwtConfig::from_env().unwrap();
        let _ = blogicum::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
    _db_guard: MutexGuard<'static, ()>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

pub async fn spawn_app() -> TestApp {
    init_env();

    let db_guard = DB_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    // Run migrations only once globally (using atomic bool for thread safety)
    if !MIGRATIONS_RAN.swap(true, Ordering::SeqCst) {
        blogicum::migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    // Clean data tables (reverse dependency order)
    cleanup_tables(&db).await;

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(blogicum::routes::create_routes())
        .layer(axum::middleware::from_fn(
            blogicum::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let addr_str = format!("http://{}", addr);
    let client = Client::new();

    TestApp {
        addr: addr_str,
        db,
        client,
        _db_guard: db_guard,
    }
}

async fn cleanup_tables(db: &DatabaseConnection) {
    let tables = ["comments", "posts", "locations", "categories", "users"];

    for table in tables {
        let sql = format!("TRUNCATE TABLE {} CASCADE", table);
        let _ = db
            .execute(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql,
            ))
            .await;
    }
}

/// Register a user and return (user_id, token).
pub async fn create_test_user(app: &TestApp, username_prefix: &str) -> (i32, String) {
    static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);
    let counter = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
    let unique_username = format!("{}_{}", username_prefix, counter);

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "username": unique_username,
            "email": format!("{}@test.com", unique_username),
            "password": "test_password_123"
        }))
        .send()
        .await
        .expect("Failed to register user");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.unwrap_or_else(|e| {
        panic!(
            "Failed to parse register response for user '{}': status={}, error={}",
            unique_username, status, e
        );
    });

    if !body["success"].as_bool().unwrap_or(false) {
        panic!(
            "Failed to register user '{}': status={}, body={}",
            unique_username, status, body
        );
    }

    let user_id = body["data"]["user_id"].as_i64().unwrap_or_else(|| {
        panic!(
            "Response missing user_id for user '{}': {:?}",
            unique_username, body
        )
    }) as i32;
    let token = body["data"]["token"]
        .as_str()
        .unwrap_or_else(|| {
            panic!(
                "Response missing token for user '{}': {:?}",
                unique_username, body
            )
        })
        .to_string();
    (user_id, token)
}

/// Make a user admin by directly updating the database.
pub async fn make_admin(db: &DatabaseConnection, user_id: i32) {
    db.execute(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "UPDATE users SET role = 'admin' WHERE id = $1",
        vec![user_id.into()],
    ))
    .await
    .expect("Failed to make user admin");
}

/// Create a category and return (id, slug).
pub async fn create_test_category(app: &TestApp, admin_token: &str) -> (i32, String) {
    let counter = CATEGORY_COUNTER.fetch_add(1, Ordering::SeqCst);
    let slug = format!("test-category-{}", counter);

    let resp = app
        .client
        .post(app.url("/categories"))
        .bearer_auth(admin_token)
        .json(&serde_json::json!({
            "title": format!("Test Category {}", counter),
            "description": "A test category",
            "slug": slug
        }))
        .send()
        .await
        .expect("Failed to create category");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse response");

    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create category: status={}, body={}", status, body);
    }

    let id = body["data"]["id"].as_i64().expect("Response missing id") as i32;
    let slug = body["data"]["slug"]
        .as_str()
        .expect("Response missing slug field")
        .to_string();
    (id, slug)
}

/// Create a location and return its id.
pub async fn create_test_location(app: &TestApp, admin_token: &str, name: &str) -> i32 {
    let resp = app
        .client
        .post(app.url("/locations"))
        .bearer_auth(admin_token)
        .json(&serde_json::json!({ "name": name }))
        .send()
        .await
        .expect("Failed to create location");

    let body: serde_json::Value = resp.json().await.expect("Failed to parse response");
    body["data"]["id"].as_i64().expect("Response missing id") as i32
}

/// Register a user, promote it to admin, and hand back a category.
pub async fn setup_admin_with_category(app: &TestApp) -> (i32, String, String) {
    let (user_id, token) = create_test_user(app, "admin").await;
    make_admin(&app.db, user_id).await;
    let (_category_id, slug) = create_test_category(app, &token).await;
    (user_id, token, slug)
}

/// Create a post via the API and return its id.
pub async fn create_test_post(
    app: &TestApp,
    token: &str,
    category_id: Option<i32>,
    pub_date: NaiveDateTime,
) -> i32 {
    let resp = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "title": "Test Post",
            "text": "Hello from the test suite",
            "pub_date": format_datetime(pub_date),
            "category_id": category_id
        }))
        .send()
        .await
        .expect("Failed to create post");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse post response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create post: status={}, body={}", status, body);
    }
    body["data"]["id"].as_i64().expect("Response missing id") as i32
}

pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

pub fn past_datetime() -> NaiveDateTime {
    Utc::now().naive_utc() - Duration::days(1)
}

pub fn future_datetime() -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::days(30)
}
