mod config;
mod error;
mod handlers;
mod middleware;
mod migration;
mod models;
mod response;
mod routes;
mod services;
mod utils;

use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Auth routes
        crate::handlers::register,
        crate::handlers::login,
        crate::handlers::auth::refresh_token,
        crate::handlers::auth::logout,
        crate::handlers::get_current_user,
        crate::handlers::change_password,
        // User routes
        crate::handlers::user::get_user_profile,
        crate::handlers::user::list_user_posts,
        crate::handlers::user::update_profile,
        // Category routes
        crate::handlers::category::list_categories,
        crate::handlers::category::get_category,
        crate::handlers::category::list_category_posts,
        crate::handlers::category::create_category,
        crate::handlers::category::update_category,
        crate::handlers::category::delete_category,
        // Location routes
        crate::handlers::location::list_locations,
        crate::handlers::location::create_location,
        crate::handlers::location::update_location,
        crate::handlers::location::delete_location,
        // Post routes
        crate::handlers::post::list_posts,
        crate::handlers::post::get_post,
        crate::handlers::post::create_post,
        crate::handlers::post::update_post,
        crate::handlers::post::delete_post,
        // Comment routes
        crate::handlers::comment::list_comments,
        crate::handlers::comment::create_comment,
        crate::handlers::comment::update_comment,
        crate::handlers::comment::delete_comment,
        // Static pages
        crate::handlers::pages::about,
        crate::handlers::pages::rules,
    ),
    components(
        schemas(
            crate::response::ApiResponse<serde_json::Value>,
            crate::response::PaginatedResponse<serde_json::Value>,
            crate::response::PageQuery,
            crate::error::AppError,
            // Auth
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::RefreshTokenRequest,
            crate::handlers::auth::AuthResponse,
            crate::handlers::auth::TokenResponse,
            crate::handlers::auth::UserResponse,
            crate::handlers::auth::ChangePasswordRequest,
            // User
            crate::handlers::user::UserProfileResponse,
            crate::handlers::user::UpdateProfileRequest,
            // Category
            crate::handlers::category::CategoryResponse,
            crate::handlers::category::CreateCategoryRequest,
            crate::handlers::category::UpdateCategoryRequest,
            // Location
            crate::handlers::location::LocationResponse,
            crate::handlers::location::CreateLocationRequest,
            crate::handlers::location::UpdateLocationRequest,
            // Post
            crate::handlers::post::PostResponse,
            crate::handlers::post::FeedItemResponse,
            crate::handlers::post::CreatePostRequest,
            crate::handlers::post::UpdatePostRequest,
            // Comment
            crate::handlers::comment::CommentResponse,
            crate::handlers::comment::CreateCommentRequest,
            crate::handlers::comment::UpdateCommentRequest,
        )
    ),
    tags(
        (name = "auth", description = "Authentication operations"),
        (name = "users", description = "User profile operations"),
        (name = "categories", description = "Category management operations"),
        (name = "locations", description = "Location management operations"),
        (name = "posts", description = "Post management operations"),
        (name = "comments", description = "Comment management operations"),
        (name = "pages", description = "Static page content"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blogicum=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let jwt_config = validate_config()?;

    // Initialize JWT config
    utils::jwt::init_jwt_config(jwt_config)?;

    tracing::info!("Starting Blogicum API v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let app = create_app().layer(Extension(db));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<crate::config::jwt::JwtConfig> {
    // JWT config — validated and cached
    let jwt_config = config::jwt::JwtConfig::from_env()?;

    // DATABASE_URL — checked here for early error; actual connection happens later
    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    Ok(jwt_config)
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app() -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(
            middleware::security::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "Blogicum API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
