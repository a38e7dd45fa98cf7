use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::error::AppError;
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes() -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .fallback(fallback_404)
}

async fn fallback_404() -> AppError {
    AppError::NotFound
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let auth = auth_routes(&rate_limit_config);
    let public_read = public_read_routes(&rate_limit_config);
    let protected =
        protected_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));

    auth.merge(public_read).merge(protected)
}

/// Auth routes: register, login, refresh.
fn auth_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/register", routing::post(handlers::register))
        .route("/auth/login", routing::post(handlers::login))
        .route("/auth/refresh", routing::post(handlers::refresh_token));

    with_optional_rate_limit(router, config.enabled, config.auth)
}

/// Public read routes: feeds, details, profiles, static pages.
fn public_read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Posts
        .route("/posts", routing::get(handlers::post::list_posts))
        .route("/posts/{id}", routing::get(handlers::post::get_post))
        .route(
            "/posts/{post_id}/comments",
            routing::get(handlers::comment::list_comments),
        )
        // Categories
        .route(
            "/categories",
            routing::get(handlers::category::list_categories),
        )
        .route(
            "/categories/{slug}",
            routing::get(handlers::category::get_category),
        )
        .route(
            "/categories/{slug}/posts",
            routing::get(handlers::category::list_category_posts),
        )
        // Locations
        .route(
            "/locations",
            routing::get(handlers::location::list_locations),
        )
        // Users
        .route(
            "/users/{username}",
            routing::get(handlers::user::get_user_profile),
        )
        .route(
            "/users/{username}/posts",
            routing::get(handlers::user::list_user_posts),
        )
        // Static pages
        .route("/pages/about", routing::get(handlers::pages::about))
        .route("/pages/rules", routing::get(handlers::pages::rules));

    with_optional_rate_limit(router, config.enabled, config.public_read)
}

/// Protected routes: all authenticated writes.
fn protected_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Auth
        .route("/auth/me", routing::get(handlers::get_current_user))
        .route("/auth/logout", routing::post(handlers::logout))
        .route("/auth/profile", routing::put(handlers::user::update_profile))
        .route("/auth/password", routing::put(handlers::change_password))
        // Posts
        .route("/posts", routing::post(handlers::post::create_post))
        .route(
            "/posts/{id}",
            routing::put(handlers::post::update_post).delete(handlers::post::delete_post),
        )
        // Comments
        .route(
            "/comments",
            routing::post(handlers::comment::create_comment),
        )
        .route(
            "/comments/{id}",
            routing::put(handlers::comment::update_comment)
                .delete(handlers::comment::delete_comment),
        )
        // Categories (admin only - checked in handler)
        .route(
            "/categories",
            routing::post(handlers::category::create_category),
        )
        .route(
            "/categories/{slug}",
            routing::put(handlers::category::update_category)
                .delete(handlers::category::delete_category),
        )
        // Locations (admin only - checked in handler)
        .route(
            "/locations",
            routing::post(handlers::location::create_location),
        )
        .route(
            "/locations/{id}",
            routing::put(handlers::location::update_location)
                .delete(handlers::location::delete_location),
        );

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}
