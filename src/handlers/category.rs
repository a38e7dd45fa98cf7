use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin, AuthUser};
use crate::models::CategoryModel;
use crate::response::{ApiResponse, PageQuery, PaginatedResponse};
use crate::services::category::CategoryService;
use crate::services::post::{PostService, FEED_PAGE_SIZE};
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    /// Category title (1-256 characters)
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    /// Category description
    #[validate(length(min = 1))]
    pub description: String,
    /// URL slug (1-64 characters; latin letters, digits, hyphen, underscore)
    #[validate(length(min = 1, max = 64))]
    pub slug: String,
    /// Uncheck to hide the category (defaults to true)
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    /// Category title (1-256 characters)
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    /// Category description
    #[validate(length(min = 1))]
    pub description: String,
    /// Uncheck to hide the category (defaults to true)
    pub is_published: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    /// Category ID
    pub id: i32,
    /// Category title
    pub title: String,
    /// Category description
    pub description: String,
    /// URL slug
    pub slug: String,
    /// Whether the category is published
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(c: CategoryModel) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            slug: c.slug,
            is_published: c.is_published,
            created_at: c.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "List published categories", body = Vec<CategoryResponse>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let service = CategoryService::new(db);
    let categories = service.list().await?;
    let response: Vec<CategoryResponse> =
        categories.into_iter().map(CategoryResponse::from).collect();
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category details", body = CategoryResponse),
        (status = 404, description = "Category not found", body = AppError),
    ),
    tag = "categories"
)]
pub async fn get_category(
    Extension(db): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = CategoryService::new(db);
    let category = service.get_published_by_slug(&slug).await?;
    Ok(ApiResponse::ok(CategoryResponse::from(category)))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{slug}/posts",
    params(
        ("slug" = String, Path, description = "Category slug"),
        ("page" = Option<u64>, Query, description = "Page number"),
    ),
    responses(
        (status = 200, description = "Category feed", body = PaginatedResponse<crate::handlers::post::FeedItemResponse>),
        (status = 404, description = "Category not found", body = AppError),
    ),
    tag = "categories"
)]
pub async fn list_category_posts(
    Extension(db): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
    Query(params): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1);

    // 404 for unknown or unpublished categories, before touching the feed.
    let category_service = CategoryService::new(db.clone());
    let category = category_service.get_published_by_slug(&slug).await?;

    let post_service = PostService::new(db);
    let (items, total) = post_service.list_feed(Some(&category.slug), page).await?;

    let items: Vec<crate::handlers::post::FeedItemResponse> = items
        .into_iter()
        .map(crate::handlers::post::FeedItemResponse::from)
        .collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items,
        total,
        page,
        FEED_PAGE_SIZE,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    security(("jwt_token" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 409, description = "Slug already exists", body = AppError),
    ),
    tag = "categories"
)]
pub async fn create_category(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    require_admin(&db, &auth_user).await?;

    let service = CategoryService::new(db);
    let category = service
        .create(
            &payload.title,
            &payload.description,
            &payload.slug,
            payload.is_published.unwrap_or(true),
        )
        .await?;

    Ok(ApiResponse::ok(CategoryResponse::from(category)))
}

#[utoipa::path(
    put,
    path = "/api/v1/categories/{slug}",
    security(("jwt_token" = [])),
    params(("slug" = String, Path, description = "Category slug")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Category not found", body = AppError),
    ),
    tag = "categories"
)]
pub async fn update_category(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    require_admin(&db, &auth_user).await?;

    let service = CategoryService::new(db);
    let category = service
        .update(
            &slug,
            &payload.title,
            &payload.description,
            payload.is_published.unwrap_or(true),
        )
        .await?;

    Ok(ApiResponse::ok(CategoryResponse::from(category)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/categories/{slug}",
    security(("jwt_token" = [])),
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category deleted", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Category not found", body = AppError),
    ),
    tag = "categories"
)]
pub async fn delete_category(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let service = CategoryService::new(db);
    service.delete(&slug).await?;

    Ok(ApiResponse::ok("Category deleted"))
}
