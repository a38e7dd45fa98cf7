use crate::error::{AppError, AppResult};
use crate::middleware::auth::{parse_user_id, AuthUser, MaybeAuthUser};
use crate::models::PostModel;
use crate::response::{ApiResponse, PageQuery, PaginatedResponse};
use crate::services::post::{FeedItem, PostService, FEED_PAGE_SIZE};
use crate::utils::render_markdown;
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    /// Post title (1-256 characters)
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    /// Post body (Markdown supported)
    #[validate(length(min = 1))]
    pub text: String,
    /// Publication date; a future date schedules the post
    pub pub_date: chrono::NaiveDateTime,
    /// Category ID
    pub category_id: Option<i32>,
    /// Location ID
    pub location_id: Option<i32>,
    /// Image URL (max 500 characters)
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    /// Uncheck to hide the post (defaults to true)
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    /// Post title (1-256 characters)
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    /// Post body (Markdown supported)
    #[validate(length(min = 1))]
    pub text: String,
    /// Publication date; a future date schedules the post
    pub pub_date: chrono::NaiveDateTime,
    /// Category ID
    pub category_id: Option<i32>,
    /// Location ID
    pub location_id: Option<i32>,
    /// Image URL (max 500 characters)
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    /// Uncheck to hide the post (defaults to true)
    pub is_published: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    /// Post ID
    pub id: i32,
    /// Author user ID
    pub author_id: i32,
    /// Category ID
    pub category_id: Option<i32>,
    /// Location ID
    pub location_id: Option<i32>,
    /// Post title
    pub title: String,
    /// Post body (Markdown)
    pub text: String,
    /// Rendered HTML body
    pub text_html: String,
    /// Image URL
    pub image_url: Option<String>,
    /// Publication timestamp
    pub pub_date: String,
    /// Whether the post is published
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl From<PostModel> for PostResponse {
    fn from(p: PostModel) -> Self {
        let text_html = render_markdown(&p.text);
        Self {
            id: p.id,
            author_id: p.author_id,
            category_id: p.category_id,
            location_id: p.location_id,
            title: p.title,
            text: p.text,
            text_html,
            image_url: p.image_url,
            pub_date: p.pub_date.to_string(),
            is_published: p.is_published,
            created_at: p.created_at.to_string(),
        }
    }
}

/// A feed entry: post fields plus the joined display data and comment count.
#[derive(Debug, Serialize, ToSchema)]
pub struct FeedItemResponse {
    /// Post ID
    pub id: i32,
    /// Author user ID
    pub author_id: i32,
    /// Author username
    pub author_username: String,
    /// Category ID
    pub category_id: Option<i32>,
    /// Category title
    pub category_title: Option<String>,
    /// Category slug
    pub category_slug: Option<String>,
    /// Location ID
    pub location_id: Option<i32>,
    /// Location name
    pub location_name: Option<String>,
    /// Post title
    pub title: String,
    /// Post body (Markdown)
    pub text: String,
    /// Rendered HTML body
    pub text_html: String,
    /// Image URL
    pub image_url: Option<String>,
    /// Publication timestamp
    pub pub_date: String,
    /// Number of comments
    pub comment_count: i64,
}

impl From<FeedItem> for FeedItemResponse {
    fn from(item: FeedItem) -> Self {
        let text_html = render_markdown(&item.text);
        Self {
            id: item.id,
            author_id: item.author_id,
            author_username: item.author_username,
            category_id: item.category_id,
            category_title: item.category_title,
            category_slug: item.category_slug,
            location_id: item.location_id,
            location_name: item.location_name,
            title: item.title,
            text: item.text,
            text_html,
            image_url: item.image_url,
            pub_date: item.pub_date.to_string(),
            comment_count: item.comment_count,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
    ),
    responses(
        (status = 200, description = "Home feed", body = PaginatedResponse<FeedItemResponse>),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1);

    let service = PostService::new(db);
    let (items, total) = service.list_feed(None, page).await?;

    let items: Vec<FeedItemResponse> = items.into_iter().map(FeedItemResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items,
        total,
        page,
        FEED_PAGE_SIZE,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = PostResponse),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn get_post(
    Extension(db): Extension<DatabaseConnection>,
    viewer: MaybeAuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = PostService::new(db);
    let post = service.get_visible_by_id(id, viewer.user_id()).await?;

    Ok(ApiResponse::ok(PostResponse::from(post)))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    security(("jwt_token" = [])),
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post created", body = PostResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "posts"
)]
pub async fn create_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let author_id = parse_user_id(&auth_user)?;

    let service = PostService::new(db);
    let post = service
        .create(
            author_id,
            &payload.title,
            &payload.text,
            payload.pub_date,
            payload.category_id,
            payload.location_id,
            payload.image_url,
            payload.is_published.unwrap_or(true),
        )
        .await?;

    Ok(ApiResponse::ok(PostResponse::from(post)))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn update_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePostRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let author_id = parse_user_id(&auth_user)?;

    let service = PostService::new(db);
    let post = service
        .update(
            id,
            author_id,
            &payload.title,
            &payload.text,
            payload.pub_date,
            payload.category_id,
            payload.location_id,
            payload.image_url,
            payload.is_published.unwrap_or(true),
        )
        .await?;

    Ok(ApiResponse::ok(PostResponse::from(post)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted", body = String),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn delete_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let author_id = parse_user_id(&auth_user)?;

    let service = PostService::new(db);
    service.delete(id, author_id).await?;

    Ok(ApiResponse::ok("Post deleted"))
}
