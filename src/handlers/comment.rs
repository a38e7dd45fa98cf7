use crate::error::{AppError, AppResult};
use crate::middleware::auth::{parse_user_id, AuthUser, MaybeAuthUser};
use crate::models::CommentModel;
use crate::response::ApiResponse;
use crate::services::comment::CommentService;
use crate::services::post::PostService;
use crate::utils::render_markdown;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    /// Post being commented on
    pub post_id: i32,
    /// Comment body (Markdown supported)
    #[validate(length(min = 1))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentRequest {
    /// Comment body (Markdown supported)
    #[validate(length(min = 1))]
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    /// Comment ID
    pub id: i32,
    /// Post ID
    pub post_id: i32,
    /// Author user ID
    pub author_id: i32,
    /// Comment body (Markdown)
    pub text: String,
    /// Rendered HTML body
    pub text_html: String,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl From<CommentModel> for CommentResponse {
    fn from(c: CommentModel) -> Self {
        let text_html = render_markdown(&c.text);
        Self {
            id: c.id,
            post_id: c.post_id,
            author_id: c.author_id,
            text: c.text,
            text_html,
            created_at: c.created_at.to_string(),
            updated_at: c.updated_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}/comments",
    params(("post_id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Comments for the post, oldest first", body = Vec<CommentResponse>),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn list_comments(
    Extension(db): Extension<DatabaseConnection>,
    viewer: MaybeAuthUser,
    Path(post_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    // Comments inherit the parent post's visibility.
    let post_service = PostService::new(db.clone());
    let post = post_service
        .get_visible_by_id(post_id, viewer.user_id())
        .await?;

    let service = CommentService::new(db);
    let comments = service.list_by_post(post.id).await?;
    let response: Vec<CommentResponse> =
        comments.into_iter().map(CommentResponse::from).collect();

    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/comments",
    security(("jwt_token" = [])),
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn create_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let author_id = parse_user_id(&auth_user)?;

    // The post must exist and be visible to the commenter.
    let post_service = PostService::new(db.clone());
    let post = post_service
        .get_visible_by_id(payload.post_id, Some(author_id))
        .await?;

    let service = CommentService::new(db);
    let comment = service.create(post.id, author_id, &payload.text).await?;

    Ok(ApiResponse::ok(CommentResponse::from(comment)))
}

#[utoipa::path(
    put,
    path = "/api/v1/comments/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Comment not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn update_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let author_id = parse_user_id(&auth_user)?;

    let service = CommentService::new(db);
    let comment = service.update(id, author_id, &payload.text).await?;

    Ok(ApiResponse::ok(CommentResponse::from(comment)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = String),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Comment not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let author_id = parse_user_id(&auth_user)?;

    let service = CommentService::new(db);
    service.delete(id, author_id).await?;

    Ok(ApiResponse::ok("Comment deleted"))
}
