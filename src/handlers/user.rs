use crate::error::{AppError, AppResult};
use crate::middleware::auth::{parse_user_id, MaybeAuthUser};
use crate::middleware::AuthUser;
use crate::models::UserModel;
use crate::response::{ApiResponse, PageQuery, PaginatedResponse};
use crate::services::post::{PostService, FEED_PAGE_SIZE};
use crate::services::user::UserService;
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfileResponse {
    pub id: i32,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    /// Birth date (YYYY-MM-DD)
    pub birth_date: Option<String>,
    pub created_at: String,
}

impl From<UserModel> for UserProfileResponse {
    fn from(u: UserModel) -> Self {
        Self {
            id: u.id,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            bio: u.bio,
            birth_date: u.birth_date.map(|d| d.to_string()),
            created_at: u.created_at.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    /// New username (3-150 characters); unchanged when omitted
    #[validate(length(min = 3, max = 150))]
    pub username: Option<String>,
    /// New email address; unchanged when omitted
    #[validate(email)]
    pub email: Option<String>,
    /// First name (max 150 characters)
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    /// Last name (max 150 characters)
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    /// About the user (max 1000 characters)
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    /// Birth date (YYYY-MM-DD)
    pub birth_date: Option<chrono::NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User profile", body = UserProfileResponse),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn get_user_profile(
    Extension(db): Extension<DatabaseConnection>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = UserService::new(db);
    let user = service.get_by_username(&username).await?;
    Ok(ApiResponse::ok(UserProfileResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{username}/posts",
    params(
        ("username" = String, Path, description = "Username"),
        ("page" = Option<u64>, Query, description = "Page number"),
    ),
    responses(
        (status = 200, description = "Posts by the user, newest first", body = PaginatedResponse<crate::handlers::post::FeedItemResponse>),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn list_user_posts(
    Extension(db): Extension<DatabaseConnection>,
    viewer: MaybeAuthUser,
    Path(username): Path<String>,
    Query(params): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1);

    let user_service = UserService::new(db.clone());
    let profile = user_service.get_by_username(&username).await?;

    // Owners see their whole feed, drafts and scheduled posts included.
    let viewer_is_owner = viewer.user_id() == Some(profile.id);

    let post_service = PostService::new(db);
    let (items, total) = post_service
        .list_by_author(profile.id, viewer_is_owner, page)
        .await?;

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
    put,
    path = "/api/v1/auth/profile",
    security(("jwt_token" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserProfileResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 409, description = "Username or email already exists", body = AppError),
    ),
    tag = "users"
)]
pub async fn update_profile(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_id = parse_user_id(&auth_user)?;

    let service = UserService::new(db);
    let user = service
        .update_profile(
            user_id,
            payload.username,
            payload.email,
            payload.first_name,
            payload.last_name,
            payload.bio,
            payload.birth_date,
        )
        .await?;

    Ok(ApiResponse::ok(UserProfileResponse::from(user)))
}
