use crate::error::{AppError, AppResult};
use crate::middleware::auth::parse_user_id;
use crate::middleware::AuthUser;
use crate::models::UserModel;
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::utils::cookie::{
    build_auth_cookie, build_clear_cookie, extract_cookie, ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
};
use anyhow::anyhow;
use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Username (3-150 characters)
    #[validate(length(min = 3, max = 150))]
    pub username: String,
    /// Email address
    #[validate(email)]
    pub email: String,
    /// Password (min 8 characters)
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username
    pub username: String,
    /// User password
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// JWT access token
    pub token: String,
    /// JWT refresh token
    pub refresh_token: String,
    /// User ID
    pub user_id: i32,
    /// Username
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    /// User ID
    pub id: i32,
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// About the user
    pub bio: Option<String>,
    /// Birth date (YYYY-MM-DD)
    pub birth_date: Option<String>,
    /// User role (user, admin)
    pub role: String,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            birth_date: user.birth_date.map(|d| d.to_string()),
            role: user.role,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 409, description = "Username or email already exists", body = AppError),
    ),
    tag = "auth"
)]
pub async fn register(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let service = AuthService::new(db);
    let (user, access_token, refresh_token) = service
        .register(&payload.username, &payload.email, &payload.password)
        .await?;

    let response = AuthResponse {
        token: access_token.clone(),
        refresh_token: refresh_token.clone(),
        user_id: user.id,
        username: user.username,
    };

    let mut http_response = ApiResponse::ok(response).into_response();
    set_auth_cookies(&mut http_response, &access_token, &refresh_token)?;
    Ok(http_response)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db);
    let (user, access_token, refresh_token) =
        service.login(&payload.username, &payload.password).await?;

    let response = AuthResponse {
        token: access_token.clone(),
        refresh_token: refresh_token.clone(),
        user_id: user.id,
        username: user.username,
    };

    let mut http_response = ApiResponse::ok(response).into_response();
    set_auth_cookies(&mut http_response, &access_token, &refresh_token)?;
    Ok(http_response)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    /// Refresh token; falls back to the refresh cookie when omitted
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// New JWT access token
    pub token: String,
    /// New JWT refresh token
    pub refresh_token: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = TokenResponse),
        (status = 401, description = "Invalid refresh token", body = AppError),
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    Json(payload): Json<RefreshTokenRequest>,
) -> AppResult<impl IntoResponse> {
    let token = payload
        .refresh_token
        .or_else(|| extract_cookie(&headers, REFRESH_TOKEN_COOKIE))
        .ok_or(AppError::Unauthorized)?;

    let service = AuthService::new(db);
    let (_user, access_token, refresh_token) = service.refresh(&token).await?;

    let response = TokenResponse {
        token: access_token.clone(),
        refresh_token: refresh_token.clone(),
    };

    let mut http_response = ApiResponse::ok(response).into_response();
    set_auth_cookies(&mut http_response, &access_token, &refresh_token)?;
    Ok(http_response)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Logged out", body = String),
    ),
    tag = "auth"
)]
pub async fn logout() -> AppResult<impl IntoResponse> {
    let mut http_response = ApiResponse::ok("Logged out").into_response();
    clear_auth_cookies(&mut http_response)?;
    Ok(http_response)
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Current user retrieved successfully", body = UserResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let service = AuthService::new(db);
    let user = service.get_user_by_id(user_id).await?;

    Ok(ApiResponse::ok(UserResponse::from(user)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    /// Current password
    pub current_password: String,
    /// New password (min 8 characters)
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/password",
    security(("jwt_token" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed successfully", body = String),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn change_password(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_id = parse_user_id(&auth_user)?;

    let service = AuthService::new(db);
    service
        .change_password(user_id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(ApiResponse::ok("Password changed successfully"))
}

fn set_auth_cookies(
    response: &mut Response,
    access_token: &str,
    refresh_token: &str,
) -> AppResult<()> {
    let access_cookie = build_auth_cookie(
        ACCESS_TOKEN_COOKIE,
        access_token,
        crate::utils::jwt::access_token_expiry_seconds(),
    );
    let refresh_cookie = build_auth_cookie(
        REFRESH_TOKEN_COOKIE,
        refresh_token,
        crate::utils::jwt::refresh_token_expiry_seconds(),
    );

    append_cookie(response, &access_cookie)?;
    append_cookie(response, &refresh_cookie)?;
    Ok(())
}

fn clear_auth_cookies(response: &mut Response) -> AppResult<()> {
    append_cookie(response, &build_clear_cookie(ACCESS_TOKEN_COOKIE))?;
    append_cookie(response, &build_clear_cookie(REFRESH_TOKEN_COOKIE))?;
    Ok(())
}

fn append_cookie(response: &mut Response, cookie: &str) -> AppResult<()> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| AppError::Internal(anyhow!("Invalid cookie header: {e}")))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}
