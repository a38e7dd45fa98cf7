use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin, AuthUser};
use crate::models::LocationModel;
use crate::response::ApiResponse;
use crate::services::location::LocationService;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLocationRequest {
    /// Place name (1-256 characters)
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    /// Uncheck to hide the location (defaults to true)
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLocationRequest {
    /// Place name (1-256 characters)
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    /// Uncheck to hide the location (defaults to true)
    pub is_published: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationResponse {
    /// Location ID
    pub id: i32,
    /// Place name
    pub name: String,
    /// Whether the location is published
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl From<LocationModel> for LocationResponse {
    fn from(l: LocationModel) -> Self {
        Self {
            id: l.id,
            name: l.name,
            is_published: l.is_published,
            created_at: l.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/locations",
    responses(
        (status = 200, description = "List published locations", body = Vec<LocationResponse>),
    ),
    tag = "locations"
)]
pub async fn list_locations(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let service = LocationService::new(db);
    let locations = service.list().await?;
    let response: Vec<LocationResponse> =
        locations.into_iter().map(LocationResponse::from).collect();
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/locations",
    security(("jwt_token" = [])),
    request_body = CreateLocationRequest,
    responses(
        (status = 200, description = "Location created", body = LocationResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "locations"
)]
pub async fn create_location(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateLocationRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    require_admin(&db, &auth_user).await?;

    let service = LocationService::new(db);
    let location = service
        .create(&payload.name, payload.is_published.unwrap_or(true))
        .await?;

    Ok(ApiResponse::ok(LocationResponse::from(location)))
}

#[utoipa::path(
    put,
    path = "/api/v1/locations/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, description = "Location updated", body = LocationResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Location not found", body = AppError),
    ),
    tag = "locations"
)]
pub async fn update_location(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateLocationRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    require_admin(&db, &auth_user).await?;

    let service = LocationService::new(db);
    let location = service
        .update(id, &payload.name, payload.is_published.unwrap_or(true))
        .await?;

    Ok(ApiResponse::ok(LocationResponse::from(location)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/locations/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location deleted", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Location not found", body = AppError),
    ),
    tag = "locations"
)]
pub async fn delete_location(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let service = LocationService::new(db);
    service.delete(id).await?;

    Ok(ApiResponse::ok("Location deleted"))
}
