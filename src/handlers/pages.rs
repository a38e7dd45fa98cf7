use crate::error::AppResult;
use crate::response::ApiResponse;
use axum::response::IntoResponse;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/pages/about",
    responses(
        (status = 200, description = "About page content", body = serde_json::Value),
    ),
    tag = "pages"
)]
pub async fn about() -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(json!({
        "title": "About",
        "body": "Blogicum is a small blogging platform: write posts, tag them \
                 with a category and a location, schedule publication, and \
                 discuss them in the comments.",
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/pages/rules",
    responses(
        (status = 200, description = "Rules page content", body = serde_json::Value),
    ),
    tag = "pages"
)]
pub async fn rules() -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(json!({
        "title": "Rules",
        "body": "Be kind. Stay on topic. You may edit or delete only your own \
                 posts and comments; moderators manage categories and locations.",
    })))
}
