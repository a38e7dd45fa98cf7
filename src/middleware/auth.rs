use crate::{
    error::AppError,
    models::User,
    utils::{
        cookie::{extract_cookie, ACCESS_TOKEN_COOKIE},
        jwt::decode_jwt,
    },
};
use axum::{
    extract::{FromRequestParts, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension,
};
use sea_orm::{DatabaseConnection, EntityTrait};

/// Extracted user information from JWT token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// JWT authentication middleware
///
/// Verifies the JWT token from the Authorization header (or HttpOnly
/// cookie), checks the user still exists, and adds user info to request
/// extensions.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers)
        .or_else(|| extract_cookie(&headers, ACCESS_TOKEN_COOKIE))
        .ok_or(AppError::Unauthorized)?;

    let claims = decode_jwt(&token).map_err(|_| AppError::Unauthorized)?;

    // Protected routes must use an access token (not a refresh token).
    if !crate::utils::jwt::is_access_token(&claims) {
        return Err(AppError::Unauthorized);
    }

    let user_id: i32 = claims
        .sub
        .parse()
        .map_err(|_| AppError::Validation("Invalid user ID in token".to_string()))?;

    User::find_by_id(user_id)
        .one(&db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let auth_user = AuthUser {
        user_id: claims.sub,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Parse user_id from AuthUser string to i32
pub fn parse_user_id(auth_user: &AuthUser) -> crate::error::AppResult<i32> {
    auth_user
        .user_id
        .parse()
        .map_err(|_| AppError::Validation("Invalid user ID".to_string()))
}

/// Verify the current user has admin role
pub async fn require_admin(
    db: &sea_orm::DatabaseConnection,
    auth_user: &AuthUser,
) -> crate::error::AppResult<i32> {
    let user_id = parse_user_id(auth_user)?;
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if user.role != "admin" {
        return Err(AppError::Forbidden);
    }
    Ok(user_id)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional viewer identity for public routes.
///
/// Public feeds and detail pages are served without the auth middleware, but
/// authors must still see their own unpublished content. This extractor
/// decodes credentials when present and degrades to anonymous on anything
/// missing or invalid.
#[derive(Debug, Clone, Default)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<i32> {
        self.0.as_ref().and_then(|u| u.user_id.parse().ok())
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(MaybeAuthUser(Some(user.clone())));
        }

        let token = match extract_bearer_token(&parts.headers)
            .or_else(|| extract_cookie(&parts.headers, ACCESS_TOKEN_COOKIE))
        {
            Some(token) => token,
            None => return Ok(MaybeAuthUser(None)),
        };

        match decode_jwt(&token) {
            Ok(claims) if crate::utils::jwt::is_access_token(&claims) => {
                Ok(MaybeAuthUser(Some(AuthUser {
                    user_id: claims.sub,
                })))
            }
            _ => Ok(MaybeAuthUser(None)),
        }
    }
}
