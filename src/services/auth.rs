use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
    utils::{encode_access_token, encode_refresh_token, hash_password, verify_password},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

pub struct AuthService {
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a new user.
    /// Returns (user_model, access_token, refresh_token).
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<(UserModel, String, String)> {
        if self.user_exists(username, email).await? {
            return Err(AppError::Conflict(
                "Username or email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let now = chrono::Utc::now().naive_utc();

        let new_user = user::ActiveModel {
            username: sea_orm::ActiveValue::Set(username.to_string()),
            email: sea_orm::ActiveValue::Set(email.to_string()),
            password_hash: sea_orm::ActiveValue::Set(password_hash),
            role: sea_orm::ActiveValue::Set("user".to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let user = new_user.insert(&self.db).await?;
        let (access_token, refresh_token) = issue_tokens(user.id)?;

        Ok((user, access_token, refresh_token))
    }

    /// Login with username and password.
    /// Returns (user_model, access_token, refresh_token).
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<(UserModel, String, String)> {
        let user = self
            .find_by_username(username)
            .await
            .map_err(|_| AppError::Unauthorized)?;

        let is_valid = verify_password(password, &user.password_hash)?;
        if !is_valid {
            return Err(AppError::Unauthorized);
        }

        let (access_token, refresh_token) = issue_tokens(user.id)?;

        Ok((user, access_token, refresh_token))
    }

    /// Exchange a valid refresh token for a fresh token pair. The user must
    /// still exist; tokens are stateless, so deletion is the revocation.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<(UserModel, String, String)> {
        let claims =
            crate::utils::jwt::decode_jwt(refresh_token).map_err(|_| AppError::Unauthorized)?;

        if !crate::utils::jwt::is_refresh_token(&claims) {
            return Err(AppError::Unauthorized);
        }

        let user_id: i32 = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;
        let user = self.get_user_by_id(user_id).await.map_err(|_| AppError::Unauthorized)?;

        let (access_token, refresh_token) = issue_tokens(user.id)?;
        Ok((user, access_token, refresh_token))
    }

    /// Change password for the authenticated user.
    pub async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.get_user_by_id(user_id).await?;
        let is_valid = verify_password(current_password, &user.password_hash)?;
        if !is_valid {
            return Err(AppError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        let new_hash = hash_password(new_password)?;
        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = user.into();
        active.password_hash = sea_orm::ActiveValue::Set(new_hash);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn get_user_by_id(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn user_exists(&self, username: &str, email: &str) -> AppResult<bool> {
        let count = User::find()
            .filter(
                sea_orm::Condition::any()
                    .add(user::Column::Username.eq(username))
                    .add(user::Column::Email.eq(email)),
            )
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<UserModel> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

fn issue_tokens(user_id: i32) -> AppResult<(String, String)> {
    let user_id_str = user_id.to_string();
    let access_token = encode_access_token(&user_id_str)?;
    let refresh_token = encode_refresh_token(&user_id_str)?;
    Ok((access_token, refresh_token))
}
