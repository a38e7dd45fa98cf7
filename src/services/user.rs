use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_by_username(&self, username: &str) -> AppResult<UserModel> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Update the requester's own profile. `username`/`email` are only
    /// touched when supplied, and both are checked for collisions with
    /// other accounts.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_profile(
        &self,
        user_id: i32,
        username: Option<String>,
        email: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
        bio: Option<String>,
        birth_date: Option<chrono::NaiveDate>,
    ) -> AppResult<UserModel> {
        let existing = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(new_username) = &username {
            if new_username != &existing.username
                && self.username_taken(new_username, user_id).await?
            {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
        }

        if let Some(new_email) = &email {
            if new_email != &existing.email && self.email_taken(new_email, user_id).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        let now = chrono::Utc::now().naive_utc();

        let mut active: user::ActiveModel = existing.into();
        if let Some(username) = username {
            active.username = sea_orm::ActiveValue::Set(username);
        }
        if let Some(email) = email {
            active.email = sea_orm::ActiveValue::Set(email);
        }
        active.first_name = sea_orm::ActiveValue::Set(first_name);
        active.last_name = sea_orm::ActiveValue::Set(last_name);
        active.bio = sea_orm::ActiveValue::Set(bio);
        active.birth_date = sea_orm::ActiveValue::Set(birth_date);
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    async fn username_taken(&self, username: &str, excluding_user: i32) -> AppResult<bool> {
        let count = User::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::Id.ne(excluding_user))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn email_taken(&self, email: &str, excluding_user: i32) -> AppResult<bool> {
        let count = User::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::Id.ne(excluding_user))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}
