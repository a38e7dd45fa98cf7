use crate::{
    error::{AppError, AppResult},
    models::{comment, Comment, CommentModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

pub struct CommentService {
    db: DatabaseConnection,
}

impl CommentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Comments of one post, oldest first. Visibility of the parent post is
    /// the caller's concern; comments themselves have no published state.
    pub async fn list_by_post(&self, post_id: i32) -> AppResult<Vec<CommentModel>> {
        let comments = Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(comments)
    }

    pub async fn create(
        &self,
        post_id: i32,
        author_id: i32,
        text: &str,
    ) -> AppResult<CommentModel> {
        let now = chrono::Utc::now().naive_utc();

        let new_comment = comment::ActiveModel {
            post_id: sea_orm::ActiveValue::Set(post_id),
            author_id: sea_orm::ActiveValue::Set(author_id),
            text: sea_orm::ActiveValue::Set(text.to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let comment = new_comment.insert(&self.db).await?;
        Ok(comment)
    }

    pub async fn update(&self, id: i32, author_id: i32, text: &str) -> AppResult<CommentModel> {
        let existing = self.get_by_id(id).await?;
        if existing.author_id != author_id {
            return Err(AppError::Forbidden);
        }

        let now = chrono::Utc::now().naive_utc();

        let mut active: comment::ActiveModel = existing.into();
        active.text = sea_orm::ActiveValue::Set(text.to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32, author_id: i32) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        if existing.author_id != author_id {
            return Err(AppError::Forbidden);
        }

        Comment::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<CommentModel> {
        Comment::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}
