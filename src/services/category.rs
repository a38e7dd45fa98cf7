use crate::{
    error::{AppError, AppResult},
    models::{category, Category, CategoryModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

pub struct CategoryService {
    db: DatabaseConnection,
}

impl CategoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Published categories only; unpublished ones exist solely for their
    /// managers until re-published.
    pub async fn list(&self) -> AppResult<Vec<CategoryModel>> {
        let categories = Category::find()
            .filter(category::Column::IsPublished.eq(true))
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await?;
        Ok(categories)
    }

    pub async fn get_published_by_slug(&self, slug: &str) -> AppResult<CategoryModel> {
        Category::find()
            .filter(category::Column::Slug.eq(slug))
            .filter(category::Column::IsPublished.eq(true))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_by_slug(&self, slug: &str) -> AppResult<CategoryModel> {
        Category::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        title: &str,
        description: &str,
        slug: &str,
        is_published: bool,
    ) -> AppResult<CategoryModel> {
        if self.slug_taken(slug).await? {
            return Err(AppError::Conflict("Slug already exists".to_string()));
        }

        let now = chrono::Utc::now().naive_utc();

        let new_category = category::ActiveModel {
            title: sea_orm::ActiveValue::Set(title.to_string()),
            description: sea_orm::ActiveValue::Set(description.to_string()),
            slug: sea_orm::ActiveValue::Set(slug.to_string()),
            is_published: sea_orm::ActiveValue::Set(is_published),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let created = new_category.insert(&self.db).await?;
        Ok(created)
    }

    pub async fn update(
        &self,
        slug: &str,
        title: &str,
        description: &str,
        is_published: bool,
    ) -> AppResult<CategoryModel> {
        let existing = self.get_by_slug(slug).await?;
        let now = chrono::Utc::now().naive_utc();

        let mut active: category::ActiveModel = existing.into();
        active.title = sea_orm::ActiveValue::Set(title.to_string());
        active.description = sea_orm::ActiveValue::Set(description.to_string());
        active.is_published = sea_orm::ActiveValue::Set(is_published);
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Referencing posts keep existing with a nulled category (FK SET NULL),
    /// which drops them out of public feeds.
    pub async fn delete(&self, slug: &str) -> AppResult<()> {
        let existing = self.get_by_slug(slug).await?;
        Category::delete_by_id(existing.id).exec(&self.db).await?;
        Ok(())
    }

    async fn slug_taken(&self, slug: &str) -> AppResult<bool> {
        let count = Category::find()
            .filter(category::Column::Slug.eq(slug))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}
