use crate::{
    error::{AppError, AppResult},
    models::{post, Category, Post, PostModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, QueryFilter, Statement,
};

/// Fixed page size for every post feed.
pub const FEED_PAGE_SIZE: u64 = 10;

/// Default visibility predicate: published flag set and publication date not
/// in the future. Applied to every public read unless the requester is the
/// post's author.
pub fn published_filter(now: chrono::NaiveDateTime) -> Condition {
    Condition::all()
        .add(post::Column::IsPublished.eq(true))
        .add(post::Column::PubDate.lte(now))
}

/// The same predicate for the joined feed queries, extended with the
/// category's own published flag. A post whose category is missing or
/// unpublished never appears in a public feed.
const FEED_VISIBILITY_SQL: &str =
    "p.is_published = TRUE AND p.pub_date <= NOW() AND c.is_published = TRUE";

const FEED_SELECT_SQL: &str = "SELECT p.id, p.author_id, u.username AS author_username, \
    p.category_id, c.title AS category_title, c.slug AS category_slug, \
    p.location_id, l.name AS location_name, \
    p.title, p.text, p.image_url, p.pub_date, p.created_at, \
    COUNT(cm.id) AS comment_count \
    FROM posts p \
    JOIN users u ON u.id = p.author_id \
    LEFT JOIN categories c ON c.id = p.category_id \
    LEFT JOIN locations l ON l.id = p.location_id \
    LEFT JOIN comments cm ON cm.post_id = p.id";

const FEED_GROUP_ORDER_SQL: &str =
    "GROUP BY p.id, u.username, c.title, c.slug, l.name ORDER BY p.pub_date DESC";

/// One row of a feed: a post joined with its author/category/location and
/// annotated with the number of comments.
#[derive(Debug, Clone, FromQueryResult, serde::Serialize)]
pub struct FeedItem {
    pub id: i32,
    pub author_id: i32,
    pub author_username: String,
    pub category_id: Option<i32>,
    pub category_title: Option<String>,
    pub category_slug: Option<String>,
    pub location_id: Option<i32>,
    pub location_name: Option<String>,
    pub title: String,
    pub text: String,
    pub image_url: Option<String>,
    pub pub_date: chrono::NaiveDateTime,
    pub created_at: chrono::NaiveDateTime,
    pub comment_count: i64,
}

pub struct PostService {
    db: DatabaseConnection,
}

impl PostService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Public feed: the home page when `category_slug` is None, a category
    /// page otherwise. Same query either way.
    pub async fn list_feed(
        &self,
        category_slug: Option<&str>,
        page: u64,
    ) -> AppResult<(Vec<FeedItem>, u64)> {
        let offset = page.saturating_sub(1) * FEED_PAGE_SIZE;

        let (where_sql, mut values): (String, Vec<sea_orm::Value>) = match category_slug {
            Some(slug) => (
                format!("WHERE {FEED_VISIBILITY_SQL} AND c.slug = $1"),
                vec![slug.into()],
            ),
            None => (format!("WHERE {FEED_VISIBILITY_SQL}"), vec![]),
        };

        let count_sql = format!(
            "SELECT COUNT(*) AS count FROM posts p \
             LEFT JOIN categories c ON c.id = p.category_id {where_sql}"
        );

        let total = self.count_rows(&count_sql, values.clone()).await?;

        let limit_param = values.len() + 1;
        let offset_param = values.len() + 2;
        let select_sql = format!(
            "{FEED_SELECT_SQL} {where_sql} {FEED_GROUP_ORDER_SQL} \
             LIMIT ${limit_param} OFFSET ${offset_param}"
        );
        values.push((FEED_PAGE_SIZE as i64).into());
        values.push((offset as i64).into());

        let items = FeedItem::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            &select_sql,
            values,
        ))
        .all(&self.db)
        .await?;

        Ok((items, total))
    }

    /// Profile feed: every post of one author. The visibility predicate is
    /// dropped only when the profile owner is looking at their own page.
    pub async fn list_by_author(
        &self,
        author_id: i32,
        viewer_is_owner: bool,
        page: u64,
    ) -> AppResult<(Vec<FeedItem>, u64)> {
        let offset = page.saturating_sub(1) * FEED_PAGE_SIZE;

        let where_sql = if viewer_is_owner {
            "WHERE p.author_id = $1".to_string()
        } else {
            format!("WHERE p.author_id = $1 AND {FEED_VISIBILITY_SQL}")
        };

        let count_sql = format!(
            "SELECT COUNT(*) AS count FROM posts p \
             LEFT JOIN categories c ON c.id = p.category_id {where_sql}"
        );

        let total = self
            .count_rows(&count_sql, vec![author_id.into()])
            .await?;

        let select_sql =
            format!("{FEED_SELECT_SQL} {where_sql} {FEED_GROUP_ORDER_SQL} LIMIT $2 OFFSET $3");

        let items = FeedItem::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            &select_sql,
            vec![
                author_id.into(),
                (FEED_PAGE_SIZE as i64).into(),
                (offset as i64).into(),
            ],
        ))
        .all(&self.db)
        .await?;

        Ok((items, total))
    }

    async fn count_rows(&self, sql: &str, values: Vec<sea_orm::Value>) -> AppResult<u64> {
        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                sql,
                values,
            ))
            .await?
            .ok_or(AppError::Internal(anyhow::anyhow!("Count query failed")))?;

        let total: i64 = row.try_get_by_index(0)?;
        Ok(total as u64)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<PostModel> {
        Post::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Post detail. Authors see their own posts unconditionally; everyone
    /// else only sees posts passing the default visibility filter, and a
    /// hidden post is indistinguishable from a missing one.
    pub async fn get_visible_by_id(&self, id: i32, viewer: Option<i32>) -> AppResult<PostModel> {
        let post = self.get_by_id(id).await?;
        if viewer == Some(post.author_id) {
            return Ok(post);
        }

        let now = chrono::Utc::now().naive_utc();
        let post = Post::find_by_id(id)
            .filter(published_filter(now))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let category = match post.category_id {
            Some(category_id) => Category::find_by_id(category_id).one(&self.db).await?,
            None => None,
        };

        match category {
            Some(c) if c.is_published => Ok(post),
            _ => Err(AppError::NotFound),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        author_id: i32,
        title: &str,
        text: &str,
        pub_date: chrono::NaiveDateTime,
        category_id: Option<i32>,
        location_id: Option<i32>,
        image_url: Option<String>,
        is_published: bool,
    ) -> AppResult<PostModel> {
        let now = chrono::Utc::now().naive_utc();

        let new_post = post::ActiveModel {
            author_id: sea_orm::ActiveValue::Set(author_id),
            category_id: sea_orm::ActiveValue::Set(category_id),
            location_id: sea_orm::ActiveValue::Set(location_id),
            title: sea_orm::ActiveValue::Set(title.to_string()),
            text: sea_orm::ActiveValue::Set(text.to_string()),
            image_url: sea_orm::ActiveValue::Set(image_url),
            pub_date: sea_orm::ActiveValue::Set(pub_date),
            is_published: sea_orm::ActiveValue::Set(is_published),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let post = new_post.insert(&self.db).await?;
        Ok(post)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: i32,
        author_id: i32,
        title: &str,
        text: &str,
        pub_date: chrono::NaiveDateTime,
        category_id: Option<i32>,
        location_id: Option<i32>,
        image_url: Option<String>,
        is_published: bool,
    ) -> AppResult<PostModel> {
        let existing = self.get_by_id(id).await?;
        if existing.author_id != author_id {
            return Err(AppError::Forbidden);
        }

        let now = chrono::Utc::now().naive_utc();

        let mut active: post::ActiveModel = existing.into();
        active.title = sea_orm::ActiveValue::Set(title.to_string());
        active.text = sea_orm::ActiveValue::Set(text.to_string());
        active.pub_date = sea_orm::ActiveValue::Set(pub_date);
        active.category_id = sea_orm::ActiveValue::Set(category_id);
        active.location_id = sea_orm::ActiveValue::Set(location_id);
        active.image_url = sea_orm::ActiveValue::Set(image_url);
        active.is_published = sea_orm::ActiveValue::Set(is_published);
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32, author_id: i32) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        if existing.author_id != author_id {
            return Err(AppError::Forbidden);
        }

        Post::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
