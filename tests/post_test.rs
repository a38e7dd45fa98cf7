mod common;

use serde_json::Value;

#[tokio::test]
async fn create_and_get_post() {
    let app = common::spawn_app().await;
    let (user_id, token, slug) = common::setup_admin_with_category(&app).await;

    // Resolve category id from slug
    let resp = app
        .client
        .get(app.url(&format!("/categories/{}", slug)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let category_id = body["data"]["id"].as_i64().unwrap();

    // Create post
    let resp = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "First Post",
            "text": "Hello, **world**!",
            "pub_date": common::format_datetime(common::past_datetime()),
            "category_id": category_id
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let post_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["title"], "First Post");
    // Creating records the requester as author
    assert_eq!(body["data"]["author_id"].as_i64().unwrap(), user_id as i64);
    assert!(body["data"]["text_html"]
        .as_str()
        .unwrap()
        .contains("<strong>world</strong>"));

    // Get post anonymously
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "First Post");
}

#[tokio::test]
async fn update_and_delete_post() {
    let app = common::spawn_app().await;
    let (_user_id, token, slug) = common::setup_admin_with_category(&app).await;

    let resp = app
        .client
        .get(app.url(&format!("/categories/{}", slug)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let category_id = body["data"]["id"].as_i64().unwrap() as i32;

    let post_id =
        common::create_test_post(&app, &token, Some(category_id), common::past_datetime()).await;

    // Update
    let resp = app
        .client
        .put(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Updated",
            "text": "Updated content",
            "pub_date": common::format_datetime(common::past_datetime()),
            "category_id": category_id
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Updated");

    // Delete
    let resp = app
        .client
        .delete(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Gone afterwards
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn wrong_user_cannot_update_or_delete_post() {
    let app = common::spawn_app().await;
    let (_user_id, token, slug) = common::setup_admin_with_category(&app).await;

    let resp = app
        .client
        .get(app.url(&format!("/categories/{}", slug)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let category_id = body["data"]["id"].as_i64().unwrap() as i32;

    let post_id =
        common::create_test_post(&app, &token, Some(category_id), common::past_datetime()).await;

    let (_other_id, other_token) = common::create_test_user(&app, "intruder").await;

    // Update as non-author
    let resp = app
        .client
        .put(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&other_token)
        .json(&serde_json::json!({
            "title": "Hijacked",
            "text": "Hijacked content",
            "pub_date": common::format_datetime(common::past_datetime()),
            "category_id": category_id
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // Delete as non-author
    let resp = app
        .client
        .delete(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // Record unchanged
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Test Post");
}

#[tokio::test]
async fn anonymous_cannot_create_post() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/posts"))
        .json(&serde_json::json!({
            "title": "Nope",
            "text": "No auth",
            "pub_date": common::format_datetime(common::past_datetime())
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn home_feed_paginates_at_ten() {
    let app = common::spawn_app().await;
    let (_user_id, token, slug) = common::setup_admin_with_category(&app).await;

    let resp = app
        .client
        .get(app.url(&format!("/categories/{}", slug)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let category_id = body["data"]["id"].as_i64().unwrap() as i32;

    for _ in 0..12 {
        common::create_test_post(&app, &token, Some(category_id), common::past_datetime()).await;
    }

    let resp = app.client.get(app.url("/posts")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 10);
    assert_eq!(body["data"]["total"].as_u64().unwrap(), 12);
    assert_eq!(body["data"]["per_page"].as_u64().unwrap(), 10);
    assert_eq!(body["data"]["total_pages"].as_u64().unwrap(), 2);

    let resp = app
        .client
        .get(app.url("/posts?page=2"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_author_cascades_to_posts() {
    let app = common::spawn_app().await;
    let (user_id, token, slug) = common::setup_admin_with_category(&app).await;

    let resp = app
        .client
        .get(app.url(&format!("/categories/{}", slug)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let category_id = body["data"]["id"].as_i64().unwrap() as i32;

    let post_id =
        common::create_test_post(&app, &token, Some(category_id), common::past_datetime()).await;

    // Account removal happens out of band; the FK cascade does the cleanup
    use sea_orm::{ConnectionTrait, Statement};
    app.db
        .execute(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "DELETE FROM users WHERE id = $1",
            vec![user_id.into()],
        ))
        .await
        .unwrap();

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn missing_post_is_404() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/posts/999999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
