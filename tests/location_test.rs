mod common;

use serde_json::Value;

#[tokio::test]
async fn list_published_locations() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "locadmin").await;
    common::make_admin(&app.db, user_id).await;

    common::create_test_location(&app, &token, "Mountains").await;

    let resp = app
        .client
        .post(app.url("/locations"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "name": "Hidden Valley", "is_published": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app.client.get(app.url("/locations")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Mountains"));
    assert!(!names.contains(&"Hidden Valley"));
}

#[tokio::test]
async fn non_admin_cannot_manage_locations() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "plainloc").await;

    let resp = app
        .client
        .post(app.url("/locations"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "name": "Nowhere" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn deleting_location_nulls_post_reference() {
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

    let location_id = common::create_test_location(&app, &token, "Lakeside").await;

    let resp = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "By the lake",
            "text": "Postcard weather",
            "pub_date": common::format_datetime(common::past_datetime()),
            "category_id": category_id,
            "location_id": location_id
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let post_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["location_id"].as_i64().unwrap(), location_id as i64);

    let resp = app
        .client
        .delete(app.url(&format!("/locations/{}", location_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The post survives with a nulled location, and stays publicly visible
    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["location_id"].is_null());
}
