mod common;

use serde_json::Value;

#[tokio::test]
async fn view_and_update_profile() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "username": "profile_user",
            "email": "profile_user@test.com",
            "password": "a_decent_password"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // Public profile view
    let resp = app
        .client
        .get(app.url("/users/profile_user"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["username"], "profile_user");
    assert!(body["data"]["bio"].is_null());
    // Email is not part of the public profile
    assert!(body["data"].get("email").is_none());

    // Update own profile
    let resp = app
        .client
        .put(app.url("/auth/profile"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "first_name": "Pat",
            "last_name": "Author",
            "bio": "I write about places.",
            "birth_date": "1990-04-01"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["first_name"], "Pat");
    assert_eq!(body["data"]["bio"], "I write about places.");
    assert_eq!(body["data"]["birth_date"], "1990-04-01");

    // Visible on the public profile afterwards
    let resp = app
        .client
        .get(app.url("/users/profile_user"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["last_name"], "Author");
}

#[tokio::test]
async fn username_change_conflict_rejected() {
    let app = common::spawn_app().await;

    for name in ["taken_name", "wants_rename"] {
        let resp = app
            .client
            .post(app.url("/auth/register"))
            .json(&serde_json::json!({
                "username": name,
                "email": format!("{}@test.com", name),
                "password": "a_decent_password"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "username": "wants_rename",
            "password": "a_decent_password"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let resp = app
        .client
        .put(app.url("/auth/profile"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "username": "taken_name" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn unknown_user_profile_is_404() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/users/ghost_user"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = app
        .client
        .get(app.url("/users/ghost_user/posts"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn static_pages_served() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/pages/about"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "About");

    let resp = app
        .client
        .get(app.url("/pages/rules"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Unknown paths fall through to the generic 404
    let resp = app
        .client
        .get(app.url("/pages/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
