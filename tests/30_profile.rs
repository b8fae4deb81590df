mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::TestApp;

async fn create_profile(app: &TestApp, token: &str) -> Result<Value> {
    let (status, profile) = app
        .post(
            "/api/profile",
            Some(token),
            json!({ "status": "Developer", "skills": "rust, go", "twitter": "@a" }),
        )
        .await?;
    anyhow::ensure!(status == StatusCode::OK, "create profile failed: {status} {profile}");
    Ok(profile)
}

#[tokio::test]
async fn me_without_profile_is_bad_request() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register("A", "a@x.com").await?;

    let (status, body) = app.get("/api/profile/me", Some(&token)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "msg": "There is no profile for this user" }));
    Ok(())
}

#[tokio::test]
async fn upsert_then_read_back_populated() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register("A", "a@x.com").await?;
    let user_id = app.user_id(&token).await?;

    let created = create_profile(&app, &token).await?;
    assert_eq!(created["skills"], json!(["rust", "go"]));
    assert_eq!(created["social"]["twitter"], "@a");

    let (status, updated) = app
        .post(
            "/api/profile",
            Some(&token),
            json!({ "status": "Lead", "skills": ["rust"], "company": "Acme" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["status"], "Lead");
    assert_eq!(updated["social"]["twitter"], "@a");

    let (status, me) = app.get("/api/profile/me", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["name"], "A");
    assert_eq!(me["company"], "Acme");

    let (status, all) = app.get("/api/profile", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().map(Vec::len), Some(1));

    let (status, by_user) = app.get(&format!("/api/profile/user/{}", user_id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_user["user"]["id"], user_id.as_str());
    Ok(())
}

#[tokio::test]
async fn profile_requires_status_and_skills() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register("A", "a@x.com").await?;

    let (status, body) = app.post("/api/profile", Some(&token), json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn profile_by_unknown_user_is_not_found() -> Result<()> {
    let app = TestApp::new()?;

    for uri in [
        "/api/profile/user/not-an-id",
        "/api/profile/user/5d8a1c2e-3f4b-4a6c-9d7e-8f9a0b1c2d3e",
    ] {
        let (status, body) = app.get(uri, None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "msg": "Profile not found" }));
    }
    Ok(())
}

#[tokio::test]
async fn experience_add_and_remove() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register("A", "a@x.com").await?;
    create_profile(&app, &token).await?;

    let (status, body) = app
        .put("/api/profile/experience", Some(&token), Some(json!({ "title": "Dev" })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let params: Vec<&str> = body["errors"]
        .as_array()
        .map(|errors| errors.iter().filter_map(|e| e["param"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(params, ["company", "from"]);

    let entry = json!({ "title": "Dev", "company": "Acme", "from": "2020-01-01" });
    app.put("/api/profile/experience", Some(&token), Some(entry)).await?;
    let (status, profile) = app
        .put(
            "/api/profile/experience",
            Some(&token),
            Some(json!({ "title": "Lead", "company": "Acme", "from": "2022-01-01", "current": true })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["experience"][0]["title"], "Lead");
    assert_eq!(profile["experience"][1]["title"], "Dev");

    let dev_id = profile["experience"][1]["id"].as_str().unwrap_or_default().to_string();
    let (status, profile) = app
        .delete(&format!("/api/profile/experience/{}", dev_id), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["experience"].as_array().map(Vec::len), Some(1));

    // Older clients remove with PUT; an unknown id changes nothing
    let (status, unchanged) = app
        .put("/api/profile/experience/not-an-id", Some(&token), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["experience"], profile["experience"]);
    Ok(())
}

#[tokio::test]
async fn education_add_and_remove() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register("A", "a@x.com").await?;
    create_profile(&app, &token).await?;

    let (status, profile) = app
        .put(
            "/api/profile/education",
            Some(&token),
            Some(json!({
                "school": "MIT",
                "degree": "BSc",
                "fieldofstudy": "CS",
                "from": "2010-09-01",
                "to": "2014-06-30"
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["education"][0]["school"], "MIT");
    assert_eq!(profile["education"][0]["to"], "2014-06-30");

    let edu_id = profile["education"][0]["id"].as_str().unwrap_or_default().to_string();
    let (status, profile) = app
        .delete(&format!("/api/profile/education/{}", edu_id), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["education"], json!([]));
    Ok(())
}

#[tokio::test]
async fn experience_without_profile_is_bad_request() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register("A", "a@x.com").await?;

    let (status, body) = app
        .put(
            "/api/profile/experience",
            Some(&token),
            Some(json!({ "title": "Dev", "company": "Acme", "from": "2020-01-01" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "msg": "There is no profile for this user" }));
    Ok(())
}

#[tokio::test]
async fn deleting_account_removes_profile_posts_and_user() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.register("A", "a@x.com").await?;
    let other = app.register("B", "b@x.com").await?;
    let user_id = app.user_id(&token).await?;
    create_profile(&app, &token).await?;
    app.post("/api/posts", Some(&token), json!({ "text": "bye" })).await?;

    let (status, body) = app.delete("/api/profile", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "User deleted" }));

    let (status, _) = app.get(&format!("/api/profile/user/{}", user_id), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, posts) = app.get("/api/posts", Some(&other)).await?;
    assert_eq!(posts, json!([]));

    // The token still verifies but its user is gone
    let (status, body) = app.get("/api/auth", Some(&token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "msg": "User not found" }));
    Ok(())
}

#[tokio::test]
async fn github_lookup_failure_is_reported() -> Result<()> {
    let app = TestApp::new()?;

    // The test config points GitHub at an unreachable local port
    let (status, body) = app.get("/api/profile/github/octocat", None).await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["msg"].is_string());
    Ok(())
}
