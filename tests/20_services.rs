mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use tourista_api::database::Collection;

async fn seed_services(app: &TestApp, uid: &str, days: std::ops::RangeInclusive<u32>) -> Result<()> {
    let token = app.token_for(uid);
    for day in days {
        let (status, _) = app
            .post(
                &format!("/services?uid={}", uid),
                Some(&token),
                json!({
                    "name": format!("Tour {}", day),
                    "createBy": uid,
                    "createAt": format!("2024-03-{:02}T10:00:00Z", day),
                }),
            )
            .await?;
        assert_eq!(status, StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn limit_returns_bare_array_newest_first() -> Result<()> {
    let app = TestApp::new();
    seed_services(&app, "u1", 1..=5).await?;

    let (status, body) = app.get("/services?limit=3", None).await?;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body
        .as_array()
        .expect("bare array")
        .iter()
        .map(|s| s["name"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["Tour 5", "Tour 4", "Tour 3"]);
    Ok(())
}

#[tokio::test]
async fn page_and_size_return_count_and_slice() -> Result<()> {
    let app = TestApp::new();
    seed_services(&app, "u1", 1..=5).await?;

    let (status, body) = app.get("/services?page=1&size=2", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);

    let result = body["result"].as_array().expect("result array");
    assert_eq!(result.len(), 2);
    assert_eq!(result[0]["name"], "Tour 3");
    assert_eq!(result[1]["name"], "Tour 2");

    let (_, last) = app.get("/services?page=2&size=2", None).await?;
    assert_eq!(last["result"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn invalid_paging_numbers_are_bad_requests() -> Result<()> {
    let app = TestApp::new();
    let (status, _) = app.get("/services?page=first&size=2", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn service_lookup_by_id() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("u1");

    let (_, created) = app
        .post("/add-service?uid=u1", Some(&token), json!({ "name": "Cox's Bazar" }))
        .await?;
    let id = created["insertedId"].as_str().expect("inserted id").to_string();

    let (status, service) = app.get(&format!("/service/{}", id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(service["name"], "Cox's Bazar");
    assert_eq!(service["_id"], id.as_str());
    assert_eq!(service["createBy"], "u1");
    assert!(service["createAt"].is_string());

    let (status, missing) = app
        .get("/service/5d2f0a4e-9a55-4c1c-8a57-1a1c1f0e2b3d", None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(missing.is_null());

    let (status, _) = app.get("/service/not-an-id", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn my_service_lists_only_callers_services() -> Result<()> {
    let app = TestApp::new();
    seed_services(&app, "u1", 1..=2).await?;
    seed_services(&app, "u2", 3..=3).await?;

    let token = app.token_for("u1");
    let (status, body) = app.get("/my-service?uid=u1", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["result"][0]["name"], "Tour 2");
    Ok(())
}

#[tokio::test]
async fn foreign_uid_is_forbidden_without_side_effects() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("u1");

    let (status, body) = app
        .post("/services?uid=u2", Some(&token), json!({ "name": "Hijack" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access Forbidden");
    assert_eq!(app.stored(Collection::Services).await?, 0);

    let (status, _) = app.get("/my-service?uid=u2", Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/my-service", Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn creator_is_the_verified_caller() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("u1");

    let (status, _) = app
        .post("/services?uid=u1", Some(&token), json!({ "name": "Forged", "createBy": "u2" }))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, mine) = app.get("/my-service?uid=u1", Some(&token)).await?;
    assert_eq!(mine["count"], 1);
    assert_eq!(mine["result"][0]["createBy"], "u1");
    Ok(())
}

#[tokio::test]
async fn creating_a_service_requires_a_token() -> Result<()> {
    let app = TestApp::new();
    let (status, _) = app
        .post("/services?uid=u1", None, json!({ "name": "Anonymous" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.stored(Collection::Services).await?, 0);
    Ok(())
}
