mod common;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::Duration;
use common::TestApp;
use serde_json::json;
use tourista_api::database::Collection;

#[tokio::test]
async fn root_and_health_respond() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.get("/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Welcome to TouristaTravels!"));

    let (status, body) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn issued_token_decodes_to_identity() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app
        .post("/jwt", None, json!({ "uid": "u1", "email": "u1@example.com" }))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().expect("token string");
    let claims = app.tokens.verify(token)?;
    assert_eq!(claims.uid, "u1");
    assert_eq!(claims.extra["email"], "u1@example.com");
    Ok(())
}

#[tokio::test]
async fn issued_token_with_audience_passes_the_guard() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app
        .post("/jwt", None, json!({ "uid": "u1", "aud": "tourista" }))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().expect("token string");
    let (status, body) = app.get("/my-service?uid=u1", Some(token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_json_not_found() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.get("/no-such-route", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["error"], true);
    Ok(())
}

#[tokio::test]
async fn token_without_identity_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.post("/jwt", None, json!({ "email": "x@example.com" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn missing_header_is_unauthenticated() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.post("/login", None, json!({ "uid": "u1" })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized Access");
    Ok(())
}

#[tokio::test]
async fn bad_token_is_forbidden() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app
        .post("/login", Some("definitely-not-a-jwt"), json!({ "uid": "u1" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access Forbidden");
    assert_eq!(app.stored(Collection::Users).await?, 0);
    Ok(())
}

#[tokio::test]
async fn expired_token_is_forbidden() -> Result<()> {
    let app = TestApp::with_ttl(Duration::seconds(-5));
    let token = app.token_for("u1");

    let (status, _) = app.get("/my-service?uid=u1", Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn login_records_user() -> Result<()> {
    let app = TestApp::new();
    let token = app.token_for("u1");

    let (status, body) = app
        .post("/login", Some(&token), json!({ "uid": "u1", "name": "Rafi" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["acknowledged"], true);
    assert!(body["insertedId"].is_string());
    assert_eq!(app.stored(Collection::Users).await?, 1);
    Ok(())
}
