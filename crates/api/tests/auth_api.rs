//! HTTP-level integration tests for the `/auth` endpoints.
//!
//! Covers registration, login, refresh-token rotation and logout.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, get, get_auth, login, post_json, post_json_auth, register,
    register_and_login, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;
use tracker_db::repositories::UserRepo;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Registering returns 201 with the public user fields only.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_success(pool: PgPool) {
    let json = register(build_test_app(pool.clone()), "testuser").await;

    assert!(json["id"].is_i64());
    assert_eq!(json["username"], "testuser");
    assert!(json.get("password").is_none());
    assert!(json.get("password_hash").is_none());
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 1);
}

/// A taken username is a field error and no second user is stored.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_duplicate_username(pool: PgPool) {
    register(build_test_app(pool.clone()), "testuser").await;

    let body = json!({ "username": "testuser", "password": "another" });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["fields"]["username"][0],
        "A user with that username already exists."
    );
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 1);
}

/// Missing username and password are both reported.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_missing_fields(pool: PgPool) {
    let response =
        post_json(build_test_app(pool.clone()), "/api/v1/auth/register", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["username"][0], "This field is required.");
    assert_eq!(json["fields"]["password"][0], "This field is required.");
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 0);
}

/// Usernames outside the allowed character set are rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_invalid_username(pool: PgPool) {
    let body = json!({ "username": "bad user!", "password": TEST_PASSWORD });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"]["username"].is_array());
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 0);
}

/// NUL characters in credentials are field errors rather than database errors.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_rejects_null_characters(pool: PgPool) {
    let app = || build_test_app(pool.clone());

    let body = json!({ "username": "nul\0user", "password": TEST_PASSWORD });
    let response = post_json(app(), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["username"][0], "Null characters are not allowed.");

    let body = json!({ "username": "testuser", "password": "pass\0word" });
    let response = post_json(app(), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["password"][0], "Null characters are not allowed.");

    assert_eq!(UserRepo::count(&pool).await.unwrap(), 0);
}

/// A body that is not JSON gets a JSON 400, not axum's plain-text rejection.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_malformed_body(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/register",
        json!("just a string"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Valid credentials return an access and a refresh token.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_success(pool: PgPool) {
    register(build_test_app(pool.clone()), "testuser").await;

    let json = login(build_test_app(pool), "testuser", TEST_PASSWORD).await;

    assert!(json["access"].is_string(), "response must contain access");
    assert!(json["refresh"].is_string(), "response must contain refresh");
    assert_eq!(json["expires_in"], 15 * 60);
}

/// A wrong password returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    register(build_test_app(pool.clone()), "testuser").await;

    let body = json!({ "username": "testuser", "password": "incorrect" });
    let response = post_json(build_test_app(pool), "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

/// An unknown username returns the same 401 as a wrong password.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_nonexistent_user(pool: PgPool) {
    let body = json!({ "username": "ghost", "password": "whatever" });
    let response = post_json(build_test_app(pool), "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login reports missing or unusable fields the same way register does.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_field_errors(pool: PgPool) {
    let app = || build_test_app(pool.clone());

    let response = post_json(app(), "/api/v1/auth/login", json!({ "username": "x" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"]["password"][0], "This field is required.");

    let body = json!({ "username": "ghost\0", "password": "whatever" });
    let response = post_json(app(), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["username"][0], "Null characters are not allowed.");
}

// ---------------------------------------------------------------------------
// Access tokens
// ---------------------------------------------------------------------------

/// A garbage bearer token is rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_invalid_access_token_rejected(pool: PgPool) {
    let response = get_auth(build_test_app(pool), "/api/v1/projects", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Tokens for a deleted account stop working.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_token_for_deleted_user_rejected(pool: PgPool) {
    let (user_id, token) = register_and_login(&pool, "testuser").await;
    assert!(UserRepo::delete(&pool, user_id).await.unwrap());

    let response = get_auth(build_test_app(pool), "/api/v1/projects", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A missing Authorization header returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_token_rejected(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/projects").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Refresh and logout
// ---------------------------------------------------------------------------

/// Refreshing rotates the refresh token; the old one cannot be reused.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_token_refresh_rotates(pool: PgPool) {
    register(build_test_app(pool.clone()), "testuser").await;
    let tokens = login(build_test_app(pool.clone()), "testuser", TEST_PASSWORD).await;
    let refresh = tokens["refresh"].as_str().unwrap();

    let body = json!({ "refresh": refresh });
    let response =
        post_json(build_test_app(pool.clone()), "/api/v1/auth/refresh", body.clone()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access"].is_string());
    assert_ne!(
        json["refresh"].as_str().unwrap(),
        refresh,
        "refresh token must rotate on use"
    );

    let reused = post_json(build_test_app(pool), "/api/v1/auth/refresh", body).await;
    assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);
}

/// Refreshing with an unknown token returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_with_invalid_token(pool: PgPool) {
    let body = json!({ "refresh": "not-a-real-token" });
    let response = post_json(build_test_app(pool), "/api/v1/auth/refresh", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Logout returns 204 and revokes outstanding refresh tokens.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_revokes_refresh_tokens(pool: PgPool) {
    register(build_test_app(pool.clone()), "testuser").await;
    let tokens = login(build_test_app(pool.clone()), "testuser", TEST_PASSWORD).await;
    let access = tokens["access"].as_str().unwrap();
    let refresh = tokens["refresh"].as_str().unwrap();

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/auth/logout",
        json!({}),
        access,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = json!({ "refresh": refresh });
    let response = post_json(build_test_app(pool), "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Logout requires authentication.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_requires_auth(pool: PgPool) {
    let response = post_json(build_test_app(pool), "/api/v1/auth/logout", json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
