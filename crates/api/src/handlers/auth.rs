//! Handlers for the `/auth` resource (register, login, refresh, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracker_core::error::CoreError;
use tracker_core::types::DbId;
use tracker_core::validation::{
    validate_no_nul, validate_username, MSG_USERNAME_TAKEN, USERNAME_MAX_LENGTH,
};
use tracker_db::models::session::CreateSession;
use tracker_db::models::user::{CreateUser, UserResponse};
use tracker_db::repositories::user_repo::USERNAME_UNIQUE_CONSTRAINT;
use tracker_db::repositories::{SessionRepo, UserRepo};
use validator::Validate;

use crate::auth::jwt::{hash_refresh_token, RefreshToken};
use crate::auth::password::{burn_verification, hash_password, verify_password};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Returned for both unknown usernames and wrong passwords.
const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "This field is required."),
        length(
            min = 1,
            max = USERNAME_MAX_LENGTH,
            message = "Ensure this field has between 1 and 150 characters."
        ),
        custom(function = "validate_username")
    )]
    pub username: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(min = 1, message = "This field may not be blank."),
        custom(function = "validate_no_nul")
    )]
    pub password: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required(message = "This field is required."), custom(function = "validate_no_nul"))]
    pub username: Option<String>,
    #[validate(required(message = "This field is required."), custom(function = "validate_no_nul"))]
    pub password: Option<String>,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(required(message = "This field is required."), custom(function = "validate_no_nul"))]
    pub refresh: Option<String>,
}

/// Token pair returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account. Returns the public `{id, username}` with 201 Created,
/// or 400 with per-field errors (missing fields, bad characters, taken
/// username).
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let username = input.username.unwrap_or_default();
    let password = input.password.unwrap_or_default();

    if UserRepo::find_by_username(&state.pool, &username)
        .await?
        .is_some()
    {
        return Err(CoreError::field("username", MSG_USERNAME_TAKEN).into());
    }

    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create_dto = CreateUser {
        username,
        password_hash,
    };

    // A concurrent registration can still win the race past the pre-check.
    let user = UserRepo::create(&state.pool, &create_dto)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, USERNAME_UNIQUE_CONSTRAINT) {
                AppError::Core(CoreError::field("username", MSG_USERNAME_TAKEN))
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let username = input.username.unwrap_or_default();
    let password = input.password.unwrap_or_default();

    let Some(user) = UserRepo::find_by_username(&state.pool, &username).await? else {
        burn_verification(&password);
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    };

    let password_valid = verify_password(&password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        tracing::debug!(user_id = user.id, "Rejected login with wrong password");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    let response = issue_tokens(&state, user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens. The
/// presented refresh token is revoked (rotation).
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token_hash = hash_refresh_token(input.refresh.as_deref().unwrap_or_default());

    let session = SessionRepo::find_active_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(invalid_refresh)?;

    // Losing this race means a concurrent request already rotated the token.
    if !SessionRepo::revoke(&state.pool, session.id).await? {
        return Err(invalid_refresh());
    }

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let response = issue_tokens(&state, user.id).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all refresh tokens for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Issue an access token plus a refresh token backed by a new session row.
async fn issue_tokens(state: &AppState, user_id: DbId) -> AppResult<TokenResponse> {
    let access = state
        .tokens
        .issue(user_id)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let refresh = RefreshToken::generate();
    let session_ttl = chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id,
            refresh_token_hash: refresh.hash,
            expires_at: Utc::now() + session_ttl,
        },
    )
    .await?;

    Ok(TokenResponse {
        access,
        refresh: refresh.plaintext,
        expires_in: state.tokens.ttl_secs(),
    })
}

fn invalid_refresh() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid or expired refresh token".into(),
    ))
}
