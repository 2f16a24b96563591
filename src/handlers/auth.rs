use anyhow::Context;
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    jwt::create_token,
    middleware::AuthUser,
    password::{hash_password, verify_password},
};
use crate::error::{AppError, AppResult};
use crate::models::user::{LoginRequest, RegisterRequest, User, UserPreferences, UserProfile};
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;

    let email = body.email.to_lowercase();

    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE email = $1 OR username = $2",
    )
    .bind(&email)
    .bind(&body.username)
    .fetch_one(&state.db)
    .await
    .context("Failed to register user")?;

    if existing > 0 {
        return Err(AppError::Conflict(
            "User with this email or username already exists".into(),
        ));
    }

    let password_hash = hash_password(&body.password)?;
    let profile = body.profile.unwrap_or_default();

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, email, password_hash, first_name, last_name,
                           date_of_birth, gender, avatar, bio, timezone, preferences)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&body.username)
    .bind(&email)
    .bind(&password_hash)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(profile.date_of_birth)
    .bind(profile.gender)
    .bind(&profile.avatar)
    .bind(&profile.bio)
    .bind(profile.timezone.as_deref().unwrap_or("UTC"))
    .bind(sqlx::types::Json(UserPreferences::default()))
    .fetch_one(&state.db)
    .await
    .context("Failed to register user")?;

    let token = create_token(user.id, &user.email, &user.username, &state.config)?;

    tracing::info!(user_id = %user.id, username = %user.username, "New user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token": token,
            "user": UserProfile::from(user),
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<Value>> {
    body.validate()?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(body.email.to_lowercase())
        .fetch_optional(&state.db)
        .await
        .context("Failed to login")?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    if !verify_password(&body.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Failed login attempt");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    if !user.is_active {
        return Err(AppError::Unauthorized("Account is deactivated".into()));
    }

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET last_login_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .fetch_one(&state.db)
    .await
    .context("Failed to login")?;

    let token = create_token(user.id, &user.email, &user.username, &state.config)?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": UserProfile::from(user),
    })))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(auth_user.id)
        .fetch_optional(&state.db)
        .await
        .context("Failed to fetch user")?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(json!({ "user": UserProfile::from(user) })))
}
