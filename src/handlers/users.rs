use anyhow::Context;
use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    middleware::AuthUser,
    password::{hash_password, verify_password},
};
use crate::error::{AppError, AppResult};
use crate::models::user::{
    ChangePasswordRequest, DeleteAccountRequest, UpdatePreferencesRequest, UpdateProfileRequest,
    User, UserProfile,
};
use crate::AppState;

async fn fetch_user(db: &sqlx::PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let user = fetch_user(&state.db, auth_user.id)
        .await
        .context("Failed to get profile")?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(json!({ "user": UserProfile::from(user) })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<Value>> {
    body.validate()?;
    let patch = body.profile.unwrap_or_default();

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            date_of_birth = COALESCE($4, date_of_birth),
            gender = COALESCE($5, gender),
            avatar = COALESCE($6, avatar),
            bio = COALESCE($7, bio),
            timezone = COALESCE($8, timezone),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(auth_user.id)
    .bind(&patch.first_name)
    .bind(&patch.last_name)
    .bind(patch.date_of_birth)
    .bind(patch.gender)
    .bind(&patch.avatar)
    .bind(&patch.bio)
    .bind(&patch.timezone)
    .fetch_optional(&state.db)
    .await
    .context("Failed to update profile")?
    .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": UserProfile::from(user),
    })))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdatePreferencesRequest>,
) -> AppResult<Json<Value>> {
    let user = fetch_user(&state.db, auth_user.id)
        .await
        .context("Failed to update preferences")?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let mut prefs = user.preferences.0;
    if let Some(patch) = body.preferences {
        prefs.apply(patch);
    }

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET preferences = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(auth_user.id)
    .bind(sqlx::types::Json(&prefs))
    .fetch_one(&state.db)
    .await
    .context("Failed to update preferences")?;

    Ok(Json(json!({
        "message": "Preferences updated successfully",
        "user": UserProfile::from(user),
    })))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<Json<Value>> {
    body.validate()?;

    let user = fetch_user(&state.db, auth_user.id)
        .await
        .context("Failed to change password")?
        .ok_or(AppError::NotFound("User not found".into()))?;

    if !verify_password(&body.current_password, &user.password_hash)? {
        return Err(AppError::BadRequest("Invalid current password".into()));
    }

    let new_hash = hash_password(&body.new_password)?;

    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(auth_user.id)
        .bind(&new_hash)
        .execute(&state.db)
        .await
        .context("Failed to change password")?;

    tracing::info!(user_id = %auth_user.id, "Password changed");

    Ok(Json(json!({ "message": "Password updated successfully" })))
}

pub async fn deactivate_account(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    sqlx::query("UPDATE users SET is_active = false, updated_at = NOW() WHERE id = $1")
        .bind(auth_user.id)
        .execute(&state.db)
        .await
        .context("Failed to deactivate account")?;

    tracing::info!(user_id = %auth_user.id, "Account deactivated");

    Ok(Json(json!({ "message": "Account deactivated successfully" })))
}

/// Soft delete. The account is deactivated and drops out of every authenticated
/// surface, but rows stay behind for recovery.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<DeleteAccountRequest>,
) -> AppResult<Json<Value>> {
    body.validate()?;

    let user = fetch_user(&state.db, auth_user.id)
        .await
        .context("Failed to delete account")?
        .ok_or(AppError::NotFound("User not found".into()))?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::BadRequest("Invalid password".into()));
    }

    sqlx::query("UPDATE users SET is_active = false, updated_at = NOW() WHERE id = $1")
        .bind(auth_user.id)
        .execute(&state.db)
        .await
        .context("Failed to delete account")?;

    tracing::info!(user_id = %auth_user.id, "Account deleted");

    Ok(Json(json!({ "message": "Account deleted successfully" })))
}
