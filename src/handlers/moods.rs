use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::analytics::summary::{fetch_mood_rows, mood_distribution, MoodSummary};
use crate::analytics::Period;
use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::mood::{CreateMoodRequest, MoodEntry, MoodListQuery, UpdateMoodRequest};
use crate::AppState;

pub async fn create_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateMoodRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;

    let mood = sqlx::query_as::<_, MoodEntry>(
        r#"
        INSERT INTO mood_entries (id, user_id, mood, mood_score, emotions, activities, triggers,
                                  notes, weather, sleep_hours, stress_level, energy_level,
                                  social_interaction, location, is_private, tags)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.mood)
    .bind(body.mood_score)
    .bind(body.emotions.unwrap_or_default())
    .bind(body.activities.unwrap_or_default())
    .bind(body.triggers.unwrap_or_default())
    .bind(body.notes)
    .bind(body.weather)
    .bind(body.sleep_hours)
    .bind(body.stress_level)
    .bind(body.energy_level)
    .bind(body.social_interaction)
    .bind(body.location)
    .bind(body.is_private.unwrap_or(false))
    .bind(body.tags.unwrap_or_default())
    .fetch_one(&state.db)
    .await
    .context("Failed to create mood entry")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Mood entry created successfully",
            "mood": mood,
        })),
    ))
}

pub async fn list_moods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodListQuery>,
) -> AppResult<Json<Value>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    let moods = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1
          AND ($2::timestamptz IS NULL OR created_at >= $2)
          AND ($3::timestamptz IS NULL OR created_at <= $3)
          AND ($4::mood_label IS NULL OR mood = $4)
        ORDER BY created_at DESC
        LIMIT $5 OFFSET $6
        "#,
    )
    .bind(auth_user.id)
    .bind(query.start_date)
    .bind(query.end_date)
    .bind(query.mood)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await
    .context("Failed to fetch mood entries")?;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM mood_entries
        WHERE user_id = $1
          AND ($2::timestamptz IS NULL OR created_at >= $2)
          AND ($3::timestamptz IS NULL OR created_at <= $3)
          AND ($4::mood_label IS NULL OR mood = $4)
        "#,
    )
    .bind(auth_user.id)
    .bind(query.start_date)
    .bind(query.end_date)
    .bind(query.mood)
    .fetch_one(&state.db)
    .await
    .context("Failed to fetch mood entries")?;

    Ok(Json(json!({
        "moods": moods,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "pages": (total + limit - 1) / limit,
        },
    })))
}

#[derive(Debug, Deserialize)]
pub struct MoodStatsQuery {
    pub period: Option<String>,
}

pub async fn mood_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodStatsQuery>,
) -> AppResult<Json<Value>> {
    let period = match query.period.as_deref() {
        Some(raw) => raw.parse::<Period>().map_err(|_| {
            AppError::Validation(vec![json!({
                "msg": "Period must be week, month, quarter, or year",
                "path": "period",
                "location": "query",
            })])
        })?,
        None => Period::default(),
    };

    let start = period.start_from(Utc::now());
    let rows = fetch_mood_rows(&state.db, auth_user.id, start)
        .await
        .context("Failed to fetch mood stats")?;

    Ok(Json(json!({
        "period": period,
        "stats": MoodSummary::from_rows(&rows),
        "moodDistribution": mood_distribution(&rows),
    })))
}

pub async fn get_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let mood = sqlx::query_as::<_, MoodEntry>(
        "SELECT * FROM mood_entries WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await
    .context("Failed to fetch mood entry")?
    .ok_or(AppError::NotFound("Mood entry not found".into()))?;

    Ok(Json(json!({ "mood": mood })))
}

pub async fn update_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMoodRequest>,
) -> AppResult<Json<Value>> {
    body.validate()?;

    let mood = sqlx::query_as::<_, MoodEntry>(
        r#"
        UPDATE mood_entries SET
            mood = COALESCE($3, mood),
            mood_score = COALESCE($4, mood_score),
            emotions = COALESCE($5, emotions),
            activities = COALESCE($6, activities),
            triggers = COALESCE($7, triggers),
            notes = COALESCE($8, notes),
            weather = COALESCE($9, weather),
            sleep_hours = COALESCE($10, sleep_hours),
            stress_level = COALESCE($11, stress_level),
            energy_level = COALESCE($12, energy_level),
            social_interaction = COALESCE($13, social_interaction),
            location = COALESCE($14, location),
            is_private = COALESCE($15, is_private),
            tags = COALESCE($16, tags),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(auth_user.id)
    .bind(body.mood)
    .bind(body.mood_score)
    .bind(body.emotions)
    .bind(body.activities)
    .bind(body.triggers)
    .bind(body.notes)
    .bind(body.weather)
    .bind(body.sleep_hours)
    .bind(body.stress_level)
    .bind(body.energy_level)
    .bind(body.social_interaction)
    .bind(body.location)
    .bind(body.is_private)
    .bind(body.tags)
    .fetch_optional(&state.db)
    .await
    .context("Failed to update mood entry")?
    .ok_or(AppError::NotFound("Mood entry not found".into()))?;

    Ok(Json(json!({
        "message": "Mood entry updated successfully",
        "mood": mood,
    })))
}

pub async fn delete_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM mood_entries WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await
        .context("Failed to delete mood entry")?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Mood entry not found".into()));
    }

    Ok(Json(json!({ "message": "Mood entry deleted successfully" })))
}
