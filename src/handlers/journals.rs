use std::collections::BTreeMap;

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::journal::{
    content_metrics, CreateJournalRequest, JournalCategory, JournalEntry, JournalListItem,
    JournalListQuery, JournalStats, UpdateJournalRequest,
};
use crate::AppState;

const LIST_COLUMNS: &str = "id, user_id, title, mood, emotions, tags, category, is_private, \
                            is_favorite, is_archived, word_count, reading_time, created_at, updated_at";

pub async fn create_journal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateJournalRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;

    let (word_count, reading_time) = content_metrics(&body.content);

    let journal = sqlx::query_as::<_, JournalEntry>(
        r#"
        INSERT INTO journal_entries (id, user_id, title, content, mood, emotions, tags, category,
                                     is_private, word_count, reading_time, reminder_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.title)
    .bind(body.content)
    .bind(body.mood)
    .bind(body.emotions.unwrap_or_default())
    .bind(body.tags.unwrap_or_default())
    .bind(body.category.unwrap_or_default())
    .bind(body.is_private.unwrap_or(true))
    .bind(word_count)
    .bind(reading_time)
    .bind(body.reminder_date)
    .fetch_one(&state.db)
    .await
    .context("Failed to create journal entry")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Journal entry created successfully",
            "journal": journal,
        })),
    ))
}

pub async fn list_journals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<JournalListQuery>,
) -> AppResult<Json<Value>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 50);
    let offset = (page - 1) * limit;

    let tags: Option<Vec<String>> = query
        .tags
        .as_deref()
        .map(|csv| csv.split(',').map(str::to_string).collect());
    // favorites=false means "no filter", same as leaving it off
    let favorites = query.favorites.filter(|v| *v);

    let filter = r#"
        WHERE user_id = $1
          AND is_archived = false
          AND ($2::journal_category IS NULL OR category = $2)
          AND ($3::text[] IS NULL OR tags && $3)
          AND ($4::text IS NULL OR title ILIKE '%' || $4 || '%' OR content ILIKE '%' || $4 || '%')
          AND ($5::boolean IS NULL OR is_favorite = $5)
    "#;

    let journals = sqlx::query_as::<_, JournalListItem>(&format!(
        "SELECT {LIST_COLUMNS} FROM journal_entries {filter} ORDER BY created_at DESC LIMIT $6 OFFSET $7"
    ))
    .bind(auth_user.id)
    .bind(query.category)
    .bind(&tags)
    .bind(&query.search)
    .bind(favorites)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await
    .context("Failed to fetch journal entries")?;

    let total = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM journal_entries {filter}"
    ))
    .bind(auth_user.id)
    .bind(query.category)
    .bind(&tags)
    .bind(&query.search)
    .bind(favorites)
    .fetch_one(&state.db)
    .await
    .context("Failed to fetch journal entries")?;

    Ok(Json(json!({
        "journals": journals,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "pages": (total + limit - 1) / limit,
        },
    })))
}

pub async fn get_journal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let journal = sqlx::query_as::<_, JournalEntry>(
        "SELECT * FROM journal_entries WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await
    .context("Failed to fetch journal entry")?
    .ok_or(AppError::NotFound("Journal entry not found".into()))?;

    Ok(Json(json!({ "journal": journal })))
}

pub async fn update_journal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateJournalRequest>,
) -> AppResult<Json<Value>> {
    body.validate()?;

    // Metrics follow the content: untouched content keeps its stored counts
    let metrics = body.content.as_deref().map(content_metrics);

    let journal = sqlx::query_as::<_, JournalEntry>(
        r#"
        UPDATE journal_entries SET
            title = COALESCE($3, title),
            content = COALESCE($4, content),
            mood = COALESCE($5, mood),
            emotions = COALESCE($6, emotions),
            tags = COALESCE($7, tags),
            category = COALESCE($8, category),
            is_private = COALESCE($9, is_private),
            is_favorite = COALESCE($10, is_favorite),
            reminder_date = COALESCE($11, reminder_date),
            word_count = COALESCE($12, word_count),
            reading_time = COALESCE($13, reading_time),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(auth_user.id)
    .bind(body.title)
    .bind(body.content)
    .bind(body.mood)
    .bind(body.emotions)
    .bind(body.tags)
    .bind(body.category)
    .bind(body.is_private)
    .bind(body.is_favorite)
    .bind(body.reminder_date)
    .bind(metrics.map(|m| m.0))
    .bind(metrics.map(|m| m.1))
    .fetch_optional(&state.db)
    .await
    .context("Failed to update journal entry")?
    .ok_or(AppError::NotFound("Journal entry not found".into()))?;

    Ok(Json(json!({
        "message": "Journal entry updated successfully",
        "journal": journal,
    })))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let journal = sqlx::query_as::<_, JournalEntry>(
        r#"
        UPDATE journal_entries
        SET is_favorite = NOT is_favorite, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await
    .context("Failed to toggle favorite status")?
    .ok_or(AppError::NotFound("Journal entry not found".into()))?;

    let message = if journal.is_favorite {
        "Journal entry added to favorites"
    } else {
        "Journal entry removed from favorites"
    };

    Ok(Json(json!({ "message": message, "journal": journal })))
}

pub async fn archive_journal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let journal = sqlx::query_as::<_, JournalEntry>(
        r#"
        UPDATE journal_entries
        SET is_archived = true, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await
    .context("Failed to archive journal entry")?
    .ok_or(AppError::NotFound("Journal entry not found".into()))?;

    Ok(Json(json!({
        "message": "Journal entry archived successfully",
        "journal": journal,
    })))
}

pub async fn delete_journal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await
        .context("Failed to delete journal entry")?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Journal entry not found".into()));
    }

    Ok(Json(json!({ "message": "Journal entry deleted successfully" })))
}

#[derive(sqlx::FromRow)]
struct StatRow {
    category: JournalCategory,
    word_count: i32,
    reading_time: i32,
    is_favorite: bool,
}

/// All-time stats over non-archived entries.
pub async fn journal_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let rows = sqlx::query_as::<_, StatRow>(
        r#"
        SELECT category, word_count, reading_time, is_favorite
        FROM journal_entries
        WHERE user_id = $1 AND is_archived = false
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await
    .context("Failed to fetch journal statistics")?;

    let stats = if rows.is_empty() {
        JournalStats::empty()
    } else {
        let total_words: i64 = rows.iter().map(|r| i64::from(r.word_count)).sum();
        JournalStats {
            total_entries: rows.len() as i64,
            total_words,
            average_words_per_entry: total_words as f64 / rows.len() as f64,
            total_reading_time: rows.iter().map(|r| i64::from(r.reading_time)).sum(),
            favorite_count: rows.iter().filter(|r| r.is_favorite).count() as i64,
        }
    };

    let mut category_distribution: BTreeMap<&str, i64> = BTreeMap::new();
    for row in &rows {
        *category_distribution.entry(row.category.as_str()).or_insert(0) += 1;
    }

    Ok(Json(json!({
        "stats": stats,
        "categoryDistribution": category_distribution,
    })))
}
