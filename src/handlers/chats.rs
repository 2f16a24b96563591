use std::collections::BTreeMap;

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::analytics::mean;
use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::chat::{
    AddMessageRequest, ChatListQuery, ChatMessage, ChatSession, ChatSessionDetail,
    ChatSessionListItem, ChatStats, ChatTopic, CreateSessionRequest, FeedbackRequest, MessageRole,
    UpdateSessionRequest,
};
use crate::services::responder;
use crate::AppState;

const SESSION_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// External session handle, e.g. `session_1718031604123_k3jf8a2qz`.
fn new_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| SESSION_ID_ALPHABET[rng.gen_range(0..SESSION_ID_ALPHABET.len())] as char)
        .collect();
    format!("session_{}_{}", Utc::now().timestamp_millis(), suffix)
}

pub async fn create_session(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let context = body.context.unwrap_or_default();

    let chat = sqlx::query_as::<_, ChatSession>(
        r#"
        INSERT INTO chat_sessions (id, user_id, session_id, topic, context_mood, urgency,
                                   context_tags, ai_personality)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(new_session_id())
    .bind(context.topic.unwrap_or_default())
    .bind(context.mood)
    .bind(context.urgency.unwrap_or_default())
    .bind(context.tags.unwrap_or_default())
    .bind(body.ai_personality.unwrap_or_default())
    .fetch_one(&state.db)
    .await
    .context("Failed to create chat session")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Chat session created successfully",
            "chat": chat,
        })),
    ))
}

pub async fn add_message(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(session_id): Path<String>,
    Json(body): Json<AddMessageRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;

    let chat = sqlx::query_as::<_, ChatSession>(
        "SELECT * FROM chat_sessions WHERE session_id = $1 AND user_id = $2 AND is_active = true",
    )
    .bind(&session_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await
    .context("Failed to add message")?
    .ok_or(AppError::NotFound("Chat session not found or inactive".into()))?;

    let history_len = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM chat_messages WHERE session_id = $1",
    )
    .bind(chat.id)
    .fetch_one(&state.db)
    .await
    .context("Failed to add message")?;

    let chat_message = sqlx::query_as::<_, ChatMessage>(
        r#"
        INSERT INTO chat_messages (id, session_id, role, content, metadata)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(chat.id)
    .bind(body.role)
    .bind(&body.content)
    .bind(body.metadata.unwrap_or_else(|| json!({})))
    .fetch_one(&state.db)
    .await
    .context("Failed to add message")?;

    // A user turn gets an assistant reply in the same request
    let reply = if body.role == MessageRole::User {
        let text = responder::generate_reply(&body.content, history_len as usize);
        let reply = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (id, session_id, role, content, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(chat.id)
        .bind(MessageRole::Assistant)
        .bind(text)
        .bind(json!({}))
        .fetch_one(&state.db)
        .await
        .context("Failed to add message")?;
        Some(reply)
    } else {
        None
    };

    sqlx::query("UPDATE chat_sessions SET updated_at = NOW() WHERE id = $1")
        .bind(chat.id)
        .execute(&state.db)
        .await
        .context("Failed to add message")?;

    let response = match reply {
        Some(reply) => json!({
            "message": "Message added successfully",
            "chatMessage": chat_message,
            "reply": reply,
            "sessionId": chat.session_id,
        }),
        None => json!({
            "message": "Message added successfully",
            "chatMessage": chat_message,
            "sessionId": chat.session_id,
        }),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ChatListQuery>,
) -> AppResult<Json<Value>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 50);
    let offset = (page - 1) * limit;

    let chats = sqlx::query_as::<_, ChatSessionListItem>(
        r#"
        SELECT s.*,
               (SELECT COUNT(*) FROM chat_messages m WHERE m.session_id = s.id) AS message_count
        FROM chat_sessions s
        WHERE s.user_id = $1
          AND ($2::chat_topic IS NULL OR s.topic = $2)
          AND ($3::boolean IS NULL OR s.is_active = $3)
        ORDER BY s.updated_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(auth_user.id)
    .bind(query.topic)
    .bind(query.active)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await
    .context("Failed to fetch chat sessions")?;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM chat_sessions
        WHERE user_id = $1
          AND ($2::chat_topic IS NULL OR topic = $2)
          AND ($3::boolean IS NULL OR is_active = $3)
        "#,
    )
    .bind(auth_user.id)
    .bind(query.topic)
    .bind(query.active)
    .fetch_one(&state.db)
    .await
    .context("Failed to fetch chat sessions")?;

    Ok(Json(json!({
        "chats": chats,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "pages": (total + limit - 1) / limit,
        },
    })))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> AppResult<Json<Value>> {
    let session = sqlx::query_as::<_, ChatSession>(
        "SELECT * FROM chat_sessions WHERE session_id = $1 AND user_id = $2",
    )
    .bind(&session_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await
    .context("Failed to fetch chat session")?
    .ok_or(AppError::NotFound("Chat session not found".into()))?;

    let messages = sqlx::query_as::<_, ChatMessage>(
        "SELECT * FROM chat_messages WHERE session_id = $1 ORDER BY seq",
    )
    .bind(session.id)
    .fetch_all(&state.db)
    .await
    .context("Failed to fetch chat session")?;

    Ok(Json(json!({
        "chat": ChatSessionDetail { session, messages },
    })))
}

pub async fn update_session(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(session_id): Path<String>,
    Json(body): Json<UpdateSessionRequest>,
) -> AppResult<Json<Value>> {
    body.validate()?;

    let context = body.context.unwrap_or_default();

    let chat = sqlx::query_as::<_, ChatSession>(
        r#"
        UPDATE chat_sessions SET
            topic = COALESCE($3, topic),
            context_mood = COALESCE($4, context_mood),
            urgency = COALESCE($5, urgency),
            context_tags = COALESCE($6, context_tags),
            summary = COALESCE($7, summary),
            is_active = COALESCE($8, is_active),
            updated_at = NOW()
        WHERE session_id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(&session_id)
    .bind(auth_user.id)
    .bind(context.topic)
    .bind(context.mood)
    .bind(context.urgency)
    .bind(context.tags)
    .bind(body.summary)
    .bind(body.is_active)
    .fetch_optional(&state.db)
    .await
    .context("Failed to update chat session")?
    .ok_or(AppError::NotFound("Chat session not found".into()))?;

    Ok(Json(json!({
        "message": "Chat session updated successfully",
        "chat": chat,
    })))
}

/// Replaces any previous feedback wholesale.
pub async fn add_feedback(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(session_id): Path<String>,
    Json(body): Json<FeedbackRequest>,
) -> AppResult<Json<Value>> {
    body.validate()?;

    let chat = sqlx::query_as::<_, ChatSession>(
        r#"
        UPDATE chat_sessions SET
            feedback_helpful = $3,
            feedback_rating = $4,
            feedback_comment = $5,
            updated_at = NOW()
        WHERE session_id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(&session_id)
    .bind(auth_user.id)
    .bind(body.helpful)
    .bind(body.rating)
    .bind(body.comment)
    .fetch_optional(&state.db)
    .await
    .context("Failed to add feedback")?
    .ok_or(AppError::NotFound("Chat session not found".into()))?;

    Ok(Json(json!({
        "message": "Feedback added successfully",
        "chat": chat,
    })))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(session_id): Path<String>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM chat_sessions WHERE session_id = $1 AND user_id = $2")
        .bind(&session_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await
        .context("Failed to delete chat session")?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Chat session not found".into()));
    }

    Ok(Json(json!({ "message": "Chat session deleted successfully" })))
}

#[derive(sqlx::FromRow)]
struct StatRow {
    topic: ChatTopic,
    is_active: bool,
    feedback_rating: Option<i32>,
    message_count: i64,
}

pub async fn chat_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let rows = sqlx::query_as::<_, StatRow>(
        r#"
        SELECT s.topic, s.is_active, s.feedback_rating,
               (SELECT COUNT(*) FROM chat_messages m WHERE m.session_id = s.id) AS message_count
        FROM chat_sessions s
        WHERE s.user_id = $1
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await
    .context("Failed to fetch chat statistics")?;

    let stats = if rows.is_empty() {
        ChatStats::empty()
    } else {
        ChatStats {
            total_sessions: rows.len() as i64,
            active_sessions: rows.iter().filter(|r| r.is_active).count() as i64,
            total_messages: rows.iter().map(|r| r.message_count).sum(),
            average_rating: mean(rows.iter().filter_map(|r| r.feedback_rating.map(f64::from))),
        }
    };

    let mut topic_distribution: BTreeMap<&str, i64> = BTreeMap::new();
    for row in &rows {
        *topic_distribution.entry(row.topic.as_str()).or_insert(0) += 1;
    }

    Ok(Json(json!({
        "stats": stats,
        "topicDistribution": topic_distribution,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_have_the_expected_shape() {
        let id = new_session_id();
        let mut parts = id.splitn(3, '_');
        assert_eq!(parts.next(), Some("session"));

        let millis = parts.next().expect("timestamp part");
        assert!(millis.parse::<i64>().is_ok());

        let suffix = parts.next().expect("random part");
        assert_eq!(suffix.len(), 9);
        assert!(suffix
            .bytes()
            .all(|b| SESSION_ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn session_ids_do_not_collide() {
        let a = new_session_id();
        let b = new_session_id();
        assert_ne!(a, b);
    }
}
