use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::mood::MoodLabel;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_id: String,
    pub topic: ChatTopic,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_mood: Option<MoodLabel>,
    pub urgency: UrgencyLevel,
    pub context_tags: Vec<String>,
    pub ai_personality: AiPersonality,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_helpful: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_comment: Option<String>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    #[serde(skip_serializing)]
    pub seq: i64,
    pub role: MessageRole,
    pub content: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Session plus its messages, the detail view shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSessionDetail {
    #[serde(flatten)]
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
}

/// List view row, messages excluded.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatSessionListItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub session: ChatSession,
    pub message_count: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "chat_topic", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ChatTopic {
    General,
    Anxiety,
    Depression,
    Stress,
    Relationships,
    Work,
    Sleep,
    SelfCare,
    Goals,
    CopingStrategies,
    Therapy,
    Medication,
    Mindfulness,
    Exercise,
    Nutrition,
}

impl Default for ChatTopic {
    fn default() -> Self {
        Self::General
    }
}

impl ChatTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatTopic::General => "general",
            ChatTopic::Anxiety => "anxiety",
            ChatTopic::Depression => "depression",
            ChatTopic::Stress => "stress",
            ChatTopic::Relationships => "relationships",
            ChatTopic::Work => "work",
            ChatTopic::Sleep => "sleep",
            ChatTopic::SelfCare => "self-care",
            ChatTopic::Goals => "goals",
            ChatTopic::CopingStrategies => "coping-strategies",
            ChatTopic::Therapy => "therapy",
            ChatTopic::Medication => "medication",
            ChatTopic::Mindfulness => "mindfulness",
            ChatTopic::Exercise => "exercise",
            ChatTopic::Nutrition => "nutrition",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "urgency_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Crisis,
}

impl Default for UrgencyLevel {
    fn default() -> Self {
        Self::Low
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "ai_personality", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AiPersonality {
    Supportive,
    Professional,
    Casual,
    Empathetic,
}

impl Default for AiPersonality {
    fn default() -> Self {
        Self::Supportive
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "message_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Session context supplied at creation or update time.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    pub topic: Option<ChatTopic>,
    pub mood: Option<MoodLabel>,
    pub urgency: Option<UrgencyLevel>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub context: Option<ChatContext>,
    pub ai_personality: Option<AiPersonality>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddMessageRequest {
    pub role: MessageRole,

    #[validate(length(
        min = 1,
        max = 5000,
        message = "Content is required and cannot exceed 5000 characters"
    ))]
    pub content: String,

    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub context: Option<ChatContext>,

    #[validate(length(max = 500, message = "Summary cannot exceed 500 characters"))]
    pub summary: Option<String>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub helpful: bool,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,

    #[validate(length(max = 500, message = "Comment cannot exceed 500 characters"))]
    pub comment: Option<String>,
}

/// List filters; page and limit are clamped in the handler rather than rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub topic: Option<ChatTopic>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStats {
    pub total_sessions: i64,
    pub active_sessions: i64,
    pub total_messages: i64,
    pub average_rating: Option<f64>,
}

impl ChatStats {
    pub fn empty() -> Self {
        Self {
            total_sessions: 0,
            active_sessions: 0,
            total_messages: 0,
            average_rating: Some(0.0),
        }
    }
}
