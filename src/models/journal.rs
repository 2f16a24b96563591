use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::mood::{EmotionTag, MoodLabel};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<MoodLabel>,
    pub emotions: Vec<EmotionTag>,
    pub tags: Vec<String>,
    pub category: JournalCategory,
    pub is_private: bool,
    pub is_favorite: bool,
    pub is_archived: bool,
    pub word_count: i32,
    pub reading_time: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List view row, excludes the full content.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JournalListItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<MoodLabel>,
    pub emotions: Vec<EmotionTag>,
    pub tags: Vec<String>,
    pub category: JournalCategory,
    pub is_private: bool,
    pub is_favorite: bool,
    pub is_archived: bool,
    pub word_count: i32,
    pub reading_time: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "journal_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JournalCategory {
    Daily,
    Gratitude,
    Goals,
    Reflection,
    Therapy,
    Dreams,
    Other,
}

impl Default for JournalCategory {
    fn default() -> Self {
        Self::Daily
    }
}

impl JournalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalCategory::Daily => "daily",
            JournalCategory::Gratitude => "gratitude",
            JournalCategory::Goals => "goals",
            JournalCategory::Reflection => "reflection",
            JournalCategory::Therapy => "therapy",
            JournalCategory::Dreams => "dreams",
            JournalCategory::Other => "other",
        }
    }
}

/// Word count and estimated reading time (200 words per minute), recomputed
/// whenever content changes.
pub fn content_metrics(content: &str) -> (i32, i32) {
    let words = content.split_whitespace().count();
    let reading_time = words.div_ceil(200);
    (words as i32, reading_time as i32)
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJournalRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title is required and cannot exceed 200 characters"
    ))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content is required and cannot exceed 10000 characters"
    ))]
    pub content: String,

    pub mood: Option<MoodLabel>,
    pub emotions: Option<Vec<EmotionTag>>,
    pub tags: Option<Vec<String>>,
    pub category: Option<JournalCategory>,
    pub is_private: Option<bool>,
    pub reminder_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJournalRequest {
    #[validate(length(max = 200, message = "Title cannot exceed 200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 10000, message = "Content cannot exceed 10000 characters"))]
    pub content: Option<String>,

    pub mood: Option<MoodLabel>,
    pub emotions: Option<Vec<EmotionTag>>,
    pub tags: Option<Vec<String>>,
    pub category: Option<JournalCategory>,
    pub is_private: Option<bool>,
    pub is_favorite: Option<bool>,
    pub reminder_date: Option<DateTime<Utc>>,
}

/// List filters; page and limit are clamped in the handler rather than rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<JournalCategory>,

    /// Comma-separated tag list; matches entries carrying any of them.
    pub tags: Option<String>,

    /// Case-insensitive substring match against title or content.
    pub search: Option<String>,

    pub favorites: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalStats {
    pub total_entries: i64,
    pub total_words: i64,
    pub average_words_per_entry: f64,
    pub total_reading_time: i64,
    pub favorite_count: i64,
}

impl JournalStats {
    pub fn empty() -> Self {
        Self {
            total_entries: 0,
            total_words: 0,
            average_words_per_entry: 0.0,
            total_reading_time: 0,
            favorite_count: 0,
        }
    }
}
