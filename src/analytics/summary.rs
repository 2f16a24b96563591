use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::analytics::{mean, Period};
use crate::models::chat::ChatTopic;
use crate::models::journal::JournalCategory;
use crate::models::mood::{EmotionTag, MoodLabel};

/// Narrow projection the mood fold works over.
#[derive(Debug, FromRow)]
pub struct MoodAggRow {
    pub mood: MoodLabel,
    pub mood_score: i32,
    pub stress_level: Option<i32>,
    pub energy_level: Option<i32>,
    pub sleep_hours: Option<f32>,
    pub emotions: Vec<EmotionTag>,
}

#[derive(Debug, FromRow)]
struct JournalAggRow {
    category: JournalCategory,
    word_count: i32,
    is_favorite: bool,
}

#[derive(Debug, FromRow)]
struct ChatAggRow {
    topic: ChatTopic,
    feedback_rating: Option<i32>,
    message_count: i64,
}

/// Mood aggregate over a time window. The optional averages cover only the
/// entries where the field was recorded; with entries present but the field
/// never recorded they are omitted from the JSON, and with no entries at all
/// every average reports zero.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoodSummary {
    pub total_entries: i64,
    pub average_mood_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_stress_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_energy_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_sleep_hours: Option<f64>,
}

impl MoodSummary {
    pub fn empty() -> Self {
        Self {
            total_entries: 0,
            average_mood_score: 0.0,
            average_stress_level: Some(0.0),
            average_energy_level: Some(0.0),
            average_sleep_hours: Some(0.0),
        }
    }

    pub fn from_rows(rows: &[MoodAggRow]) -> Self {
        if rows.is_empty() {
            return Self::empty();
        }
        let score_sum: f64 = rows.iter().map(|r| f64::from(r.mood_score)).sum();
        Self {
            total_entries: rows.len() as i64,
            average_mood_score: score_sum / rows.len() as f64,
            average_stress_level: mean(rows.iter().filter_map(|r| r.stress_level.map(f64::from))),
            average_energy_level: mean(rows.iter().filter_map(|r| r.energy_level.map(f64::from))),
            average_sleep_hours: mean(rows.iter().filter_map(|r| r.sleep_hours.map(f64::from))),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalSummary {
    pub total_entries: i64,
    pub total_words: i64,
    pub average_words_per_entry: f64,
    pub favorite_count: i64,
}

impl JournalSummary {
    fn empty() -> Self {
        Self {
            total_entries: 0,
            total_words: 0,
            average_words_per_entry: 0.0,
            favorite_count: 0,
        }
    }

    fn from_rows(rows: &[JournalAggRow]) -> Self {
        if rows.is_empty() {
            return Self::empty();
        }
        let total_words: i64 = rows.iter().map(|r| i64::from(r.word_count)).sum();
        Self {
            total_entries: rows.len() as i64,
            total_words,
            average_words_per_entry: total_words as f64 / rows.len() as f64,
            favorite_count: rows.iter().filter(|r| r.is_favorite).count() as i64,
        }
    }
}

/// `average_rating` stays null when sessions exist but none were rated.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub total_sessions: i64,
    pub total_messages: i64,
    pub average_rating: Option<f64>,
}

impl ChatSummary {
    fn empty() -> Self {
        Self {
            total_sessions: 0,
            total_messages: 0,
            average_rating: Some(0.0),
        }
    }

    fn from_rows(rows: &[ChatAggRow]) -> Self {
        if rows.is_empty() {
            return Self::empty();
        }
        Self {
            total_sessions: rows.len() as i64,
            total_messages: rows.iter().map(|r| r.message_count).sum(),
            average_rating: mean(rows.iter().filter_map(|r| r.feedback_rating.map(f64::from))),
        }
    }
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentMood {
    pub id: Uuid,
    pub mood: MoodLabel,
    pub mood_score: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentJournal {
    pub id: Uuid,
    pub title: String,
    pub category: JournalCategory,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentChat {
    pub id: Uuid,
    pub session_id: String,
    pub topic: ChatTopic,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SummarySection {
    pub mood: MoodSummary,
    pub journal: JournalSummary,
    pub chat: ChatSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Distributions {
    pub mood: BTreeMap<String, i64>,
    pub emotions: BTreeMap<String, i64>,
    pub journal_categories: BTreeMap<String, i64>,
    pub chat_topics: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct RecentActivity {
    pub moods: Vec<RecentMood>,
    pub journals: Vec<RecentJournal>,
    pub chats: Vec<RecentChat>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub period: Period,
    pub summary: SummarySection,
    pub distributions: Distributions,
    pub recent_activity: RecentActivity,
}

/// Frequency map over categorical keys, ordered for stable output.
fn tally<'a, I>(keys: I) -> BTreeMap<String, i64>
where
    I: Iterator<Item = &'a str>,
{
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }
    counts
}

pub fn mood_distribution(rows: &[MoodAggRow]) -> BTreeMap<String, i64> {
    tally(rows.iter().map(|r| r.mood.as_str()))
}

/// Flattens every entry's emotion list into one frequency map.
pub fn emotion_frequency(rows: &[MoodAggRow]) -> BTreeMap<String, i64> {
    tally(rows.iter().flat_map(|r| r.emotions.iter().map(|e| e.as_str())))
}

pub async fn fetch_mood_rows(
    db: &PgPool,
    user_id: Uuid,
    start: DateTime<Utc>,
) -> Result<Vec<MoodAggRow>, sqlx::Error> {
    sqlx::query_as::<_, MoodAggRow>(
        r#"
        SELECT mood, mood_score, stress_level, energy_level, sleep_hours, emotions
        FROM mood_entries
        WHERE user_id = $1 AND created_at >= $2
        "#,
    )
    .bind(user_id)
    .bind(start)
    .fetch_all(db)
    .await
}

async fn fetch_journal_rows(
    db: &PgPool,
    user_id: Uuid,
    start: DateTime<Utc>,
) -> Result<Vec<JournalAggRow>, sqlx::Error> {
    sqlx::query_as::<_, JournalAggRow>(
        r#"
        SELECT category, word_count, is_favorite
        FROM journal_entries
        WHERE user_id = $1 AND created_at >= $2 AND is_archived = false
        "#,
    )
    .bind(user_id)
    .bind(start)
    .fetch_all(db)
    .await
}

async fn fetch_chat_rows(
    db: &PgPool,
    user_id: Uuid,
    start: DateTime<Utc>,
) -> Result<Vec<ChatAggRow>, sqlx::Error> {
    sqlx::query_as::<_, ChatAggRow>(
        r#"
        SELECT s.topic, s.feedback_rating,
               (SELECT COUNT(*) FROM chat_messages m WHERE m.session_id = s.id) AS message_count
        FROM chat_sessions s
        WHERE s.user_id = $1 AND s.created_at >= $2
        "#,
    )
    .bind(user_id)
    .bind(start)
    .fetch_all(db)
    .await
}

async fn fetch_recent_moods(
    db: &PgPool,
    user_id: Uuid,
    start: DateTime<Utc>,
) -> Result<Vec<RecentMood>, sqlx::Error> {
    sqlx::query_as::<_, RecentMood>(
        r#"
        SELECT id, mood, mood_score, created_at
        FROM mood_entries
        WHERE user_id = $1 AND created_at >= $2
        ORDER BY created_at DESC
        LIMIT 5
        "#,
    )
    .bind(user_id)
    .bind(start)
    .fetch_all(db)
    .await
}

async fn fetch_recent_journals(
    db: &PgPool,
    user_id: Uuid,
    start: DateTime<Utc>,
) -> Result<Vec<RecentJournal>, sqlx::Error> {
    sqlx::query_as::<_, RecentJournal>(
        r#"
        SELECT id, title, category, created_at
        FROM journal_entries
        WHERE user_id = $1 AND created_at >= $2 AND is_archived = false
        ORDER BY created_at DESC
        LIMIT 5
        "#,
    )
    .bind(user_id)
    .bind(start)
    .fetch_all(db)
    .await
}

async fn fetch_recent_chats(
    db: &PgPool,
    user_id: Uuid,
    start: DateTime<Utc>,
) -> Result<Vec<RecentChat>, sqlx::Error> {
    sqlx::query_as::<_, RecentChat>(
        r#"
        SELECT id, session_id, topic, updated_at
        FROM chat_sessions
        WHERE user_id = $1 AND created_at >= $2
        ORDER BY updated_at DESC
        LIMIT 3
        "#,
    )
    .bind(user_id)
    .bind(start)
    .fetch_all(db)
    .await
}

/// Runs the three per-kind aggregations and the recent-activity fetches
/// concurrently; any single failure aborts the whole response.
pub async fn dashboard_summary(
    db: &PgPool,
    user_id: Uuid,
    period: Period,
    now: DateTime<Utc>,
) -> Result<DashboardSummary, sqlx::Error> {
    let start = period.start_from(now);

    let (mood_rows, journal_rows, chat_rows, recent_moods, recent_journals, recent_chats) =
        tokio::try_join!(
            fetch_mood_rows(db, user_id, start),
            fetch_journal_rows(db, user_id, start),
            fetch_chat_rows(db, user_id, start),
            fetch_recent_moods(db, user_id, start),
            fetch_recent_journals(db, user_id, start),
            fetch_recent_chats(db, user_id, start),
        )?;

    Ok(DashboardSummary {
        period,
        summary: SummarySection {
            mood: MoodSummary::from_rows(&mood_rows),
            journal: JournalSummary::from_rows(&journal_rows),
            chat: ChatSummary::from_rows(&chat_rows),
        },
        distributions: Distributions {
            mood: mood_distribution(&mood_rows),
            emotions: emotion_frequency(&mood_rows),
            journal_categories: tally(journal_rows.iter().map(|r| r.category.as_str())),
            chat_topics: tally(chat_rows.iter().map(|r| r.topic.as_str())),
        },
        recent_activity: RecentActivity {
            moods: recent_moods,
            journals: recent_journals,
            chats: recent_chats,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mood_row(score: i32, stress: Option<i32>, sleep: Option<f32>) -> MoodAggRow {
        MoodAggRow {
            mood: MoodLabel::Neutral,
            mood_score: score,
            stress_level: stress,
            energy_level: None,
            sleep_hours: sleep,
            emotions: vec![],
        }
    }

    #[test]
    fn empty_rows_report_zeroes_not_nulls() {
        let mood = MoodSummary::from_rows(&[]);
        assert_eq!(mood, MoodSummary::empty());

        let json = serde_json::to_value(&mood).unwrap();
        assert_eq!(json["totalEntries"], 0);
        assert_eq!(json["averageMoodScore"], 0.0);
        assert_eq!(json["averageStressLevel"], 0.0);
        assert_eq!(json["averageSleepHours"], 0.0);

        let chat = ChatSummary::from_rows(&[]);
        assert_eq!(serde_json::to_value(&chat).unwrap()["averageRating"], 0.0);
    }

    #[test]
    fn mood_score_mean_covers_all_entries() {
        let rows = vec![
            mood_row(1, None, None),
            mood_row(3, None, None),
            mood_row(5, None, None),
        ];
        let summary = MoodSummary::from_rows(&rows);
        assert_eq!(summary.total_entries, 3);
        assert_eq!(summary.average_mood_score, 3.0);
    }

    #[test]
    fn optional_means_skip_entries_missing_the_field() {
        let rows = vec![
            mood_row(3, Some(4), None),
            mood_row(3, Some(6), None),
            mood_row(3, None, None),
        ];
        let summary = MoodSummary::from_rows(&rows);
        assert_eq!(summary.average_stress_level, Some(5.0));
        assert_eq!(summary.average_sleep_hours, None);

        // a never-recorded field disappears from the JSON instead of lying
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("averageSleepHours").is_none());
    }

    #[test]
    fn journal_summary_sums_words_and_favorites() {
        let rows = vec![
            JournalAggRow {
                category: JournalCategory::Daily,
                word_count: 100,
                is_favorite: true,
            },
            JournalAggRow {
                category: JournalCategory::Gratitude,
                word_count: 300,
                is_favorite: false,
            },
        ];
        let summary = JournalSummary::from_rows(&rows);
        assert_eq!(summary.total_entries, 2);
        assert_eq!(summary.total_words, 400);
        assert_eq!(summary.average_words_per_entry, 200.0);
        assert_eq!(summary.favorite_count, 1);
    }

    #[test]
    fn unrated_sessions_leave_rating_null() {
        let rated = |rating: Option<i32>| ChatAggRow {
            topic: ChatTopic::General,
            feedback_rating: rating,
            message_count: 4,
        };

        let summary = ChatSummary::from_rows(&[rated(None), rated(None)]);
        assert_eq!(summary.total_sessions, 2);
        assert_eq!(summary.total_messages, 8);
        assert_eq!(summary.average_rating, None);
        assert_eq!(
            serde_json::to_value(&summary).unwrap()["averageRating"],
            serde_json::Value::Null
        );

        let summary = ChatSummary::from_rows(&[rated(Some(2)), rated(Some(4)), rated(None)]);
        assert_eq!(summary.average_rating, Some(3.0));
    }

    #[test]
    fn emotion_frequency_flattens_across_entries() {
        let mut a = mood_row(4, None, None);
        a.emotions = vec![EmotionTag::Calm, EmotionTag::Grateful];
        let mut b = mood_row(2, None, None);
        b.emotions = vec![EmotionTag::Calm, EmotionTag::Anxious];

        let freq = emotion_frequency(&[a, b]);
        assert_eq!(freq.get("calm"), Some(&2));
        assert_eq!(freq.get("grateful"), Some(&1));
        assert_eq!(freq.get("anxious"), Some(&1));
        assert_eq!(freq.len(), 3);
    }

    #[test]
    fn distributions_count_by_label() {
        let mut sad = mood_row(1, None, None);
        sad.mood = MoodLabel::VerySad;
        let rows = vec![mood_row(3, None, None), sad, mood_row(3, None, None)];

        let dist = mood_distribution(&rows);
        assert_eq!(dist.get("neutral"), Some(&2));
        assert_eq!(dist.get("very-sad"), Some(&1));
    }
}
