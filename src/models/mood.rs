use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgHasArrayType, PgTypeInfo};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: MoodLabel,
    pub mood_score: i32,
    pub emotions: Vec<EmotionTag>,
    pub activities: Vec<ActivityTag>,
    pub triggers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_interaction: Option<SocialLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationKind>,
    pub is_private: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "mood_label", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum MoodLabel {
    VerySad,
    Sad,
    Neutral,
    Happy,
    VeryHappy,
}

impl MoodLabel {
    /// Key used in the mood distribution map ("very-sad", "happy", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLabel::VerySad => "very-sad",
            MoodLabel::Sad => "sad",
            MoodLabel::Neutral => "neutral",
            MoodLabel::Happy => "happy",
            MoodLabel::VeryHappy => "very-happy",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "emotion_tag", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum EmotionTag {
    Anxious,
    Stressed,
    Overwhelmed,
    Depressed,
    Lonely,
    Angry,
    Frustrated,
    Confused,
    Tired,
    Energetic,
    Calm,
    Peaceful,
    Grateful,
    Hopeful,
    Excited,
    Confident,
    Loved,
    Proud,
    Content,
    Motivated,
}

impl EmotionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionTag::Anxious => "anxious",
            EmotionTag::Stressed => "stressed",
            EmotionTag::Overwhelmed => "overwhelmed",
            EmotionTag::Depressed => "depressed",
            EmotionTag::Lonely => "lonely",
            EmotionTag::Angry => "angry",
            EmotionTag::Frustrated => "frustrated",
            EmotionTag::Confused => "confused",
            EmotionTag::Tired => "tired",
            EmotionTag::Energetic => "energetic",
            EmotionTag::Calm => "calm",
            EmotionTag::Peaceful => "peaceful",
            EmotionTag::Grateful => "grateful",
            EmotionTag::Hopeful => "hopeful",
            EmotionTag::Excited => "excited",
            EmotionTag::Confident => "confident",
            EmotionTag::Loved => "loved",
            EmotionTag::Proud => "proud",
            EmotionTag::Content => "content",
            EmotionTag::Motivated => "motivated",
        }
    }
}

impl PgHasArrayType for EmotionTag {
    fn array_type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("_emotion_tag")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "activity_tag", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ActivityTag {
    Work,
    Exercise,
    Socializing,
    FamilyTime,
    Hobbies,
    Meditation,
    Reading,
    Music,
    Movies,
    Cooking,
    Shopping,
    Traveling,
    Studying,
    Gaming,
    Sleeping,
    Eating,
    Therapy,
    Volunteering,
    Nature,
    Art,
}

impl PgHasArrayType for ActivityTag {
    fn array_type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("_activity_tag")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "weather_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Stormy,
    Foggy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "social_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SocialLevel {
    None,
    Minimal,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "location_kind", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum LocationKind {
    Home,
    Work,
    School,
    Outdoors,
    SocialVenue,
    Other,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMoodRequest {
    pub mood: MoodLabel,

    #[validate(range(min = 1, max = 5, message = "Mood score must be between 1 and 5"))]
    pub mood_score: i32,

    pub emotions: Option<Vec<EmotionTag>>,
    pub activities: Option<Vec<ActivityTag>>,
    pub triggers: Option<Vec<String>>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    pub weather: Option<WeatherKind>,

    #[validate(range(min = 0.0, max = 24.0, message = "Sleep hours must be between 0 and 24"))]
    pub sleep_hours: Option<f32>,

    #[validate(range(min = 1, max = 10, message = "Stress level must be between 1 and 10"))]
    pub stress_level: Option<i32>,

    #[validate(range(min = 1, max = 10, message = "Energy level must be between 1 and 10"))]
    pub energy_level: Option<i32>,

    pub social_interaction: Option<SocialLevel>,
    pub location: Option<LocationKind>,
    pub is_private: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// Partial update for PUT /api/moods/:id; every field is optional.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMoodRequest {
    pub mood: Option<MoodLabel>,

    #[validate(range(min = 1, max = 5, message = "Mood score must be between 1 and 5"))]
    pub mood_score: Option<i32>,

    pub emotions: Option<Vec<EmotionTag>>,
    pub activities: Option<Vec<ActivityTag>>,
    pub triggers: Option<Vec<String>>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    pub weather: Option<WeatherKind>,

    #[validate(range(min = 0.0, max = 24.0, message = "Sleep hours must be between 0 and 24"))]
    pub sleep_hours: Option<f32>,

    #[validate(range(min = 1, max = 10, message = "Stress level must be between 1 and 10"))]
    pub stress_level: Option<i32>,

    #[validate(range(min = 1, max = 10, message = "Energy level must be between 1 and 10"))]
    pub energy_level: Option<i32>,

    pub social_interaction: Option<SocialLevel>,
    pub location: Option<LocationKind>,
    pub is_private: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// List filters; page and limit are clamped in the handler rather than rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub mood: Option<MoodLabel>,
}
