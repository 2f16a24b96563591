use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::analytics::mean;

/// Insights always look at the last 30 days, independent of any period
/// parameter elsewhere.
const LOOKBACK_DAYS: i64 = 30;

const MOOD_SAMPLE_LIMIT: i64 = 30;
const JOURNAL_SAMPLE_LIMIT: i64 = 20;
const CHAT_SAMPLE_LIMIT: i64 = 10;

/// The mood fields the rule evaluator reads. Callers supply samples most
/// recent first; the "recent" slice is the head of the list.
#[derive(Debug, FromRow)]
pub struct MoodSample {
    pub mood_score: i32,
    pub sleep_hours: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Positive,
    Concern,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: &'static str,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    Mood,
    Sleep,
    Journaling,
    General,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoints {
    pub mood_entries: usize,
    pub journal_entries: usize,
    pub chat_sessions: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessInsights {
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
    pub data_points: DataPoints,
}

/// Threshold rules over the recent records. Rules fire independently and in a
/// fixed order, and the closing "Stay Consistent" recommendation is always
/// appended last.
///
/// The mood-trend rule compares the average of the newest min(7, n) samples
/// against the average of all of them. A recent average sitting anywhere in
/// (overall - 0.5, overall] fires nothing; that gap separates "improving"
/// from "declining" so day-to-day noise stays quiet.
pub fn evaluate_wellness(
    moods: &[MoodSample],
    journal_count: usize,
    chat_count: usize,
) -> (Vec<Insight>, Vec<Recommendation>) {
    let mut insights = Vec::new();
    let mut recommendations = Vec::new();

    if !moods.is_empty() {
        let overall_avg =
            moods.iter().map(|m| f64::from(m.mood_score)).sum::<f64>() / moods.len() as f64;
        let recent = &moods[..moods.len().min(7)];
        let recent_avg =
            recent.iter().map(|m| f64::from(m.mood_score)).sum::<f64>() / recent.len() as f64;

        if recent_avg > overall_avg {
            insights.push(Insight {
                kind: InsightKind::Positive,
                title: "Mood Improvement",
                description: "Your mood has been trending upward in the past week!".to_string(),
            });
        } else if recent_avg < overall_avg - 0.5 {
            insights.push(Insight {
                kind: InsightKind::Concern,
                title: "Mood Decline",
                description: "Your mood has been lower than usual recently.".to_string(),
            });
            recommendations.push(Recommendation {
                category: RecommendationCategory::Mood,
                title: "Consider Self-Care Activities",
                description: "Try engaging in activities that usually make you feel better, or consider reaching out to a friend or counselor.",
            });
        }

        if let Some(avg_sleep) = mean(moods.iter().filter_map(|m| m.sleep_hours.map(f64::from))) {
            if avg_sleep < 6.0 {
                insights.push(Insight {
                    kind: InsightKind::Concern,
                    title: "Insufficient Sleep",
                    description: format!(
                        "Your average sleep is {:.1} hours, which may be affecting your mood.",
                        avg_sleep
                    ),
                });
                recommendations.push(Recommendation {
                    category: RecommendationCategory::Sleep,
                    title: "Improve Sleep Hygiene",
                    description: "Try to maintain a consistent sleep schedule and aim for 7-9 hours of sleep per night.",
                });
            }
        }
    }

    if journal_count > 0 {
        let journal_frequency = journal_count as f64 / 30.0;
        if journal_frequency > 0.5 {
            insights.push(Insight {
                kind: InsightKind::Positive,
                title: "Consistent Journaling",
                description: "You've been maintaining a good journaling habit!".to_string(),
            });
        } else if journal_frequency < 0.1 {
            recommendations.push(Recommendation {
                category: RecommendationCategory::Journaling,
                title: "Regular Journaling",
                description: "Consider writing in your journal more regularly to track your thoughts and feelings.",
            });
        }
    }

    if chat_count > 0 && chat_count as f64 / 30.0 > 0.2 {
        insights.push(Insight {
            kind: InsightKind::Positive,
            title: "Active Support Seeking",
            description: "You've been actively using the AI chat for support.".to_string(),
        });
    }

    recommendations.push(Recommendation {
        category: RecommendationCategory::General,
        title: "Stay Consistent",
        description: "Regular mood tracking and journaling can help you better understand your mental health patterns.",
    });

    (insights, recommendations)
}

async fn fetch_mood_samples(
    db: &PgPool,
    user_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<MoodSample>, sqlx::Error> {
    sqlx::query_as::<_, MoodSample>(
        r#"
        SELECT mood_score, sleep_hours
        FROM mood_entries
        WHERE user_id = $1 AND created_at >= $2
        ORDER BY created_at DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(since)
    .bind(MOOD_SAMPLE_LIMIT)
    .fetch_all(db)
    .await
}

async fn fetch_recent_journal_ids(
    db: &PgPool,
    user_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id
        FROM journal_entries
        WHERE user_id = $1 AND created_at >= $2 AND is_archived = false
        ORDER BY created_at DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(since)
    .bind(JOURNAL_SAMPLE_LIMIT)
    .fetch_all(db)
    .await
}

async fn fetch_recent_chat_ids(
    db: &PgPool,
    user_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id
        FROM chat_sessions
        WHERE user_id = $1 AND created_at >= $2
        ORDER BY updated_at DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(since)
    .bind(CHAT_SAMPLE_LIMIT)
    .fetch_all(db)
    .await
}

pub async fn wellness_insights(
    db: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<WellnessInsights, sqlx::Error> {
    let since = now - Duration::days(LOOKBACK_DAYS);

    let (moods, journal_ids, chat_ids) = tokio::try_join!(
        fetch_mood_samples(db, user_id, since),
        fetch_recent_journal_ids(db, user_id, since),
        fetch_recent_chat_ids(db, user_id, since),
    )?;

    let (insights, recommendations) = evaluate_wellness(&moods, journal_ids.len(), chat_ids.len());

    Ok(WellnessInsights {
        insights,
        recommendations,
        data_points: DataPoints {
            mood_entries: moods.len(),
            journal_entries: journal_ids.len(),
            chat_sessions: chat_ids.len(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(score: i32, sleep: Option<f32>) -> MoodSample {
        MoodSample {
            mood_score: score,
            sleep_hours: sleep,
        }
    }

    fn scores(scores: &[i32]) -> Vec<MoodSample> {
        scores.iter().map(|&s| sample(s, None)).collect()
    }

    fn insight_titles(insights: &[Insight]) -> Vec<&'static str> {
        insights.iter().map(|i| i.title).collect()
    }

    fn recommendation_titles(recs: &[Recommendation]) -> Vec<&'static str> {
        recs.iter().map(|r| r.title).collect()
    }

    #[test]
    fn no_records_yields_only_the_general_recommendation() {
        let (insights, recs) = evaluate_wellness(&[], 0, 0);
        assert!(insights.is_empty());
        assert_eq!(recommendation_titles(&recs), vec!["Stay Consistent"]);
    }

    #[test]
    fn flat_mood_emits_no_trend_insight() {
        // recent average equals overall average exactly
        let moods = scores(&[3, 3, 3, 3, 3, 3, 3, 3, 3, 3]);
        let (insights, _) = evaluate_wellness(&moods, 0, 0);
        assert!(!insight_titles(&insights).contains(&"Mood Improvement"));
        assert!(!insight_titles(&insights).contains(&"Mood Decline"));
    }

    #[test]
    fn small_dip_stays_inside_the_quiet_band() {
        // recent avg 3.0, overall 3.3: lower, but not by more than 0.5
        let moods = scores(&[3, 3, 3, 3, 3, 3, 3, 4, 4, 4]);
        let (insights, recs) = evaluate_wellness(&moods, 0, 0);
        assert!(insights.is_empty());
        assert_eq!(recommendation_titles(&recs), vec!["Stay Consistent"]);
    }

    #[test]
    fn recent_lift_emits_mood_improvement() {
        // newest seven average 4.0, all ten average 3.1
        let moods = scores(&[4, 4, 4, 4, 4, 4, 4, 1, 1, 1]);
        let (insights, recs) = evaluate_wellness(&moods, 0, 0);
        assert_eq!(insight_titles(&insights), vec!["Mood Improvement"]);
        assert_eq!(insights[0].kind, InsightKind::Positive);
        assert_eq!(recommendation_titles(&recs), vec!["Stay Consistent"]);
    }

    #[test]
    fn sustained_drop_emits_decline_and_self_care() {
        // newest seven average 2.0, all ten average 2.9
        let moods = scores(&[2, 2, 2, 2, 2, 2, 2, 5, 5, 5]);
        let (insights, recs) = evaluate_wellness(&moods, 0, 0);
        assert_eq!(insight_titles(&insights), vec!["Mood Decline"]);
        assert_eq!(insights[0].kind, InsightKind::Concern);
        assert_eq!(
            recommendation_titles(&recs),
            vec!["Consider Self-Care Activities", "Stay Consistent"]
        );
    }

    #[test]
    fn short_sleep_shows_the_average_in_the_description() {
        let moods = vec![sample(3, Some(4.0)), sample(3, Some(5.0))];
        let (insights, recs) = evaluate_wellness(&moods, 0, 0);

        assert_eq!(insight_titles(&insights), vec!["Insufficient Sleep"]);
        assert!(insights[0].description.contains("4.5"));
        assert_eq!(
            recommendation_titles(&recs),
            vec!["Improve Sleep Hygiene", "Stay Consistent"]
        );
    }

    #[test]
    fn sleep_rule_ignores_entries_without_sleep() {
        let moods = vec![sample(3, None), sample(3, Some(8.0)), sample(3, None)];
        let (insights, _) = evaluate_wellness(&moods, 0, 0);
        assert!(!insight_titles(&insights).contains(&"Insufficient Sleep"));
    }

    #[test]
    fn journal_frequency_thresholds() {
        // 16 entries in 30 days is better than one every other day
        let (insights, _) = evaluate_wellness(&[], 16, 0);
        assert_eq!(insight_titles(&insights), vec!["Consistent Journaling"]);

        // 2 entries is under one per ten days
        let (insights, recs) = evaluate_wellness(&[], 2, 0);
        assert!(insights.is_empty());
        assert_eq!(
            recommendation_titles(&recs),
            vec!["Regular Journaling", "Stay Consistent"]
        );

        // 9 entries sits between the two thresholds
        let (insights, recs) = evaluate_wellness(&[], 9, 0);
        assert!(insights.is_empty());
        assert_eq!(recommendation_titles(&recs), vec!["Stay Consistent"]);
    }

    #[test]
    fn frequent_chat_use_is_noticed() {
        let (insights, _) = evaluate_wellness(&[], 0, 7);
        assert_eq!(insight_titles(&insights), vec!["Active Support Seeking"]);

        // exactly at the threshold stays quiet
        let (insights, _) = evaluate_wellness(&[], 0, 6);
        assert!(insights.is_empty());
    }

    #[test]
    fn stay_consistent_is_always_last() {
        // trip every rule at once
        let mut moods = scores(&[2, 2, 2, 2, 2, 2, 2, 5, 5, 5]);
        for m in &mut moods {
            m.sleep_hours = Some(5.0);
        }
        let (insights, recs) = evaluate_wellness(&moods, 16, 7);

        assert_eq!(
            insight_titles(&insights),
            vec![
                "Mood Decline",
                "Insufficient Sleep",
                "Consistent Journaling",
                "Active Support Seeking"
            ]
        );
        assert_eq!(recs.last().map(|r| r.title), Some("Stay Consistent"));
        assert_eq!(
            recommendation_titles(&recs),
            vec![
                "Consider Self-Care Activities",
                "Improve Sleep Hygiene",
                "Stay Consistent"
            ]
        );
    }

    #[test]
    fn rated_output_serializes_with_plain_keys() {
        let (insights, recs) = evaluate_wellness(&scores(&[4, 4, 4, 1, 1, 1, 1, 1, 1, 1]), 0, 0);
        let json = serde_json::to_value(&insights).unwrap();
        assert_eq!(json[0]["type"], "positive");
        assert_eq!(json[0]["title"], "Mood Improvement");

        let json = serde_json::to_value(&recs).unwrap();
        assert_eq!(json[0]["category"], "general");
    }
}
