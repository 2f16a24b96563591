use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::analytics::{mean, Granularity, Period};

#[derive(Debug, FromRow)]
pub struct TrendRow {
    pub created_at: DateTime<Utc>,
    pub mood_score: i32,
    pub stress_level: Option<i32>,
    pub energy_level: Option<i32>,
    pub sleep_hours: Option<f32>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendBucket {
    pub bucket: String,
    pub average_mood_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_stress_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_energy_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_sleep_hours: Option<f64>,
    pub entry_count: i64,
}

#[derive(Debug, Serialize)]
pub struct MoodTrends {
    pub period: Period,
    pub granularity: Granularity,
    pub trends: Vec<TrendBucket>,
}

/// Groups entries by their bucket key and averages each bucket. Keys come out
/// unique and sorted ascending, so consumers can plot the series directly.
pub fn bucket_rows(rows: &[TrendRow], granularity: Granularity) -> Vec<TrendBucket> {
    let mut groups: BTreeMap<String, Vec<&TrendRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry(granularity.bucket_key(row.created_at))
            .or_default()
            .push(row);
    }

    groups
        .into_iter()
        .map(|(bucket, members)| {
            let score_sum: f64 = members.iter().map(|r| f64::from(r.mood_score)).sum();
            TrendBucket {
                bucket,
                average_mood_score: score_sum / members.len() as f64,
                average_stress_level: mean(
                    members.iter().filter_map(|r| r.stress_level.map(f64::from)),
                ),
                average_energy_level: mean(
                    members.iter().filter_map(|r| r.energy_level.map(f64::from)),
                ),
                average_sleep_hours: mean(
                    members.iter().filter_map(|r| r.sleep_hours.map(f64::from)),
                ),
                entry_count: members.len() as i64,
            }
        })
        .collect()
}

pub async fn mood_trends(
    db: &PgPool,
    user_id: Uuid,
    period: Period,
    granularity: Granularity,
    now: DateTime<Utc>,
) -> Result<MoodTrends, sqlx::Error> {
    let start = period.start_from(now);

    let rows = sqlx::query_as::<_, TrendRow>(
        r#"
        SELECT created_at, mood_score, stress_level, energy_level, sleep_hours
        FROM mood_entries
        WHERE user_id = $1 AND created_at >= $2
        "#,
    )
    .bind(user_id)
    .bind(start)
    .fetch_all(db)
    .await?;

    Ok(MoodTrends {
        period,
        granularity,
        trends: bucket_rows(&rows, granularity),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ts: &str, score: i32) -> TrendRow {
        TrendRow {
            created_at: ts.parse().unwrap(),
            mood_score: score,
            stress_level: None,
            energy_level: None,
            sleep_hours: None,
        }
    }

    #[test]
    fn no_rows_means_no_buckets() {
        assert!(bucket_rows(&[], Granularity::Day).is_empty());
    }

    #[test]
    fn daily_buckets_are_unique_sorted_and_complete() {
        let rows = vec![
            row("2024-06-03T09:00:00Z", 4),
            row("2024-06-01T08:00:00Z", 2),
            row("2024-06-03T21:00:00Z", 2),
            row("2024-06-02T12:00:00Z", 5),
        ];

        let buckets = bucket_rows(&rows, Granularity::Day);
        let keys: Vec<&str> = buckets.iter().map(|b| b.bucket.as_str()).collect();
        assert_eq!(keys, vec!["2024-06-01", "2024-06-02", "2024-06-03"]);

        let total: i64 = buckets.iter().map(|b| b.entry_count).sum();
        assert_eq!(total, rows.len() as i64);

        // two entries on Jun 3 average out
        assert_eq!(buckets[2].average_mood_score, 3.0);
        assert_eq!(buckets[2].entry_count, 2);
    }

    #[test]
    fn one_entry_per_month_over_a_year() {
        // Jul 2023 through Jun 2024
        let rows: Vec<TrendRow> = (0..12)
            .map(|i| {
                let month = (6 + i) % 12 + 1;
                let year = if i < 6 { 2023 } else { 2024 };
                row(&format!("{year}-{month:02}-15T10:00:00Z"), 3)
            })
            .collect();

        let buckets = bucket_rows(&rows, Granularity::Month);
        assert_eq!(buckets.len(), 12);
        assert!(buckets.iter().all(|b| b.entry_count == 1));
    }

    #[test]
    fn bucket_means_skip_missing_fields() {
        let mut with_sleep = row("2024-06-01T07:00:00Z", 4);
        with_sleep.sleep_hours = Some(7.5);
        let without_sleep = row("2024-06-01T22:00:00Z", 2);

        let buckets = bucket_rows(&[with_sleep, without_sleep], Granularity::Day);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].average_sleep_hours, Some(7.5));
        assert_eq!(buckets[0].average_stress_level, None);
    }
}
