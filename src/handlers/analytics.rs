use anyhow::Context;
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::analytics::insights::WellnessInsights;
use crate::analytics::summary::DashboardSummary;
use crate::analytics::trends::MoodTrends;
use crate::analytics::{dashboard_summary, mood_trends, wellness_insights, Granularity, Period};
use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    pub period: Option<String>,
    pub granularity: Option<String>,
}

fn parse_period(raw: Option<&str>) -> AppResult<Period> {
    match raw {
        Some(raw) => raw.parse().map_err(|_| {
            AppError::Validation(vec![json!({
                "msg": "Period must be week, month, quarter, or year",
                "path": "period",
                "location": "query",
            })])
        }),
        None => Ok(Period::default()),
    }
}

fn parse_granularity(raw: Option<&str>) -> AppResult<Granularity> {
    match raw {
        Some(raw) => raw.parse().map_err(|_| {
            AppError::Validation(vec![json!({
                "msg": "Granularity must be day, week, or month",
                "path": "granularity",
                "location": "query",
            })])
        }),
        None => Ok(Granularity::default()),
    }
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DashboardSummary>> {
    let period = parse_period(query.period.as_deref())?;

    let summary = dashboard_summary(&state.db, auth_user.id, period, Utc::now())
        .await
        .context("Failed to fetch dashboard analytics")?;

    Ok(Json(summary))
}

pub async fn trends(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<TrendsQuery>,
) -> AppResult<Json<MoodTrends>> {
    let period = parse_period(query.period.as_deref())?;
    let granularity = parse_granularity(query.granularity.as_deref())?;

    let trends = mood_trends(&state.db, auth_user.id, period, granularity, Utc::now())
        .await
        .context("Failed to fetch mood trends")?;

    Ok(Json(trends))
}

pub async fn insights(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<WellnessInsights>> {
    let insights = wellness_insights(&state.db, auth_user.id, Utc::now())
        .await
        .context("Failed to fetch insights")?;

    Ok(Json(insights))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_period_maps_to_a_field_error() {
        let err = parse_period(Some("fortnight")).unwrap_err();
        match err {
            AppError::Validation(details) => {
                assert_eq!(details[0]["path"], "period");
                assert_eq!(details[0]["location"], "query");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_params_fall_back_to_defaults() {
        assert_eq!(parse_period(None).unwrap(), Period::Month);
        assert_eq!(parse_granularity(None).unwrap(), Granularity::Day);
    }
}
