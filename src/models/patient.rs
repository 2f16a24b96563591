use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::GenderKind;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<GenderKind>,
    pub contact: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    #[validate(length(min = 1, max = 200, message = "Patient name is required"))]
    pub name: String,

    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<GenderKind>,
    pub contact: Option<serde_json::Value>,

    #[validate(length(max = 2000, message = "Medical history cannot exceed 2000 characters"))]
    pub medical_history: Option<String>,

    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    #[validate(length(max = 200, message = "Name cannot exceed 200 characters"))]
    pub name: Option<String>,

    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<GenderKind>,
    pub contact: Option<serde_json::Value>,

    #[validate(length(max = 2000, message = "Medical history cannot exceed 2000 characters"))]
    pub medical_history: Option<String>,

    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,
}
