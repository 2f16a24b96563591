use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::patient::{CreatePatientRequest, Patient, UpdatePatientRequest};
use crate::AppState;

pub async fn create_patient(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreatePatientRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;

    let patient = sqlx::query_as::<_, Patient>(
        r#"
        INSERT INTO patients (id, user_id, username, name, date_of_birth, gender, contact,
                              medical_history, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&auth_user.username)
    .bind(&body.name)
    .bind(body.date_of_birth)
    .bind(body.gender)
    .bind(body.contact.unwrap_or_else(|| json!({})))
    .bind(body.medical_history.as_deref().unwrap_or(""))
    .bind(body.notes.as_deref().unwrap_or(""))
    .fetch_one(&state.db)
    .await
    .context("Failed to create patient")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Patient created", "patient": patient })),
    ))
}

pub async fn list_patients(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let patients = sqlx::query_as::<_, Patient>(
        r#"
        SELECT * FROM patients
        WHERE user_id = $1 AND is_active = true
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await
    .context("Failed to list patients")?;

    Ok(Json(json!({ "patients": patients })))
}

pub async fn get_patient(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let patient = sqlx::query_as::<_, Patient>(
        "SELECT * FROM patients WHERE id = $1 AND user_id = $2 AND is_active = true",
    )
    .bind(id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await
    .context("Failed to get patient")?
    .ok_or(AppError::NotFound("Patient not found".into()))?;

    Ok(Json(json!({ "patient": patient })))
}

pub async fn update_patient(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePatientRequest>,
) -> AppResult<Json<Value>> {
    body.validate()?;

    let patient = sqlx::query_as::<_, Patient>(
        r#"
        UPDATE patients SET
            name = COALESCE($3, name),
            date_of_birth = COALESCE($4, date_of_birth),
            gender = COALESCE($5, gender),
            contact = COALESCE($6, contact),
            medical_history = COALESCE($7, medical_history),
            notes = COALESCE($8, notes),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(auth_user.id)
    .bind(&body.name)
    .bind(body.date_of_birth)
    .bind(body.gender)
    .bind(&body.contact)
    .bind(&body.medical_history)
    .bind(&body.notes)
    .fetch_optional(&state.db)
    .await
    .context("Failed to update patient")?
    .ok_or(AppError::NotFound("Patient not found".into()))?;

    Ok(Json(json!({ "message": "Patient updated", "patient": patient })))
}

/// Soft delete; the patient drops out of lists but the row stays.
pub async fn delete_patient(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query(
        "UPDATE patients SET is_active = false, updated_at = NOW() WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(auth_user.id)
    .execute(&state.db)
    .await
    .context("Failed to remove patient")?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Patient not found".into()));
    }

    Ok(Json(json!({ "message": "Patient removed" })))
}
