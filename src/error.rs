use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Access denied. No token provided.")]
    MissingToken,

    #[error("Invalid token.")]
    InvalidToken,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(Vec<Value>),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Too many requests from this IP, please try again later.")]
    RateLimited,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<Value> = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors {
                let msg = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {field}"));
                details.push(json!({
                    "msg": msg,
                    "path": field,
                    "location": "body",
                }));
            }
        }
        // field_errors() iterates a HashMap; sort for stable output
        details.sort_by(|a, b| a["path"].as_str().cmp(&b["path"].as_str()));
        AppError::Validation(details)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::MissingToken | AppError::InvalidToken | AppError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": self.to_string() }),
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            AppError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "details": details }),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": self.to_string() }),
            ),
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Internal Server Error",
                        "message": "Internal server error",
                    }),
                )
            }
            // anyhow's Display shows only the outermost context, so the
            // route-level phrase surfaces while the cause stays in the logs
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": self.to_string(),
                        "message": "Internal server error",
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
