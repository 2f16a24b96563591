use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::AppState;

/// Authenticated account attached to request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::MissingToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::MissingToken)?;

    let token_data = verify_token(token, &state.config)?;

    // The account must still exist and be active; deactivation revokes access
    // even for tokens that have not yet expired.
    let row = sqlx::query_as::<_, (Uuid, String, String, bool)>(
        "SELECT id, username, email, is_active FROM users WHERE id = $1",
    )
    .bind(token_data.claims.sub)
    .fetch_optional(&state.db)
    .await?;

    let (id, username, email, is_active) = row.ok_or(AppError::InvalidToken)?;
    if !is_active {
        return Err(AppError::InvalidToken);
    }

    let auth_user = AuthUser {
        id,
        username,
        email,
    };

    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}
