use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

pub fn create_token(
    user_id: Uuid,
    email: &str,
    username: &str,
    config: &Config,
) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        username: username.to_string(),
        exp: (now + Duration::seconds(config.jwt_ttl_secs)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/test".into(),
            host: "127.0.0.1".into(),
            port: 5000,
            frontend_url: "http://localhost:5173".into(),
            jwt_secret: "test-secret-value".into(),
            jwt_ttl_secs: 3600,
            rate_limit_max: 100,
            rate_limit_window_secs: 900,
        }
    }

    #[test]
    fn token_roundtrip() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let token = create_token(user_id, "a@b.com", "alice", &config).unwrap();
        let data = verify_token(&token, &config).unwrap();
        assert_eq!(data.claims.sub, user_id);
        assert_eq!(data.claims.email, "a@b.com");
        assert_eq!(data.claims.username, "alice");
    }

    #[test]
    fn tampered_token_rejected() {
        let config = test_config();
        let token = create_token(Uuid::new_v4(), "a@b.com", "alice", &config).unwrap();
        let mut other = test_config();
        other.jwt_secret = "different-secret".into();
        assert!(verify_token(&token, &other).is_err());
    }
}
