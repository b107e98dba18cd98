//! JWT token creation with HMAC-SHA256 signing and a configurable TTL.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;

use super::claims::{Claims, TokenSubject};

/// Creates signed session tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    ttl_hours: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// A freshly signed token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub jti: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_hours: config.token_ttl_hours as i64,
        }
    }

    /// Signs a token for `subject` valid for the configured number of hours.
    pub fn issue(&self, subject: &TokenSubject) -> AppResult<IssuedToken> {
        self.issue_at(subject, Utc::now())
    }

    fn issue_at(&self, subject: &TokenSubject, now: DateTime<Utc>) -> AppResult<IssuedToken> {
        let expires_at = now + chrono::Duration::hours(self.ttl_hours);
        let claims = Claims {
            sub: subject.user_id,
            username: subject.username.clone(),
            roles: subject.roles.clone(),
            permissions: subject.permissions.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok(IssuedToken {
            token,
            jti: claims.jti,
            expires_at,
        })
    }

    #[cfg(test)]
    pub(crate) fn issue_backdated(
        &self,
        subject: &TokenSubject,
        hours_ago: i64,
    ) -> AppResult<IssuedToken> {
        self.issue_at(subject, Utc::now() - chrono::Duration::hours(hours_ago))
    }
}
