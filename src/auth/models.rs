use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use treino_shared::UserRole;

/// JWT token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // Subject (user profile ID)
    pub email: String,
    pub role: UserRole,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}

/// Authenticated caller, inserted into request extensions by the JWT middleware.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub jti: String,
}

impl UserSession {
    pub fn from_claims(claims: &Claims) -> Result<Self, uuid::Error> {
        Ok(Self {
            user_id: Uuid::parse_str(&claims.sub)?,
            email: claims.email.clone(),
            role: claims.role,
            jti: claims.jti.clone(),
        })
    }
}

/// Single-use credential row (invite or password reset).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SingleUseToken {
    pub id: Uuid,
    pub user_profile_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

/// Refresh token row removed during rotation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub user_profile_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Lifetimes of the credentials the auth service issues.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub invite_token_ttl: Duration,
    pub reset_token_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
            invite_token_ttl: Duration::days(7),
            reset_token_ttl: Duration::hours(1),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}
