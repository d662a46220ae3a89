use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

/// Resolves an authenticated user profile to its coach or athlete row.
#[derive(Clone)]
pub struct ProfileService {
    db: PgPool,
}

impl ProfileService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn coach_id(&self, user_id: Uuid) -> Result<Uuid, ApiError> {
        sqlx::query_scalar("SELECT id FROM coaches WHERE user_profile_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::Forbidden("Coach profile not found".to_string()))
    }

    pub async fn athlete_id(&self, user_id: Uuid) -> Result<Uuid, ApiError> {
        sqlx::query_scalar("SELECT id FROM athletes WHERE user_profile_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::Forbidden("Athlete profile not found".to_string()))
    }
}
