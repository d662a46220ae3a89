use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{AthleteDetail, AthleteSummary, ProgramRef};

const ATHLETE_SUMMARY_SELECT: &str = "SELECT a.id, a.name, up.email, up.is_active, a.notes \
     FROM athletes a \
     JOIN user_profiles up ON up.id = a.user_profile_id";

#[derive(Clone)]
pub struct AthleteService {
    db: PgPool,
}

impl AthleteService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Athletes of one coach, by name
    pub async fn list_for_coach(&self, coach_id: Uuid) -> Result<Vec<AthleteSummary>, ApiError> {
        let athletes = sqlx::query_as::<_, AthleteSummary>(&format!(
            "{ATHLETE_SUMMARY_SELECT} WHERE a.coach_id = $1 ORDER BY a.name ASC"
        ))
        .bind(coach_id)
        .fetch_all(&self.db)
        .await?;

        Ok(athletes)
    }

    pub async fn get_for_coach(
        &self,
        coach_id: Uuid,
        athlete_id: Uuid,
    ) -> Result<AthleteDetail, ApiError> {
        let athlete = sqlx::query_as::<_, AthleteSummary>(&format!(
            "{ATHLETE_SUMMARY_SELECT} WHERE a.id = $1 AND a.coach_id = $2"
        ))
        .bind(athlete_id)
        .bind(coach_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Athlete not found".to_string()))?;

        let programs = sqlx::query_as::<_, ProgramRef>(
            "SELECT id, title, description FROM programs
             WHERE athlete_id = $1 AND coach_id = $2
             ORDER BY title ASC",
        )
        .bind(athlete_id)
        .bind(coach_id)
        .fetch_all(&self.db)
        .await?;

        Ok(AthleteDetail {
            id: athlete.id,
            name: athlete.name,
            email: athlete.email,
            is_active: athlete.is_active,
            notes: athlete.notes,
            programs,
        })
    }
}
