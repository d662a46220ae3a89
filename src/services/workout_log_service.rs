use sqlx::PgPool;
use uuid::Uuid;

use treino_shared::LogWorkout;

use crate::error::ApiError;
use crate::models::WorkoutLog;

const LOG_COLUMNS: &str = "id, workout_id, athlete_id, completed_at, notes";

/// Completion records an athlete keeps against workouts of their programs.
#[derive(Clone)]
pub struct WorkoutLogService {
    db: PgPool,
}

impl WorkoutLogService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn ensure_assigned(&self, athlete_id: Uuid, workout_id: Uuid) -> Result<(), ApiError> {
        let assigned: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM workouts w
                 JOIN programs p ON p.id = w.program_id
                 WHERE w.id = $1 AND p.athlete_id = $2
             )",
        )
        .bind(workout_id)
        .bind(athlete_id)
        .fetch_one(&self.db)
        .await?;

        if assigned {
            Ok(())
        } else {
            Err(ApiError::NotFound("Workout not found".to_string()))
        }
    }

    pub async fn log_completion(
        &self,
        athlete_id: Uuid,
        workout_id: Uuid,
        request: LogWorkout,
    ) -> Result<WorkoutLog, ApiError> {
        self.ensure_assigned(athlete_id, workout_id).await?;

        let log = sqlx::query_as::<_, WorkoutLog>(&format!(
            "INSERT INTO workout_logs (id, workout_id, athlete_id, notes)
             VALUES ($1, $2, $3, $4)
             RETURNING {LOG_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(workout_id)
        .bind(athlete_id)
        .bind(&request.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(workout_id = %workout_id, athlete_id = %athlete_id, "workout logged");
        Ok(log)
    }

    /// Newest first
    pub async fn list_for_workout(
        &self,
        athlete_id: Uuid,
        workout_id: Uuid,
    ) -> Result<Vec<WorkoutLog>, ApiError> {
        self.ensure_assigned(athlete_id, workout_id).await?;

        let logs = sqlx::query_as::<_, WorkoutLog>(&format!(
            "SELECT {LOG_COLUMNS} FROM workout_logs
             WHERE workout_id = $1 AND athlete_id = $2
             ORDER BY completed_at DESC"
        ))
        .bind(workout_id)
        .bind(athlete_id)
        .fetch_all(&self.db)
        .await?;

        Ok(logs)
    }
}
