use sqlx::PgPool;
use uuid::Uuid;

use treino_shared::CreateExercise;

use crate::error::ApiError;
use crate::models::Exercise;

/// Global exercise catalog shared by every coach.
#[derive(Clone)]
pub struct ExerciseService {
    db: PgPool,
}

impl ExerciseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Exercise>, ApiError> {
        let exercises = sqlx::query_as::<_, Exercise>(
            "SELECT id, name, video_url, created_at FROM exercises ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(exercises)
    }

    pub async fn create(&self, request: CreateExercise) -> Result<Exercise, ApiError> {
        let exercise = sqlx::query_as::<_, Exercise>(
            "INSERT INTO exercises (id, name, video_url)
             VALUES ($1, $2, $3)
             RETURNING id, name, video_url, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.video_url)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(exercise_id = %exercise.id, "exercise created");
        Ok(exercise)
    }
}
