use std::collections::{BTreeSet, HashMap};

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use treino_shared::{
    BulkProgramExercises, CreateProgram, CreateWorkout, ProgramExerciseDetail, UpdateProgram,
    UpdateWorkout,
};

use crate::error::ApiError;
use crate::models::{
    AthleteRef, Program, ProgramDetail, ProgramExerciseRow, ProgramSummary, Workout,
    WorkoutDetail, PROGRAM_EXERCISE_SELECT,
};

const PROGRAM_COLUMNS: &str = "id, coach_id, athlete_id, title, description, created_at, updated_at";
const WORKOUT_COLUMNS: &str = "id, program_id, date, title, created_at, updated_at";

/// Whose programs a query may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramScope {
    Coach(Uuid),
    Athlete(Uuid),
}

impl ProgramScope {
    fn column(&self) -> &'static str {
        match self {
            ProgramScope::Coach(_) => "coach_id",
            ProgramScope::Athlete(_) => "athlete_id",
        }
    }

    fn id(&self) -> Uuid {
        match self {
            ProgramScope::Coach(id) | ProgramScope::Athlete(id) => *id,
        }
    }
}

fn program_not_found() -> ApiError {
    ApiError::NotFound("Program not found".to_string())
}

fn workout_not_found() -> ApiError {
    ApiError::NotFound("Workout not found".to_string())
}

#[derive(Clone)]
pub struct ProgramService {
    db: PgPool,
}

impl ProgramService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Program summaries with workout counts, by title
    pub async fn list_summaries(
        &self,
        scope: ProgramScope,
        athlete_filter: Option<Uuid>,
    ) -> Result<Vec<ProgramSummary>, ApiError> {
        let query = format!(
            "SELECT p.id, p.title, p.description, COUNT(w.id) AS workout_count,
                    p.athlete_id, a.name AS athlete_name
             FROM programs p
             JOIN athletes a ON a.id = p.athlete_id
             LEFT JOIN workouts w ON w.program_id = p.id
             WHERE p.{} = $1 AND ($2::uuid IS NULL OR p.athlete_id = $2)
             GROUP BY p.id, a.name
             ORDER BY p.title ASC",
            scope.column()
        );

        let programs = sqlx::query_as::<_, ProgramSummary>(&query)
            .bind(scope.id())
            .bind(athlete_filter)
            .fetch_all(&self.db)
            .await?;

        Ok(programs)
    }

    pub async fn create(&self, coach_id: Uuid, request: CreateProgram) -> Result<Program, ApiError> {
        let athlete_is_ours: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM athletes WHERE id = $1 AND coach_id = $2)",
        )
        .bind(request.athlete_id)
        .bind(coach_id)
        .fetch_one(&self.db)
        .await?;

        if !athlete_is_ours {
            return Err(ApiError::NotFound("Athlete not found".to_string()));
        }

        let program = sqlx::query_as::<_, Program>(&format!(
            "INSERT INTO programs (id, coach_id, athlete_id, title, description)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PROGRAM_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(coach_id)
        .bind(request.athlete_id)
        .bind(&request.title)
        .bind(&request.description)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(program_id = %program.id, athlete_id = %program.athlete_id, "program created");
        Ok(program)
    }

    async fn find_program(&self, scope: ProgramScope, program_id: Uuid) -> Result<Program, ApiError> {
        sqlx::query_as::<_, Program>(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM programs WHERE id = $1 AND {} = $2",
            scope.column()
        ))
        .bind(program_id)
        .bind(scope.id())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(program_not_found)
    }

    /// Program with its athlete, workouts (by date) and their exercises (by order)
    pub async fn get_detail(
        &self,
        scope: ProgramScope,
        program_id: Uuid,
    ) -> Result<ProgramDetail, ApiError> {
        let program = self.find_program(scope, program_id).await?;

        let athlete = sqlx::query_as::<_, AthleteRef>("SELECT id, name FROM athletes WHERE id = $1")
            .bind(program.athlete_id)
            .fetch_one(&self.db)
            .await?;

        let workouts = sqlx::query_as::<_, Workout>(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE program_id = $1
             ORDER BY date ASC, created_at ASC"
        ))
        .bind(program.id)
        .fetch_all(&self.db)
        .await?;

        let workout_ids: Vec<Uuid> = workouts.iter().map(|w| w.id).collect();
        let rows = sqlx::query_as::<_, ProgramExerciseRow>(&format!(
            "{PROGRAM_EXERCISE_SELECT} WHERE pe.workout_id = ANY($1) ORDER BY pe.position ASC"
        ))
        .bind(&workout_ids)
        .fetch_all(&self.db)
        .await?;

        let mut by_workout: HashMap<Uuid, Vec<ProgramExerciseDetail>> = HashMap::new();
        for row in rows {
            by_workout
                .entry(row.workout_id)
                .or_default()
                .push(ProgramExerciseDetail::from(row));
        }

        let workouts = workouts
            .into_iter()
            .map(|workout| {
                let exercises = by_workout.remove(&workout.id).unwrap_or_default();
                WorkoutDetail { workout, exercises }
            })
            .collect();

        Ok(ProgramDetail {
            program,
            athlete,
            workouts,
        })
    }

    pub async fn update(
        &self,
        coach_id: Uuid,
        program_id: Uuid,
        request: UpdateProgram,
    ) -> Result<Program, ApiError> {
        sqlx::query_as::<_, Program>(&format!(
            "UPDATE programs
             SET title = COALESCE($3, title),
                 description = COALESCE($4, description),
                 updated_at = NOW()
             WHERE id = $1 AND coach_id = $2
             RETURNING {PROGRAM_COLUMNS}"
        ))
        .bind(program_id)
        .bind(coach_id)
        .bind(&request.title)
        .bind(&request.description)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(program_not_found)
    }

    /// Delete a program and everything under it
    pub async fn delete(&self, coach_id: Uuid, program_id: Uuid) -> Result<(), ApiError> {
        let program = self.find_program(ProgramScope::Coach(coach_id), program_id).await?;

        let mut tx = self.db.begin().await?;

        sqlx::query(
            "DELETE FROM workout_logs
             WHERE workout_id IN (SELECT id FROM workouts WHERE program_id = $1)",
        )
        .bind(program.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM program_exercises
             WHERE workout_id IN (SELECT id FROM workouts WHERE program_id = $1)",
        )
        .bind(program.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM workouts WHERE program_id = $1")
            .bind(program.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(program.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(program_id = %program.id, "program deleted");
        Ok(())
    }

    pub async fn add_workout(
        &self,
        coach_id: Uuid,
        program_id: Uuid,
        request: CreateWorkout,
    ) -> Result<Workout, ApiError> {
        let program = self.find_program(ProgramScope::Coach(coach_id), program_id).await?;

        let workout = sqlx::query_as::<_, Workout>(&format!(
            "INSERT INTO workouts (id, program_id, date, title)
             VALUES ($1, $2, $3, $4)
             RETURNING {WORKOUT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(program.id)
        .bind(request.date)
        .bind(&request.title)
        .fetch_one(&self.db)
        .await?;

        Ok(workout)
    }

    pub async fn update_workout(
        &self,
        coach_id: Uuid,
        program_id: Uuid,
        workout_id: Uuid,
        request: UpdateWorkout,
    ) -> Result<Workout, ApiError> {
        let program = self.find_program(ProgramScope::Coach(coach_id), program_id).await?;

        sqlx::query_as::<_, Workout>(&format!(
            "UPDATE workouts
             SET date = COALESCE($3, date),
                 title = COALESCE($4, title),
                 updated_at = NOW()
             WHERE id = $1 AND program_id = $2
             RETURNING {WORKOUT_COLUMNS}"
        ))
        .bind(workout_id)
        .bind(program.id)
        .bind(request.date)
        .bind(&request.title)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(workout_not_found)
    }

    pub async fn delete_workout(
        &self,
        coach_id: Uuid,
        program_id: Uuid,
        workout_id: Uuid,
    ) -> Result<(), ApiError> {
        let program = self.find_program(ProgramScope::Coach(coach_id), program_id).await?;

        let mut tx = self.db.begin().await?;
        ensure_workout_in_program(&mut tx, program.id, workout_id).await?;

        sqlx::query("DELETE FROM workout_logs WHERE workout_id = $1")
            .bind(workout_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM program_exercises WHERE workout_id = $1")
            .bind(workout_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(workout_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(program_id = %program.id, workout_id = %workout_id, "workout deleted");
        Ok(())
    }

    /// Replace the whole exercise list of a workout
    pub async fn replace_workout_exercises(
        &self,
        coach_id: Uuid,
        program_id: Uuid,
        workout_id: Uuid,
        request: BulkProgramExercises,
    ) -> Result<Vec<ProgramExerciseDetail>, ApiError> {
        let program = self.find_program(ProgramScope::Coach(coach_id), program_id).await?;

        let requested: BTreeSet<Uuid> = request.exercises.iter().map(|e| e.exercise_id).collect();
        let requested: Vec<Uuid> = requested.into_iter().collect();
        let known: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM exercises WHERE id = ANY($1)")
            .bind(&requested)
            .fetch_all(&self.db)
            .await?;

        if let Some(missing) = first_missing(&requested, &known) {
            return Err(ApiError::BadRequest(format!("Exercise {missing} not found")));
        }

        let mut tx = self.db.begin().await?;
        ensure_workout_in_program(&mut tx, program.id, workout_id).await?;

        sqlx::query("DELETE FROM program_exercises WHERE workout_id = $1")
            .bind(workout_id)
            .execute(&mut *tx)
            .await?;

        for item in &request.exercises {
            sqlx::query(
                "INSERT INTO program_exercises
                     (id, workout_id, exercise_id, sets, reps, load, notes, position)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(Uuid::new_v4())
            .bind(workout_id)
            .bind(item.exercise_id)
            .bind(&item.sets)
            .bind(&item.reps)
            .bind(&item.load)
            .bind(&item.notes)
            .bind(item.order)
            .execute(&mut *tx)
            .await?;
        }

        let rows = sqlx::query_as::<_, ProgramExerciseRow>(&format!(
            "{PROGRAM_EXERCISE_SELECT} WHERE pe.workout_id = $1 ORDER BY pe.position ASC"
        ))
        .bind(workout_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            workout_id = %workout_id,
            exercises = rows.len(),
            "workout exercises replaced"
        );
        Ok(rows.into_iter().map(ProgramExerciseDetail::from).collect())
    }
}

async fn ensure_workout_in_program(
    tx: &mut Transaction<'_, Postgres>,
    program_id: Uuid,
    workout_id: Uuid,
) -> Result<(), ApiError> {
    // Row lock keeps a concurrent delete from racing the write that follows
    sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM workouts WHERE id = $1 AND program_id = $2 FOR UPDATE",
    )
    .bind(workout_id)
    .bind(program_id)
    .fetch_optional(&mut **tx)
    .await?
    .map(|_| ())
    .ok_or_else(workout_not_found)
}

fn first_missing(requested: &[Uuid], known: &[Uuid]) -> Option<Uuid> {
    requested.iter().copied().find(|id| !known.contains(id))
}
