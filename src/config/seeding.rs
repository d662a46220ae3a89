use anyhow::Result;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::hash_password_blocking;
use crate::auth::UserRole;

pub const DEMO_COACH_EMAIL: &str = "coach@treino.dev";
pub const DEMO_ATHLETE_EMAIL: &str = "athlete@treino.dev";
pub const DEMO_PASSWORD: &str = "password123";

const STARTER_EXERCISES: &[&str] = &[
    "Back Squat",
    "Bench Press",
    "Deadlift",
    "Overhead Press",
    "Pull-up",
    "Barbell Row",
    "Romanian Deadlift",
    "Walking Lunge",
    "Plank",
    "Box Jump",
];

/// Populates a development database with a demo coach, athlete and exercise catalog.
/// Running it twice changes nothing.
pub struct DatabaseSeeder {
    pool: PgPool,
    bcrypt_cost: u32,
}

impl DatabaseSeeder {
    pub fn new(pool: PgPool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    pub async fn seed_all(&self) -> Result<()> {
        tracing::info!("Starting database seeding...");

        self.seed_exercises().await?;
        let coach_id = self.seed_coach().await?;
        self.seed_athlete(coach_id).await?;
        self.seed_program(coach_id).await?;

        tracing::info!("Database seeding completed!");
        Ok(())
    }

    async fn seed_exercises(&self) -> Result<()> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercises")
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Ok(());
        }

        for name in STARTER_EXERCISES {
            sqlx::query("INSERT INTO exercises (id, name) VALUES ($1, $2)")
                .bind(Uuid::new_v4())
                .bind(*name)
                .execute(&self.pool)
                .await?;
        }

        tracing::info!(count = STARTER_EXERCISES.len(), "Created starter exercises");
        Ok(())
    }

    async fn find_profile(&self, email: &str) -> Result<Option<Uuid>> {
        Ok(sqlx::query_scalar("SELECT id FROM user_profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn seed_coach(&self) -> Result<Uuid> {
        if let Some(profile_id) = self.find_profile(DEMO_COACH_EMAIL).await? {
            let coach_id = sqlx::query_scalar("SELECT id FROM coaches WHERE user_profile_id = $1")
                .bind(profile_id)
                .fetch_one(&self.pool)
                .await?;
            return Ok(coach_id);
        }

        let password_hash = hash_password_blocking(DEMO_PASSWORD.to_string(), self.bcrypt_cost).await?;
        let profile_id = Uuid::new_v4();
        let coach_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO user_profiles (id, email, password_hash, role, is_active)
             VALUES ($1, $2, $3, $4, TRUE)",
        )
        .bind(profile_id)
        .bind(DEMO_COACH_EMAIL)
        .bind(&password_hash)
        .bind(UserRole::Coach.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO coaches (id, user_profile_id, name) VALUES ($1, $2, $3)")
            .bind(coach_id)
            .bind(profile_id)
            .bind("Demo Coach")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!("Created demo coach {}", DEMO_COACH_EMAIL);
        Ok(coach_id)
    }

    async fn seed_athlete(&self, coach_id: Uuid) -> Result<()> {
        if self.find_profile(DEMO_ATHLETE_EMAIL).await?.is_some() {
            return Ok(());
        }

        let password_hash = hash_password_blocking(DEMO_PASSWORD.to_string(), self.bcrypt_cost).await?;
        let profile_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO user_profiles (id, email, password_hash, role, is_active)
             VALUES ($1, $2, $3, $4, TRUE)",
        )
        .bind(profile_id)
        .bind(DEMO_ATHLETE_EMAIL)
        .bind(&password_hash)
        .bind(UserRole::Athlete.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO athletes (id, user_profile_id, coach_id, name, notes)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(profile_id)
        .bind(coach_id)
        .bind("Demo Athlete")
        .bind("Seeded for local development")
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!("Created demo athlete {}", DEMO_ATHLETE_EMAIL);
        Ok(())
    }

    async fn seed_program(&self, coach_id: Uuid) -> Result<()> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM programs WHERE coach_id = $1")
            .bind(coach_id)
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Ok(());
        }

        let athlete_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT a.id FROM athletes a
             JOIN user_profiles up ON up.id = a.user_profile_id
             WHERE up.email = $1",
        )
        .bind(DEMO_ATHLETE_EMAIL)
        .fetch_optional(&self.pool)
        .await?;
        let Some(athlete_id) = athlete_id else {
            return Ok(());
        };

        let exercise_ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM exercises ORDER BY name ASC LIMIT 3")
                .fetch_all(&self.pool)
                .await?;

        let program_id = Uuid::new_v4();
        let workout_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO programs (id, coach_id, athlete_id, title, description)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(program_id)
        .bind(coach_id)
        .bind(athlete_id)
        .bind("Strength Foundations")
        .bind("Four weeks of full-body strength work")
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO workouts (id, program_id, date, title) VALUES ($1, $2, $3, $4)")
            .bind(workout_id)
            .bind(program_id)
            .bind((Utc::now() + Duration::days(1)).date_naive())
            .bind("Day 1: Full body")
            .execute(&mut *tx)
            .await?;

        for (position, exercise_id) in exercise_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO program_exercises (id, workout_id, exercise_id, sets, reps, position)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(Uuid::new_v4())
            .bind(workout_id)
            .bind(exercise_id)
            .bind("3")
            .bind("8")
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::info!("Created demo program");
        Ok(())
    }
}
