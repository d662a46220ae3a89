// API routes and handlers

pub mod athlete_portal;
pub mod athletes;
pub mod auth;
pub mod exercises;
pub mod health;
pub mod programs;
pub mod routes;

use std::time::Duration;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::{AuthService, RateLimiter, TokenSettings};
use crate::config::AppConfig;
use crate::services::{
    AthleteService, ExerciseService, Mailer, ProfileService, ProgramService, WorkoutLogService,
};

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub athlete_service: AthleteService,
    pub exercise_service: ExerciseService,
    pub program_service: ProgramService,
    pub workout_log_service: WorkoutLogService,
    pub auth_rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(
        db: PgPool,
        jwt_secret: &str,
        tokens: TokenSettings,
        mailer: Mailer,
        app_url: &str,
        auth_rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            auth_service: AuthService::new(db.clone(), jwt_secret, tokens, mailer, app_url),
            profile_service: ProfileService::new(db.clone()),
            athlete_service: AthleteService::new(db.clone()),
            exercise_service: ExerciseService::new(db.clone()),
            program_service: ProgramService::new(db.clone()),
            workout_log_service: WorkoutLogService::new(db),
            auth_rate_limiter,
        }
    }

    pub fn from_config(db: PgPool, config: &AppConfig, mailer: Mailer) -> Self {
        let limiter = RateLimiter::new(
            config.auth_rate_limit.max_requests,
            Duration::from_secs(config.auth_rate_limit.window_secs),
        )
        .trusting_proxy(config.auth_rate_limit.trust_proxy);
        Self::new(
            db,
            &config.jwt_secret,
            config.tokens.clone(),
            mailer,
            &config.app_url,
            limiter,
        )
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> AuthService {
        state.auth_service.clone()
    }
}

impl FromRef<AppState> for RateLimiter {
    fn from_ref(state: &AppState) -> RateLimiter {
        state.auth_rate_limiter.clone()
    }
}
