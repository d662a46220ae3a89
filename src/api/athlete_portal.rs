use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use treino_shared::{ApiResponse, LogWorkout};

use crate::api::AppState;
use crate::auth::{jwt_auth_middleware, require_athlete, UserSession};
use crate::error::ApiError;
use crate::models::{ProgramDetail, ProgramSummary, WorkoutLog};
use crate::services::ProgramScope;

/// Routes an athlete uses to follow assigned programs
pub fn athlete_portal_routes(state: AppState) -> Router {
    Router::new()
        .route("/programs", get(my_programs))
        .route("/programs/:id", get(my_program))
        .route(
            "/workouts/:workout_id/logs",
            get(my_workout_logs).post(log_workout),
        )
        .route_layer(middleware::from_fn(require_athlete))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
        .with_state(state)
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn my_programs(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<ApiResponse<Vec<ProgramSummary>>>, ApiError> {
    let athlete_id = state.profile_service.athlete_id(session.user_id).await?;
    let programs = state
        .program_service
        .list_summaries(ProgramScope::Athlete(athlete_id), None)
        .await?;
    Ok(Json(ApiResponse::data(programs)))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn my_program(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(program_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<ApiResponse<ProgramDetail>>, ApiError> {
    let athlete_id = state.profile_service.athlete_id(session.user_id).await?;
    let program = state
        .program_service
        .get_detail(ProgramScope::Athlete(athlete_id), program_id)
        .await?;
    Ok(Json(ApiResponse::data(program)))
}

#[tracing::instrument(skip(state, session, request), fields(user_id = %session.user_id))]
async fn log_workout(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(workout_id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<LogWorkout>, ApiError>,
) -> Result<(StatusCode, Json<ApiResponse<WorkoutLog>>), ApiError> {
    request.validate()?;
    let athlete_id = state.profile_service.athlete_id(session.user_id).await?;
    let log = state
        .workout_log_service
        .log_completion(athlete_id, workout_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::data(log))))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn my_workout_logs(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(workout_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<ApiResponse<Vec<WorkoutLog>>>, ApiError> {
    let athlete_id = state.profile_service.athlete_id(session.user_id).await?;
    let logs = state
        .workout_log_service
        .list_for_workout(athlete_id, workout_id)
        .await?;
    Ok(Json(ApiResponse::data(logs)))
}
