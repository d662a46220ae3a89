use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use treino_shared::{
    ApiResponse, BulkProgramExercises, CreateProgram, CreateWorkout, Normalize,
    ProgramExerciseDetail, ProgramQuery, UpdateProgram, UpdateWorkout,
};

use crate::api::AppState;
use crate::auth::{jwt_auth_middleware, require_coach, UserSession};
use crate::error::ApiError;
use crate::models::{Program, ProgramDetail, ProgramSummary, Workout};
use crate::services::ProgramScope;

/// Coach-scoped program routes
pub fn program_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_programs).post(create_program))
        .route(
            "/:id",
            get(get_program).put(update_program).delete(delete_program),
        )
        .route("/:id/workouts", post(add_workout))
        .route(
            "/:id/workouts/:workout_id",
            put(update_workout).delete(delete_workout),
        )
        .route(
            "/:id/workouts/:workout_id/exercises",
            put(replace_workout_exercises),
        )
        .route_layer(middleware::from_fn(require_coach))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
        .with_state(state)
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn list_programs(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<ProgramQuery>, ApiError>,
) -> Result<Json<ApiResponse<Vec<ProgramSummary>>>, ApiError> {
    let coach_id = state.profile_service.coach_id(session.user_id).await?;
    let programs = state
        .program_service
        .list_summaries(ProgramScope::Coach(coach_id), query.athlete_id)
        .await?;
    Ok(Json(ApiResponse::data(programs)))
}

#[tracing::instrument(skip(state, session, request), fields(user_id = %session.user_id))]
async fn create_program(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<CreateProgram>, ApiError>,
) -> Result<(StatusCode, Json<ApiResponse<Program>>), ApiError> {
    let request = request.normalize();
    request.validate()?;
    let coach_id = state.profile_service.coach_id(session.user_id).await?;
    let program = state.program_service.create(coach_id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::data(program))))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn get_program(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(program_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<ApiResponse<ProgramDetail>>, ApiError> {
    let coach_id = state.profile_service.coach_id(session.user_id).await?;
    let program = state
        .program_service
        .get_detail(ProgramScope::Coach(coach_id), program_id)
        .await?;
    Ok(Json(ApiResponse::data(program)))
}

#[tracing::instrument(skip(state, session, request), fields(user_id = %session.user_id))]
async fn update_program(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(program_id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateProgram>, ApiError>,
) -> Result<Json<ApiResponse<Program>>, ApiError> {
    let request = request.normalize();
    request.validate()?;
    let coach_id = state.profile_service.coach_id(session.user_id).await?;
    let program = state
        .program_service
        .update(coach_id, program_id, request)
        .await?;
    Ok(Json(ApiResponse::data(program)))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn delete_program(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(program_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let coach_id = state.profile_service.coach_id(session.user_id).await?;
    state.program_service.delete(coach_id, program_id).await?;
    Ok(Json(ApiResponse::message("Program deleted")))
}

#[tracing::instrument(skip(state, session, request), fields(user_id = %session.user_id))]
async fn add_workout(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(program_id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<CreateWorkout>, ApiError>,
) -> Result<(StatusCode, Json<ApiResponse<Workout>>), ApiError> {
    let request = request.normalize();
    request.validate()?;
    let coach_id = state.profile_service.coach_id(session.user_id).await?;
    let workout = state
        .program_service
        .add_workout(coach_id, program_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::data(workout))))
}

#[tracing::instrument(skip(state, session, request), fields(user_id = %session.user_id))]
async fn update_workout(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path((program_id, workout_id)), _): WithRejection<Path<(Uuid, Uuid)>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateWorkout>, ApiError>,
) -> Result<Json<ApiResponse<Workout>>, ApiError> {
    let request = request.normalize();
    request.validate()?;
    let coach_id = state.profile_service.coach_id(session.user_id).await?;
    let workout = state
        .program_service
        .update_workout(coach_id, program_id, workout_id, request)
        .await?;
    Ok(Json(ApiResponse::data(workout)))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn delete_workout(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path((program_id, workout_id)), _): WithRejection<Path<(Uuid, Uuid)>, ApiError>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let coach_id = state.profile_service.coach_id(session.user_id).await?;
    state
        .program_service
        .delete_workout(coach_id, program_id, workout_id)
        .await?;
    Ok(Json(ApiResponse::message("Workout deleted")))
}

#[tracing::instrument(skip(state, session, request), fields(user_id = %session.user_id))]
async fn replace_workout_exercises(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path((program_id, workout_id)), _): WithRejection<Path<(Uuid, Uuid)>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<BulkProgramExercises>, ApiError>,
) -> Result<Json<ApiResponse<Vec<ProgramExerciseDetail>>>, ApiError> {
    request.validate()?;
    let coach_id = state.profile_service.coach_id(session.user_id).await?;
    let exercises = state
        .program_service
        .replace_workout_exercises(coach_id, program_id, workout_id, request)
        .await?;
    Ok(Json(ApiResponse::data(exercises)))
}
