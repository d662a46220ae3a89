use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use treino_shared::{ApiResponse, CreateExercise, Normalize};

use crate::api::AppState;
use crate::auth::{jwt_auth_middleware, require_coach};
use crate::error::ApiError;
use crate::models::Exercise;

/// Exercise catalog routes (coach only)
pub fn exercise_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_exercises).post(create_exercise))
        .route_layer(middleware::from_fn(require_coach))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
        .with_state(state)
}

async fn list_exercises(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Exercise>>>, ApiError> {
    let exercises = state.exercise_service.list().await?;
    Ok(Json(ApiResponse::data(exercises)))
}

#[tracing::instrument(skip(state, request), fields(name = %request.name))]
async fn create_exercise(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<CreateExercise>, ApiError>,
) -> Result<(StatusCode, Json<ApiResponse<Exercise>>), ApiError> {
    let request = request.normalize();
    request.validate()?;
    let exercise = state.exercise_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::data(exercise))))
}
