use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use treino_shared::ApiResponse;

use crate::api::AppState;
use crate::auth::{jwt_auth_middleware, require_coach, UserSession};
use crate::error::ApiError;
use crate::models::{AthleteDetail, AthleteSummary};

/// Coach-scoped athlete routes
pub fn athlete_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_athletes))
        .route("/:id", get(get_athlete))
        .route_layer(middleware::from_fn(require_coach))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
        .with_state(state)
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn list_athletes(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<ApiResponse<Vec<AthleteSummary>>>, ApiError> {
    let coach_id = state.profile_service.coach_id(session.user_id).await?;
    let athletes = state.athlete_service.list_for_coach(coach_id).await?;
    Ok(Json(ApiResponse::data(athletes)))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn get_athlete(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(athlete_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<ApiResponse<AthleteDetail>>, ApiError> {
    let coach_id = state.profile_service.coach_id(session.user_id).await?;
    let athlete = state
        .athlete_service
        .get_for_coach(coach_id, athlete_id)
        .await?;
    Ok(Json(ApiResponse::data(athlete)))
}
