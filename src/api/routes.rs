use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::athlete_portal::athlete_portal_routes;
use super::athletes::athlete_routes;
use super::auth::auth_routes;
use super::exercises::exercise_routes;
use super::health::health_check;
use super::programs::program_routes;
use super::AppState;
use crate::auth::{cors_layer, security_headers_layer};

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/athletes", athlete_routes(state.clone()))
        .nest("/exercises", exercise_routes(state.clone()))
        .nest("/programs", program_routes(state.clone()))
        .nest("/me", athlete_portal_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(security_headers_layer())
        .layer(cors_layer())
}
