use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use treino_shared::{
    ActivateAthlete, ApiResponse, AuthTokens, AuthUser, InviteAthlete, InviteCreated, Login,
    Normalize, RefreshTokenRequest, RefreshedTokens, RegisterCoach, RequestPasswordReset, ResetPassword,
};

use crate::api::AppState;
use crate::auth::{
    jwt_auth_middleware, rate_limit_middleware, require_coach, AuthService, UserSession,
};
use crate::error::ApiError;

pub const RESET_REQUESTED_MESSAGE: &str = "If the email exists, a reset link has been sent";

/// Authentication routes
pub fn auth_routes(state: AppState) -> Router {
    let limiter = state.auth_rate_limiter.clone();
    let rate_limited =
        move || middleware::from_fn_with_state(limiter.clone(), rate_limit_middleware);
    let auth_state = state.clone();
    let authenticated =
        move || middleware::from_fn_with_state(auth_state.clone(), jwt_auth_middleware);

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login).route_layer(rate_limited()))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout).route_layer(authenticated()))
        .route(
            "/invite-athlete",
            post(invite_athlete)
                .route_layer(middleware::from_fn(require_coach))
                .route_layer(authenticated()),
        )
        .route("/activate", post(activate).route_layer(rate_limited()))
        .route("/forgot-password", post(forgot_password).route_layer(rate_limited()))
        .route("/reset-password", post(reset_password).route_layer(rate_limited()))
        .route("/me", get(me).route_layer(authenticated()))
        .with_state(state)
}

/// Register a new coach
#[tracing::instrument(skip(auth_service, request))]
async fn register(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterCoach>, ApiError>,
) -> Result<(StatusCode, Json<ApiResponse<AuthTokens>>), ApiError> {
    let request = request.normalize();
    request.validate()?;
    let tokens = auth_service.register_coach(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::data(tokens))))
}

/// Login user
#[tracing::instrument(skip(auth_service, request))]
async fn login(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<Login>, ApiError>,
) -> Result<Json<ApiResponse<AuthTokens>>, ApiError> {
    let request = request.normalize();
    request.validate()?;
    let tokens = auth_service.login(request).await?;
    Ok(Json(ApiResponse::data(tokens)))
}

/// Rotate the refresh token
#[tracing::instrument(skip(auth_service, request))]
async fn refresh_token(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<RefreshTokenRequest>, ApiError>,
) -> Result<Json<ApiResponse<RefreshedTokens>>, ApiError> {
    request.validate()?;
    let tokens = auth_service.refresh(&request.refresh_token).await?;
    Ok(Json(ApiResponse::data(tokens)))
}

/// Logout user
#[tracing::instrument(skip(auth_service, session, request), fields(user_id = %session.user_id))]
async fn logout(
    State(auth_service): State<AuthService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<RefreshTokenRequest>, ApiError>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    request.validate()?;
    auth_service.logout(session.user_id, &request.refresh_token).await?;
    Ok(Json(ApiResponse::message("Logged out")))
}

/// Invite an athlete (coach only)
#[tracing::instrument(skip(auth_service, session, request), fields(coach_user_id = %session.user_id))]
async fn invite_athlete(
    State(auth_service): State<AuthService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<InviteAthlete>, ApiError>,
) -> Result<(StatusCode, Json<ApiResponse<InviteCreated>>), ApiError> {
    let request = request.normalize();
    request.validate()?;
    let invite = auth_service.invite_athlete(session.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::data(invite))))
}

/// Activate an invited athlete account
#[tracing::instrument(skip(auth_service, request))]
async fn activate(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<ActivateAthlete>, ApiError>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    request.validate()?;
    auth_service
        .activate_athlete(&request.token, request.password)
        .await?;
    Ok(Json(ApiResponse::message("Account activated")))
}

/// Forgot password; the answer never reveals whether the account exists
#[tracing::instrument(skip(auth_service, request))]
async fn forgot_password(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<RequestPasswordReset>, ApiError>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let request = request.normalize();
    request.validate()?;
    auth_service.request_password_reset(&request.email).await?;
    Ok(Json(ApiResponse::message(RESET_REQUESTED_MESSAGE)))
}

/// Reset password
#[tracing::instrument(skip(auth_service, request))]
async fn reset_password(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<ResetPassword>, ApiError>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    request.validate()?;
    auth_service
        .reset_password(&request.token, request.password)
        .await?;
    Ok(Json(ApiResponse::message("Password reset successful")))
}

/// Current user
#[tracing::instrument(skip(auth_service, session), fields(user_id = %session.user_id))]
async fn me(
    State(auth_service): State<AuthService>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<ApiResponse<AuthUser>>, ApiError> {
    let user = auth_service.me(session.user_id).await?;
    Ok(Json(ApiResponse::data(user)))
}
