//! Router behaviour that is settled before any query runs: guards, input
//! validation, rate limiting and the error envelope.

mod common;

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode},
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use common::{bearer_for, lazy_pool, send, test_app, test_state};
use treino::auth::{JwtService, UserRole};
use treino::create_routes;

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = test_app(lazy_pool());

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_security_header_is_set() {
    let app = test_app(lazy_pool());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let app = test_app(lazy_pool());

    for (method, uri) in [
        (Method::GET, "/athletes"),
        (Method::GET, "/exercises"),
        (Method::GET, "/programs"),
        (Method::GET, "/me/programs"),
        (Method::GET, "/auth/me"),
    ] {
        let (status, body) = send(&app, method, uri, None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["message"], "Invalid or expired token");
    }
}

#[tokio::test]
async fn test_logout_requires_a_token() {
    let app = test_app(lazy_pool());

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/logout",
        None,
        Some(json!({ "refreshToken": "abc" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_and_forged_tokens_are_rejected() {
    let app = test_app(lazy_pool());

    let (status, _) = send(&app, Method::GET, "/athletes", Some("Token abc"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/athletes", Some("Bearer not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = JwtService::new("some_other_secret", chrono::Duration::minutes(15))
        .create_access_token(Uuid::new_v4(), "coach@example.com", UserRole::Coach)
        .unwrap();
    let (status, _) = send(
        &app,
        Method::GET,
        "/athletes",
        Some(&format!("Bearer {forged}")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = test_app(lazy_pool());

    let expired = JwtService::new(common::TEST_JWT_SECRET, chrono::Duration::minutes(-1))
        .create_access_token(Uuid::new_v4(), "coach@example.com", UserRole::Coach)
        .unwrap();

    let (status, body) = send(
        &app,
        Method::GET,
        "/programs",
        Some(&format!("Bearer {expired}")),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_athlete_cannot_use_coach_routes() {
    let state = test_state(lazy_pool(), 1_000);
    let bearer = bearer_for(&state, Uuid::new_v4(), UserRole::Athlete);
    let app = create_routes(state);

    for (method, uri) in [
        (Method::GET, "/athletes"),
        (Method::GET, "/exercises"),
        (Method::GET, "/programs"),
        (Method::DELETE, "/programs/8a4c5a8e-5b0f-4c43-9f5e-6d1f1c0b7a11"),
    ] {
        let (status, body) = send(&app, method, uri, Some(&bearer), None).await;

        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["message"], "Coach access required");
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/invite-athlete",
        Some(&bearer),
        Some(json!({ "name": "Ana", "email": "ana@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Coach access required");
}

#[tokio::test]
async fn test_coach_cannot_use_athlete_portal() {
    let state = test_state(lazy_pool(), 1_000);
    let bearer = bearer_for(&state, Uuid::new_v4(), UserRole::Coach);
    let app = create_routes(state);

    let (status, body) = send(&app, Method::GET, "/me/programs", Some(&bearer), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Athlete access required");
}

#[tokio::test]
async fn test_login_validation_reports_fields() {
    let app = test_app(lazy_pool());

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "not-an-email", "password": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["message"], "Validation failed");
    assert!(body["details"]["email"].is_array());
    assert!(body["details"]["password"].is_array());
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = test_app(lazy_pool());

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "name": "Carla", "email": "carla@example.com", "password": "short" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["password"].is_array());
    assert!(body["details"].get("email").is_none());
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let app = test_app(lazy_pool());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/auth/register")
                .header("content-type", "application/json")
                .body(Body::from("{\"name\":"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Bad Request");
}

#[tokio::test]
async fn test_invalid_program_id_is_bad_request() {
    let state = test_state(lazy_pool(), 1_000);
    let bearer = bearer_for(&state, Uuid::new_v4(), UserRole::Coach);
    let app = create_routes(state);

    let (status, body) = send(&app, Method::GET, "/programs/not-a-uuid", Some(&bearer), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_program_body_is_validated_before_lookup() {
    let state = test_state(lazy_pool(), 1_000);
    let bearer = bearer_for(&state, Uuid::new_v4(), UserRole::Coach);
    let app = create_routes(state);

    let (status, body) = send(
        &app,
        Method::POST,
        "/programs",
        Some(&bearer),
        Some(json!({ "athleteId": Uuid::new_v4(), "title": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["title"].is_array());
}

#[tokio::test]
async fn test_bulk_exercises_report_nested_paths() {
    let state = test_state(lazy_pool(), 1_000);
    let bearer = bearer_for(&state, Uuid::new_v4(), UserRole::Coach);
    let app = create_routes(state);

    let uri = format!(
        "/programs/{}/workouts/{}/exercises",
        Uuid::new_v4(),
        Uuid::new_v4()
    );
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&bearer),
        Some(json!({
            "exercises": [
                { "exerciseId": Uuid::new_v4(), "order": 0 },
                { "exerciseId": Uuid::new_v4(), "order": -1 }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["exercises[1].order"].is_array());
}

#[tokio::test]
async fn test_workout_date_must_be_a_calendar_date() {
    let state = test_state(lazy_pool(), 1_000);
    let bearer = bearer_for(&state, Uuid::new_v4(), UserRole::Coach);
    let app = create_routes(state);

    let uri = format!("/programs/{}/workouts", Uuid::new_v4());
    let (status, _) = send(
        &app,
        Method::POST,
        &uri,
        Some(&bearer),
        Some(json!({ "date": "2024-13-45" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_auth_endpoints_are_rate_limited() {
    let app = create_routes(test_state(lazy_pool(), 2));
    let invalid = json!({ "email": "nope", "password": "" });

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let (status, _) = send(&app, Method::POST, "/auth/login", None, Some(invalid.clone())).await;
        statuses.push(status);
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::BAD_REQUEST,
            StatusCode::BAD_REQUEST,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );

    // Registration is not behind the limiter
    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "name": "", "email": "x", "password": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn login_from(app: &axum::Router, peer: &str, forwarded_for: &str) -> StatusCode {
    let addr: SocketAddr = peer.parse().unwrap();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", forwarded_for)
        .extension(ConnectInfo(addr))
        .body(Body::from(json!({ "email": "nope", "password": "" }).to_string()))
        .unwrap();

    app.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_rate_limit_ignores_forwarded_header_from_untrusted_peer() {
    let app = create_routes(test_state(lazy_pool(), 1));

    let first = login_from(&app, "192.0.2.1:40000", "203.0.113.1").await;
    let rotated = login_from(&app, "192.0.2.1:40001", "203.0.113.2").await;
    let other_peer = login_from(&app, "192.0.2.2:40000", "203.0.113.1").await;

    assert_eq!(first, StatusCode::BAD_REQUEST);
    assert_eq!(rotated, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(other_peer, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rate_limit_keys_on_forwarded_client_behind_trusted_proxy() {
    let mut state = test_state(lazy_pool(), 1);
    state.auth_rate_limiter = state.auth_rate_limiter.trusting_proxy(true);
    let app = create_routes(state);

    let first = login_from(&app, "10.0.0.1:40000", "203.0.113.1").await;
    let second_client = login_from(&app, "10.0.0.1:40000", "203.0.113.2").await;
    let repeat = login_from(&app, "10.0.0.1:40000", "203.0.113.1").await;

    assert_eq!(first, StatusCode::BAD_REQUEST);
    assert_eq!(second_client, StatusCode::BAD_REQUEST);
    assert_eq!(repeat, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_whitespace_only_names_are_rejected() {
    let state = test_state(lazy_pool(), 1_000);
    let bearer = bearer_for(&state, Uuid::new_v4(), UserRole::Coach);
    let app = create_routes(state);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "name": "   ", "email": "coach@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["name"].is_array());
    assert!(body["details"].get("email").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/programs",
        Some(&bearer),
        Some(json!({ "athleteId": Uuid::new_v4(), "title": " \t " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["title"].is_array());

    let (status, body) = send(
        &app,
        Method::POST,
        "/exercises",
        Some(&bearer),
        Some(json!({ "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["name"].is_array());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = test_app(lazy_pool());

    let (status, _) = send(&app, Method::GET, "/nope", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
