use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::AUTHORIZATION, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer};

use crate::auth::{extract_bearer_token, AuthService, UserRole, UserSession};
use crate::error::ApiError;

/// JWT authentication middleware
pub async fn jwt_auth_middleware(
    State(auth_service): State<AuthService>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    let token = extract_bearer_token(auth_header)?;
    let session = auth_service.authenticate(token)?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

fn require_role(request: &Request, role: UserRole, message: &str) -> Result<(), ApiError> {
    // A missing session means the route was mounted without the JWT layer.
    let session = request
        .extensions()
        .get::<UserSession>()
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    if session.role != role {
        return Err(ApiError::Forbidden(message.to_string()));
    }
    Ok(())
}

/// Coach-only middleware, layered inside [`jwt_auth_middleware`]
pub async fn require_coach(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&request, UserRole::Coach, "Coach access required")?;
    Ok(next.run(request).await)
}

/// Athlete-only middleware, layered inside [`jwt_auth_middleware`]
pub async fn require_athlete(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&request, UserRole::Athlete, "Athlete access required")?;
    Ok(next.run(request).await)
}

/// CORS configuration; any origin is reflected back
pub fn cors_layer() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Security headers middleware
pub fn security_headers_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}

/// Sliding-window rate limiter keyed by client address
#[derive(Debug, Clone)]
pub struct RateLimiter {
    requests: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
    max_requests: usize,
    window: Duration,
    trust_proxy: bool,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            requests: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
            trust_proxy: false,
        }
    }

    /// Key on `x-forwarded-for`/`x-real-ip` rather than the TCP peer.
    pub fn trusting_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    pub fn check_rate_limit(&self, key: &str) -> bool {
        let mut requests = self
            .requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Instant::now();

        // Drop idle clients so the map does not grow without bound
        requests.retain(|_, hits| {
            hits.last()
                .map(|last| now.duration_since(*last) < self.window)
                .unwrap_or(false)
        });

        let entry = requests.entry(key.to_string()).or_default();
        entry.retain(|&time| now.duration_since(time) < self.window);

        if entry.len() >= self.max_requests {
            return false;
        }

        entry.push(now);
        true
    }
}

/// Peer IP from `ConnectInfo`, or the forwarded client address when the
/// limiter sits behind a trusted proxy.
fn client_key(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .or_else(|| request.headers().get("x-real-ip"))
            .and_then(|header| header.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        if let Some(address) = forwarded {
            return address.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiting middleware function
pub async fn rate_limit_middleware(
    State(rate_limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(&request, rate_limiter.trust_proxy);

    if !rate_limiter.check_rate_limit(&key) {
        tracing::warn!(client = %key, path = %request.uri().path(), "rate limit exceeded");
        return Err(ApiError::TooManyRequests);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::body::Body;

    #[test]
    fn test_rate_limiter() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        assert!(limiter.check_rate_limit("client1"));
        assert!(limiter.check_rate_limit("client1"));
        assert!(limiter.check_rate_limit("client1"));

        assert!(!limiter.check_rate_limit("client1"));

        assert!(limiter.check_rate_limit("client2"));
    }

    #[test]
    fn test_rate_limiter_window_expires() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));

        assert!(limiter.check_rate_limit("client"));
        assert!(!limiter.check_rate_limit("client"));

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check_rate_limit("client"));
    }

    fn request_from(peer: &str) -> axum::http::request::Builder {
        let addr: SocketAddr = peer.parse().unwrap();
        Request::builder().extension(ConnectInfo(addr))
    }

    #[test]
    fn test_client_key_uses_peer_address() {
        let request = request_from("192.0.2.10:51234")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&request, false), "192.0.2.10");

        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_key(&request, false), "unknown");
    }

    #[test]
    fn test_client_key_behind_trusted_proxy() {
        let request = request_from("10.0.0.1:8080")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&request, true), "203.0.113.7");

        let request = request_from("10.0.0.1:8080")
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&request, true), "198.51.100.2");

        let request = request_from("10.0.0.1:8080").body(Body::empty()).unwrap();
        assert_eq!(client_key(&request, true), "10.0.0.1");
    }

    #[test]
    fn test_role_check() {
        let mut request = Request::builder().body(Body::empty()).unwrap();
        request.extensions_mut().insert(UserSession {
            user_id: uuid::Uuid::new_v4(),
            email: "athlete@example.com".into(),
            role: UserRole::Athlete,
            jti: "jti".into(),
        });

        assert!(require_role(&request, UserRole::Athlete, "Athlete access required").is_ok());
        assert_matches!(
            require_role(&request, UserRole::Coach, "Coach access required"),
            Err(ApiError::Forbidden(message)) if message == "Coach access required"
        );
    }
}
