use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::{Claims, UserRole, UserSession};
use crate::error::ApiError;

const INVALID_TOKEN: &str = "Invalid or expired token";

/// JWT service for issuing and validating access tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("access_token_expires_in", &self.access_token_expires_in)
            .finish()
    }
}

impl JwtService {
    pub fn new(secret: &str, access_token_expires_in: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in,
        }
    }

    /// Create an access token for a user
    pub fn create_access_token(
        &self,
        user_id: Uuid,
        email: &str,
        role: UserRole,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + self.access_token_expires_in;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Validate signature and expiry, returning the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|err| {
                tracing::debug!(error = %err, "rejected access token");
                ApiError::Unauthorized(INVALID_TOKEN.to_string())
            })
    }

    pub fn extract_user_session(&self, token: &str) -> Result<UserSession, ApiError> {
        let claims = self.validate_token(token)?;
        UserSession::from_claims(&claims)
            .map_err(|_| ApiError::Unauthorized(INVALID_TOKEN.to_string()))
    }
}

/// Extract bearer token from an Authorization header value
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, ApiError> {
    match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ApiError::Unauthorized(INVALID_TOKEN.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test_secret", Duration::minutes(15))
    }

    #[test]
    fn test_jwt_creation_and_validation() {
        let jwt_service = service();
        let user_id = Uuid::new_v4();

        let token = jwt_service
            .create_access_token(user_id, "athlete@example.com", UserRole::Athlete)
            .unwrap();
        let claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "athlete@example.com");
        assert_eq!(claims.role, UserRole::Athlete);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(extract_bearer_token("Bearer test_token").unwrap(), "test_token");

        assert!(extract_bearer_token("Invalid header").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
        assert!(extract_bearer_token("bearer test_token").is_err());
    }

    #[test]
    fn test_user_session_extraction() {
        let jwt_service = service();
        let user_id = Uuid::new_v4();

        let token = jwt_service
            .create_access_token(user_id, "coach@example.com", UserRole::Coach)
            .unwrap();
        let session = jwt_service.extract_user_session(&token).unwrap();

        assert_eq!(session.user_id, user_id);
        assert_eq!(session.email, "coach@example.com");
        assert_eq!(session.role, UserRole::Coach);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = JwtService::new("other_secret", Duration::minutes(15))
            .create_access_token(Uuid::new_v4(), "coach@example.com", UserRole::Coach)
            .unwrap();

        assert!(matches!(
            service().validate_token(&token),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let expired = JwtService::new("test_secret", Duration::minutes(-5));
        let token = expired
            .create_access_token(Uuid::new_v4(), "coach@example.com", UserRole::Coach)
            .unwrap();

        assert!(service().validate_token(&token).is_err());
    }

    #[test]
    fn test_each_token_has_unique_jti() {
        let jwt_service = service();
        let user_id = Uuid::new_v4();

        let first = jwt_service
            .create_access_token(user_id, "coach@example.com", UserRole::Coach)
            .unwrap();
        let second = jwt_service
            .create_access_token(user_id, "coach@example.com", UserRole::Coach)
            .unwrap();

        assert_ne!(
            jwt_service.validate_token(&first).unwrap().jti,
            jwt_service.validate_token(&second).unwrap().jti
        );
    }
}
