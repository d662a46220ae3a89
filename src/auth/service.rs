use chrono::Utc;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use treino_shared::{
    normalize_email, AuthTokens, AuthUser, InviteAthlete, InviteCreated, Login, RefreshedTokens,
    RegisterCoach,
};

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::tokens::{expiry_from_now, generate_token, hash_token, is_redeemable};
use crate::auth::{
    JwtService, RefreshTokenRecord, SingleUseToken, TokenSettings, UserRole, UserSession,
};
use crate::error::ApiError;
use crate::models::{UserAccount, USER_ACCOUNT_SELECT};
use crate::services::mail_service::{invite_email, password_reset_email, Mailer};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token";
const EMAIL_TAKEN: &str = "Email already registered";

/// Issues and redeems every credential: access JWTs, refresh, invite and reset tokens.
#[derive(Debug, Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    settings: TokenSettings,
    mailer: Mailer,
    app_url: String,
    db: PgPool,
}

impl AuthService {
    pub fn new(
        db: PgPool,
        jwt_secret: &str,
        settings: TokenSettings,
        mailer: Mailer,
        app_url: impl Into<String>,
    ) -> Self {
        Self {
            jwt_service: JwtService::new(jwt_secret, settings.access_token_ttl),
            settings,
            mailer,
            app_url: app_url.into(),
            db,
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt_service
    }

    /// Validate a bearer token; no database access.
    pub fn authenticate(&self, token: &str) -> Result<UserSession, ApiError> {
        self.jwt_service.extract_user_session(token)
    }

    /// Register a coach account and sign it in
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register_coach(&self, request: RegisterCoach) -> Result<AuthTokens, ApiError> {
        let email = normalize_email(&request.email);

        if self.find_account_by_email(&email).await?.is_some() {
            return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let password_hash =
            hash_password_blocking(request.password, self.settings.bcrypt_cost).await?;
        let user_id = Uuid::new_v4();
        let name = request.name;

        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT INTO user_profiles (id, email, password_hash, role, is_active)
             VALUES ($1, $2, $3, $4, TRUE)",
        )
        .bind(user_id)
        .bind(&email)
        .bind(&password_hash)
        .bind(UserRole::Coach.as_str())
        .execute(&mut *tx)
        .await
        .map_err(ApiError::conflict_on_unique(EMAIL_TAKEN))?;

        sqlx::query("INSERT INTO coaches (id, user_profile_id, name) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&name)
            .execute(&mut *tx)
            .await?;

        let refresh_token = self.insert_refresh_token(&mut *tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user_id, "coach registered");

        let access_token = self
            .jwt_service
            .create_access_token(user_id, &email, UserRole::Coach)?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            user: AuthUser {
                id: user_id,
                email,
                role: UserRole::Coach,
                name,
            },
        })
    }

    /// Login user
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: Login) -> Result<AuthTokens, ApiError> {
        let email = normalize_email(&request.email);

        let account = self
            .find_account_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let password_hash = account
            .password_hash
            .clone()
            .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !account.is_active {
            return Err(ApiError::Unauthorized("Account is not active".to_string()));
        }

        if !verify_password_blocking(request.password, password_hash).await? {
            tracing::info!(user_id = %account.id, "login rejected: wrong password");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let role = account_role(&account)?;
        let access_token = self
            .jwt_service
            .create_access_token(account.id, &account.email, role)?;
        let refresh_token = self.insert_refresh_token(&self.db, account.id).await?;

        tracing::info!(user_id = %account.id, role = %role, "user logged in");

        Ok(AuthTokens {
            access_token,
            refresh_token,
            user: account.to_auth_user(role),
        })
    }

    /// Exchange a refresh token for a new access token and a new refresh token.
    /// The presented token is consumed.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, ApiError> {
        let mut tx = self.db.begin().await?;

        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            "DELETE FROM refresh_tokens WHERE token_hash = $1
             RETURNING user_profile_id, expires_at",
        )
        .bind(hash_token(refresh_token))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()))?;

        if record.expires_at <= Utc::now() {
            // Commit so the expired row is gone either way
            tx.commit().await?;
            return Err(ApiError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()));
        }

        let query = format!("{USER_ACCOUNT_SELECT} WHERE up.id = $1");
        let account = sqlx::query_as::<_, UserAccount>(&query)
            .bind(record.user_profile_id)
            .fetch_optional(&mut *tx)
            .await?
            .filter(|account| account.is_active)
            .ok_or_else(|| ApiError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()))?;

        let role = account_role(&account)?;
        let new_refresh_token = self.insert_refresh_token(&mut *tx, account.id).await?;
        tx.commit().await?;

        let access_token = self
            .jwt_service
            .create_access_token(account.id, &account.email, role)?;

        tracing::debug!(user_id = %account.id, "refresh token rotated");

        Ok(RefreshedTokens {
            access_token,
            refresh_token: new_refresh_token,
        })
    }

    /// Revoke one of the caller's refresh tokens. Unknown tokens are ignored.
    #[tracing::instrument(skip(self, refresh_token))]
    pub async fn logout(&self, user_id: Uuid, refresh_token: &str) -> Result<(), ApiError> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens WHERE token_hash = $1 AND user_profile_id = $2",
        )
        .bind(hash_token(refresh_token))
        .bind(user_id)
        .execute(&self.db)
        .await?;

        tracing::info!(revoked = result.rows_affected(), "user logged out");
        Ok(())
    }

    /// Create an inactive athlete under the calling coach and mail the activation link
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn invite_athlete(
        &self,
        coach_user_id: Uuid,
        request: InviteAthlete,
    ) -> Result<InviteCreated, ApiError> {
        let email = normalize_email(&request.email);
        let name = request.name;

        let coach_id: Uuid =
            sqlx::query_scalar("SELECT id FROM coaches WHERE user_profile_id = $1")
                .bind(coach_user_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| ApiError::NotFound("Coach not found".to_string()))?;

        if self.find_account_by_email(&email).await?.is_some() {
            return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let user_id = Uuid::new_v4();
        let invite_token = generate_token();

        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT INTO user_profiles (id, email, password_hash, role, is_active)
             VALUES ($1, $2, NULL, $3, FALSE)",
        )
        .bind(user_id)
        .bind(&email)
        .bind(UserRole::Athlete.as_str())
        .execute(&mut *tx)
        .await
        .map_err(ApiError::conflict_on_unique(EMAIL_TAKEN))?;

        sqlx::query(
            "INSERT INTO athletes (id, user_profile_id, coach_id, name, notes)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(coach_id)
        .bind(&name)
        .bind(&request.notes)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO invite_tokens (id, user_profile_id, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(hash_token(&invite_token))
        .bind(expiry_from_now(self.settings.invite_token_ttl))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(coach_id = %coach_id, athlete_user_id = %user_id, "athlete invited");

        self.mailer
            .send_or_log(invite_email(&self.app_url, &email, &name, &invite_token))
            .await;

        Ok(InviteCreated {
            invite_token,
            athlete_email: email,
        })
    }

    /// Set the password of an invited athlete and activate the account
    #[tracing::instrument(skip_all)]
    pub async fn activate_athlete(&self, token: &str, password: String) -> Result<(), ApiError> {
        let invalid = || ApiError::BadRequest("Invalid or expired invite token".to_string());

        let invite = sqlx::query_as::<_, SingleUseToken>(
            "SELECT id, user_profile_id, expires_at, used_at
             FROM invite_tokens WHERE token_hash = $1",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.db)
        .await?
        .filter(|invite| is_redeemable(invite.expires_at, invite.used_at))
        .ok_or_else(invalid)?;

        let password_hash = hash_password_blocking(password, self.settings.bcrypt_cost).await?;

        let mut tx = self.db.begin().await?;

        // Claim the invite first; a concurrent activation loses here
        let claimed = sqlx::query(
            "UPDATE invite_tokens SET used_at = NOW() WHERE id = $1 AND used_at IS NULL",
        )
        .bind(invite.id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            return Err(invalid());
        }

        sqlx::query(
            "UPDATE user_profiles SET password_hash = $2, is_active = TRUE, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(invite.user_profile_id)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %invite.user_profile_id, "athlete activated");
        Ok(())
    }

    /// Start a password reset. Returns the raw token when one was issued;
    /// callers must not reveal whether that happened.
    #[tracing::instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<Option<String>, ApiError> {
        let email = normalize_email(email);

        let account = match self.find_account_by_email(&email).await? {
            Some(account) if account.is_active => account,
            _ => {
                tracing::debug!("password reset requested for unknown or inactive account");
                return Ok(None);
            }
        };

        let token = generate_token();
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE user_profile_id = $1")
            .bind(account.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO password_reset_tokens (id, user_profile_id, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(account.id)
        .bind(hash_token(&token))
        .bind(expiry_from_now(self.settings.reset_token_ttl))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.mailer
            .send_or_log(password_reset_email(&self.app_url, &account.email, &token))
            .await;

        Ok(Some(token))
    }

    /// Set a new password and sign the user out everywhere
    #[tracing::instrument(skip_all)]
    pub async fn reset_password(&self, token: &str, password: String) -> Result<(), ApiError> {
        let invalid = || ApiError::BadRequest("Invalid or expired reset token".to_string());

        let reset = sqlx::query_as::<_, SingleUseToken>(
            "SELECT id, user_profile_id, expires_at, used_at
             FROM password_reset_tokens WHERE token_hash = $1",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.db)
        .await?
        .filter(|reset| is_redeemable(reset.expires_at, reset.used_at))
        .ok_or_else(invalid)?;

        let password_hash = hash_password_blocking(password, self.settings.bcrypt_cost).await?;

        let mut tx = self.db.begin().await?;

        let claimed = sqlx::query(
            "UPDATE password_reset_tokens SET used_at = NOW() WHERE id = $1 AND used_at IS NULL",
        )
        .bind(reset.id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            return Err(invalid());
        }

        sqlx::query("UPDATE user_profiles SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(reset.user_profile_id)
            .bind(&password_hash)
            .execute(&mut *tx)
            .await?;

        let revoked = sqlx::query("DELETE FROM refresh_tokens WHERE user_profile_id = $1")
            .bind(reset.user_profile_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %reset.user_profile_id,
            revoked_sessions = revoked.rows_affected(),
            "password reset"
        );
        Ok(())
    }

    /// Profile of the authenticated user
    pub async fn me(&self, user_id: Uuid) -> Result<AuthUser, ApiError> {
        let query = format!("{USER_ACCOUNT_SELECT} WHERE up.id = $1");
        let account = sqlx::query_as::<_, UserAccount>(&query)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let role = account_role(&account)?;
        Ok(account.to_auth_user(role))
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<UserAccount>, ApiError> {
        let account =
            sqlx::query_as::<_, UserAccount>(&format!("{USER_ACCOUNT_SELECT} WHERE up.email = $1"))
                .bind(email)
                .fetch_optional(&self.db)
                .await?;
        Ok(account)
    }

    async fn insert_refresh_token<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<String, ApiError>
    where
        E: PgExecutor<'e>,
    {
        let token = generate_token();

        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_profile_id, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(hash_token(&token))
        .bind(expiry_from_now(self.settings.refresh_token_ttl))
        .execute(executor)
        .await?;

        Ok(token)
    }
}

fn account_role(account: &UserAccount) -> Result<UserRole, ApiError> {
    account.role().ok_or_else(|| {
        ApiError::Internal(anyhow::anyhow!(
            "user profile {} has unknown role {:?}",
            account.id,
            account.role
        ))
    })
}
