use anyhow::{Context, Result};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

use treino_shared::{
    ActivateAthlete, ApiResponse, AthleteDetail, AthleteSummary, AuthTokens, AuthUser,
    BulkProgramExercises, CreateExercise, CreateProgram, CreateWorkout, Exercise, InviteAthlete,
    InviteCreated, LogWorkout, Login, Program, ProgramDetail, ProgramExerciseDetail,
    ProgramSummary, RefreshTokenRequest, RefreshedTokens, RequestPasswordReset, ResetPassword,
    UpdateProgram, UpdateWorkout, Workout, WorkoutLog,
};

use crate::config::Config;

mod error;

pub use error::{describe_validation, ApiError};

/// Client for the Treino REST API.
///
/// Tokens live in the config file at `config_path`; a rotated pair is written
/// back as soon as the server hands it out.
pub struct ApiClient {
    client: Client,
    base_url: String,
    config: Mutex<Config>,
    config_path: PathBuf,
}

impl ApiClient {
    pub fn new(config: Config, config_path: PathBuf) -> Result<Self> {
        let timeout = Duration::from_secs(config.api.timeout_seconds);
        let base_url = config.api.base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            config: Mutex::new(config),
            config_path,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn config(&self) -> MutexGuard<'_, Config> {
        self.config.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_authenticated(&self) -> bool {
        self.config().is_authenticated()
    }

    fn store_tokens(&self, access_token: String, refresh_token: String) -> Result<()> {
        let mut config = self.config();
        config.set_tokens(access_token, refresh_token);
        self.persist_auth(&config)
    }

    pub fn clear_tokens(&self) -> Result<()> {
        let mut config = self.config();
        config.clear_tokens();
        self.persist_auth(&config)
    }

    /// Write only the `[auth]` section so a `--api-url` override never lands
    /// in the file.
    fn persist_auth(&self, config: &Config) -> Result<()> {
        let mut stored = Config::load_from(&self.config_path)?;
        stored.auth = config.auth.clone();
        stored.save_to(&self.config_path)
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "sending request");

        let mut request = self.client.request(method, &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))
    }

    async fn send_authenticated(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response> {
        self.send_authenticated_with(method, path, |_| Ok(body.cloned()))
            .await
    }

    /// Send with the stored access token. A 401 triggers exactly one refresh
    /// and retry; if the refresh is refused the stored session is dropped.
    ///
    /// The body is rebuilt from the config before each attempt, so a retry
    /// sees tokens rotated by the refresh.
    async fn send_authenticated_with<F>(
        &self,
        method: Method,
        path: &str,
        build_body: F,
    ) -> Result<Response>
    where
        F: Fn(&Config) -> Result<Option<Value>>,
    {
        let (token, body) = {
            let config = self.config();
            if !config.is_authenticated() {
                return Err(ApiError::NotLoggedIn.into());
            }
            (config.auth.access_token.clone(), build_body(&*config)?)
        };

        let response = self
            .send(method.clone(), path, body.as_ref(), Some(&token))
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!("access token rejected, attempting refresh");
        let token = match self.refresh_session().await {
            Ok(token) => token,
            Err(e) => {
                tracing::debug!(error = %e, "refresh failed, clearing stored session");
                self.clear_tokens()?;
                return Err(ApiError::SessionExpired.into());
            }
        };

        let body = build_body(&*self.config())?;
        self.send(method, path, body.as_ref(), Some(&token))
            .await
            .context("Failed to retry request after token refresh")
    }

    async fn refresh_session(&self) -> Result<String> {
        let refresh_token = {
            let config = self.config();
            if config.auth.refresh_token.is_empty() {
                return Err(anyhow::anyhow!("No refresh token available"));
            }
            config.auth.refresh_token.clone()
        };

        let body = to_body(&RefreshTokenRequest { refresh_token })?;
        let response = self
            .send(Method::POST, "/auth/refresh", Some(&body), None)
            .await?;
        let tokens: RefreshedTokens = read_data(response).await?;

        self.store_tokens(tokens.access_token.clone(), tokens.refresh_token)?;
        tracing::info!("access token refreshed");
        Ok(tokens.access_token)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send_authenticated(Method::GET, path, None).await?;
        read_data(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = to_body(body)?;
        let response = self
            .send_authenticated(Method::POST, path, Some(&body))
            .await?;
        read_data(response).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = to_body(body)?;
        let response = self
            .send_authenticated(Method::PUT, path, Some(&body))
            .await?;
        read_data(response).await
    }

    async fn delete(&self, path: &str) -> Result<String> {
        let response = self.send_authenticated(Method::DELETE, path, None).await?;
        read_message(response).await
    }

    async fn post_public<B: Serialize>(&self, path: &str, body: &B) -> Result<Response> {
        let body = to_body(body)?;
        self.send(Method::POST, path, Some(&body), None).await
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser> {
        let request = Login {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self.post_public("/auth/login", &request).await?;
        let tokens: AuthTokens = read_data(response).await?;

        self.store_tokens(tokens.access_token, tokens.refresh_token)?;
        tracing::info!(user_id = %tokens.user.id, "logged in");
        Ok(tokens.user)
    }

    /// Revoke the stored refresh token server-side, then forget the session
    /// locally whatever the server said.
    pub async fn logout(&self) -> Result<()> {
        let has_refresh_token = !self.config().auth.refresh_token.is_empty();

        let result = if !has_refresh_token {
            Ok(())
        } else {
            let current_refresh_token = |config: &Config| {
                to_body(&RefreshTokenRequest {
                    refresh_token: config.auth.refresh_token.clone(),
                })
                .map(Some)
            };
            match self
                .send_authenticated_with(Method::POST, "/auth/logout", current_refresh_token)
                .await
            {
                Ok(response) => read_message(response).await.map(|_| ()),
                Err(e) => Err(e),
            }
        };

        self.clear_tokens()?;
        result
    }

    pub async fn me(&self) -> Result<AuthUser> {
        self.get("/auth/me").await
    }

    pub async fn activate(&self, token: &str, password: &str) -> Result<String> {
        let request = ActivateAthlete {
            token: token.to_string(),
            password: password.to_string(),
        };
        let response = self.post_public("/auth/activate", &request).await?;
        read_message(response).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        let request = RequestPasswordReset {
            email: email.to_string(),
        };
        let response = self.post_public("/auth/forgot-password", &request).await?;
        read_message(response).await
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<String> {
        let request = ResetPassword {
            token: token.to_string(),
            password: password.to_string(),
        };
        let response = self.post_public("/auth/reset-password", &request).await?;
        read_message(response).await
    }

    // ------------------------------------------------------------------
    // Coach
    // ------------------------------------------------------------------

    pub async fn invite_athlete(&self, invite: &InviteAthlete) -> Result<InviteCreated> {
        self.post("/auth/invite-athlete", invite).await
    }

    pub async fn list_athletes(&self) -> Result<Vec<AthleteSummary>> {
        self.get("/athletes").await
    }

    pub async fn get_athlete(&self, id: Uuid) -> Result<AthleteDetail> {
        self.get(&format!("/athletes/{id}")).await
    }

    pub async fn list_exercises(&self) -> Result<Vec<Exercise>> {
        self.get("/exercises").await
    }

    pub async fn create_exercise(&self, exercise: &CreateExercise) -> Result<Exercise> {
        self.post("/exercises", exercise).await
    }

    pub async fn list_programs(&self, athlete_id: Option<Uuid>) -> Result<Vec<ProgramSummary>> {
        match athlete_id {
            Some(id) => self.get(&format!("/programs?athleteId={id}")).await,
            None => self.get("/programs").await,
        }
    }

    pub async fn get_program(&self, id: Uuid) -> Result<ProgramDetail> {
        self.get(&format!("/programs/{id}")).await
    }

    pub async fn create_program(&self, program: &CreateProgram) -> Result<Program> {
        self.post("/programs", program).await
    }

    pub async fn update_program(&self, id: Uuid, changes: &UpdateProgram) -> Result<Program> {
        self.put(&format!("/programs/{id}"), changes).await
    }

    pub async fn delete_program(&self, id: Uuid) -> Result<String> {
        self.delete(&format!("/programs/{id}")).await
    }

    pub async fn add_workout(&self, program_id: Uuid, workout: &CreateWorkout) -> Result<Workout> {
        self.post(&format!("/programs/{program_id}/workouts"), workout)
            .await
    }

    pub async fn update_workout(
        &self,
        program_id: Uuid,
        workout_id: Uuid,
        changes: &UpdateWorkout,
    ) -> Result<Workout> {
        self.put(
            &format!("/programs/{program_id}/workouts/{workout_id}"),
            changes,
        )
        .await
    }

    pub async fn delete_workout(&self, program_id: Uuid, workout_id: Uuid) -> Result<String> {
        self.delete(&format!("/programs/{program_id}/workouts/{workout_id}"))
            .await
    }

    /// Replace every prescription in a workout with `exercises`.
    pub async fn set_workout_exercises(
        &self,
        program_id: Uuid,
        workout_id: Uuid,
        exercises: &BulkProgramExercises,
    ) -> Result<Vec<ProgramExerciseDetail>> {
        self.put(
            &format!("/programs/{program_id}/workouts/{workout_id}/exercises"),
            exercises,
        )
        .await
    }

    // ------------------------------------------------------------------
    // Athlete portal
    // ------------------------------------------------------------------

    pub async fn my_programs(&self) -> Result<Vec<ProgramSummary>> {
        self.get("/me/programs").await
    }

    pub async fn my_program(&self, id: Uuid) -> Result<ProgramDetail> {
        self.get(&format!("/me/programs/{id}")).await
    }

    pub async fn log_workout(&self, workout_id: Uuid, notes: Option<String>) -> Result<WorkoutLog> {
        self.post(
            &format!("/me/workouts/{workout_id}/logs"),
            &LogWorkout { notes },
        )
        .await
    }

    pub async fn workout_logs(&self, workout_id: Uuid) -> Result<Vec<WorkoutLog>> {
        self.get(&format!("/me/workouts/{workout_id}/logs")).await
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<Value> {
    serde_json::to_value(body).context("Failed to serialize request body")
}

async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<ApiResponse<T>> {
    let status = response.status();
    let text = response
        .text()
        .await
        .context("Failed to read response body")?;

    if !status.is_success() {
        return Err(ApiError::from_body(status, &text).into());
    }

    serde_json::from_str(&text)
        .map_err(|e| ApiError::UnexpectedResponse(e.to_string()).into())
}

/// Unwrap `{ "success": true, "data": ... }`.
pub async fn read_data<T: DeserializeOwned>(response: Response) -> Result<T> {
    read_envelope::<T>(response)
        .await?
        .data
        .ok_or_else(|| ApiError::UnexpectedResponse("response carried no data".into()).into())
}

/// Unwrap `{ "success": true, "message": ... }`.
pub async fn read_message(response: Response) -> Result<String> {
    let envelope = read_envelope::<Value>(response).await?;
    Ok(envelope.message.unwrap_or_default())
}
