use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Canonical form of a request before validation: surrounding whitespace is
/// dropped so a blank name fails the length rules.
pub trait Normalize {
    fn normalize(self) -> Self;
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

/// Optional field on a create request; blank means absent.
fn trimmed_or_none(value: Option<String>) -> Option<String> {
    value.map(trimmed).filter(|value| !value.is_empty())
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCoach {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,
}

impl Normalize for RegisterCoach {
    fn normalize(self) -> Self {
        Self {
            name: trimmed(self.name),
            email: trimmed(self.email),
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Normalize for Login {
    fn normalize(self) -> Self {
        Self {
            email: trimmed(self.email),
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InviteAthlete {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

impl Normalize for InviteAthlete {
    fn normalize(self) -> Self {
        Self {
            name: trimmed(self.name),
            email: trimmed(self.email),
            notes: trimmed_or_none(self.notes),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivateAthlete {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RequestPasswordReset {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

impl Normalize for RequestPasswordReset {
    fn normalize(self) -> Self {
        Self {
            email: trimmed(self.email),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPassword {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExercise {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Video URL must be a valid URL"))]
    pub video_url: Option<String>,
}

impl Normalize for CreateExercise {
    fn normalize(self) -> Self {
        Self {
            name: trimmed(self.name),
            video_url: trimmed_or_none(self.video_url),
        }
    }
}

// ============================================================================
// Programs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProgram {
    pub athlete_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

impl Normalize for CreateProgram {
    fn normalize(self) -> Self {
        Self {
            title: trimmed(self.title),
            description: trimmed_or_none(self.description),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgram {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

impl Normalize for UpdateProgram {
    // A present but blank title stays present so validation rejects it.
    fn normalize(self) -> Self {
        Self {
            title: self.title.map(trimmed),
            description: self.description.map(trimmed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkout {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,
}

impl Normalize for CreateWorkout {
    fn normalize(self) -> Self {
        Self {
            title: trimmed_or_none(self.title),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,
}

impl Normalize for UpdateWorkout {
    fn normalize(self) -> Self {
        Self {
            title: self.title.map(trimmed),
            ..self
        }
    }
}

/// One set/rep/load prescription inside a workout.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProgramExerciseInput {
    pub exercise_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50, message = "Sets must be at most 50 characters"))]
    pub sets: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50, message = "Reps must be at most 50 characters"))]
    pub reps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50, message = "Load must be at most 50 characters"))]
    pub load: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
    #[validate(range(min = 0, message = "Order must not be negative"))]
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkProgramExercises {
    #[validate(length(max = 100, message = "A workout holds at most 100 exercises"))]
    #[validate(nested)]
    pub exercises: Vec<ProgramExerciseInput>,
}

// ============================================================================
// Athlete portal
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogWorkout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramQuery {
    pub athlete_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_coach_rejects_short_password_and_bad_email() {
        let body: RegisterCoach = serde_json::from_value(json!({
            "name": "Ana",
            "email": "not-an-email",
            "password": "short"
        }))
        .unwrap();

        let errors = body.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn invite_athlete_accepts_missing_notes() {
        let body: InviteAthlete = serde_json::from_value(json!({
            "name": "Bruno",
            "email": "bruno@example.com"
        }))
        .unwrap();

        assert!(body.notes.is_none());
        assert!(body.validate().is_ok());
    }

    #[test]
    fn refresh_request_uses_camel_case() {
        let body: RefreshTokenRequest =
            serde_json::from_value(json!({ "refreshToken": "abc" })).unwrap();
        assert_eq!(body.refresh_token, "abc");
        assert!(serde_json::from_value::<RefreshTokenRequest>(json!({ "refresh_token": "abc" })).is_err());
    }

    #[test]
    fn create_workout_parses_plain_dates() {
        let body: CreateWorkout =
            serde_json::from_value(json!({ "date": "2025-03-10", "title": "Lower body" })).unwrap();
        assert_eq!(body.date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());

        assert!(serde_json::from_value::<CreateWorkout>(json!({ "date": "10/03/2025" })).is_err());
    }

    #[test]
    fn bulk_exercises_validate_each_item() {
        let body: BulkProgramExercises = serde_json::from_value(json!({
            "exercises": [
                { "exerciseId": Uuid::new_v4(), "sets": "3", "reps": "10", "order": 0 },
                { "exerciseId": Uuid::new_v4(), "order": -1 }
            ]
        }))
        .unwrap();

        assert!(body.validate().is_err());
    }

    #[test]
    fn bulk_exercises_allow_empty_list() {
        let body = BulkProgramExercises { exercises: vec![] };
        assert!(body.validate().is_ok());
    }

    #[test]
    fn create_exercise_checks_video_url() {
        let ok = CreateExercise {
            name: "Back squat".into(),
            video_url: Some("https://videos.example.com/squat".into()),
        };
        assert!(ok.validate().is_ok());

        let bad = CreateExercise {
            name: "Back squat".into(),
            video_url: Some("squat video".into()),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn blank_names_fail_after_normalizing() {
        let body = RegisterCoach {
            name: "   ".into(),
            email: " coach@example.com ".into(),
            password: "password123".into(),
        }
        .normalize();

        assert_eq!(body.email, "coach@example.com");
        let errors = body.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let invite = InviteAthlete {
            name: "\t".into(),
            email: "bruno@example.com".into(),
            notes: Some("  ".into()),
        }
        .normalize();
        assert!(invite.notes.is_none());
        assert!(invite.validate().unwrap_err().field_errors().contains_key("name"));
    }

    #[test]
    fn normalizing_keeps_inner_whitespace() {
        let program = CreateProgram {
            athlete_id: Uuid::new_v4(),
            title: "  Off season  block ".into(),
            description: Some(" ".into()),
        }
        .normalize();

        assert_eq!(program.title, "Off season  block");
        assert!(program.description.is_none());
        assert!(program.validate().is_ok());
    }

    #[test]
    fn blank_update_title_is_still_rejected() {
        let body = UpdateProgram {
            title: Some("  ".into()),
            description: None,
        }
        .normalize();

        assert_eq!(body.title.as_deref(), Some(""));
        assert!(body.validate().is_err());

        let exercise = CreateExercise {
            name: " ".into(),
            video_url: None,
        }
        .normalize();
        assert!(exercise.validate().is_err());
    }

    #[test]
    fn update_program_rejects_empty_title() {
        let body = UpdateProgram {
            title: Some(String::new()),
            description: None,
        };
        assert!(body.validate().is_err());
        assert!(UpdateProgram::default().validate().is_ok());
    }
}
