use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use treino_shared::{Exercise, ProgramExerciseDetail};

/// A prescription row joined with its catalog exercise.
#[derive(Debug, Clone, FromRow)]
pub struct ProgramExerciseRow {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub sets: Option<String>,
    pub reps: Option<String>,
    pub load: Option<String>,
    pub notes: Option<String>,
    pub position: i32,
    pub exercise_name: String,
    pub exercise_video_url: Option<String>,
    pub exercise_created_at: DateTime<Utc>,
}

pub const PROGRAM_EXERCISE_SELECT: &str = "SELECT pe.id, pe.workout_id, pe.exercise_id, pe.sets, pe.reps, pe.load, \
     pe.notes, pe.position, e.name AS exercise_name, e.video_url AS exercise_video_url, \
     e.created_at AS exercise_created_at \
     FROM program_exercises pe \
     JOIN exercises e ON e.id = pe.exercise_id";

impl From<ProgramExerciseRow> for ProgramExerciseDetail {
    fn from(row: ProgramExerciseRow) -> Self {
        ProgramExerciseDetail {
            id: row.id,
            workout_id: row.workout_id,
            exercise_id: row.exercise_id,
            sets: row.sets,
            reps: row.reps,
            load: row.load,
            notes: row.notes,
            order: row.position,
            exercise: Exercise {
                id: row.exercise_id,
                name: row.exercise_name,
                video_url: row.exercise_video_url,
                created_at: row.exercise_created_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_becomes_order_with_nested_exercise() {
        let exercise_id = Uuid::new_v4();
        let row = ProgramExerciseRow {
            id: Uuid::new_v4(),
            workout_id: Uuid::new_v4(),
            exercise_id,
            sets: Some("3".into()),
            reps: Some("8-10".into()),
            load: None,
            notes: None,
            position: 2,
            exercise_name: "Back Squat".into(),
            exercise_video_url: None,
            exercise_created_at: Utc::now(),
        };

        let detail = ProgramExerciseDetail::from(row);
        assert_eq!(detail.order, 2);
        assert_eq!(detail.exercise.id, exercise_id);
        assert_eq!(detail.exercise.name, "Back Squat");

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["order"], 2);
        assert_eq!(json["exercise"]["name"], "Back Squat");
    }
}
