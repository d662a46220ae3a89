use anyhow::{bail, Context as _, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use dialoguer::Confirm;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use treino_shared::{BulkProgramExercises, CreateWorkout, Normalize, UpdateWorkout};
use uuid::Uuid;

use super::{check, Context};
use crate::output;

#[derive(Subcommand)]
pub enum WorkoutsCommand {
    /// Schedule a workout inside a program
    Add {
        /// Program ID
        program: Uuid,

        /// Day of the workout (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        #[arg(long)]
        title: Option<String>,
    },

    /// Move a workout to another day or retitle it
    Update {
        /// Program ID
        program: Uuid,

        /// Workout ID
        workout: Uuid,

        /// New day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        title: Option<String>,
    },

    /// Remove a workout with its exercises and logs
    Delete {
        /// Program ID
        program: Uuid,

        /// Workout ID
        workout: Uuid,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Replace the exercises of a workout from a JSON file
    SetExercises {
        /// Program ID
        program: Uuid,

        /// Workout ID
        workout: Uuid,

        /// JSON list of prescriptions, or an object with an `exercises` list
        #[arg(long)]
        file: PathBuf,
    },
}

impl WorkoutsCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            WorkoutsCommand::Add {
                program,
                date,
                title,
            } => {
                let request = CreateWorkout { date, title }.normalize();
                check(&request)?;

                let workout = ctx.client()?.add_workout(program, &request).await?;
                output::success(&format!("Scheduled workout {} on {}", workout.id, workout.date));
            }
            WorkoutsCommand::Update {
                program,
                workout,
                date,
                title,
            } => {
                if date.is_none() && title.is_none() {
                    bail!("Nothing to update: pass --date and/or --title");
                }
                let request = UpdateWorkout { date, title }.normalize();
                check(&request)?;

                let updated = ctx
                    .client()?
                    .update_workout(program, workout, &request)
                    .await?;
                output::success(&format!("Workout {} is on {}", updated.id, updated.date));
            }
            WorkoutsCommand::Delete {
                program,
                workout,
                force,
            } => {
                if !force
                    && !Confirm::new()
                        .with_prompt(format!("Delete workout {workout} and its logs?"))
                        .default(false)
                        .interact()?
                {
                    println!("Cancelled.");
                    return Ok(());
                }

                let message = ctx.client()?.delete_workout(program, workout).await?;
                output::success(&message);
            }
            WorkoutsCommand::SetExercises {
                program,
                workout,
                file,
            } => {
                let request = read_prescriptions(&file)?;
                check(&request)?;

                let exercises = ctx
                    .client()?
                    .set_workout_exercises(program, workout, &request)
                    .await?;
                output::success(&format!("Workout now has {} exercises", exercises.len()));
                print!("{}", output::render_prescriptions(&exercises));
            }
        }

        Ok(())
    }
}

/// Load prescriptions for `set-exercises`. A bare JSON array is accepted as
/// shorthand for `{ "exercises": [...] }`.
pub fn read_prescriptions(path: &Path) -> Result<BulkProgramExercises> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let value = match value {
        Value::Array(items) => json!({ "exercises": items }),
        other => other,
    };

    serde_json::from_value(value)
        .with_context(|| format!("{} does not describe workout exercises", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("exercises.json");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn bare_list_is_accepted() {
        let dir = TempDir::new().unwrap();
        let exercise_id = Uuid::new_v4();
        let path = write(
            &dir,
            &format!(r#"[{{ "exerciseId": "{exercise_id}", "sets": "3", "reps": "8", "order": 0 }}]"#),
        );

        let bulk = read_prescriptions(&path).unwrap();

        assert_eq!(bulk.exercises.len(), 1);
        assert_eq!(bulk.exercises[0].exercise_id, exercise_id);
        assert_eq!(bulk.exercises[0].reps.as_deref(), Some("8"));
    }

    #[test]
    fn wrapped_empty_list_clears_the_workout() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{ "exercises": [] }"#);

        assert!(read_prescriptions(&path).unwrap().exercises.is_empty());
    }

    #[test]
    fn unreadable_input_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "not json");

        let error = read_prescriptions(&path).unwrap_err();
        assert!(error.to_string().contains("exercises.json is not valid JSON"));

        let missing = dir.path().join("absent.json");
        assert!(read_prescriptions(&missing).is_err());
    }
}
