use anyhow::Result;
use clap::Subcommand;
use treino_shared::{CreateExercise, Normalize};

use super::{check, Context};
use crate::output;

#[derive(Subcommand)]
pub enum ExercisesCommand {
    /// List the exercise catalog
    List,

    /// Add an exercise to the catalog
    Add {
        #[arg(long)]
        name: String,

        /// Demonstration video
        #[arg(long)]
        video_url: Option<String>,
    },
}

impl ExercisesCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let client = ctx.client()?;

        match self {
            ExercisesCommand::List => {
                let exercises = client.list_exercises().await?;
                print!("{}", output::render_exercises(&exercises));
            }
            ExercisesCommand::Add { name, video_url } => {
                let request = CreateExercise { name, video_url }.normalize();
                check(&request)?;

                let exercise = client.create_exercise(&request).await?;
                output::success(&format!("Added {} ({})", exercise.name, exercise.id));
            }
        }

        Ok(())
    }
}
