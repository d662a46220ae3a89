use anyhow::Result;
use clap::{Args, Subcommand};
use treino_shared::LogWorkout;
use uuid::Uuid;

use super::{check, Context};
use crate::output;

#[derive(Subcommand)]
pub enum MyProgramsCommand {
    /// List the programs assigned to you
    List,

    /// Show one of your programs
    Show {
        /// Program ID
        id: Uuid,
    },
}

impl MyProgramsCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let client = ctx.client()?;

        match self {
            MyProgramsCommand::List => {
                let programs = client.my_programs().await?;
                print!("{}", output::render_programs(&programs));
            }
            MyProgramsCommand::Show { id } => {
                let program = client.my_program(id).await?;
                print!("{}", output::render_program(&program));
            }
        }

        Ok(())
    }
}

#[derive(Args)]
pub struct LogCommand {
    /// Workout ID
    workout_id: Uuid,

    /// How the session went
    #[arg(long)]
    notes: Option<String>,
}

impl LogCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        check(&LogWorkout {
            notes: self.notes.clone(),
        })?;

        let log = ctx
            .client()?
            .log_workout(self.workout_id, self.notes)
            .await?;

        output::success(&format!(
            "Workout logged at {}",
            log.completed_at.format("%Y-%m-%d %H:%M")
        ));
        Ok(())
    }
}

#[derive(Args)]
pub struct LogsCommand {
    /// Workout ID
    workout_id: Uuid,
}

impl LogsCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let logs = ctx.client()?.workout_logs(self.workout_id).await?;
        print!("{}", output::render_logs(&logs));
        Ok(())
    }
}
