use anyhow::{bail, Result};
use clap::Subcommand;
use dialoguer::Confirm;
use treino_shared::{CreateProgram, Normalize, UpdateProgram};
use uuid::Uuid;

use super::{check, Context};
use crate::output;

#[derive(Subcommand)]
pub enum ProgramsCommand {
    /// List your programs
    List {
        /// Only programs assigned to this athlete
        #[arg(long)]
        athlete: Option<Uuid>,
    },

    /// Show a program with its workouts and exercises
    Show {
        /// Program ID
        id: Uuid,
    },

    /// Create a program for one of your athletes
    Create {
        /// Athlete the program is assigned to
        #[arg(long)]
        athlete: Uuid,

        #[arg(long)]
        title: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Rename a program or change its description
    Update {
        /// Program ID
        id: Uuid,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a program and everything scheduled in it
    Delete {
        /// Program ID
        id: Uuid,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl ProgramsCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            ProgramsCommand::List { athlete } => {
                let programs = ctx.client()?.list_programs(athlete).await?;
                print!("{}", output::render_programs(&programs));
            }
            ProgramsCommand::Show { id } => {
                let program = ctx.client()?.get_program(id).await?;
                print!("{}", output::render_program(&program));
            }
            ProgramsCommand::Create {
                athlete,
                title,
                description,
            } => {
                let request = CreateProgram {
                    athlete_id: athlete,
                    title,
                    description,
                }
                .normalize();
                check(&request)?;

                let program = ctx.client()?.create_program(&request).await?;
                output::success(&format!("Created {} ({})", program.title, program.id));
            }
            ProgramsCommand::Update {
                id,
                title,
                description,
            } => {
                if title.is_none() && description.is_none() {
                    bail!("Nothing to update: pass --title and/or --description");
                }
                let request = UpdateProgram { title, description }.normalize();
                check(&request)?;

                let program = ctx.client()?.update_program(id, &request).await?;
                output::success(&format!("Updated {} ({})", program.title, program.id));
            }
            ProgramsCommand::Delete { id, force } => {
                if !force
                    && !Confirm::new()
                        .with_prompt(format!("Delete program {id} and all of its workouts?"))
                        .default(false)
                        .interact()?
                {
                    println!("Cancelled.");
                    return Ok(());
                }

                let message = ctx.client()?.delete_program(id).await?;
                output::success(&message);
            }
        }

        Ok(())
    }
}
