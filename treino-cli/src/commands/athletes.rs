use anyhow::Result;
use clap::Subcommand;
use treino_shared::{InviteAthlete, Normalize};
use uuid::Uuid;

use super::{check, Context};
use crate::output;

#[derive(Subcommand)]
pub enum AthletesCommand {
    /// List your athletes
    List,

    /// Show an athlete and the programs assigned to them
    Show {
        /// Athlete ID
        id: Uuid,
    },

    /// Invite a new athlete by email
    Invite {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Private notes about the athlete
        #[arg(long)]
        notes: Option<String>,
    },
}

impl AthletesCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let client = ctx.client()?;

        match self {
            AthletesCommand::List => {
                let athletes = client.list_athletes().await?;
                print!("{}", output::render_athletes(&athletes));
            }
            AthletesCommand::Show { id } => {
                let athlete = client.get_athlete(id).await?;
                print!("{}", output::render_athlete(&athlete));
            }
            AthletesCommand::Invite { name, email, notes } => {
                let invite = InviteAthlete { name, email, notes }.normalize();
                check(&invite)?;

                let created = client.invite_athlete(&invite).await?;
                output::success(&format!("Invitation sent to {}", created.athlete_email));
                println!("Invite token: {}", created.invite_token);
            }
        }

        Ok(())
    }
}
