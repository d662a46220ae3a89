mod athletes;
mod auth;
mod exercises;
mod portal;
mod programs;
mod workouts;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use dialoguer::Password;
use std::path::PathBuf;
use validator::Validate;

use crate::api::{describe_validation, ApiClient};
use crate::config::Config;

pub use athletes::AthletesCommand;
pub use auth::{
    ActivateCommand, ForgotPasswordCommand, LoginCommand, LogoutCommand, ResetPasswordCommand,
    WhoamiCommand,
};
pub use exercises::ExercisesCommand;
pub use portal::{LogCommand, LogsCommand, MyProgramsCommand};
pub use programs::ProgramsCommand;
pub use workouts::{read_prescriptions, WorkoutsCommand};

#[derive(Parser)]
#[command(name = "treino")]
#[command(about = "Terminal client for the Treino coaching API", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base URL of the Treino API (overrides the config file)
    #[arg(long, global = true, env = "TREINO_API_URL")]
    api_url: Option<String>,

    /// Path to configuration file
    #[arg(long, global = true, env = "TREINO_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store a session
    Login(LoginCommand),

    /// Revoke the stored session
    Logout(LogoutCommand),

    /// Show the logged-in account
    Whoami(WhoamiCommand),

    /// Activate an invited athlete account
    Activate(ActivateCommand),

    /// Request a password reset link
    ForgotPassword(ForgotPasswordCommand),

    /// Set a new password with a reset token
    ResetPassword(ResetPasswordCommand),

    /// Manage your athletes (coach)
    #[command(subcommand)]
    Athletes(AthletesCommand),

    /// Browse and extend the exercise catalog (coach)
    #[command(subcommand)]
    Exercises(ExercisesCommand),

    /// Manage training programs (coach)
    #[command(subcommand)]
    Programs(ProgramsCommand),

    /// Schedule workouts and their exercises (coach)
    #[command(subcommand)]
    Workouts(WorkoutsCommand),

    /// Programs assigned to you (athlete)
    #[command(subcommand)]
    MyPrograms(MyProgramsCommand),

    /// Mark a workout as completed (athlete)
    Log(LogCommand),

    /// Show your completions of a workout (athlete)
    Logs(LogsCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Resolved config location plus command-line overrides, shared by every command.
pub struct Context {
    config_path: PathBuf,
    api_url: Option<String>,
}

impl Context {
    pub fn new(config_path: PathBuf, api_url: Option<String>) -> Self {
        Self {
            config_path,
            api_url,
        }
    }

    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_from(&self.config_path)?;
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        Ok(config)
    }

    pub fn client(&self) -> Result<ApiClient> {
        let config = self.load_config()?;
        ApiClient::new(config, self.config_path.clone())
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => Config::default_path()?,
        };
        let ctx = Context::new(config_path, self.api_url);

        match self.command {
            Commands::Login(cmd) => cmd.execute(&ctx).await,
            Commands::Logout(cmd) => cmd.execute(&ctx).await,
            Commands::Whoami(cmd) => cmd.execute(&ctx).await,
            Commands::Activate(cmd) => cmd.execute(&ctx).await,
            Commands::ForgotPassword(cmd) => cmd.execute(&ctx).await,
            Commands::ResetPassword(cmd) => cmd.execute(&ctx).await,
            Commands::Athletes(cmd) => cmd.execute(&ctx).await,
            Commands::Exercises(cmd) => cmd.execute(&ctx).await,
            Commands::Programs(cmd) => cmd.execute(&ctx).await,
            Commands::Workouts(cmd) => cmd.execute(&ctx).await,
            Commands::MyPrograms(cmd) => cmd.execute(&ctx).await,
            Commands::Log(cmd) => cmd.execute(&ctx).await,
            Commands::Logs(cmd) => cmd.execute(&ctx).await,
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Run the shared request rules locally so bad input never leaves the machine.
pub(crate) fn check<T: Validate>(request: &T) -> Result<()> {
    request.validate().map_err(|errors| {
        let details = treino_shared::validation_details(&errors);
        anyhow::anyhow!(describe_validation("Invalid input", &details))
    })
}

/// Use the flag when given, otherwise prompt for a new password twice.
pub(crate) fn new_password(flag: Option<String>) -> Result<String> {
    match flag {
        Some(password) => Ok(password),
        None => Ok(Password::new()
            .with_prompt("New password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?),
    }
}
