use anyhow::Result;
use clap::Args;
use dialoguer::Password;
use treino_shared::{ActivateAthlete, Login, RequestPasswordReset, ResetPassword};

use super::{check, new_password, Context};
use crate::output;

#[derive(Args)]
pub struct LoginCommand {
    /// Account email
    #[arg(long)]
    email: String,

    /// Password (prompted when omitted)
    #[arg(long)]
    password: Option<String>,
}

impl LoginCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let password = match self.password {
            Some(password) => password,
            None => Password::new().with_prompt("Password").interact()?,
        };

        check(&Login {
            email: self.email.clone(),
            password: password.clone(),
        })?;

        let client = ctx.client()?;
        tracing::debug!(api = client.base_url(), "logging in");

        match client.login(&self.email, &password).await {
            Ok(user) => {
                output::success(&format!("Logged in as {}", user.email));
                println!();
                print!("{}", output::render_user(&user));
                Ok(())
            }
            Err(e) => {
                output::failure(&format!("Login failed: {e}"));
                Err(e)
            }
        }
    }
}

#[derive(Args)]
pub struct LogoutCommand {}

impl LogoutCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let client = ctx.client()?;

        if !client.is_authenticated() {
            println!("You are not logged in.");
            return Ok(());
        }

        // The local session is dropped even when the server call fails
        if let Err(e) = client.logout().await {
            tracing::warn!(error = %e, "server-side logout failed");
        }

        output::success("Logged out");
        Ok(())
    }
}

#[derive(Args)]
pub struct WhoamiCommand {}

impl WhoamiCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let client = ctx.client()?;

        if !client.is_authenticated() {
            println!("You are not logged in.");
            println!();
            println!("Use 'treino login --email <EMAIL>' to authenticate.");
            return Ok(());
        }

        let user = client.me().await?;
        print!("{}", output::render_user(&user));
        Ok(())
    }
}

#[derive(Args)]
pub struct ActivateCommand {
    /// Invite token from the invitation email
    #[arg(long)]
    token: String,

    /// New password (prompted when omitted)
    #[arg(long)]
    password: Option<String>,
}

impl ActivateCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let password = new_password(self.password)?;
        check(&ActivateAthlete {
            token: self.token.clone(),
            password: password.clone(),
        })?;

        let message = ctx.client()?.activate(&self.token, &password).await?;
        output::success(&message);
        println!("You can now log in with 'treino login'.");
        Ok(())
    }
}

#[derive(Args)]
pub struct ForgotPasswordCommand {
    /// Email of the account to reset
    #[arg(long)]
    email: String,
}

impl ForgotPasswordCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        check(&RequestPasswordReset {
            email: self.email.clone(),
        })?;

        let message = ctx.client()?.forgot_password(&self.email).await?;
        output::success(&message);
        Ok(())
    }
}

#[derive(Args)]
pub struct ResetPasswordCommand {
    /// Reset token from the email
    #[arg(long)]
    token: String,

    /// New password (prompted when omitted)
    #[arg(long)]
    password: Option<String>,
}

impl ResetPasswordCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let password = new_password(self.password)?;
        check(&ResetPassword {
            token: self.token.clone(),
            password: password.clone(),
        })?;

        let message = ctx.client()?.reset_password(&self.token, &password).await?;
        output::success(&message);
        println!("Existing sessions were signed out. Log in again with your new password.");
        Ok(())
    }
}
