use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Invalid email address: {0}")]
    InvalidEmailAddress(String),
    #[error("Failed to build email: {0}")]
    MessageBuildFailed(String),
    #[error("SMTP connection failed: {0}")]
    SmtpConnectionFailed(String),
    #[error("Email sending failed: {0}")]
    EmailSendingFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers transactional mail (invites, password resets).
///
/// Without SMTP settings the message is written to the log instead, which is
/// how links are picked up in development.
#[derive(Clone)]
pub enum Mailer {
    Log,
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    },
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mailer::Log => f.write_str("Mailer::Log"),
            Mailer::Smtp { from, .. } => f.debug_struct("Mailer::Smtp").field("from", from).finish(),
        }
    }
}

impl Mailer {
    pub fn from_config(smtp: Option<&SmtpConfig>) -> Result<Self, EmailError> {
        let Some(smtp) = smtp else {
            tracing::info!("SMTP not configured, emails will be logged");
            return Ok(Mailer::Log);
        };

        let from: Mailbox = smtp
            .from
            .parse()
            .map_err(|_| EmailError::InvalidEmailAddress(smtp.from.clone()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
            .map_err(|e| EmailError::SmtpConnectionFailed(e.to_string()))?
            .port(smtp.port);

        if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        tracing::info!(host = %smtp.host, port = smtp.port, "SMTP mailer configured");
        Ok(Mailer::Smtp {
            transport: builder.build(),
            from,
        })
    }

    pub async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        match self {
            Mailer::Log => {
                tracing::info!(to = %email.to, subject = %email.subject, body = %email.body, "email (not sent)");
                Ok(())
            }
            Mailer::Smtp { transport, from } => {
                let to: Mailbox = email
                    .to
                    .parse()
                    .map_err(|_| EmailError::InvalidEmailAddress(email.to.clone()))?;

                let message = Message::builder()
                    .from(from.clone())
                    .to(to)
                    .subject(email.subject.as_str())
                    .header(ContentType::TEXT_PLAIN)
                    .body(email.body)
                    .map_err(|e| EmailError::MessageBuildFailed(e.to_string()))?;

                transport
                    .send(message)
                    .await
                    .map_err(|e| EmailError::EmailSendingFailed(e.to_string()))?;

                tracing::info!(to = %email.to, subject = %email.subject, "email sent");
                Ok(())
            }
        }
    }

    /// Delivery failures are logged; the request that triggered them still succeeds.
    pub async fn send_or_log(&self, email: OutgoingEmail) {
        let to = email.to.clone();
        if let Err(e) = self.send(email).await {
            tracing::error!(to = %to, error = %e, "failed to deliver email");
        }
    }
}

pub fn invite_email(app_url: &str, to: &str, athlete_name: &str, token: &str) -> OutgoingEmail {
    let link = format!("{}/activate?token={}", app_url.trim_end_matches('/'), token);
    OutgoingEmail {
        to: to.to_string(),
        subject: "You have been invited to Treino".to_string(),
        body: format!(
            "Hi {athlete_name},\n\nYour coach invited you to Treino. \
             Set your password to activate your account:\n\n{link}\n\n\
             This link expires in 7 days.\n"
        ),
    }
}

pub fn password_reset_email(app_url: &str, to: &str, token: &str) -> OutgoingEmail {
    let link = format!("{}/reset-password?token={}", app_url.trim_end_matches('/'), token);
    OutgoingEmail {
        to: to.to_string(),
        subject: "Reset your Treino password".to_string(),
        body: format!(
            "A password reset was requested for your account.\n\n{link}\n\n\
             If you did not ask for this, ignore this email.\n"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_link_points_at_activation_page() {
        let email = invite_email("http://localhost:5173/", "ana@example.com", "Ana", "abc123");

        assert_eq!(email.to, "ana@example.com");
        assert!(email.body.contains("http://localhost:5173/activate?token=abc123"));
        assert!(email.body.starts_with("Hi Ana,"));
    }

    #[test]
    fn reset_link_points_at_reset_page() {
        let email = password_reset_email("https://app.treino.dev", "ana@example.com", "tok");
        assert!(email.body.contains("https://app.treino.dev/reset-password?token=tok"));
    }

    #[test]
    fn mailer_without_smtp_logs() {
        assert!(matches!(Mailer::from_config(None).unwrap(), Mailer::Log));
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let email = password_reset_email("http://localhost", "x@example.com", "t");
        assert!(Mailer::Log.send(email).await.is_ok());
    }

    #[test]
    fn bad_sender_address_is_rejected() {
        let smtp = SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            username: None,
            password: None,
            from: "not an address".into(),
        };
        assert!(matches!(
            Mailer::from_config(Some(&smtp)),
            Err(EmailError::InvalidEmailAddress(_))
        ));
    }
}
