use anyhow::{bail, Result};
use std::env;

use super::{optional_var, parse_var};
use crate::auth::TokenSettings;

const DEV_JWT_SECRET: &str = "treino-dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_secs: u64,
    /// Key clients by `x-forwarded-for`/`x-real-ip` instead of the peer address.
    /// Only safe behind a reverse proxy that overwrites those headers.
    pub trust_proxy: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub jwt_secret: String,
    pub tokens: TokenSettings,
    pub app_url: String,
    pub auth_rate_limit: RateLimitConfig,
    pub smtp: Option<SmtpConfig>,
    pub seed_database: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("PORT", 3333u16)?;
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let jwt_secret = match optional_var("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == "production" => {
                bail!("JWT_SECRET must be set when ENVIRONMENT=production")
            }
            None => DEV_JWT_SECRET.to_string(),
        };

        let tokens = TokenSettings {
            access_token_ttl: chrono::Duration::minutes(parse_var("ACCESS_TOKEN_TTL_MINUTES", 15)?),
            refresh_token_ttl: chrono::Duration::hours(parse_var("REFRESH_TOKEN_TTL_HOURS", 168)?),
            invite_token_ttl: chrono::Duration::hours(parse_var("INVITE_TOKEN_TTL_HOURS", 168)?),
            reset_token_ttl: chrono::Duration::hours(parse_var("RESET_TOKEN_TTL_HOURS", 1)?),
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        };

        let app_url =
            env::var("APP_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let auth_rate_limit = RateLimitConfig {
            max_requests: parse_var("AUTH_RATE_LIMIT_MAX", 10)?,
            window_secs: parse_var("AUTH_RATE_LIMIT_WINDOW_SECS", 60)?,
            trust_proxy: parse_var("TRUST_PROXY", false)?,
        };

        let smtp = match optional_var("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse_var("SMTP_PORT", 587)?,
                username: optional_var("SMTP_USERNAME"),
                password: optional_var("SMTP_PASSWORD"),
                from: optional_var("SMTP_FROM")
                    .unwrap_or_else(|| "Treino <no-reply@treino.local>".to_string()),
            }),
            None => None,
        };

        let seed_database = parse_var("SEED_DATABASE", false)?;

        Ok(AppConfig {
            host,
            port,
            environment,
            log_level,
            jwt_secret,
            tokens,
            app_url,
            auth_rate_limit,
            smtp,
            seed_database,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// True when no `JWT_SECRET` was given and the built-in development secret is in use.
    pub fn uses_dev_jwt_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "HOST",
        "PORT",
        "ENVIRONMENT",
        "LOG_LEVEL",
        "JWT_SECRET",
        "ACCESS_TOKEN_TTL_MINUTES",
        "REFRESH_TOKEN_TTL_HOURS",
        "BCRYPT_COST",
        "SMTP_HOST",
        "SMTP_PORT",
        "SMTP_FROM",
        "SEED_DATABASE",
        "TRUST_PROXY",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_in_development() {
        clear_env();

        let config = AppConfig::from_env().unwrap();

        assert_eq!(config.server_address(), "0.0.0.0:3333");
        assert!(config.is_development());
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert!(config.uses_dev_jwt_secret());
        assert_eq!(config.tokens.access_token_ttl, chrono::Duration::minutes(15));
        assert_eq!(config.tokens.refresh_token_ttl, chrono::Duration::days(7));
        assert_eq!(config.tokens.reset_token_ttl, chrono::Duration::hours(1));
        assert_eq!(config.auth_rate_limit.max_requests, 10);
        assert!(!config.auth_rate_limit.trust_proxy);
        assert!(config.smtp.is_none());
        assert!(!config.seed_database);
    }

    #[test]
    #[serial]
    fn production_requires_jwt_secret() {
        clear_env();
        env::set_var("ENVIRONMENT", "production");

        assert!(AppConfig::from_env().is_err());

        env::set_var("JWT_SECRET", "a-real-secret");
        let config = AppConfig::from_env().unwrap();
        assert!(config.is_production());
        assert_eq!(config.jwt_secret, "a-real-secret");
        assert!(!config.uses_dev_jwt_secret());

        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_numbers_are_reported() {
        clear_env();
        env::set_var("PORT", "not-a-port");

        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("PORT"));

        clear_env();
    }

    #[test]
    #[serial]
    fn smtp_settings_are_read_when_host_is_set() {
        clear_env();
        env::set_var("SMTP_HOST", "smtp.example.com");
        env::set_var("SMTP_PORT", "2525");
        env::set_var("SMTP_FROM", "coach@example.com");
        env::set_var("SEED_DATABASE", "true");

        let config = AppConfig::from_env().unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 2525);
        assert_eq!(smtp.from, "coach@example.com");
        assert!(config.seed_database);

        clear_env();
    }

    #[test]
    #[serial]
    fn trust_proxy_is_opt_in() {
        clear_env();
        env::set_var("TRUST_PROXY", "true");

        let config = AppConfig::from_env().unwrap();
        assert!(config.auth_rate_limit.trust_proxy);

        env::set_var("TRUST_PROXY", "sometimes");
        assert!(AppConfig::from_env().is_err());

        clear_env();
    }
}
