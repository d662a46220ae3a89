pub mod app;
pub mod database;
pub mod seeding;

pub use app::*;
pub use database::*;
pub use seeding::*;

use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Parse `name` from the environment. Unset or blank means `default`; a value
/// that does not parse is an error naming the variable.
pub(crate) fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}

pub(crate) fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` (from `LOG_LEVEL`) is used,
/// with the sqlx query logger kept at `warn`.
pub fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{level},sqlx=warn")))
        .map_err(|e| anyhow!("invalid log level '{level}': {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("failed to set subscriber: {e}"))?;

    Ok(())
}
