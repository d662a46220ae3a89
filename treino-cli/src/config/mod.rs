use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of `config.toml`: where the API lives and the stored session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: String,
}

fn default_base_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Config {
    /// `<config dir>/treino/config.toml`, e.g. `~/.config/treino/config.toml` on Linux.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not find a configuration directory")?;
        Ok(dir.join("treino").join("config.toml"))
    }

    /// Load configuration from `path`, falling back to defaults when the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        !self.auth.access_token.is_empty()
    }

    pub fn set_tokens(&mut self, access_token: String, refresh_token: String) {
        self.auth.access_token = access_token;
        self.auth.refresh_token = refresh_token;
    }

    pub fn clear_tokens(&mut self) {
        self.auth.access_token.clear();
        self.auth.refresh_token.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:3333");
        assert_eq!(config.api.timeout_seconds, 30);
        assert!(!config.is_authenticated());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str("[auth]\naccess_token = \"abc\"\n").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3333");
        assert_eq!(config.auth.access_token, "abc");
        assert!(config.auth.refresh_token.is_empty());
    }

    #[test]
    fn test_token_lifecycle() {
        let mut config = Config::default();

        config.set_tokens("access".to_string(), "refresh".to_string());
        assert!(config.is_authenticated());

        config.clear_tokens();
        assert!(!config.is_authenticated());
        assert!(config.auth.refresh_token.is_empty());
    }
}
