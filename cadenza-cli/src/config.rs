//! CLI configuration handling.

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use cadenza_core::auth::{DEFAULT_AUTH_URL, DEFAULT_TOKEN_URL};
use cadenza_core::remote::DEFAULT_API_BASE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// OAuth client ID registered with the streaming service.
    pub client_id: String,

    /// OAuth client secret, when the registration has one.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Redirect URI registered for the authorization flow.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Where the credential record lives. Defaults to the platform
    /// configuration directory.
    #[serde(default)]
    pub credential_path: Option<PathBuf>,

    /// Base URL of the playback Web API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Authorization endpoint.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Logging level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_redirect_uri() -> String {
    "http://localhost:8888/callback".to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default configuration path: `cadenza.toml` under the platform
/// configuration directory.
pub fn default_config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("io", "cadenza", "cadenza")
        .context("platform configuration directory not available")?;
    Ok(dirs.config_dir().join("cadenza.toml"))
}

/// Load configuration from the given path, or the default location.
pub fn load_config(path_override: Option<&Path>) -> Result<CliConfig> {
    let config_path = match path_override {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    if !config_path.exists() {
        bail!(
            "no configuration found at {}\n\
             Create it with at least:\n\
             \n\
             client_id = \"<your application client id>\"\n\
             client_secret = \"<your application client secret>\"",
            config_path.display()
        );
    }

    let contents = std::fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read config from {:?}", config_path))?;
    let config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config from {:?}", config_path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn minimal_config_gets_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "client_id = \"abc123\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.client_id, "abc123");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE);
        assert_eq!(config.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(config.log_level, "info");
        assert!(config.client_secret.is_none());
    }

    #[test]
    fn missing_config_is_a_helpful_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("cadenza.toml");

        let err = load_config(Some(&missing)).unwrap_err();

        assert!(err.to_string().contains("client_id"));
    }

    #[test]
    fn overrides_are_honored() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "client_id = \"abc\"\napi_base_url = \"http://localhost:9000\"\nlog_level = \"debug\""
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.api_base_url, "http://localhost:9000");
        assert_eq!(config.log_level, "debug");
    }
}
