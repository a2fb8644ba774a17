use crate::config::toml_config::TomlConfig;
use crate::config::CliConfig;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_URL_ENV: &str = "TIMECLOCK_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_CONFIG_FILE: &str = "timeclock.toml";

/// Fully resolved client settings: defaults, then the TOML file, then
/// `TIMECLOCK_API_URL`, then command line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub token_file: PathBuf,
    pub log_level: Option<String>,
    pub json_logs: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: format!("timeclock/{}", env!("CARGO_PKG_VERSION")),
            token_file: default_token_file(),
            log_level: None,
            json_logs: false,
        }
    }
}

impl ClientSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Resolve settings for a CLI invocation, reading the config file and the
    /// process environment.
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => Some(TomlConfig::from_file(path)?),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Some(TomlConfig::from_file(DEFAULT_CONFIG_FILE)?)
            }
            None => None,
        };
        let env_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());

        Self::merge(cli, file, env_url)
    }

    pub fn merge(cli: &CliConfig, file: Option<TomlConfig>, env_url: Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(file) = file {
            file.validate()?;
            if let Some(base_url) = file.api.base_url {
                settings.api_base_url = base_url;
            }
            if let Some(timeout) = file.api.timeout_seconds {
                settings.timeout_seconds = timeout;
            }
            if let Some(user_agent) = file.api.user_agent {
                settings.user_agent = user_agent;
            }
            if let Some(token_file) = file.storage.token_file {
                settings.token_file = expand_home(&token_file);
            }
            settings.log_level = file.logging.level;
            settings.json_logs = file.logging.json.unwrap_or(false);
        }

        if let Some(env_url) = env_url {
            settings.api_base_url = env_url;
        }

        if let Some(api_url) = &cli.api_url {
            settings.api_base_url = api_url.clone();
        }
        if let Some(token_file) = &cli.token_file {
            settings.token_file = token_file.clone();
        }
        settings.json_logs |= cli.json_logs;

        settings.api_base_url = settings.api_base_url.trim_end_matches('/').to_string();
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for ClientSettings {
    fn validate(&self) -> Result<()> {
        validate_url("api_base_url", &self.api_base_url)?;
        validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        if self.token_file.as_os_str().is_empty() {
            return Err(ClientError::MissingConfigError {
                field: "token_file".to_string(),
            });
        }
        Ok(())
    }
}

impl ConfigProvider for ClientSettings {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

fn default_token_file() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".timeclock");
    path.push("tokens.json");
    path
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> CliConfig {
        let mut argv = vec!["timeclock"];
        argv.extend_from_slice(args);
        argv.push("status");
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let settings = ClientSettings::merge(&cli(&[]), None, None).unwrap();
        assert_eq!(settings.api_base_url, DEFAULT_API_URL);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert!(settings.token_file.ends_with("tokens.json"));
    }

    #[test]
    fn env_overrides_file_and_flag_overrides_env() {
        let file = TomlConfig::from_toml_str(
            "[api]\nbase_url = \"http://file.example.com/api\"\ntimeout_seconds = 5\n",
        )
        .unwrap();

        let settings = ClientSettings::merge(
            &cli(&[]),
            Some(file.clone()),
            Some("http://env.example.com/api/".to_string()),
        )
        .unwrap();
        assert_eq!(settings.api_base_url, "http://env.example.com/api");
        assert_eq!(settings.timeout_seconds, 5);

        let settings = ClientSettings::merge(
            &cli(&["--api-url", "http://flag.example.com/api"]),
            Some(file),
            Some("http://env.example.com/api".to_string()),
        )
        .unwrap();
        assert_eq!(settings.api_base_url, "http://flag.example.com/api");
    }

    #[test]
    fn invalid_url_is_rejected() {
        let result = ClientSettings::merge(&cli(&["--api-url", "not a url"]), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn token_file_flag_wins() {
        let settings =
            ClientSettings::merge(&cli(&["--token-file", "/tmp/tc/tokens.json"]), None, None)
                .unwrap();
        assert_eq!(settings.token_file, PathBuf::from("/tmp/tc/tokens.json"));
    }
}
