use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Used when no config file exists at the resolved path, so the service can
/// be configured from the environment alone.
const DEFAULT_CONFIG: &str = include_str!("../config.example.yaml");

#[derive(Parser, Debug)]
#[command(name = "bookmarks")]
#[command(about = "Runs the bookmarks service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bookmarks")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct App {
    database: String,
    port: u16,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub turso_url: Option<String>,
    #[serde(default)]
    pub turso_auth_token: Option<String>,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_seconds: u64,
}

fn default_sync_interval() -> u64 {
    60
}

impl App {
    pub fn get_db(&self) -> &str {
        return &self.database;
    }

    pub fn get_port(&self) -> u16 {
        return self.port;
    }

    /// Remote replica credentials, only when both are set and non-empty.
    pub fn replica(&self) -> Option<(&str, &str)> {
        let url = self.turso_url.as_deref().filter(|s| !s.is_empty())?;
        let token = self.turso_auth_token.as_deref().filter(|s| !s.is_empty())?;
        Some((url, token))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Cors {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for Cors {
    fn default() -> Self {
        Cors {
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string(), "http://localhost:8080".to_string()]
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: App,
    #[serde(default)]
    pub cors: Cors,
    /// Problems found while loading. Logged by the caller once tracing is up.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        if cfg.app.api_key.trim().is_empty() {
            anyhow::bail!("app.api_key must be set (API_KEY)");
        }
        Ok(cfg)
    }

    fn load_config(path: &str) -> Result<Config> {
        if Path::new(path).exists() {
            return Config::parse(&fs::read_to_string(path)?);
        }

        let mut cfg = Config::parse(DEFAULT_CONFIG)?;
        cfg.warnings
            .insert(0, format!("config file {path} not found, using environment defaults"));
        Ok(cfg)
    }

    pub fn parse(yaml_str: &str) -> Result<Config> {
        let mut warnings = Vec::new();
        let yaml_with_env = Config::substitute_env_vars(yaml_str, &mut warnings)?;
        let mut config: Config = serde_yaml::from_str(&yaml_with_env)?;
        config.warnings = warnings;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str, warnings: &mut Vec<String>) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        warnings.push(format!("environment variable {var_name} not found"));
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn substitutes_defaults_for_unset_vars() {
        let out = Config::substitute_env_vars("port: ${BOOKMARKS_TEST_UNSET_PORT:-8123}", &mut Vec::new()).unwrap();
        assert_eq!(out, "port: 8123");
    }

    #[test]
    fn substitutes_set_vars() {
        unsafe { env::set_var("BOOKMARKS_TEST_SET_KEY", "s3cret") };
        let out = Config::substitute_env_vars("api_key: ${BOOKMARKS_TEST_SET_KEY}", &mut Vec::new()).unwrap();
        assert_eq!(out, "api_key: s3cret");
    }

    #[test]
    fn unterminated_placeholder_is_left_alone() {
        let out = Config::substitute_env_vars("key: ${OOPS", &mut Vec::new()).unwrap();
        assert_eq!(out, "key: ${OOPS");
    }

    #[test]
    fn missing_vars_without_default_are_reported() {
        let cfg = Config::parse(
            "app:\n  database: x.db\n  port: 1\n  api_key: \"${BOOKMARKS_TEST_MISSING_KEY}\"\n",
        )
        .unwrap();

        assert_eq!(cfg.app.api_key, "");
        assert_eq!(cfg.warnings, vec!["environment variable BOOKMARKS_TEST_MISSING_KEY not found"]);
    }

    #[test]
    fn missing_file_falls_back_with_a_warning() {
        unsafe { env::set_var("API_KEY", "from-env") };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let cfg = Config::new(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.app.api_key, "from-env");
        assert!(cfg.warnings[0].contains("not found, using environment defaults"));
    }

    #[test]
    fn parses_full_config() {
        let cfg = Config::parse(
            r#"
app:
  database: bookmarks.db
  port: 9000
  environment: production
  api_key: abc
cors:
  allowed_origins:
    - http://example.test
"#,
        )
        .unwrap();

        assert_eq!(cfg.app.get_port(), 9000);
        assert_eq!(cfg.app.get_db(), "bookmarks.db");
        assert!(cfg.app.environment.is_production());
        assert_eq!(cfg.app.api_key, "abc");
        assert_eq!(cfg.cors.allowed_origins, vec!["http://example.test"]);
        assert!(cfg.app.replica().is_none());
    }

    #[test]
    fn cors_and_environment_default_when_omitted() {
        let cfg = Config::parse("app:\n  database: x.db\n  port: 1\n").unwrap();
        assert_eq!(cfg.app.environment, Environment::Development);
        assert_eq!(cfg.cors.allowed_origins, default_allowed_origins());
        assert_eq!(cfg.app.sync_interval_seconds, 60);
    }

    #[test]
    fn empty_replica_credentials_mean_local_mode() {
        let cfg = Config::parse(
            "app:\n  database: x.db\n  port: 1\n  turso_url: \"\"\n  turso_auth_token: token\n",
        )
        .unwrap();
        assert!(cfg.app.replica().is_none());
    }

    #[test]
    fn new_rejects_missing_api_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "app:\n  database: x.db\n  port: 1\n  api_key: \"\"").unwrap();

        let err = Config::new(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn new_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "app:\n  database: x.db\n  port: 4242\n  api_key: k").unwrap();

        let cfg = Config::new(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.app.get_port(), 4242);
    }
}
