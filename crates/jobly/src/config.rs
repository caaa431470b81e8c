//! Database configuration.
//!
//! Resolved either from the environment (with `.env` support) or from a
//! `jobly.toml` file:
//!
//! ```toml
//! [database]
//! url = "postgresql://${DB_USER}@localhost/jobly"
//! test_url = "postgresql:///jobly_test"
//! ```
//!
//! `${VAR}` references in the file are expanded from the environment.

use crate::error::{JoblyError, JoblyResult};
use serde::Deserialize;
use std::path::Path;

/// Fallback URL when nothing is configured.
pub const DEFAULT_DATABASE_URL: &str = "postgresql:///jobly";
/// Fallback URL for the test environment.
pub const DEFAULT_TEST_DATABASE_URL: &str = "postgresql:///jobly_test";

/// Which database a process should talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
}

impl Environment {
    /// `JOBLY_ENV=test` selects [`Environment::Test`]; anything else is development.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var("JOBLY_ENV").ok().as_deref())
    }

    /// Environment named by a `JOBLY_ENV` value.
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("test") => Environment::Test,
            _ => Environment::Development,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DbConfig {
    pub url: String,
    #[serde(default)]
    pub test_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    database: DbConfig,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            test_url: None,
        }
    }
}

impl DbConfig {
    /// Read `DATABASE_URL` / `DATABASE_TEST_URL`, loading `.env` first if present.
    pub fn from_env() -> Self {
        // A missing .env file is fine; real env vars still apply.
        let _ = dotenvy::dotenv();

        Self::from_vars(
            std::env::var("DATABASE_URL").ok(),
            std::env::var("DATABASE_TEST_URL").ok(),
        )
    }

    /// Build from `DATABASE_URL` / `DATABASE_TEST_URL` values; unset means default.
    pub fn from_vars(url: Option<String>, test_url: Option<String>) -> Self {
        Self {
            url: url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            test_url,
        }
    }

    /// Parse a `jobly.toml` document.
    pub fn from_toml_str(raw: &str) -> JoblyResult<Self> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| JoblyError::config(format!("failed to parse config: {e}")))?;

        let mut config = file.database;
        config.url = expand_env_vars(&config.url)?;
        if let Some(test_url) = config.test_url.as_mut() {
            *test_url = expand_env_vars(test_url)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> JoblyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JoblyError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// URL for the given environment.
    pub fn database_url(&self, env: Environment) -> &str {
        match env {
            Environment::Development => &self.url,
            Environment::Test => self
                .test_url
                .as_deref()
                .unwrap_or(DEFAULT_TEST_DATABASE_URL),
        }
    }

    fn validate(&self) -> JoblyResult<()> {
        if self.url.trim().is_empty() {
            return Err(JoblyError::config("database.url must not be empty"));
        }
        if self.test_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(JoblyError::config("database.test_url must not be empty"));
        }
        Ok(())
    }
}

fn expand_env_vars(input: &str) -> JoblyResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(JoblyError::config(format!(
                    "unterminated env var reference: ${{{key}"
                )));
            }
            if key.is_empty() {
                return Err(JoblyError::config("invalid env var reference: ${}"));
            }

            let v = std::env::var(&key).map_err(|_| {
                JoblyError::config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
