use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_APP_NAME: &str = "NoemaFeed";
pub const DEFAULT_APP_HOST: &str = "https://max456im.github.io/noemafeed-mobile/";
pub const DEFAULT_PROFILE_YEAR: u32 = 1990;
pub const SHARE_TITLE: &str = "NoemaFeed analysis";

static DEFAULT_APP_URL: OnceLock<Url> = OnceLock::new();

/// Parsed form of [`DEFAULT_APP_HOST`], shared by every default config.
pub fn default_app_host() -> Url {
    DEFAULT_APP_URL
        .get_or_init(|| {
            // Constant input, checked by `default_app_host_parses`.
            Url::parse(DEFAULT_APP_HOST).expect("DEFAULT_APP_HOST is a valid url")
        })
        .clone()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("app name cannot be empty")]
    EmptyAppName,

    #[error("invalid app host {host}: {reason}")]
    InvalidAppHost { host: String, reason: String },

    #[error("profile year {0} is out of range")]
    InvalidProfileYear(u32),
}

/// Controller settings. Fixed for the lifetime of a `Model`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellConfig {
    pub app_name: String,
    pub app_host: Url,
    /// Context parameter handed to every analysis call (user profile year).
    pub profile_year: u32,
    pub load_knowledge_base: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            app_host: default_app_host(),
            profile_year: DEFAULT_PROFILE_YEAR,
            load_knowledge_base: true,
        }
    }
}

impl ShellConfig {
    pub fn new(app_host: &str) -> Result<Self, ConfigError> {
        let app_host = Url::parse(app_host).map_err(|e| ConfigError::InvalidAppHost {
            host: app_host.to_string(),
            reason: e.to_string(),
        })?;
        let config = Self {
            app_host,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_profile_year(mut self, year: u32) -> Self {
        self.profile_year = year;
        self
    }

    #[must_use]
    pub fn with_knowledge_base(mut self, load: bool) -> Self {
        self.load_knowledge_base = load;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::EmptyAppName);
        }
        if !matches!(self.app_host.scheme(), "https" | "http") {
            return Err(ConfigError::InvalidAppHost {
                host: self.app_host.to_string(),
                reason: "scheme must be http or https".into(),
            });
        }
        if self.app_host.cannot_be_a_base() || self.app_host.host_str().is_none() {
            return Err(ConfigError::InvalidAppHost {
                host: self.app_host.to_string(),
                reason: "missing host".into(),
            });
        }
        if !(1900..=2100).contains(&self.profile_year) {
            return Err(ConfigError::InvalidProfileYear(self.profile_year));
        }
        Ok(())
    }
}
