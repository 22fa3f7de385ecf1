//! Runtime configuration
//!
//! Resolved once at startup from `INSTANTLY_*` environment variables, then
//! overridden by the global CLI flags, and passed by reference from there.

use std::time::Duration;

use instantly_core::timezone::TimezoneConfig;

use crate::prelude::*;

pub const DEFAULT_BASE_URL: &str = "https://api.instantly.ai/api/v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration, resolved once and passed by reference
#[derive(Debug, Clone)]
pub struct InstantlyConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub timezones: TimezoneConfig,
    pub verbose: bool,
}

impl Default for InstantlyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            timezones: TimezoneConfig::default(),
            verbose: false,
        }
    }
}

impl InstantlyConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        config.api_key = std::env::var("INSTANTLY_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        if let Ok(url) = std::env::var("INSTANTLY_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(secs) = std::env::var("INSTANTLY_TIMEOUT_SECS") {
            config.timeout = parse_timeout(&secs)?;
        }
        if let Ok(timezone) = std::env::var("INSTANTLY_DEFAULT_TIMEZONE") {
            config.timezones = timezone_config(&timezone)?;
        }

        Ok(config)
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(
        mut self,
        api_key: Option<String>,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
        default_timezone: Option<String>,
        verbose: bool,
    ) -> Result<Self> {
        if let Some(key) = api_key.filter(|key| !key.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(secs) = timeout_secs {
            self.timeout = parse_timeout(&secs.to_string())?;
        }
        if let Some(timezone) = default_timezone {
            self.timezones = timezone_config(&timezone)?;
        }
        self.verbose = self.verbose || verbose;
        Ok(self)
    }

    /// Environment first, then the global CLI flags on top
    pub fn from_global(global: &crate::Global) -> Result<Self> {
        Self::from_env()?.with_overrides(
            global.api_key.clone(),
            global.base_url.clone(),
            global.timeout,
            global.default_timezone.clone(),
            global.verbose,
        )
    }

    pub fn api_key(&self) -> Result<&str, Error> {
        self.api_key.as_deref().ok_or(Error::MissingApiKey)
    }
}

fn parse_timeout(value: &str) -> Result<Duration, Error> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::InvalidConfig(format!(
            "timeout must be a positive number of seconds, got '{value}'"
        ))),
    }
}

fn timezone_config(default_timezone: &str) -> Result<TimezoneConfig, Error> {
    let config = TimezoneConfig::with_default(default_timezone.trim());
    if config.is_accepted(&config.default_timezone) {
        Ok(config)
    } else {
        Err(Error::InvalidConfig(format!(
            "default timezone '{default_timezone}' is not one the Instantly scheduler accepts"
        )))
    }
}
