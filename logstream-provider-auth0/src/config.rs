//! Management API connection settings

use std::collections::HashMap;
use std::time::Duration;

use logstream_core::resource::Value;
use thiserror::Error;

pub const ENV_DOMAIN: &str = "AUTH0_DOMAIN";
pub const ENV_API_TOKEN: &str = "AUTH0_API_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "AUTH0_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing setting '{0}'")]
    Missing(&'static str),

    #[error("Invalid value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

/// Connection settings for the Auth0 Management API
#[derive(Clone, PartialEq)]
pub struct ManagementConfig {
    /// Tenant domain (e.g., "example.eu.auth0.com")
    pub domain: String,
    /// Management API access token
    pub api_token: String,
    /// Per-request timeout
    pub timeout: Duration,
}

// Keeps the token out of debug output
impl std::fmt::Debug for ManagementConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementConfig")
            .field("domain", &self.domain)
            .field("api_token", &"(sensitive)")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ManagementConfig {
    pub fn new(domain: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            api_token: api_token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let domain = lookup(ENV_DOMAIN)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(ENV_DOMAIN))?;
        let api_token = lookup(ENV_API_TOKEN)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(ENV_API_TOKEN))?;

        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => parse_timeout(ENV_TIMEOUT_SECS, &raw)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            domain,
            api_token,
            timeout,
        })
    }

    /// Read settings from a provider block (`domain`, `api_token`, `timeout_secs`)
    pub fn from_attributes(attributes: &HashMap<String, Value>) -> Result<Self, ConfigError> {
        let get_string = |key: &'static str| -> Result<Option<String>, ConfigError> {
            match attributes.get(key) {
                None => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(other) => Err(ConfigError::Invalid {
                    key,
                    message: format!("expected string, got {}", other.type_name()),
                }),
            }
        };

        let domain = get_string("domain")?.ok_or(ConfigError::Missing("domain"))?;
        let api_token = get_string("api_token")?.ok_or(ConfigError::Missing("api_token"))?;
        let timeout = match attributes.get("timeout_secs") {
            None => DEFAULT_TIMEOUT,
            Some(Value::Int(n)) if *n > 0 => Duration::from_secs(*n as u64),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "timeout_secs",
                    message: format!("expected positive integer, got {}", other.type_name()),
                });
            }
        };

        Ok(Self {
            domain,
            api_token,
            timeout,
        })
    }

    /// Base URL of the Management API v2
    ///
    /// A domain that already carries a scheme is used verbatim.
    pub fn api_base_url(&self) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            format!("{}/api/v2", domain)
        } else {
            format!("https://{}/api/v2", domain)
        }
    }
}

fn parse_timeout(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid {
            key,
            message: format!("'{}' is not a positive number of seconds", raw),
        }),
    }
}
