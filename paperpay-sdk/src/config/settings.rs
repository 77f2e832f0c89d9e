//! Structured settings with a flat key/value fallback.
//!
//! Each value is taken from the structured source first (e.g. the
//! `[payment_server]` table of a TOML file). Missing or empty values are
//! looked up under a flat key through a caller-supplied function, which is
//! the process environment in the binary and a plain map in tests.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::{ConfigError, DEFAULT_TIMEOUT, PaymentServerConfig, RetryPolicy};
use crate::signature::RequestSigner;
use super::retry::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};

/// Flat key for the payment server base URL.
pub const BASE_URL_KEY: &str = "PAYMENT_SERVER_URL";

/// Flat key for the caller API key.
pub const API_KEY_KEY: &str = "PAYMENT_SERVER_API_KEY";

/// Flat key for the shared HMAC secret.
pub const SECRET_KEY: &str = "PAYMENT_SERVER_SECRET";

/// Payment server section as it appears in a structured source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentServerSettings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
    /// Per-attempt timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub retry_base_delay_ms: Option<u64>,
}

impl PaymentServerSettings {
    /// Resolve into a runtime config, consulting `lookup` for any required
    /// value the structured source left out.
    pub fn resolve<F>(self, lookup: F) -> Result<PaymentServerConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = pick(self.base_url, BASE_URL_KEY, &lookup)
            .ok_or(ConfigError::Missing("payment server base url"))?;
        let api_key =
            pick(self.api_key, API_KEY_KEY, &lookup).ok_or(ConfigError::Missing("api key"))?;
        let secret =
            pick(self.secret, SECRET_KEY, &lookup).ok_or(ConfigError::Missing("hmac secret"))?;

        let base_url = Url::parse(&base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "unsupported url scheme: {}",
                base_url.scheme()
            )));
        }

        let timeout = self
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        let retry = RetryPolicy::new(
            self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            self.retry_base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_BASE_DELAY),
        );

        Ok(
            PaymentServerConfig::new(base_url, api_key, secret.into_bytes())
                .with_timeout(timeout)
                .with_retry_policy(retry),
        )
    }

    /// Resolve only the signing credentials; the base URL and tuning values
    /// are not consulted.
    pub fn resolve_signer<F>(self, lookup: F) -> Result<RequestSigner, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key =
            pick(self.api_key, API_KEY_KEY, &lookup).ok_or(ConfigError::Missing("api key"))?;
        let secret =
            pick(self.secret, SECRET_KEY, &lookup).ok_or(ConfigError::Missing("hmac secret"))?;
        RequestSigner::new(api_key, secret.into_bytes())
    }

    /// Resolve using the process environment as the flat fallback.
    pub fn resolve_from_env(self) -> Result<PaymentServerConfig, ConfigError> {
        self.resolve(|key| std::env::var(key).ok())
    }
}

fn pick<F>(structured: Option<String>, key: &str, lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    structured
        .filter(|v| !v.trim().is_empty())
        .or_else(|| lookup(key).filter(|v| !v.trim().is_empty()))
}
