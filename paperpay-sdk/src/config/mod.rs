//! Configuration types for the payment client.
//!
//! [`PaymentServerConfig`] is the validated runtime configuration handed to
//! the client at construction time. [`PaymentServerSettings`] is the
//! deserializable form read from a structured source, resolved against a
//! flat key/value fallback.

mod retry;
mod settings;

pub use retry::RetryPolicy;
pub use settings::{API_KEY_KEY, BASE_URL_KEY, PaymentServerSettings, SECRET_KEY};

use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while resolving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    #[error("invalid payment server url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Runtime configuration for talking to the payment server.
#[derive(Clone)]
pub struct PaymentServerConfig {
    /// Root URL of the payment server (e.g. `https://pay.example.com`).
    pub base_url: Url,
    /// Public API key sent with every request.
    pub api_key: String,
    /// Shared HMAC secret bytes.
    pub secret: Box<[u8]>,
    /// Upper bound for a single HTTP attempt.
    pub timeout: Duration,
    /// Attempt budget and backoff.
    pub retry: RetryPolicy,
}

impl PaymentServerConfig {
    /// Create a new config with the default timeout and retry policy.
    pub fn new(
        base_url: Url,
        api_key: impl Into<String>,
        secret: impl Into<Box<[u8]>>,
    ) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            secret: secret.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the secret key bytes for HMAC signing.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }
}

impl std::fmt::Debug for PaymentServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentServerConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}
