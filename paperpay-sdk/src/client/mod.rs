//! HTTP client for the payment server.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need signing or the shared types do not pull in `reqwest`.

mod payment;
mod retry;

pub use payment::{INTENTS_PATH, PaymentClient};
pub use retry::{Classification, classify_status};

use reqwest::StatusCode;

use crate::config::ConfigError;
use crate::objects::{RequestError, ResponseError};

/// Errors produced by [`PaymentClient`].
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Signing credentials or other settings are missing. Raised before any
    /// network call.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The request violates its own invariants and was never sent.
    #[error("invalid payment intent request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// The server refused the payload (4xx). Not retried.
    #[error("payment server rejected request: status {status}, body: {body}")]
    Rejected { status: StatusCode, body: String },

    /// The server answered 2xx with a body that breaks the response contract.
    #[error("invalid response from payment server: {0}")]
    InvalidResponse(#[from] ResponseError),

    /// Every attempt failed with a transient error.
    #[error("payment server unavailable after {attempts} attempts (idempotency key {idempotency_key}): {last}")]
    Exhausted {
        attempts: u32,
        idempotency_key: String,
        last: TransientFailure,
    },

    /// A shutdown signal arrived before the call finished.
    #[error("payment intent creation cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    /// The underlying HTTP client could not be built.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request body could not be serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// A failure that is worth another attempt.
#[derive(Debug, thiserror::Error)]
pub enum TransientFailure {
    /// Connect error, timeout, or a body that could not be read.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered 5xx.
    #[error("server error: status {status}, body: {body}")]
    Server { status: StatusCode, body: String },
}
