//! Payment intent client (application backend → payment server).
//!
//! Every attempt is re-signed with a fresh nonce and timestamp over the same
//! body bytes, while the `Idempotency-Key` stays fixed for the whole call so
//! the server can collapse repeated deliveries.

use reqwest::Client;
use reqwest::header::HeaderValue;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use super::retry::{Classification, classify_status};
use super::{PaymentError, TransientFailure};
use crate::config::{ConfigError, PaymentServerConfig, RetryPolicy};
use crate::objects::{PaymentIntentRequest, PaymentIntentResult};
use crate::signature::{
    API_KEY_HEADER, IDEMPOTENCY_KEY_HEADER, NONCE_HEADER, RequestSigner, SIGNATURE_HEADER,
    SignedEnvelope, TIMESTAMP_HEADER,
};

/// Endpoint for creating payment intents.
pub const INTENTS_PATH: &str = "/api/v1/payments/intents";

const METHOD: &str = "POST";

/// Outcome of a single HTTP attempt.
enum Attempt {
    Done(Result<PaymentIntentResult, PaymentError>),
    Retry(TransientFailure),
}

/// Typed HTTP client for creating payment intents.
///
/// Holds the signer and a pooled `reqwest::Client`; clone it freely, calls
/// share no mutable state.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    http: Client,
    intents_url: Url,
    signer: RequestSigner,
    retry: RetryPolicy,
}

impl PaymentClient {
    /// Create a new `PaymentClient`.
    ///
    /// Fails with [`PaymentError::Configuration`] before anything touches the
    /// network: `Missing` when the API key or the secret is empty, and
    /// `ValidationError` when the API key is not a valid header value.
    ///
    /// The endpoint is resolved under the base URL, so a base such as
    /// `https://host/payment-server` keeps its path prefix.
    pub fn new(config: PaymentServerConfig) -> Result<Self, PaymentError> {
        HeaderValue::from_str(&config.api_key).map_err(|_| {
            ConfigError::ValidationError("api key is not a valid header value".to_string())
        })?;
        let signer = RequestSigner::new(config.api_key, config.secret)?;
        let intents_url = endpoint_url(&config.base_url)?;
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            intents_url,
            signer,
            retry: config.retry,
        })
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure a proxy). The replacement is responsible for its own
    /// timeout.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// The fully joined endpoint URL.
    pub fn intents_url(&self) -> &Url {
        &self.intents_url
    }

    /// `POST /api/v1/payments/intents` – create a payment intent.
    pub async fn create_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntentResult, PaymentError> {
        self.run(request, None).await
    }

    /// Same as [`create_intent`](Self::create_intent), but gives up with
    /// [`PaymentError::Cancelled`] as soon as `shutdown` turns `true`.
    ///
    /// A dropped sender never cancels.
    pub async fn create_intent_until(
        &self,
        request: PaymentIntentRequest,
        shutdown: watch::Receiver<bool>,
    ) -> Result<PaymentIntentResult, PaymentError> {
        self.run(request, Some(shutdown)).await
    }

    async fn run(
        &self,
        request: PaymentIntentRequest,
        mut shutdown: Option<watch::Receiver<bool>>,
    ) -> Result<PaymentIntentResult, PaymentError> {
        request.validate()?;

        let body = serde_json::to_string(&request)?;
        let idempotency_key = Uuid::new_v4().to_string();
        let max_attempts = self.retry.max_attempts();

        let mut attempt: u32 = 1;
        loop {
            let outcome = tokio::select! {
                biased;

                _ = cancelled(&mut shutdown) => {
                    warn!(
                        attempt,
                        idempotency_key = %idempotency_key,
                        order_id = %request.order_id,
                        "Payment intent cancelled during attempt"
                    );
                    return Err(PaymentError::Cancelled { attempts: attempt });
                }

                outcome = self.attempt(attempt, &idempotency_key, &body, &request) => outcome,
            };

            let failure = match outcome {
                Attempt::Done(result) => return result,
                Attempt::Retry(failure) => failure,
            };

            if attempt >= max_attempts {
                error!(
                    attempts = attempt,
                    idempotency_key = %idempotency_key,
                    order_id = %request.order_id,
                    error = %failure,
                    "Payment server unavailable, retry budget exhausted"
                );
                return Err(PaymentError::Exhausted {
                    attempts: attempt,
                    idempotency_key,
                    last: failure,
                });
            }

            let delay = self.retry.delay_after(attempt);
            debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                idempotency_key = %idempotency_key,
                "Backing off before next attempt"
            );

            tokio::select! {
                biased;

                _ = cancelled(&mut shutdown) => {
                    warn!(
                        attempt,
                        idempotency_key = %idempotency_key,
                        order_id = %request.order_id,
                        "Payment intent cancelled during backoff"
                    );
                    return Err(PaymentError::Cancelled { attempts: attempt });
                }

                _ = tokio::time::sleep(delay) => {}
            }

            attempt += 1;
        }
    }

    /// Sign, send and classify one attempt.
    async fn attempt(
        &self,
        attempt: u32,
        idempotency_key: &str,
        body: &str,
        request: &PaymentIntentRequest,
    ) -> Attempt {
        let max_attempts = self.retry.max_attempts();
        let envelope = self
            .signer
            .sign(METHOD, self.intents_url.path(), body, idempotency_key);

        debug!(
            attempt,
            max_attempts,
            idempotency_key,
            nonce = %envelope.nonce,
            timestamp = envelope.timestamp,
            order_id = %request.order_id,
            "Sending payment intent request"
        );

        let resp = match self.send(&envelope, body).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(
                    attempt,
                    max_attempts,
                    idempotency_key,
                    classification = "retryable",
                    error = %e,
                    "Payment intent request failed"
                );
                return Attempt::Retry(TransientFailure::Transport(e));
            }
        };

        let status = resp.status();
        let classification = classify_status(status);
        match classification {
            Classification::Success => {
                let bytes = match resp.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(
                            attempt,
                            max_attempts,
                            idempotency_key,
                            classification = "retryable",
                            error = %e,
                            "Failed to read payment intent response"
                        );
                        return Attempt::Retry(TransientFailure::Transport(e));
                    }
                };

                match PaymentIntentResult::parse(&bytes, request.amount) {
                    Ok(result) => {
                        info!(
                            attempt,
                            idempotency_key,
                            status = %status,
                            classification = %classification,
                            order_id = %request.order_id,
                            "Payment intent created"
                        );
                        Attempt::Done(Ok(result))
                    }
                    Err(e) => {
                        error!(
                            attempt,
                            idempotency_key,
                            status = %status,
                            classification = "invalid_response",
                            error = %e,
                            "Payment server returned an invalid response"
                        );
                        Attempt::Done(Err(e.into()))
                    }
                }
            }
            Classification::Retryable => {
                let body = resp.text().await.unwrap_or_default();
                warn!(
                    attempt,
                    max_attempts,
                    idempotency_key,
                    status = %status,
                    classification = %classification,
                    "Payment server error"
                );
                Attempt::Retry(TransientFailure::Server { status, body })
            }
            Classification::Rejected => {
                let body = resp.text().await.unwrap_or_default();
                warn!(
                    attempt,
                    idempotency_key,
                    status = %status,
                    classification = %classification,
                    body = %body,
                    "Payment server rejected request"
                );
                Attempt::Done(Err(PaymentError::Rejected { status, body }))
            }
        }
    }

    async fn send(
        &self,
        envelope: &SignedEnvelope,
        body: &str,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.http
            .post(self.intents_url.clone())
            .header(API_KEY_HEADER, self.signer.api_key())
            .header(TIMESTAMP_HEADER, envelope.timestamp.to_string())
            .header(NONCE_HEADER, &envelope.nonce)
            .header(SIGNATURE_HEADER, &envelope.signature)
            .header(IDEMPOTENCY_KEY_HEADER, &envelope.idempotency_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_owned())
            .send()
            .await
    }
}

/// Join [`INTENTS_PATH`] below `base`, keeping any path prefix.
fn endpoint_url(base: &Url) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(INTENTS_PATH.trim_start_matches('/'))
}

/// Resolves once `shutdown` observes `true`; pends forever otherwise.
async fn cancelled(shutdown: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = shutdown {
        if rx.wait_for(|stop| *stop).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await
}
