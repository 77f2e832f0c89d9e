//! Request signing and verification for the payment server API.
//!
//! Every call to the payment server carries an HMAC-SHA256 signature over
//! a canonical string built from the request:
//!
//! ```text
//! canonical = UPPERCASE(method) + path + timestamp + nonce + body
//! x-signature = lowercase_hex(HMAC-SHA256(secret, canonical))
//! ```
//!
//! There are no separators between the parts. `body` must be the exact
//! bytes put on the wire; re-serializing after signing breaks verification.

use crate::config::ConfigError;

/// Header carrying the caller identity.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the signed Unix timestamp (seconds).
pub const TIMESTAMP_HEADER: &str = "x-timestamp";

/// Header carrying the signed nonce.
pub const NONCE_HEADER: &str = "x-nonce";

/// Header carrying the hex HMAC digest.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Header carrying the per-call idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Default maximum clock skew accepted by [`check_timestamp`] (in seconds).
pub const MAX_SIGNATURE_AGE: i64 = 5 * 60;

/// Number of random bytes in a nonce before hex encoding.
const NONCE_LEN: usize = 16;

/// Errors produced when verifying a received signature.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid hex encoding")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("invalid signature")]
    SignatureMismatch,
    #[error("signature timestamp outside the accepted window")]
    Expired,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

// ---------------------------------------------------------------------------
// Canonical string / digest
// ---------------------------------------------------------------------------

/// Build the canonical string that gets signed.
pub fn canonical_string(
    method: &str,
    path: &str,
    timestamp: i64,
    nonce: &str,
    body: &str,
) -> String {
    format!(
        "{}{path}{timestamp}{nonce}{body}",
        method.to_ascii_uppercase()
    )
}

/// Compute the lowercase hex HMAC-SHA256 signature for a request.
///
/// Pure function of its inputs.
pub fn compute_signature(
    secret: &[u8],
    method: &str,
    path: &str,
    timestamp: i64,
    nonce: &str,
    body: &str,
) -> String {
    let data = canonical_string(method, path, timestamp, nonce, body);
    let tag = ring::hmac::sign(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret),
        data.as_bytes(),
    );
    hex::encode(tag.as_ref())
}

/// Verify a received signature against the request parts.
///
/// The comparison is constant-time. This does **not** check the timestamp
/// window; call [`check_timestamp`] for that.
pub fn verify_signature(
    secret: &[u8],
    method: &str,
    path: &str,
    timestamp: i64,
    nonce: &str,
    body: &str,
    signature_hex: &str,
) -> Result<(), SignatureError> {
    let signature = hex::decode(signature_hex)?;
    let data = canonical_string(method, path, timestamp, nonce, body);
    ring::hmac::verify(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret),
        data.as_bytes(),
        &signature,
    )?;
    Ok(())
}

/// Check that `timestamp` is within `max_age` seconds of now, in either
/// direction.
pub fn check_timestamp(timestamp: i64, max_age: i64) -> Result<(), SignatureError> {
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    if (now - timestamp).abs() > max_age {
        return Err(SignatureError::Expired);
    }
    Ok(())
}

/// Generate a fresh random nonce (128 bits, lowercase hex).
pub fn generate_nonce() -> String {
    use rand::Rng;

    let mut bytes = [0u8; NONCE_LEN];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

/// The signed values for one HTTP attempt.
///
/// Computed right before a send and dropped once the response is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub nonce: String,
    pub timestamp: i64,
    pub idempotency_key: String,
    pub signature: String,
}

/// Holds the API key and the shared HMAC secret.
///
/// Both credentials are checked when the signer is built, so a signer that
/// exists can always sign.
#[derive(Clone)]
pub struct RequestSigner {
    api_key: String,
    secret: Box<[u8]>,
}

impl RequestSigner {
    /// Create a signer, failing if either credential is empty.
    pub fn new(
        api_key: impl Into<String>,
        secret: impl Into<Box<[u8]>>,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        let secret = secret.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::Missing("api key"));
        }
        if secret.is_empty() {
            return Err(ConfigError::Missing("hmac secret"));
        }
        Ok(Self { api_key, secret })
    }

    /// The public API key sent in [`API_KEY_HEADER`].
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign `body` for `method path` with a fresh nonce and the current time.
    pub fn sign(
        &self,
        method: &str,
        path: &str,
        body: &str,
        idempotency_key: &str,
    ) -> SignedEnvelope {
        let timestamp = time::OffsetDateTime::now_utc().unix_timestamp();
        self.sign_at(method, path, body, idempotency_key, timestamp, generate_nonce())
    }

    /// Sign with an explicit timestamp and nonce.
    pub fn sign_at(
        &self,
        method: &str,
        path: &str,
        body: &str,
        idempotency_key: &str,
        timestamp: i64,
        nonce: String,
    ) -> SignedEnvelope {
        let signature = compute_signature(&self.secret, method, path, timestamp, &nonce, body);
        SignedEnvelope {
            nonce,
            timestamp,
            idempotency_key: idempotency_key.to_owned(),
            signature,
        }
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}
