//! Status classification for the retry loop.

use reqwest::StatusCode;

/// What the retry loop should do with an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// 2xx: parse the body.
    Success,
    /// 5xx: try again if budget remains.
    Retryable,
    /// Anything else: fail now with the server's body.
    Rejected,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Success => "success",
            Classification::Retryable => "retryable",
            Classification::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a response status.
pub fn classify_status(status: StatusCode) -> Classification {
    if status.is_success() {
        Classification::Success
    } else if status.is_server_error() {
        Classification::Retryable
    } else {
        Classification::Rejected
    }
}
