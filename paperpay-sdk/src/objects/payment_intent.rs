//! Payment intent request and response types.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request payload for creating a payment intent.
///
/// Serialized once with camelCase keys; those exact bytes are signed and
/// sent. `amount` is written as a JSON number with its exact decimal digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub order_id: String,
    pub paper_id: String,
    pub payment_id: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub currency: String,
    pub user_id: String,
    pub user_name: String,
    pub email: String,
}

/// A request that cannot be sent as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("amount must have at most two decimal places, got {0}")]
    TooPrecise(Decimal),
    #[error("`{0}` must not be empty")]
    Empty(&'static str),
}

impl PaymentIntentRequest {
    /// Check the request invariants.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.amount <= Decimal::ZERO {
            return Err(RequestError::NonPositiveAmount(self.amount));
        }
        if self.amount.normalize().scale() > 2 {
            return Err(RequestError::TooPrecise(self.amount));
        }
        if self.order_id.trim().is_empty() {
            return Err(RequestError::Empty("orderId"));
        }
        if self.payment_id.trim().is_empty() {
            return Err(RequestError::Empty("paymentId"));
        }
        Ok(())
    }
}

/// Raw success body returned by the payment server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentIntentResponse {
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Flat gateway field map.
    #[serde(default)]
    pub fields: Option<HashMap<String, Value>>,
}

/// A 2xx response that does not honour the response contract.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("response field `{0}` is missing or empty")]
    MissingField(&'static str),
}

/// Normalized payment intent returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResult {
    pub success: bool,
    pub gateway: String,
    pub action: String,
    pub url: String,
    pub merchant_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub hash: String,
    pub notify_url: String,
    pub cancel_url: String,
    pub return_url: String,
    pub email: String,
    pub order_id: String,
    pub items: String,
    pub first_name: String,
    pub last_name: String,
}

impl PaymentIntentResult {
    /// Parse a raw 2xx body and normalize it.
    pub fn parse(body: &[u8], fallback_amount: Decimal) -> Result<Self, ResponseError> {
        let response: PaymentIntentResponse = serde_json::from_slice(body)?;
        Self::from_response(response, fallback_amount)
    }

    /// Normalize a decoded response.
    ///
    /// Fields are looked up by key. Missing ones become empty strings;
    /// `amount` falls back to `fallback_amount` when absent or not a decimal.
    /// `merchant_id` and `hash` are mandatory.
    pub fn from_response(
        response: PaymentIntentResponse,
        fallback_amount: Decimal,
    ) -> Result<Self, ResponseError> {
        let fields = response.fields.unwrap_or_default();
        let get = |key: &str| field_text(fields.get(key));

        let merchant_id = get("merchant_id");
        if merchant_id.trim().is_empty() {
            return Err(ResponseError::MissingField("merchant_id"));
        }
        let hash = get("hash");
        if hash.trim().is_empty() {
            return Err(ResponseError::MissingField("hash"));
        }

        let amount = get("amount")
            .trim()
            .parse::<Decimal>()
            .unwrap_or(fallback_amount);

        Ok(Self {
            success: true,
            gateway: response.gateway.unwrap_or_default(),
            action: response.action.unwrap_or_default(),
            url: response.url.unwrap_or_default(),
            merchant_id,
            amount,
            currency: get("currency"),
            hash,
            notify_url: get("notify_url"),
            cancel_url: get("cancel_url"),
            return_url: get("return_url"),
            email: get("email"),
            order_id: get("order_id"),
            items: get("items"),
            first_name: get("first_name"),
            last_name: get("last_name"),
        })
    }
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
