//! Subcommand implementations.

use clap::Args;
use paperpay_sdk::client::{INTENTS_PATH, PaymentClient};
use paperpay_sdk::config::PaymentServerConfig;
use paperpay_sdk::objects::PaymentIntentRequest;
use paperpay_sdk::signature::{
    API_KEY_HEADER, IDEMPOTENCY_KEY_HEADER, NONCE_HEADER, RequestSigner, SIGNATURE_HEADER,
    TIMESTAMP_HEADER,
};
use rust_decimal::Decimal;

use crate::shutdown::spawn_shutdown_watch;

/// Arguments for `create-intent`.
#[derive(Args, Debug)]
pub struct CreateIntentArgs {
    #[arg(long)]
    pub order_id: String,
    #[arg(long)]
    pub paper_id: String,
    #[arg(long)]
    pub payment_id: String,
    /// Amount with at most two decimal places (e.g. 500.00)
    #[arg(long)]
    pub amount: Decimal,
    #[arg(long, default_value = "LKR")]
    pub currency: String,
    #[arg(long)]
    pub user_id: String,
    #[arg(long)]
    pub user_name: String,
    #[arg(long)]
    pub email: String,
}

impl From<CreateIntentArgs> for PaymentIntentRequest {
    fn from(args: CreateIntentArgs) -> Self {
        PaymentIntentRequest {
            order_id: args.order_id,
            paper_id: args.paper_id,
            payment_id: args.payment_id,
            amount: args.amount,
            currency: args.currency,
            user_id: args.user_id,
            user_name: args.user_name,
            email: args.email,
        }
    }
}

/// Arguments for `sign`.
#[derive(Args, Debug)]
pub struct SignArgs {
    #[arg(long, default_value = "POST")]
    pub method: String,
    #[arg(long, default_value = INTENTS_PATH)]
    pub path: String,
    /// Exact JSON body as it will be sent
    #[arg(long)]
    pub body: String,
    #[arg(long)]
    pub idempotency_key: Option<String>,
}

/// Create a payment intent and print the normalized result as JSON.
pub async fn create_intent(
    config: PaymentServerConfig,
    args: CreateIntentArgs,
) -> anyhow::Result<()> {
    let client = PaymentClient::new(config)?;
    let request = PaymentIntentRequest::from(args);

    tracing::info!(
        order_id = %request.order_id,
        payment_id = %request.payment_id,
        url = %client.intents_url(),
        "Creating payment intent"
    );

    let shutdown = spawn_shutdown_watch();
    let result = client.create_intent_until(request, shutdown).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Print the signed headers for a body without sending anything.
pub fn sign(signer: &RequestSigner, args: SignArgs) -> anyhow::Result<()> {
    let idempotency_key = args.idempotency_key.unwrap_or_default();
    let envelope = signer.sign(&args.method, &args.path, &args.body, &idempotency_key);

    let mut headers = serde_json::Map::new();
    headers.insert(API_KEY_HEADER.into(), signer.api_key().into());
    headers.insert(TIMESTAMP_HEADER.into(), envelope.timestamp.to_string().into());
    headers.insert(NONCE_HEADER.into(), envelope.nonce.into());
    headers.insert(SIGNATURE_HEADER.into(), envelope.signature.into());
    if !idempotency_key.is_empty() {
        headers.insert(IDEMPOTENCY_KEY_HEADER.into(), idempotency_key.into());
    }

    println!("{}", serde_json::to_string_pretty(&headers)?);
    Ok(())
}
