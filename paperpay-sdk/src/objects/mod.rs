pub mod payment_intent;

pub use payment_intent::{
    PaymentIntentRequest, PaymentIntentResponse, PaymentIntentResult, RequestError, ResponseError,
};
