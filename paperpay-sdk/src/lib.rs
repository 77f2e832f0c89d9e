//! Signed payment-intent SDK.
//!
//! Builds HMAC-signed, idempotent requests to the payment server and
//! normalizes its responses. The HTTP client lives behind the `client`
//! feature; signing, verification, configuration and the wire types are
//! always available.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod objects;
pub mod signature;
