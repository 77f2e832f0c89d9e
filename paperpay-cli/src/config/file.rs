//! TOML file configuration structures.
//!
//! These structs directly map to the `paperpay.toml` file format.

use paperpay_sdk::config::PaymentServerSettings;
use serde::{Deserialize, Serialize};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub payment_server: PaymentServerSettings,
}
