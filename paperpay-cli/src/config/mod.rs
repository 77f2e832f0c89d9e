//! Configuration loading for the paperpay CLI.
//!
//! Reads the `[payment_server]` table from a TOML file, applies CLI
//! overrides, and fills whatever is left from flat environment keys.

pub mod file;

use crate::config::file::FileConfig;
use paperpay_sdk::config::PaymentServerConfig;
use paperpay_sdk::signature::RequestSigner;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Config file looked up when none is given explicitly.
pub const DEFAULT_CONFIG_PATH: &str = "./paperpay.toml";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error(transparent)]
    Resolve(#[from] paperpay_sdk::config::ConfigError),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    explicit: bool,
    base_url_override: Option<Url>,
}

impl ConfigLoader {
    /// Create a new config loader.
    ///
    /// An explicitly named file must exist; the default file may be absent,
    /// in which case only the flat fallback is used.
    pub fn new(config_path: Option<&Path>, base_url_override: Option<Url>) -> Self {
        match config_path {
            Some(path) => Self {
                config_path: path.to_path_buf(),
                explicit: true,
                base_url_override,
            },
            None => Self {
                config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
                explicit: false,
                base_url_override,
            },
        }
    }

    /// Load using the process environment as the flat fallback.
    pub fn load(&self) -> Result<PaymentServerConfig, ConfigError> {
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Load and resolve the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file (if present)
    /// 2. Apply CLI overrides
    /// 3. Fill missing values through `lookup`
    /// 4. Validate the result
    pub fn load_with<F>(&self, lookup: F) -> Result<PaymentServerConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut file_config = self.read_file()?;

        if let Some(base_url) = &self.base_url_override {
            file_config.payment_server.base_url = Some(base_url.to_string());
        }

        Ok(file_config.payment_server.resolve(lookup)?)
    }

    /// Load only the signing credentials, using the process environment as
    /// the flat fallback.
    pub fn load_signer(&self) -> Result<RequestSigner, ConfigError> {
        self.load_signer_with(|key| std::env::var(key).ok())
    }

    /// Load the API key and secret without requiring a base URL.
    pub fn load_signer_with<F>(&self, lookup: F) -> Result<RequestSigner, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_config = self.read_file()?;
        Ok(file_config.payment_server.resolve_signer(lookup)?)
    }

    fn read_file(&self) -> Result<FileConfig, ConfigError> {
        if !self.explicit && !self.config_path.exists() {
            tracing::debug!(
                path = %self.config_path.display(),
                "No config file found, using environment only"
            );
            return Ok(FileConfig::default());
        }

        let content =
            std::fs::read_to_string(&self.config_path).map_err(|source| ConfigError::IoError {
                path: self.config_path.clone(),
                source,
            })?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperpay_sdk::config::{API_KEY_KEY, BASE_URL_KEY, SECRET_KEY};
    use std::collections::HashMap;

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "paperpay-{}-{name}.toml",
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_file_values_with_env_fallback() {
        let path = temp_config(
            "fallback",
            r#"
[payment_server]
base_url = "https://pay.example.com"
api_key = "file-key"
"#,
        );
        let loader = ConfigLoader::new(Some(&path), None);
        let config = loader
            .load_with(env(&[(API_KEY_KEY, "env-key"), (SECRET_KEY, "env-secret")]))
            .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.secret_bytes(), b"env-secret");
    }

    #[test]
    fn test_base_url_override_wins() {
        let path = temp_config(
            "override",
            r#"
[payment_server]
base_url = "https://pay.example.com"
api_key = "k"
secret = "s"
"#,
        );
        let loader = ConfigLoader::new(
            Some(&path),
            Some(Url::parse("http://localhost:9000").unwrap()),
        );
        let config = loader.load_with(env(&[])).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.base_url.as_str(), "http://localhost:9000/");
    }

    #[test]
    fn test_signer_loads_without_base_url() {
        let path = temp_config(
            "signer",
            r#"
[payment_server]
api_key = "file-key"
"#,
        );
        let loader = ConfigLoader::new(Some(&path), None);
        let signer = loader
            .load_signer_with(env(&[(SECRET_KEY, "env-secret")]))
            .unwrap();
        let full = loader.load_with(env(&[(SECRET_KEY, "env-secret")]));
        std::fs::remove_file(&path).unwrap();

        assert_eq!(signer.api_key(), "file-key");
        assert!(matches!(
            full,
            Err(ConfigError::Resolve(
                paperpay_sdk::config::ConfigError::Missing("payment server base url")
            ))
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let loader = ConfigLoader::new(Some(Path::new("/nonexistent/paperpay.toml")), None);
        assert!(matches!(
            loader.load_with(env(&[])),
            Err(ConfigError::IoError { .. })
        ));
    }

    #[test]
    fn test_env_only_when_default_file_absent() {
        let loader = ConfigLoader {
            config_path: PathBuf::from("/nonexistent/paperpay.toml"),
            explicit: false,
            base_url_override: None,
        };
        let config = loader
            .load_with(env(&[
                (BASE_URL_KEY, "https://pay.example.com"),
                (API_KEY_KEY, "k"),
                (SECRET_KEY, "s"),
            ]))
            .unwrap();
        assert_eq!(config.api_key, "k");

        let err = loader.load_with(env(&[])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Resolve(paperpay_sdk::config::ConfigError::Missing(_))
        ));
    }
}
