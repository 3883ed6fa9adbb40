//! Configuration module for the robokassa CLI.
//!
//! Loads the merchant section from a TOML file and lets the environment
//! override the passwords so they need not be stored on disk.

pub mod file;

use crate::config::file::FileConfig;
use robokassa_sdk::{MerchantConfig, SecretPair};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding `merchant.password1`.
pub const PASSWORD1_ENV: &str = "ROBOKASSA_PASSWORD1";

/// Environment variable overriding `merchant.password2`.
pub const PASSWORD2_ENV: &str = "ROBOKASSA_PASSWORD2";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply password overrides from the environment
    /// 3. Validate and convert into the SDK configuration
    pub fn load(&self) -> Result<MerchantConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Ok(password) = std::env::var(PASSWORD1_ENV) {
            tracing::debug!("{} overrides merchant.password1", PASSWORD1_ENV);
            file_config.merchant.password1 = password;
        }
        if let Ok(password) = std::env::var(PASSWORD2_ENV) {
            tracing::debug!("{} overrides merchant.password2", PASSWORD2_ENV);
            file_config.merchant.password2 = password;
        }

        build_merchant_config(file_config)
    }
}

/// Validate a parsed file and convert it into the SDK configuration.
pub fn build_merchant_config(file_config: FileConfig) -> Result<MerchantConfig, ConfigError> {
    let merchant = file_config.merchant;
    if merchant.login.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "merchant.login must not be empty".to_string(),
        ));
    }
    if merchant.password1.is_empty() || merchant.password2.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "both passwords are required (set them in the file or via {PASSWORD1_ENV} / {PASSWORD2_ENV})"
        )));
    }
    if merchant.password1 == merchant.password2 {
        return Err(ConfigError::ValidationError(
            "password1 and password2 must differ".to_string(),
        ));
    }

    Ok(
        MerchantConfig::new(merchant.login, SecretPair::new(merchant.password1, merchant.password2))
            .with_hash_algorithm(merchant.hash_algorithm)
            .with_test_mode(merchant.is_test),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use robokassa_sdk::HashAlgorithm;

    fn parse(toml_str: &str) -> FileConfig {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_build_valid_config() {
        let config = build_merchant_config(parse(
            r#"
[merchant]
login = "demo"
password1 = "first"
password2 = "second"
hash_algorithm = "sha512"
"#,
        ))
        .unwrap();
        assert_eq!(config.merchant_login, "demo");
        assert_eq!(config.hash_algorithm, HashAlgorithm::Sha512);
        assert_eq!(config.secrets.outbound().expose(), "first");
        assert_eq!(config.secrets.inbound().expose(), "second");
    }

    #[test]
    fn test_missing_password_is_rejected() {
        let err = build_merchant_config(parse(
            r#"
[merchant]
login = "demo"
password1 = "first"
"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_identical_passwords_are_rejected() {
        let err = build_merchant_config(parse(
            r#"
[merchant]
login = "demo"
password1 = "same"
password2 = "same"
"#,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_empty_login_is_rejected() {
        let err = build_merchant_config(parse(
            r#"
[merchant]
login = " "
password1 = "a"
password2 = "b"
"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_load_reads_file() {
        let path = std::env::temp_dir().join(format!("robokassa-cli-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[merchant]\nlogin = \"demo\"\npassword1 = \"a\"\npassword2 = \"b\"\n",
        )
        .unwrap();
        let result = ConfigLoader::new(&path).load();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(result.unwrap().merchant_login, "demo");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigLoader::new("/nonexistent/robokassa.toml").load().unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
