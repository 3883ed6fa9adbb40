//! TOML file configuration structures.
//!
//! These structs directly map to the `robokassa.toml` file format.

use robokassa_sdk::HashAlgorithm;
use serde::Deserialize;

/// Root configuration structure as read from the TOML file.
///
/// Not `Debug`: it holds plaintext passwords.
#[derive(Clone, Deserialize)]
pub struct FileConfig {
    pub merchant: MerchantConfig,
}

/// Shop credentials and signing settings.
#[derive(Clone, Deserialize)]
pub struct MerchantConfig {
    /// Shop identifier (`MerchantLogin`).
    pub login: String,
    /// Password #1. May be left empty and supplied via `ROBOKASSA_PASSWORD1`.
    #[serde(default)]
    pub password1: String,
    /// Password #2. May be left empty and supplied via `ROBOKASSA_PASSWORD2`.
    #[serde(default)]
    pub password2: String,
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
    #[serde(default)]
    pub is_test: bool,
}
