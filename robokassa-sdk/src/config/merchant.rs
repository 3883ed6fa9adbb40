//! Merchant configuration.

use std::fmt;

use crate::signature::hash::HashAlgorithm;

/// A merchant password. `Debug` never prints the value and the type is not
/// serializable.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw secret, for inclusion in a signing string only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// The two shop passwords issued by Robokassa.
///
/// Password #1 signs outbound payment requests and verifies the SuccessURL
/// redirect; password #2 verifies ResultURL notifications.
#[derive(Debug, Clone)]
pub struct SecretPair {
    password1: Password,
    password2: Password,
}

impl SecretPair {
    pub fn new(password1: impl Into<Password>, password2: impl Into<Password>) -> Self {
        Self {
            password1: password1.into(),
            password2: password2.into(),
        }
    }

    /// Password #1.
    pub fn outbound(&self) -> &Password {
        &self.password1
    }

    /// Password #2.
    pub fn inbound(&self) -> &Password {
        &self.password2
    }
}

/// Everything needed to sign requests for one Robokassa shop.
#[derive(Debug, Clone)]
pub struct MerchantConfig {
    /// Shop identifier (`MerchantLogin`).
    pub merchant_login: String,
    pub secrets: SecretPair,
    pub hash_algorithm: HashAlgorithm,
    /// Adds `IsTest=1` to payment requests.
    pub is_test: bool,
}

impl MerchantConfig {
    /// Create a production configuration using MD5, the gateway default.
    pub fn new(merchant_login: impl Into<String>, secrets: SecretPair) -> Self {
        Self {
            merchant_login: merchant_login.into(),
            secrets,
            hash_algorithm: HashAlgorithm::default(),
            is_test: false,
        }
    }

    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    pub fn with_test_mode(mut self, is_test: bool) -> Self {
        self.is_test = is_test;
        self
    }
}
