//! Configuration types for a Robokassa shop.
//!
//! Built programmatically by the caller; loading from files or the
//! environment is left to the application.

mod merchant;

pub use merchant::{MerchantConfig, Password, SecretPair};
