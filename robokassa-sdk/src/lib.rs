//! Client-side SDK for the Robokassa payment gateway.
//!
//! Builds signed payment requests and verifies the signatures of the
//! gateway's ResultURL / SuccessURL callbacks. Nothing in this crate performs
//! I/O: the merchant application owns HTTP in both directions.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod objects;
pub mod params;
pub mod signature;

pub use client::Robokassa;
pub use config::{MerchantConfig, Password, SecretPair};
pub use error::InvalidValue;
pub use objects::callback::CallbackPayload;
pub use objects::invoice::{Invoice, InvoiceBuilder, InvoiceId};
pub use signature::hash::HashAlgorithm;
