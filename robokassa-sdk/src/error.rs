//! Input validation errors raised before any signature work begins.

/// A value handed to the SDK cannot be represented in a Robokassa request.
#[derive(Debug, thiserror::Error)]
pub enum InvalidValue {
    #[error("amount is not a number: {0:?}")]
    MalformedAmount(String),

    #[error("amount is not finite")]
    NonFiniteAmount,

    #[error("amount is out of range: {0:?}")]
    AmountOutOfRange(String),

    #[error("timestamp cannot be formatted: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("invoice id {0} is outside 1..=2147483647")]
    InvoiceIdOutOfRange(u64),

    #[error("invoice id is not a number: {0:?}")]
    MalformedInvoiceId(String),

    #[error("description is {0} characters long, at most 100 are allowed")]
    DescriptionTooLong(usize),

    #[error("extra parameter key is empty")]
    EmptyParameterKey,

    #[error("extra parameter key {0:?} contains ':' or '='")]
    AmbiguousParameterKey(String),

    #[error("extra parameter key {0:?} appears more than once")]
    DuplicateParameterKey(String),

    #[error("receipt cannot be serialized: {0}")]
    Receipt(#[from] serde_json::Error),
}
