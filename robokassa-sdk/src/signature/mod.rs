//! Signing strings and `SignatureValue` computation.
//!
//! A Robokassa signature is a hex digest over colon-joined segments. Which
//! segments appear, and in which order, is fixed per message kind and
//! expressed below as a rule table interpreted by `compose`:
//!
//! ```text
//! payment request:  OutSum:InvId:Password#1[:Receipt][:UserIp][:IncCurrLabel][:shp_k=v...]
//! callback:         OutSum:InvId:Password[:shp_k=v...]
//! ```
//!
//! `UserIp` is only signed when no receipt is attached. An unset invoice id
//! still contributes an empty segment. Callbacks are signed over `OutSum` and
//! `InvId` exactly as the gateway transmitted them.

pub mod hash;
pub mod verify;

use std::borrow::Cow;
use std::fmt;

pub use hash::HashAlgorithm;
pub use verify::{verify, verify_signature};

use crate::config::Password;
use crate::params::UserParameters;

/// Separator between signing string segments.
pub const SEGMENT_SEPARATOR: &str = ":";

/// The signable projection of a payment request or callback.
#[derive(Debug, Clone)]
pub struct SignableFields<'a> {
    pub out_sum: &'a str,
    /// Rendered invoice id; `None` signs as an empty segment.
    pub inv_id: Option<Cow<'a, str>>,
    pub receipt: Option<&'a str>,
    pub user_ip: Option<&'a str>,
    pub inc_curr_label: Option<&'a str>,
    pub user_parameters: &'a UserParameters,
}

impl<'a> SignableFields<'a> {
    /// Fields of a callback: amount, invoice id and extra parameters only.
    pub fn callback(
        out_sum: &'a str,
        inv_id: Option<&'a str>,
        user_parameters: &'a UserParameters,
    ) -> Self {
        Self {
            out_sum,
            inv_id: inv_id.map(Cow::Borrowed),
            receipt: None,
            user_ip: None,
            inc_curr_label: None,
            user_parameters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    OutSum,
    InvId,
    Secret,
    Receipt,
    UserIpWithoutReceipt,
    IncCurrLabel,
    UserParameters,
}

const OUTBOUND_RULES: &[Rule] = &[
    Rule::OutSum,
    Rule::InvId,
    Rule::Secret,
    Rule::Receipt,
    Rule::UserIpWithoutReceipt,
    Rule::IncCurrLabel,
    Rule::UserParameters,
];

const CALLBACK_RULES: &[Rule] = &[
    Rule::OutSum,
    Rule::InvId,
    Rule::Secret,
    Rule::UserParameters,
];

/// A string about to be hashed. It embeds a password, so `Debug` is
/// redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningString(String);

impl SigningString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex digest of the string, i.e. the `SignatureValue`.
    pub fn digest(&self, algorithm: HashAlgorithm) -> String {
        algorithm.digest(&self.0)
    }
}

impl fmt::Debug for SigningString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningString(***)")
    }
}

fn compose(rules: &[Rule], fields: &SignableFields<'_>, secret: &Password) -> SigningString {
    let mut segments: Vec<Cow<'_, str>> = Vec::with_capacity(rules.len());
    for rule in rules {
        match rule {
            Rule::OutSum => segments.push(Cow::Borrowed(fields.out_sum)),
            Rule::InvId => {
                segments.push(Cow::Borrowed(fields.inv_id.as_deref().unwrap_or_default()))
            }
            Rule::Secret => segments.push(Cow::Borrowed(secret.expose())),
            Rule::Receipt => segments.extend(fields.receipt.map(Cow::Borrowed)),
            Rule::UserIpWithoutReceipt => {
                if fields.receipt.is_none() {
                    segments.extend(fields.user_ip.map(Cow::Borrowed));
                }
            }
            Rule::IncCurrLabel => segments.extend(fields.inc_curr_label.map(Cow::Borrowed)),
            Rule::UserParameters => segments.extend(
                fields
                    .user_parameters
                    .iter()
                    .map(|(key, value)| Cow::Owned(format!("{key}={value}"))),
            ),
        }
    }
    SigningString(segments.join(SEGMENT_SEPARATOR))
}

/// Signing string of an outbound payment request, keyed with password #1.
pub fn compose_outbound(fields: &SignableFields<'_>, secret: &Password) -> SigningString {
    compose(OUTBOUND_RULES, fields, secret)
}

/// Signing string of a ResultURL or SuccessURL callback.
pub fn compose_callback(fields: &SignableFields<'_>, secret: &Password) -> SigningString {
    compose(CALLBACK_RULES, fields, secret)
}

/// `SignatureValue` for an outbound payment request.
pub fn sign(fields: &SignableFields<'_>, secret: &Password, algorithm: HashAlgorithm) -> String {
    compose_outbound(fields, secret).digest(algorithm)
}
