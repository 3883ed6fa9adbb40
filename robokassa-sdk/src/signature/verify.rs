//! Callback signature verification.
//!
//! Verification answers yes or no. Anything that prevents recomputing the
//! expected signature (a non-numeric amount, unusable extra parameters, a
//! truncated digest) is a "no", never an error.

use subtle::ConstantTimeEq;

use super::{HashAlgorithm, SignableFields, compose_callback};
use crate::config::Password;
use crate::format::Amount;
use crate::objects::callback::CallbackPayload;
use crate::params::canonicalize;

/// Check `claimed` against the callback signature of `fields`.
///
/// Hex case is ignored; length and content must otherwise match exactly.
pub fn verify_signature(
    fields: &SignableFields<'_>,
    secret: &Password,
    algorithm: HashAlgorithm,
    claimed: &str,
) -> bool {
    let expected = compose_callback(fields, secret).digest(algorithm);
    digests_match(&expected, claimed)
}

/// Verify a parsed callback with the given password and algorithm.
pub fn verify(payload: &CallbackPayload, secret: &Password, algorithm: HashAlgorithm) -> bool {
    if Amount::from(payload.out_sum()).to_decimal().is_err() {
        tracing::debug!(out_sum = payload.out_sum(), "callback amount is not numeric");
        return false;
    }
    let user_parameters = match canonicalize(payload.user_parameters()) {
        Ok(params) => params,
        Err(e) => {
            tracing::debug!(error = %e, "callback extra parameters rejected");
            return false;
        }
    };
    let fields = SignableFields::callback(payload.out_sum(), payload.inv_id_text(), &user_parameters);
    verify_signature(&fields, secret, algorithm, payload.signature_value())
}

fn digests_match(expected: &str, claimed: &str) -> bool {
    if claimed.len() != expected.len() {
        return false;
    }
    let claimed = claimed.to_ascii_lowercase();
    expected.as_bytes().ct_eq(claimed.as_bytes()).into()
}
