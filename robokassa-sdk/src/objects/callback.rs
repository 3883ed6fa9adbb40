//! Inbound ResultURL / SuccessURL notifications.
//!
//! The merchant application receives the gateway's form fields over its own
//! HTTP endpoint and hands them to [`CallbackPayload::from_request`]. Parsing
//! failures are reported as [`CallbackError`]; whether the signature holds is
//! a separate yes/no question answered by [`crate::signature::verify`].

use std::collections::HashSet;

use crate::objects::invoice::{Invoice, InvoiceId};
use crate::params::{is_user_parameter, prefixed_key};

/// The request could not be read as a Robokassa callback.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("field {0} appears more than once")]
    DuplicateField(String),

    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

/// Untrusted callback data, kept exactly as transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackPayload {
    out_sum: String,
    inv_id: Option<InvoiceId>,
    inv_id_text: Option<String>,
    user_parameters: Vec<(String, String)>,
    signature_value: String,
    email: Option<String>,
    fee: Option<String>,
    inc_curr_label: Option<String>,
    payment_method: Option<String>,
    is_test: bool,
}

impl CallbackPayload {
    pub fn new<I, K, V>(
        out_sum: impl Into<String>,
        inv_id: Option<InvoiceId>,
        user_parameters: I,
        signature_value: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            out_sum: out_sum.into(),
            inv_id,
            inv_id_text: inv_id.map(|id| id.to_string()),
            user_parameters: user_parameters
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            signature_value: signature_value.into(),
            email: None,
            fee: None,
            inc_curr_label: None,
            payment_method: None,
            is_test: false,
        }
    }

    /// The callback the gateway would send back for `invoice`.
    pub fn from_invoice(invoice: &Invoice, signature_value: impl Into<String>) -> Self {
        Self::new(
            invoice.out_sum(),
            invoice.inv_id(),
            invoice.user_parameters(),
            signature_value,
        )
    }

    /// Read the gateway's form fields.
    ///
    /// Field names are matched case-insensitively. `OutSum` and
    /// `SignatureValue` are required; repeating any known field is rejected
    /// as ambiguous. Extra parameters are told apart the same way
    /// [`canonicalize`](crate::params::canonicalize) does: only the `shp_`
    /// prefix ignores case. Unknown fields are ignored.
    pub fn from_request<I, K, V>(fields: I) -> Result<Self, CallbackError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut out_sum = None;
        let mut inv_id = None;
        let mut signature_value = None;
        let mut payload = Self::new(String::new(), None, Vec::<(String, String)>::new(), "");

        for (key, value) in fields {
            let key = key.as_ref();
            let identity = if is_user_parameter(key) {
                prefixed_key(key)
            } else {
                key.to_ascii_lowercase()
            };
            if !seen.insert(identity) {
                return Err(CallbackError::DuplicateField(key.to_owned()));
            }
            let value = value.into();
            if is_user_parameter(key) {
                payload.user_parameters.push((key.to_owned(), value));
                continue;
            }
            match key.to_ascii_lowercase().as_str() {
                "outsum" => out_sum = Some(value),
                "invid" => inv_id = Some(value),
                "signaturevalue" => signature_value = Some(value),
                "email" => payload.email = Some(value),
                "fee" => payload.fee = Some(value),
                "inccurrlabel" => payload.inc_curr_label = Some(value),
                "paymentmethod" => payload.payment_method = Some(value),
                "istest" => payload.is_test = value == "1",
                _ => {}
            }
        }

        payload.out_sum = out_sum.ok_or(CallbackError::MissingField("OutSum"))?;
        payload.signature_value =
            signature_value.ok_or(CallbackError::MissingField("SignatureValue"))?;
        if let Some(raw) = inv_id.filter(|raw| !raw.is_empty()) {
            let parsed = raw.parse().map_err(|_| CallbackError::InvalidField {
                field: "InvId",
                value: raw.clone(),
            })?;
            payload.inv_id = Some(parsed);
            payload.inv_id_text = Some(raw);
        }
        Ok(payload)
    }

    /// `OutSum` as transmitted; the gateway signs this exact text.
    pub fn out_sum(&self) -> &str {
        &self.out_sum
    }

    pub fn inv_id(&self) -> Option<InvoiceId> {
        self.inv_id
    }

    /// `InvId` as transmitted, which is what the gateway signed.
    pub fn inv_id_text(&self) -> Option<&str> {
        self.inv_id_text.as_deref()
    }

    /// Extra parameters as received, not yet canonicalized.
    pub fn user_parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.user_parameters
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Claimed signature.
    pub fn signature_value(&self) -> &str {
        &self.signature_value
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Gateway commission, informational only.
    pub fn fee(&self) -> Option<&str> {
        self.fee.as_deref()
    }

    pub fn inc_curr_label(&self) -> Option<&str> {
        self.inc_curr_label.as_deref()
    }

    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    pub fn is_test(&self) -> bool {
        self.is_test
    }

    /// Body a ResultURL handler must answer with to acknowledge receipt.
    pub fn result_response(&self) -> String {
        match &self.inv_id_text {
            Some(id) => format!("OK{id}"),
            None => "OK".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Vec<(&'static str, &'static str)> {
        vec![
            ("OutSum", "100.000000"),
            ("InvId", "7"),
            ("SignatureValue", "ABCDEF"),
            ("Shp_login", "vasya"),
            ("EMail", "buyer@example.com"),
            ("Fee", "3.9"),
            ("IncCurrLabel", "BankCardPSR"),
            ("PaymentMethod", "BankCard"),
            ("IsTest", "1"),
            ("Culture", "ru"),
        ]
    }

    #[test]
    fn test_parse_full_request() {
        let payload = CallbackPayload::from_request(request()).unwrap();
        assert_eq!(payload.out_sum(), "100.000000");
        assert_eq!(payload.inv_id().map(InvoiceId::get), Some(7));
        assert_eq!(payload.signature_value(), "ABCDEF");
        assert_eq!(
            payload.user_parameters().collect::<Vec<_>>(),
            vec![("Shp_login", "vasya")]
        );
        assert_eq!(payload.email(), Some("buyer@example.com"));
        assert_eq!(payload.fee(), Some("3.9"));
        assert_eq!(payload.inc_curr_label(), Some("BankCardPSR"));
        assert_eq!(payload.payment_method(), Some("BankCard"));
        assert!(payload.is_test());
        assert_eq!(payload.result_response(), "OK7");
    }

    #[test]
    fn test_field_names_are_case_insensitive() {
        let payload = CallbackPayload::from_request([
            ("outsum", "5.00"),
            ("INVID", "12"),
            ("signaturevalue", "x"),
        ])
        .unwrap();
        assert_eq!(payload.out_sum(), "5.00");
        assert_eq!(payload.result_response(), "OK12");
        assert!(!payload.is_test());
    }

    #[test]
    fn test_missing_fields() {
        let err = CallbackPayload::from_request([("InvId", "1"), ("SignatureValue", "x")]).unwrap_err();
        assert!(matches!(err, CallbackError::MissingField("OutSum")));
        let err = CallbackPayload::from_request([("OutSum", "1"), ("InvId", "1")]).unwrap_err();
        assert!(matches!(err, CallbackError::MissingField("SignatureValue")));
    }

    #[test]
    fn test_duplicate_fields_are_ambiguous() {
        let err = CallbackPayload::from_request([
            ("OutSum", "1.00"),
            ("outsum", "2.00"),
            ("SignatureValue", "x"),
        ])
        .unwrap_err();
        assert!(matches!(err, CallbackError::DuplicateField(_)));

        let err = CallbackPayload::from_request([
            ("OutSum", "1.00"),
            ("SignatureValue", "x"),
            ("Shp_a", "1"),
            ("shp_a", "2"),
        ])
        .unwrap_err();
        assert!(matches!(err, CallbackError::DuplicateField(_)));
    }

    #[test]
    fn test_parameter_names_differing_in_case_are_distinct() {
        let invoice = Invoice::builder(100.0, "Order 7")
            .inv_id(7)
            .user_parameter("a", "1")
            .user_parameter("A", "2")
            .build()
            .unwrap();
        let mut fields = vec![
            ("OutSum".to_string(), invoice.out_sum().to_string()),
            ("InvId".to_string(), "7".to_string()),
            ("SignatureValue".to_string(), "x".to_string()),
        ];
        fields.extend(
            invoice
                .user_parameters()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );

        let payload = CallbackPayload::from_request(fields).unwrap();
        let mut keys: Vec<&str> = payload.user_parameters().map(|(k, _)| k).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["shp_A", "shp_a"]);
    }

    #[test]
    fn test_invoice_id_text_is_kept_as_transmitted() {
        let payload = CallbackPayload::from_request([
            ("OutSum", "1.00"),
            ("InvId", "07"),
            ("SignatureValue", "x"),
        ])
        .unwrap();
        assert_eq!(payload.inv_id().map(InvoiceId::get), Some(7));
        assert_eq!(payload.inv_id_text(), Some("07"));
        assert_eq!(payload.result_response(), "OK07");
    }

    #[test]
    fn test_invalid_invoice_id() {
        let err = CallbackPayload::from_request([
            ("OutSum", "1.00"),
            ("InvId", "abc"),
            ("SignatureValue", "x"),
        ])
        .unwrap_err();
        assert!(matches!(err, CallbackError::InvalidField { field: "InvId", .. }));

        let payload = CallbackPayload::from_request([
            ("OutSum", "1.00"),
            ("InvId", ""),
            ("SignatureValue", "x"),
        ])
        .unwrap();
        assert!(payload.inv_id().is_none());
        assert!(payload.inv_id_text().is_none());
        assert_eq!(payload.result_response(), "OK");
    }
}
