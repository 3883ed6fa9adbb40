//! Payment request (invoice) value object.
//!
//! An [`Invoice`] only ever holds canonical, wire-ready strings: amounts,
//! timestamps, receipts and extra parameters are normalized once in
//! [`InvoiceBuilder::build`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::InvalidValue;
use crate::format::{Amount, format_amount, format_timestamp};
use crate::objects::options::{Culture, OutSumCurrency};
use crate::objects::receipt::Receipt;
use crate::params::{UserParameters, canonicalize};
use crate::signature::SignableFields;

/// Longest description the gateway accepts, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 100;

/// Default `Encoding` of the payment page.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Shop-side invoice number, `1..=2147483647`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct InvoiceId(u32);

impl InvoiceId {
    pub const MAX: u32 = 2_147_483_647;

    pub fn new(value: u64) -> Result<Self, InvalidValue> {
        match u32::try_from(value) {
            Ok(id) if (1..=Self::MAX).contains(&id) => Ok(Self(id)),
            _ => Err(InvalidValue::InvoiceIdOutOfRange(value)),
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u64> for InvoiceId {
    type Error = InvalidValue;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InvoiceId> for u64 {
    fn from(id: InvoiceId) -> Self {
        u64::from(id.0)
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InvoiceId {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s
            .parse()
            .map_err(|_| InvalidValue::MalformedInvoiceId(s.to_owned()))?;
        Self::new(value)
    }
}

#[derive(Debug, Clone)]
enum ReceiptSource {
    Structured(Receipt),
    Json(String),
}

#[derive(Debug, Clone)]
enum Expiration {
    At(OffsetDateTime),
    Formatted(String),
}

/// A signed-or-signable payment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    out_sum: String,
    inv_id: Option<InvoiceId>,
    description: String,
    previous_invoice_id: Option<InvoiceId>,
    receipt: Option<String>,
    expiration_date: Option<String>,
    email: Option<String>,
    out_sum_currency: Option<OutSumCurrency>,
    user_ip: Option<String>,
    inc_curr_label: Option<String>,
    user_parameters: UserParameters,
    encoding: String,
    culture: Option<Culture>,
    signature_value: Option<String>,
}

impl Invoice {
    pub fn builder(out_sum: impl Into<Amount>, description: impl Into<String>) -> InvoiceBuilder {
        InvoiceBuilder::new(out_sum, description)
    }

    /// `OutSum`, always with two decimals.
    pub fn out_sum(&self) -> &str {
        &self.out_sum
    }

    /// `None` lets the gateway assign the number.
    pub fn inv_id(&self) -> Option<InvoiceId> {
        self.inv_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parent payment of a recurring charge.
    pub fn previous_invoice_id(&self) -> Option<InvoiceId> {
        self.previous_invoice_id
    }

    /// Receipt JSON exactly as signed.
    pub fn receipt(&self) -> Option<&str> {
        self.receipt.as_deref()
    }

    pub fn expiration_date(&self) -> Option<&str> {
        self.expiration_date.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn out_sum_currency(&self) -> Option<OutSumCurrency> {
        self.out_sum_currency
    }

    pub fn user_ip(&self) -> Option<&str> {
        self.user_ip.as_deref()
    }

    pub fn inc_curr_label(&self) -> Option<&str> {
        self.inc_curr_label.as_deref()
    }

    pub fn user_parameters(&self) -> &UserParameters {
        &self.user_parameters
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn culture(&self) -> Option<Culture> {
        self.culture
    }

    /// A signature supplied by the caller instead of computed by the SDK.
    pub fn signature_value(&self) -> Option<&str> {
        self.signature_value.as_deref()
    }

    pub fn signable_fields(&self) -> SignableFields<'_> {
        SignableFields {
            out_sum: &self.out_sum,
            inv_id: self.inv_id.map(|id| Cow::Owned(id.to_string())),
            receipt: self.receipt.as_deref(),
            user_ip: self.user_ip.as_deref(),
            inc_curr_label: self.inc_curr_label.as_deref(),
            user_parameters: &self.user_parameters,
        }
    }
}

/// Collects raw invoice inputs; [`build`](Self::build) validates and
/// normalizes them.
#[derive(Debug, Clone)]
pub struct InvoiceBuilder {
    out_sum: Amount,
    inv_id: Option<u64>,
    description: String,
    previous_invoice_id: Option<u64>,
    receipt: Option<ReceiptSource>,
    expiration_date: Option<Expiration>,
    email: Option<String>,
    out_sum_currency: Option<OutSumCurrency>,
    user_ip: Option<String>,
    inc_curr_label: Option<String>,
    user_parameters: Vec<(String, String)>,
    encoding: String,
    culture: Option<Culture>,
    signature_value: Option<String>,
}

impl InvoiceBuilder {
    pub fn new(out_sum: impl Into<Amount>, description: impl Into<String>) -> Self {
        Self {
            out_sum: out_sum.into(),
            inv_id: None,
            description: description.into(),
            previous_invoice_id: None,
            receipt: None,
            expiration_date: None,
            email: None,
            out_sum_currency: None,
            user_ip: None,
            inc_curr_label: None,
            user_parameters: Vec::new(),
            encoding: DEFAULT_ENCODING.to_owned(),
            culture: None,
            signature_value: None,
        }
    }

    pub fn inv_id(mut self, inv_id: u64) -> Self {
        self.inv_id = Some(inv_id);
        self
    }

    pub fn previous_invoice_id(mut self, inv_id: u64) -> Self {
        self.previous_invoice_id = Some(inv_id);
        self
    }

    pub fn receipt(mut self, receipt: Receipt) -> Self {
        self.receipt = Some(ReceiptSource::Structured(receipt));
        self
    }

    /// Attach an already serialized receipt; it is signed byte-for-byte.
    pub fn receipt_json(mut self, json: impl Into<String>) -> Self {
        self.receipt = Some(ReceiptSource::Json(json.into()));
        self
    }

    pub fn expiration_date(mut self, at: OffsetDateTime) -> Self {
        self.expiration_date = Some(Expiration::At(at));
        self
    }

    /// Use a pre-formatted ISO-8601 expiration as is.
    pub fn expiration_date_formatted(mut self, formatted: impl Into<String>) -> Self {
        self.expiration_date = Some(Expiration::Formatted(formatted.into()));
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn out_sum_currency(mut self, currency: OutSumCurrency) -> Self {
        self.out_sum_currency = Some(currency);
        self
    }

    pub fn user_ip(mut self, user_ip: impl Into<String>) -> Self {
        self.user_ip = Some(user_ip.into());
        self
    }

    pub fn inc_curr_label(mut self, label: impl Into<String>) -> Self {
        self.inc_curr_label = Some(label.into());
        self
    }

    /// Add one extra parameter; the `shp_` prefix is optional.
    pub fn user_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.user_parameters.push((key.into(), value.into()));
        self
    }

    pub fn user_parameters<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.user_parameters
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn culture(mut self, culture: Culture) -> Self {
        self.culture = Some(culture);
        self
    }

    pub fn signature_value(mut self, signature: impl Into<String>) -> Self {
        self.signature_value = Some(signature.into());
        self
    }

    pub fn build(self) -> Result<Invoice, InvalidValue> {
        let out_sum = format_amount(self.out_sum)?;
        let inv_id = self.inv_id.map(InvoiceId::new).transpose()?;
        let previous_invoice_id = self.previous_invoice_id.map(InvoiceId::new).transpose()?;

        let description_len = self.description.chars().count();
        if description_len > MAX_DESCRIPTION_LEN {
            return Err(InvalidValue::DescriptionTooLong(description_len));
        }

        let receipt = match self.receipt {
            Some(ReceiptSource::Structured(receipt)) => Some(receipt.to_json()?),
            Some(ReceiptSource::Json(json)) => non_empty(Some(json)),
            None => None,
        };
        let expiration_date = match self.expiration_date {
            Some(Expiration::At(at)) => Some(format_timestamp(at)?),
            Some(Expiration::Formatted(formatted)) => non_empty(Some(formatted)),
            None => None,
        };
        let user_parameters = canonicalize(self.user_parameters.iter().map(|(k, v)| (k, v)))?;
        let encoding = non_empty(Some(self.encoding)).unwrap_or_else(|| DEFAULT_ENCODING.to_owned());

        Ok(Invoice {
            out_sum,
            inv_id,
            description: self.description,
            previous_invoice_id,
            receipt,
            expiration_date,
            email: non_empty(self.email),
            out_sum_currency: self.out_sum_currency,
            user_ip: non_empty(self.user_ip),
            inc_curr_label: non_empty(self.inc_curr_label),
            user_parameters,
            encoding,
            culture: self.culture,
            signature_value: non_empty(self.signature_value),
        })
    }
}

/// Blank optional text counts as absent, on both signing and transmission.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
