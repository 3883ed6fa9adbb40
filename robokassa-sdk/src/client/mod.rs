//! Merchant-side facade over signing and verification.
//!
//! [`Robokassa`] owns one shop's configuration and turns invoices into the
//! form fields or redirect URL of the payment page. It performs no I/O: the
//! caller redirects the buyer or POSTs the form with its own HTTP stack.

use url::Url;

use crate::config::MerchantConfig;
use crate::objects::callback::CallbackPayload;
use crate::objects::invoice::Invoice;
use crate::signature;

/// Payment page for one-off payments.
pub const PAYMENT_URL: &str = "https://auth.robokassa.ru/Merchant/Index.aspx";

/// Endpoint for charging a saved card again (form POST).
pub const RECURRING_URL: &str = "https://auth.robokassa.ru/Merchant/Recurring";

/// Errors produced while assembling a payment request.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configured endpoint is not a valid URL.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Client for a single Robokassa shop.
#[derive(Debug, Clone)]
pub struct Robokassa {
    config: MerchantConfig,
    payment_url: String,
    recurring_url: String,
}

impl Robokassa {
    pub fn new(config: MerchantConfig) -> Self {
        Self {
            config,
            payment_url: PAYMENT_URL.to_owned(),
            recurring_url: RECURRING_URL.to_owned(),
        }
    }

    /// Point the client at different endpoints (e.g. a local stub).
    pub fn with_endpoints(
        mut self,
        payment_url: impl Into<String>,
        recurring_url: impl Into<String>,
    ) -> Self {
        self.payment_url = payment_url.into();
        self.recurring_url = recurring_url.into();
        self
    }

    pub fn config(&self) -> &MerchantConfig {
        &self.config
    }

    /// `SignatureValue` for `invoice`.
    ///
    /// A signature supplied on the invoice wins; otherwise it is computed with
    /// password #1 and the configured algorithm.
    pub fn signature(&self, invoice: &Invoice) -> String {
        match invoice.signature_value() {
            Some(signature) => signature.to_owned(),
            None => signature::sign(
                &invoice.signable_fields(),
                self.config.secrets.outbound(),
                self.config.hash_algorithm,
            ),
        }
    }

    /// Where the request for `invoice` must be sent.
    pub fn endpoint(&self, invoice: &Invoice) -> &str {
        if invoice.previous_invoice_id().is_some() {
            &self.recurring_url
        } else {
            &self.payment_url
        }
    }

    /// Form fields of the payment request, extra parameters last.
    pub fn payment_parameters(&self, invoice: &Invoice) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = Vec::with_capacity(16);
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                params.push((key.to_owned(), value));
            }
        };

        push("MerchantLogin", Some(self.config.merchant_login.clone()));
        push("OutSum", Some(invoice.out_sum().to_owned()));
        push("InvId", invoice.inv_id().map(|id| id.to_string()));
        push("Description", Some(invoice.description().to_owned()));
        push("SignatureValue", Some(self.signature(invoice)));
        push("Culture", invoice.culture().map(|c| c.as_str().to_owned()));
        push("Encoding", Some(invoice.encoding().to_owned()));
        push(
            "OutSumCurrency",
            invoice.out_sum_currency().map(|c| c.as_str().to_owned()),
        );
        push("UserIp", invoice.user_ip().map(str::to_owned));
        push("Receipt", invoice.receipt().map(str::to_owned));
        push("ExpirationDate", invoice.expiration_date().map(str::to_owned));
        push("IncCurrLabel", invoice.inc_curr_label().map(str::to_owned));
        push("Email", invoice.email().map(str::to_owned));
        push(
            "PreviousInvoiceID",
            invoice.previous_invoice_id().map(|id| id.to_string()),
        );
        push("IsTest", self.config.is_test.then(|| "1".to_owned()));
        for (key, value) in invoice.user_parameters() {
            push(key, Some(value.to_owned()));
        }

        tracing::debug!(
            inv_id = ?invoice.inv_id(),
            algorithm = %self.config.hash_algorithm,
            parameters = params.len(),
            "assembled payment request"
        );
        params
    }

    /// Redirect URL for the buyer, parameters in the query string.
    pub fn payment_url(&self, invoice: &Invoice) -> Result<Url, ClientError> {
        let params = self.payment_parameters(invoice);
        Ok(Url::parse_with_params(self.endpoint(invoice), &params)?)
    }

    /// `application/x-www-form-urlencoded` body for POSTing the request.
    pub fn form_body(&self, invoice: &Invoice) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.payment_parameters(invoice))
            .finish()
    }

    /// Verify a ResultURL notification (password #2).
    pub fn verify_result(&self, payload: &CallbackPayload) -> bool {
        let verified = signature::verify(
            payload,
            self.config.secrets.inbound(),
            self.config.hash_algorithm,
        );
        if !verified {
            tracing::warn!(inv_id = ?payload.inv_id_text(), "ResultURL signature does not verify");
        }
        verified
    }

    /// Verify the SuccessURL redirect (password #1).
    pub fn verify_success(&self, payload: &CallbackPayload) -> bool {
        let verified = signature::verify(
            payload,
            self.config.secrets.outbound(),
            self.config.hash_algorithm,
        );
        if !verified {
            tracing::warn!(inv_id = ?payload.inv_id_text(), "SuccessURL signature does not verify");
        }
        verified
    }
}
