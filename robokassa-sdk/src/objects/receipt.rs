//! Fiscal receipt attached to a payment (`Receipt` parameter).
//!
//! The serialized JSON is signed verbatim, so [`Receipt::to_json`] is the only
//! place it is produced.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvalidValue;
use crate::format::{Amount, format_amount};

/// Taxation system of the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sno {
    Osn,
    UsnIncome,
    UsnIncomeOutcome,
    Esn,
    Patent,
}

/// VAT rate of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tax {
    None,
    Vat0,
    Vat5,
    Vat7,
    Vat10,
    Vat20,
    Vat105,
    Vat107,
    Vat110,
    Vat120,
}

/// Settlement method of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    FullPrepayment,
    Prepayment,
    Advance,
    FullPayment,
    PartialPayment,
    Credit,
    CreditPayment,
}

/// What a line item sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentObject {
    Commodity,
    Excise,
    Job,
    Service,
    Payment,
    AgentCommission,
    Composite,
    PropertyRight,
    #[serde(rename = "non-operating_gain")]
    NonOperatingGain,
    Another,
}

/// One position of the receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    /// Total for the position.
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
    /// Unit price, when the gateway should derive `sum` itself.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub cost: Option<Decimal>,
    pub tax: Tax,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_object: Option<PaymentObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nomenclature_code: Option<String>,
}

impl ReceiptItem {
    pub fn new(name: impl Into<String>, quantity: Decimal, sum: Decimal, tax: Tax) -> Self {
        Self {
            name: name.into(),
            quantity,
            sum,
            cost: None,
            tax,
            payment_method: None,
            payment_object: None,
            nomenclature_code: None,
        }
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    pub fn with_payment_object(mut self, object: PaymentObject) -> Self {
        self.payment_object = Some(object);
        self
    }
}

/// A VAT total, with the sum pre-formatted like `OutSum`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vat {
    #[serde(rename = "type")]
    pub tax: Tax,
    pub sum: String,
}

impl Vat {
    pub fn new(tax: Tax, sum: impl Into<Amount>) -> Result<Self, InvalidValue> {
        Ok(Self {
            tax,
            sum: format_amount(sum)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sno: Option<Sno>,
    pub items: Vec<ReceiptItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vats: Vec<Vat>,
}

impl Receipt {
    pub fn new(items: Vec<ReceiptItem>) -> Self {
        Self {
            sno: None,
            items,
            vats: Vec::new(),
        }
    }

    pub fn with_sno(mut self, sno: Sno) -> Self {
        self.sno = Some(sno);
        self
    }

    pub fn with_vat(mut self, vat: Vat) -> Self {
        self.vats.push(vat);
        self
    }

    /// Compact JSON as signed and transmitted.
    pub fn to_json(&self) -> Result<String, InvalidValue> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_json_shape() {
        let receipt = Receipt::new(vec![
            ReceiptItem::new("Book", Decimal::ONE, Decimal::new(10050, 2), Tax::Vat10)
                .with_payment_method(PaymentMethod::FullPayment)
                .with_payment_object(PaymentObject::Commodity),
        ])
        .with_sno(Sno::UsnIncome);

        let json = receipt.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"sno":"usn_income","items":[{"name":"Book","quantity":1.0,"sum":100.5,"tax":"vat10","payment_method":"full_payment","payment_object":"commodity"}]}"#
        );
    }

    #[test]
    fn test_vat_sum_is_formatted() {
        let vat = Vat::new(Tax::Vat20, 16.7).unwrap();
        assert_eq!(vat.sum, "16.70");
        let json = serde_json::to_string(&vat).unwrap();
        assert_eq!(json, r#"{"type":"vat20","sum":"16.70"}"#);
        assert!(Vat::new(Tax::Vat20, "n/a").is_err());
    }

    #[test]
    fn test_receipt_parses_back() {
        let json = r#"{"items":[{"name":"Fee","quantity":2,"sum":10,"tax":"none","payment_object":"non-operating_gain"}]}"#;
        let receipt: Receipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.items[0].quantity, Decimal::from(2));
        assert_eq!(
            receipt.items[0].payment_object,
            Some(PaymentObject::NonOperatingGain)
        );
        assert!(receipt.sno.is_none());
    }
}
