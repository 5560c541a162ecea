use super::order::Order;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const PAYMENT_FAILED: &str = "PAYMENT_FAILED";
pub const PAYMENT_FAILED_DESCRIPTION: &str = "Payment processing failed";
pub const PROCESSING_TIMEOUT: &str = "PROCESSING_TIMEOUT";
pub const PROCESSING_TIMEOUT_DESCRIPTION: &str = "Payment processing timed out";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "upi",
            Self::Card => "card",
        }
    }

    /// Parses the wire value. Anything other than `upi` or `card` is unsupported.
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "upi" => Some(Self::Upi),
            "card" => Some(Self::Card),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Processing,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Rupay,
    Unknown,
}

impl CardNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Rupay => "rupay",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The validated instrument a payment was made with.
///
/// Only the VPA or the card's network and last four digits are kept; the full
/// card number never reaches a stored record.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentInstrument {
    Upi { vpa: String },
    Card { network: CardNetwork, last4: String },
}

impl PaymentInstrument {
    pub fn method(&self) -> PaymentMethod {
        match self {
            Self::Upi { .. } => PaymentMethod::Upi,
            Self::Card { .. } => PaymentMethod::Card,
        }
    }
}

/// Error detail attached to a payment that ended in `failed`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PaymentFailure {
    pub code: String,
    pub description: String,
}

/// A single attempt to settle an order.
///
/// Amount, currency and merchant are copied from the order when the attempt is
/// created so the record stands on its own. Status only ever moves forward:
/// `processing` to `success` or `failed`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub merchant_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub instrument: PaymentInstrument,
    pub status: PaymentStatus,
    /// Present if and only if `status` is `failed`.
    pub failure: Option<PaymentFailure>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        id: String,
        order: &Order,
        instrument: PaymentInstrument,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            order_id: order.id.clone(),
            merchant_id: order.merchant_id,
            amount: order.amount.value(),
            currency: order.currency.clone(),
            instrument,
            status: PaymentStatus::Processing,
            failure: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn method(&self) -> PaymentMethod {
        self.instrument.method()
    }

    /// Marks the payment as settled.
    pub fn succeed(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.ensure_processing(PaymentStatus::Success)?;
        self.status = PaymentStatus::Success;
        self.updated_at = now;
        Ok(())
    }

    /// Marks the payment as failed with the given error detail.
    pub fn fail(
        &mut self,
        code: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_processing(PaymentStatus::Failed)?;
        self.status = PaymentStatus::Failed;
        self.failure = Some(PaymentFailure {
            code: code.into(),
            description: description.into(),
        });
        self.updated_at = now;
        Ok(())
    }

    fn ensure_processing(&self, to: PaymentStatus) -> Result<()> {
        if self.status.is_terminal() {
            return Err(PaymentError::InvalidTransition {
                id: self.id.clone(),
                from: self.status.as_str(),
                to: to.as_str(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Amount, Order};

    fn processing_payment() -> Payment {
        let now = Utc::now();
        let order = Order::new(
            "order_abc".to_string(),
            Uuid::new_v4(),
            Amount::new(500).unwrap(),
            "INR".to_string(),
            None,
            None,
            now,
        );
        Payment::new(
            "pay_abc".to_string(),
            &order,
            PaymentInstrument::Upi {
                vpa: "bob@upi".to_string(),
            },
            now,
        )
    }

    #[test]
    fn test_new_payment_copies_order_fields() {
        let payment = processing_payment();
        assert_eq!(payment.order_id, "order_abc");
        assert_eq!(payment.amount, 500);
        assert_eq!(payment.currency, "INR");
        assert_eq!(payment.method(), PaymentMethod::Upi);
        assert_eq!(payment.status, PaymentStatus::Processing);
        assert!(payment.failure.is_none());
    }

    #[test]
    fn test_success_is_terminal() {
        let mut payment = processing_payment();
        payment.succeed(Utc::now()).unwrap();
        assert_eq!(payment.status, PaymentStatus::Success);
        assert!(payment.failure.is_none());

        let err = payment.fail(PAYMENT_FAILED, PAYMENT_FAILED_DESCRIPTION, Utc::now());
        assert!(matches!(err, Err(PaymentError::InvalidTransition { .. })));
        assert_eq!(payment.status, PaymentStatus::Success);
    }

    #[test]
    fn test_failure_records_error_detail() {
        let mut payment = processing_payment();
        payment
            .fail(PAYMENT_FAILED, PAYMENT_FAILED_DESCRIPTION, Utc::now())
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Failed);
        let failure = payment.failure.as_ref().unwrap();
        assert_eq!(failure.code, "PAYMENT_FAILED");
        assert_eq!(failure.description, "Payment processing failed");

        assert!(payment.succeed(Utc::now()).is_err());
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(PaymentMethod::parse("upi"), Some(PaymentMethod::Upi));
        assert_eq!(PaymentMethod::parse("card"), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::parse("netbanking"), None);
        assert_eq!(PaymentMethod::parse("UPI"), None);
    }

    #[test]
    fn test_payment_json_roundtrip_keeps_instrument_tag() {
        let payment = processing_payment();
        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["instrument"]["method"], "upi");
        assert_eq!(json["status"], "processing");
        let back: Payment = serde_json::from_value(json).unwrap();
        assert_eq!(back, payment);
    }
}
