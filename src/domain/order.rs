use crate::error::PaymentError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest chargeable order, in minor currency units.
pub const MIN_ORDER_AMOUNT: i64 = 100;
pub const DEFAULT_CURRENCY: &str = "INR";

/// An order amount in minor currency units (paise for INR).
///
/// Construction enforces the minimum chargeable amount, so an `Order` can never
/// hold less than `MIN_ORDER_AMOUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    pub fn new(value: i64) -> Result<Self, PaymentError> {
        if value >= MIN_ORDER_AMOUNT {
            Ok(Self(value))
        } else {
            Err(PaymentError::bad_request(format!(
                "amount must be at least {MIN_ORDER_AMOUNT}"
            )))
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = PaymentError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Created,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
        }
    }
}

/// A charge requested by a merchant. Payments are attempted against it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: String,
    pub merchant_id: Uuid,
    pub amount: Amount,
    pub currency: String,
    pub receipt: Option<String>,
    pub notes: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        id: String,
        merchant_id: Uuid,
        amount: Amount,
        currency: String,
        receipt: Option<String>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            merchant_id,
            amount,
            currency,
            receipt,
            notes,
            status: OrderStatus::Created,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn belongs_to(&self, merchant_id: Uuid) -> bool {
        self.merchant_id == merchant_id
    }
}
