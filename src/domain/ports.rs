use super::merchant::Merchant;
use super::order::Order;
use super::payment::{Payment, PaymentStatus};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Key-addressable merchant records.
#[async_trait]
pub trait MerchantStore: Send + Sync {
    async fn store(&self, merchant: Merchant) -> Result<()>;
    async fn get(&self, merchant_id: Uuid) -> Result<Option<Merchant>>;
    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Merchant>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Merchant>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn store(&self, order: Order) -> Result<()>;
    async fn get(&self, order_id: &str) -> Result<Option<Order>>;

    async fn exists(&self, order_id: &str) -> Result<bool> {
        Ok(self.get(order_id).await?.is_some())
    }
}

/// Payment records. `store` overwrites unconditionally and is used for the initial
/// `processing` record; moving a payment to its terminal state goes through
/// `store_if_processing` so a terminal record is never replaced.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn get(&self, payment_id: &str) -> Result<Option<Payment>>;
    async fn find_by_merchant(&self, merchant_id: Uuid) -> Result<Vec<Payment>>;
    async fn find_by_status(&self, status: PaymentStatus) -> Result<Vec<Payment>>;

    async fn exists(&self, payment_id: &str) -> Result<bool> {
        Ok(self.get(payment_id).await?.is_some())
    }

    /// Writes `payment` only if the stored record is still `processing`.
    /// Returns whether the write happened.
    ///
    /// The default reads then writes; adapters that can hold a lock across both
    /// should override it.
    async fn store_if_processing(&self, payment: Payment) -> Result<bool> {
        match self.get(&payment.id).await? {
            Some(current) if current.status == PaymentStatus::Processing => {
                self.store(payment).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Source of randomness for identifiers, delays and outcomes.
///
/// Implementations must be usable from many in-flight requests at once.
pub trait RandomSource: Send + Sync {
    /// `len` characters drawn uniformly from `[A-Za-z0-9]`.
    fn alphanumeric(&self, len: usize) -> String;
    /// A uniform draw from `[0, 1)`.
    fn unit(&self) -> f64;
    /// A uniform draw from `[min, max]`. Callers guarantee `min <= max`.
    fn between(&self, min: u64, max: u64) -> u64;
}

pub type SharedMerchantStore = Arc<dyn MerchantStore>;
pub type SharedOrderStore = Arc<dyn OrderStore>;
pub type SharedPaymentStore = Arc<dyn PaymentStore>;
pub type SharedRandom = Arc<dyn RandomSource>;
