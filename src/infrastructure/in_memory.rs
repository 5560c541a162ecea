use crate::domain::merchant::Merchant;
use crate::domain::order::Order;
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::ports::{MerchantStore, OrderStore, PaymentStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory store for merchants, keyed by merchant id.
///
/// Lookups by API key or email scan the map; merchant counts are tiny.
#[derive(Default, Clone)]
pub struct InMemoryMerchantStore {
    merchants: Arc<RwLock<HashMap<Uuid, Merchant>>>,
}

impl InMemoryMerchantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MerchantStore for InMemoryMerchantStore {
    async fn store(&self, merchant: Merchant) -> Result<()> {
        let mut merchants = self.merchants.write().await;
        merchants.insert(merchant.id, merchant);
        Ok(())
    }

    async fn get(&self, merchant_id: Uuid) -> Result<Option<Merchant>> {
        let merchants = self.merchants.read().await;
        Ok(merchants.get(&merchant_id).cloned())
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Merchant>> {
        let merchants = self.merchants.read().await;
        Ok(merchants.values().find(|m| m.api_key == api_key).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Merchant>> {
        let merchants = self.merchants.read().await;
        Ok(merchants.values().find(|m| m.email == email).cloned())
    }
}

/// A thread-safe in-memory store for orders.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn store(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(order_id).cloned())
    }
}

/// A thread-safe in-memory store for payments.
///
/// Readers polling a payment see whatever was last written: `processing` right
/// after submission, the terminal state once processing finishes.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<String, Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id.clone(), payment);
        Ok(())
    }

    async fn get(&self, payment_id: &str) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(payment_id).cloned())
    }

    async fn find_by_merchant(&self, merchant_id: Uuid) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|p| p.merchant_id == merchant_id)
            .cloned()
            .collect())
    }

    async fn find_by_status(&self, status: PaymentStatus) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect())
    }

    async fn store_if_processing(&self, payment: Payment) -> Result<bool> {
        let mut payments = self.payments.write().await;
        let processing = payments
            .get(&payment.id)
            .is_some_and(|current| current.status == PaymentStatus::Processing);
        if !processing {
            return Ok(false);
        }
        payments.insert(payment.id.clone(), payment);
        Ok(true)
    }
}
