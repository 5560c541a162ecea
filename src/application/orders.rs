use crate::domain::ids::{MAX_ID_ATTEMPTS, ORDER_PREFIX, generate_id};
use crate::domain::merchant::Merchant;
use crate::domain::order::{Amount, Order};
use crate::domain::ports::{SharedOrderStore, SharedRandom};
use crate::error::{PaymentError, Result};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// Creates and looks up orders.
#[derive(Clone)]
pub struct OrderLedger {
    orders: SharedOrderStore,
    random: SharedRandom,
}

impl OrderLedger {
    pub fn new(orders: SharedOrderStore, random: SharedRandom) -> Self {
        Self { orders, random }
    }

    pub async fn create_order(
        &self,
        merchant: &Merchant,
        amount: Amount,
        currency: String,
        receipt: Option<String>,
        notes: Option<String>,
    ) -> Result<Order> {
        let id = self.fresh_id().await?;
        let order = Order::new(id, merchant.id, amount, currency, receipt, notes, Utc::now());
        self.orders.store(order.clone()).await?;

        info!(
            order_id = %order.id,
            merchant_id = %merchant.id,
            amount = order.amount.value(),
            currency = %order.currency,
            "order created"
        );
        Ok(order)
    }

    /// Merchant-scoped lookup. Someone else's order looks exactly like a missing one.
    pub async fn get_order(&self, order_id: &str, merchant_id: Uuid) -> Result<Order> {
        match self.orders.get(order_id).await? {
            Some(order) if order.belongs_to(merchant_id) => Ok(order),
            _ => Err(PaymentError::not_found("Order", order_id)),
        }
    }

    /// Unscoped lookup for the public checkout page.
    pub async fn get_order_public(&self, order_id: &str) -> Result<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Order", order_id))
    }

    async fn fresh_id(&self) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = generate_id(ORDER_PREFIX, self.random.as_ref());
            if !self.orders.exists(&id).await? {
                return Ok(id);
            }
        }
        Err(PaymentError::internal("could not generate a unique order id"))
    }
}
