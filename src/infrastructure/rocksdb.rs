use crate::domain::merchant::Merchant;
use crate::domain::order::Order;
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::ports::{MerchantStore, OrderStore, PaymentStore};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for merchant records, keyed by the merchant UUID bytes.
pub const CF_MERCHANTS: &str = "merchants";
/// Column Family for orders, keyed by order id.
pub const CF_ORDERS: &str = "orders";
/// Column Family for payments, keyed by payment id.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent store implementation using RocksDB.
///
/// Merchants, orders and payments live in separate Column Families and are
/// encoded as JSON. Secondary lookups (API key, merchant, status) scan the
/// relevant family.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
/// Conditional payment writes are serialized by a lock shared between clones.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    settle_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating the
    /// column families on first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_MERCHANTS, CF_ORDERS, CF_PAYMENTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            settle_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PaymentError::internal(format!("{name} column family not found")))
    }

    fn put_json<T: Serialize>(&self, family: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(family)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key, bytes)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, family: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(family)?;
        match self.db.get_pinned_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_json<T: DeserializeOwned>(
        &self,
        family: &str,
        keep: impl Fn(&T) -> bool,
    ) -> Result<Vec<T>> {
        let cf = self.cf(family)?;
        let mut found = Vec::new();

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let record: T = serde_json::from_slice(&value)?;
            if keep(&record) {
                found.push(record);
            }
        }

        Ok(found)
    }
}

#[async_trait]
impl MerchantStore for RocksDBStore {
    async fn store(&self, merchant: Merchant) -> Result<()> {
        self.put_json(CF_MERCHANTS, merchant.id.as_bytes(), &merchant)
    }

    async fn get(&self, merchant_id: uuid::Uuid) -> Result<Option<Merchant>> {
        self.get_json(CF_MERCHANTS, merchant_id.as_bytes())
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Merchant>> {
        let mut found = self.scan_json(CF_MERCHANTS, |m: &Merchant| m.api_key == api_key)?;
        Ok(found.pop())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Merchant>> {
        let mut found = self.scan_json(CF_MERCHANTS, |m: &Merchant| m.email == email)?;
        Ok(found.pop())
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn store(&self, order: Order) -> Result<()> {
        self.put_json(CF_ORDERS, order.id.as_bytes(), &order)
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>> {
        self.get_json(CF_ORDERS, order_id.as_bytes())
    }

    async fn exists(&self, order_id: &str) -> Result<bool> {
        let cf = self.cf(CF_ORDERS)?;
        Ok(self.db.get_pinned_cf(cf, order_id.as_bytes())?.is_some())
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        self.put_json(CF_PAYMENTS, payment.id.as_bytes(), &payment)
    }

    async fn get(&self, payment_id: &str) -> Result<Option<Payment>> {
        self.get_json(CF_PAYMENTS, payment_id.as_bytes())
    }

    async fn find_by_merchant(&self, merchant_id: uuid::Uuid) -> Result<Vec<Payment>> {
        self.scan_json(CF_PAYMENTS, |p: &Payment| p.merchant_id == merchant_id)
    }

    async fn find_by_status(&self, status: PaymentStatus) -> Result<Vec<Payment>> {
        self.scan_json(CF_PAYMENTS, |p: &Payment| p.status == status)
    }

    async fn exists(&self, payment_id: &str) -> Result<bool> {
        let cf = self.cf(CF_PAYMENTS)?;
        Ok(self.db.get_pinned_cf(cf, payment_id.as_bytes())?.is_some())
    }

    async fn store_if_processing(&self, payment: Payment) -> Result<bool> {
        let _guard = self.settle_lock.lock().await;
        let current: Option<Payment> = self.get_json(CF_PAYMENTS, payment.id.as_bytes())?;
        if !current.is_some_and(|p| p.status == PaymentStatus::Processing) {
            return Ok(false);
        }
        self.put_json(CF_PAYMENTS, payment.id.as_bytes(), &payment)?;
        Ok(true)
    }
}
