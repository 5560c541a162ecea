use crate::domain::merchant::Merchant;
use crate::domain::ports::SharedMerchantStore;
use crate::error::{PaymentError, Result};
use tracing::{debug, info};

/// Resolves API credentials to an active merchant.
#[derive(Clone)]
pub struct Authenticator {
    merchants: SharedMerchantStore,
}

impl Authenticator {
    pub fn new(merchants: SharedMerchantStore) -> Self {
        Self { merchants }
    }

    /// Unknown key, wrong secret and inactive merchant all fail the same way so a
    /// caller cannot tell which part was wrong.
    pub async fn authenticate(&self, api_key: &str, api_secret: &str) -> Result<Merchant> {
        if api_key.is_empty() || api_secret.is_empty() {
            debug!("rejecting request without credentials");
            return Err(PaymentError::Authentication);
        }

        let Some(merchant) = self.merchants.find_by_api_key(api_key).await? else {
            debug!(api_key, "unknown api key");
            return Err(PaymentError::Authentication);
        };

        if merchant.api_secret != api_secret {
            debug!(merchant_id = %merchant.id, "api secret mismatch");
            return Err(PaymentError::Authentication);
        }

        if !merchant.is_active {
            debug!(merchant_id = %merchant.id, "merchant is inactive");
            return Err(PaymentError::Authentication);
        }

        Ok(merchant)
    }

    /// Stores a merchant unless one with the same email already exists, in which
    /// case the existing record is returned untouched.
    ///
    /// Fails if the id or the API key is already taken by a different merchant.
    pub async fn register(&self, merchant: Merchant) -> Result<Merchant> {
        if let Some(existing) = self.merchants.find_by_email(&merchant.email).await? {
            return Ok(existing);
        }

        if self.merchants.get(merchant.id).await?.is_some() {
            return Err(PaymentError::bad_request("merchant id already registered"));
        }

        if self.merchants.find_by_api_key(&merchant.api_key).await?.is_some() {
            return Err(PaymentError::bad_request("api key already registered"));
        }

        self.merchants.store(merchant.clone()).await?;
        info!(merchant_id = %merchant.id, email = %merchant.email, "merchant registered");
        Ok(merchant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryMerchantStore;
    use std::sync::Arc;
    use uuid::Uuid;

    async fn authenticator_with(merchant: Merchant) -> Authenticator {
        let auth = Authenticator::new(Arc::new(InMemoryMerchantStore::new()));
        auth.register(merchant).await.unwrap();
        auth
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let merchant = Merchant::new(
            Uuid::new_v4(),
            "Shop",
            "shop@example.com",
            "key_1",
            "secret_1",
        );
        let auth = authenticator_with(merchant.clone()).await;

        let found = auth.authenticate("key_1", "secret_1").await.unwrap();
        assert_eq!(found.id, merchant.id);
    }

    #[tokio::test]
    async fn test_rejections_are_uniform() {
        let mut inactive = Merchant::new(
            Uuid::new_v4(),
            "Old",
            "old@example.com",
            "key_old",
            "secret_old",
        );
        inactive.is_active = false;
        let auth = authenticator_with(inactive).await;
        let shop = Merchant::new(
            Uuid::new_v4(),
            "Shop",
            "shop@example.com",
            "key_1",
            "secret_1",
        );
        auth.register(shop).await.unwrap();

        for (key, secret) in [
            ("key_unknown", "secret_1"),
            ("key_1", "wrong"),
            ("key_1", "SECRET_1"),
            ("key_old", "secret_old"),
            ("", ""),
        ] {
            let result = auth.authenticate(key, secret).await;
            assert!(
                matches!(result, Err(PaymentError::Authentication)),
                "expected rejection for {key}/{secret}"
            );
        }
    }

    #[tokio::test]
    async fn test_register_is_idempotent_by_email() {
        let first = Merchant::new(Uuid::new_v4(), "Shop", "shop@example.com", "key_1", "secret_1");
        let auth = authenticator_with(first.clone()).await;

        let again = Merchant::new(
            Uuid::new_v4(),
            "Shop 2",
            "shop@example.com",
            "key_2",
            "secret_2",
        );
        let kept = auth.register(again).await.unwrap();
        assert_eq!(kept.id, first.id);

        let clash = Merchant::new(
            Uuid::new_v4(),
            "Other",
            "other@example.com",
            "key_1",
            "secret_x",
        );
        assert!(matches!(auth.register(clash).await, Err(PaymentError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_id() {
        let first = Merchant::new(Uuid::new_v4(), "Shop", "shop@example.com", "key_1", "secret_1");
        let auth = authenticator_with(first.clone()).await;

        let same_id = Merchant::new(first.id, "Other", "other@example.com", "key_2", "secret_2");
        assert!(matches!(auth.register(same_id).await, Err(PaymentError::BadRequest(_))));
        assert!(matches!(
            auth.authenticate("key_2", "secret_2").await,
            Err(PaymentError::Authentication)
        ));
    }
}
