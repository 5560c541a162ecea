use crate::config::ProcessingConfig;
use crate::domain::ids::{MAX_ID_ATTEMPTS, PAYMENT_PREFIX, generate_id};
use crate::domain::order::Order;
use crate::domain::payment::{
    PAYMENT_FAILED, PAYMENT_FAILED_DESCRIPTION, PROCESSING_TIMEOUT, PROCESSING_TIMEOUT_DESCRIPTION,
    Payment, PaymentInstrument, PaymentMethod, PaymentStatus,
};
use crate::domain::ports::{SharedPaymentStore, SharedRandom};
use crate::domain::validation::{
    clean_card_number, detect_card_network, is_valid_card_number, is_valid_expiry, is_valid_vpa,
};
use crate::error::{PaymentError, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Raw instrument details as submitted by the payer, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum InstrumentInput {
    Upi {
        vpa: Option<String>,
    },
    Card {
        number: Option<String>,
        expiry_month: Option<String>,
        expiry_year: Option<String>,
    },
}

/// Runs payments through validation, simulated settlement and persistence.
///
/// Cloning is cheap: the store, randomness source and configuration are shared.
#[derive(Clone)]
pub struct PaymentProcessor {
    payments: SharedPaymentStore,
    random: SharedRandom,
    config: Arc<ProcessingConfig>,
}

impl PaymentProcessor {
    /// Fails with `PaymentError::Config` if `config` does not validate.
    pub fn new(
        payments: SharedPaymentStore,
        random: SharedRandom,
        config: ProcessingConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            payments,
            random,
            config: Arc::new(config),
        })
    }

    /// Validates the instrument, records the payment as `processing`, waits out the
    /// simulated settlement and returns the payment in its terminal state.
    ///
    /// Instrument errors are returned before anything is written. Once the
    /// `processing` record exists, settlement runs on its own task, so dropping
    /// this future does not leave the payment stuck.
    pub async fn create_payment(&self, order: &Order, input: InstrumentInput) -> Result<Payment> {
        let instrument = validate_instrument(input)?;

        let id = self.fresh_id().await?;
        let payment = Payment::new(id, order, instrument, Utc::now());
        self.payments.store(payment.clone()).await?;

        info!(
            payment_id = %payment.id,
            order_id = %payment.order_id,
            method = %payment.method(),
            amount = payment.amount,
            "payment processing"
        );

        let processor = self.clone();
        tokio::spawn(async move { processor.settle(payment).await })
            .await
            .map_err(|e| PaymentError::InternalError(Box::new(e)))?
    }

    /// Merchant-scoped lookup. Someone else's payment looks exactly like a missing one.
    pub async fn get_payment(&self, payment_id: &str, merchant_id: Uuid) -> Result<Payment> {
        match self.payments.get(payment_id).await? {
            Some(payment) if payment.merchant_id == merchant_id => Ok(payment),
            _ => Err(PaymentError::not_found("Payment", payment_id)),
        }
    }

    /// Every payment recorded for the merchant, in no particular order.
    pub async fn payments_by_merchant(&self, merchant_id: Uuid) -> Result<Vec<Payment>> {
        self.payments.find_by_merchant(merchant_id).await
    }

    /// Fails payments left in `processing` for longer than `max_age`, e.g. after a
    /// crash between the two writes. Returns how many were swept.
    ///
    /// A live settlement swept this way keeps the `failed` outcome; whichever
    /// terminal write lands first wins.
    pub async fn sweep_stale(&self, max_age: Duration) -> Result<usize> {
        let max_age = chrono::Duration::from_std(max_age)
            .map_err(|e| PaymentError::InternalError(Box::new(e)))?;
        let cutoff = Utc::now() - max_age;
        let mut swept = 0;

        for mut payment in self.payments.find_by_status(PaymentStatus::Processing).await? {
            if payment.updated_at >= cutoff {
                continue;
            }
            payment.fail(PROCESSING_TIMEOUT, PROCESSING_TIMEOUT_DESCRIPTION, Utc::now())?;
            let (payment_id, order_id, stale_since) =
                (payment.id.clone(), payment.order_id.clone(), payment.created_at);
            if !self.payments.store_if_processing(payment).await? {
                continue;
            }
            warn!(
                payment_id = %payment_id,
                order_id = %order_id,
                stale_since = %stale_since,
                "stale payment marked failed"
            );
            swept += 1;
        }

        Ok(swept)
    }

    async fn settle(&self, mut payment: Payment) -> Result<Payment> {
        tokio::time::sleep(self.processing_delay()).await;

        let now = Utc::now();
        if self.determine_success(payment.method()) {
            payment.succeed(now)?;
        } else {
            payment.fail(PAYMENT_FAILED, PAYMENT_FAILED_DESCRIPTION, now)?;
        }

        if !self.payments.store_if_processing(payment.clone()).await? {
            // Already terminal (swept while in flight); the stored outcome stands.
            let id = payment.id;
            debug!(payment_id = %id, "settlement skipped, payment already terminal");
            return self
                .payments
                .get(&id)
                .await?
                .ok_or_else(|| PaymentError::not_found("Payment", id.clone()));
        }

        info!(
            payment_id = %payment.id,
            order_id = %payment.order_id,
            method = %payment.method(),
            status = %payment.status,
            "payment settled"
        );
        Ok(payment)
    }

    fn processing_delay(&self) -> Duration {
        if self.config.test_mode {
            return self.config.test_delay;
        }
        let min = duration_millis(self.config.delay_min);
        let max = duration_millis(self.config.delay_max);
        Duration::from_millis(self.random.between(min, max))
    }

    fn determine_success(&self, method: PaymentMethod) -> bool {
        if self.config.test_mode {
            return self.config.test_payment_success;
        }
        let rate = match method {
            PaymentMethod::Upi => self.config.upi_success_rate,
            PaymentMethod::Card => self.config.card_success_rate,
        };
        self.random.unit() <= rate
    }

    async fn fresh_id(&self) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = generate_id(PAYMENT_PREFIX, self.random.as_ref());
            if !self.payments.exists(&id).await? {
                return Ok(id);
            }
        }
        Err(PaymentError::internal("could not generate a unique payment id"))
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Turns raw payer input into a stored instrument, or the matching instrument error.
pub fn validate_instrument(input: InstrumentInput) -> Result<PaymentInstrument> {
    match input {
        InstrumentInput::Upi { vpa } => match vpa {
            Some(vpa) if is_valid_vpa(&vpa) => Ok(PaymentInstrument::Upi { vpa }),
            _ => {
                debug!("rejecting payment: invalid vpa");
                Err(PaymentError::InvalidVpa)
            }
        },
        InstrumentInput::Card {
            number,
            expiry_month,
            expiry_year,
        } => {
            let Some(number) = number.filter(|n| is_valid_card_number(n)) else {
                debug!("rejecting payment: invalid card number");
                return Err(PaymentError::InvalidCard);
            };

            let month = expiry_month.unwrap_or_default();
            let year = expiry_year.unwrap_or_default();
            if !is_valid_expiry(&month, &year) {
                debug!("rejecting payment: card expired");
                return Err(PaymentError::ExpiredCard);
            }

            let cleaned = clean_card_number(&number);
            Ok(PaymentInstrument::Card {
                network: detect_card_network(&cleaned),
                last4: cleaned[cleaned.len() - 4..].to_string(),
            })
        }
    }
}
