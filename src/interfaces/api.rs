//! The gateway's public operations, independent of any transport.
//!
//! Each operation authenticates (unless it is one of the two public checkout
//! calls), validates the request, calls into the application services and
//! returns either a response with its status code or an error envelope. An HTTP
//! adapter only has to move these values on and off the wire.

use crate::application::auth::Authenticator;
use crate::application::orders::OrderLedger;
use crate::application::processor::{InstrumentInput, PaymentProcessor};
use crate::config::ProcessingConfig;
use crate::domain::merchant::Merchant;
use crate::domain::order::{Amount, DEFAULT_CURRENCY, MIN_ORDER_AMOUNT, Order, OrderStatus};
use crate::domain::payment::{CardNetwork, Payment, PaymentInstrument, PaymentMethod, PaymentStatus};
use crate::domain::ports::{SharedMerchantStore, SharedOrderStore, SharedPaymentStore, SharedRandom};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;
use uuid::Uuid;

/// API key and secret, carried alongside (not inside) the request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderRequest {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub receipt: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardRequest {
    pub number: Option<String>,
    pub expiry_month: Option<String>,
    pub expiry_year: Option<String>,
    /// Accepted for payload compatibility; never validated or stored.
    pub cvv: Option<String>,
    pub holder_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePaymentRequest {
    pub order_id: Option<String>,
    pub method: Option<String>,
    pub vpa: Option<String>,
    pub card: Option<CardRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub id: String,
    pub merchant_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub notes: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            merchant_id: order.merchant_id,
            amount: order.amount.value(),
            currency: order.currency,
            receipt: order.receipt,
            notes: order.notes,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// What the unauthenticated checkout page may see of an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicOrderView {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: OrderStatus,
}

impl From<Order> for PublicOrderView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            amount: order.amount.value(),
            currency: order.currency,
            status: order.status,
        }
    }
}

/// Flat payment resource. Instrument fields appear only for the matching
/// method and error fields only when the payment failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentView {
    pub id: String,
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_network: Option<CardNetwork>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Payment> for PaymentView {
    fn from(payment: Payment) -> Self {
        let method = payment.method();
        let (vpa, card_network, card_last4) = match payment.instrument {
            PaymentInstrument::Upi { vpa } => (Some(vpa), None, None),
            PaymentInstrument::Card { network, last4 } => (None, Some(network), Some(last4)),
        };
        let (error_code, error_description) = match payment.failure {
            Some(failure) => (Some(failure.code), Some(failure.description)),
            None => (None, None),
        };

        Self {
            id: payment.id,
            order_id: payment.order_id,
            amount: payment.amount,
            currency: payment.currency,
            method,
            status: payment.status,
            vpa,
            card_network,
            card_last4,
            error_code,
            error_description,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub body: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub description: String,
}

/// `{ "error": { "code": ..., "description": ... } }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub body: ErrorEnvelope,
}

impl ApiError {
    pub fn code(&self) -> &str {
        &self.body.error.code
    }

    pub fn description(&self) -> &str {
        &self.body.error.description
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        let status = err.status();
        if status >= 500 {
            error!(error = %err, "request failed");
        }
        Self {
            status,
            body: ErrorEnvelope {
                error: ErrorBody {
                    code: err.code().to_string(),
                    description: err.description(),
                },
            },
        }
    }
}

pub type ApiResult<T> = std::result::Result<ApiResponse<T>, ApiError>;

fn respond<T>(status: u16, result: Result<T>) -> ApiResult<T> {
    result
        .map(|body| ApiResponse { status, body })
        .map_err(ApiError::from)
}

fn parse_currency(currency: Option<String>) -> Result<String> {
    let Some(currency) = currency else {
        return Ok(DEFAULT_CURRENCY.to_string());
    };
    let currency = currency.trim();
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(currency.to_ascii_uppercase())
    } else {
        Err(PaymentError::bad_request("currency must be a 3-letter code"))
    }
}

/// Method and instrument checks that happen before the processor is involved.
fn parse_instrument(method: &str, request: CreatePaymentRequest) -> Result<InstrumentInput> {
    match PaymentMethod::parse(method) {
        Some(PaymentMethod::Upi) => Ok(InstrumentInput::Upi { vpa: request.vpa }),
        Some(PaymentMethod::Card) => {
            let card = request
                .card
                .ok_or_else(|| PaymentError::bad_request("card details required"))?;
            Ok(InstrumentInput::Card {
                number: card.number,
                expiry_month: card.expiry_month,
                expiry_year: card.expiry_year,
            })
        }
        None => Err(PaymentError::bad_request("invalid payment method")),
    }
}

/// Entry point for every gateway operation.
#[derive(Clone)]
pub struct GatewayApi {
    auth: Authenticator,
    orders: OrderLedger,
    processor: PaymentProcessor,
}

impl GatewayApi {
    pub fn new(
        merchants: SharedMerchantStore,
        orders: SharedOrderStore,
        payments: SharedPaymentStore,
        random: SharedRandom,
        config: ProcessingConfig,
    ) -> Result<Self> {
        Ok(Self {
            auth: Authenticator::new(merchants),
            orders: OrderLedger::new(orders, random.clone()),
            processor: PaymentProcessor::new(payments, random, config)?,
        })
    }

    /// Adds a merchant (bootstrap only; there is no merchant-management API).
    pub async fn register_merchant(&self, merchant: Merchant) -> Result<Merchant> {
        self.auth.register(merchant).await
    }

    /// Recovery pass for payments stuck in `processing`.
    pub async fn sweep_stale_payments(&self, max_age: Duration) -> Result<usize> {
        self.processor.sweep_stale(max_age).await
    }

    pub async fn get_order_public(&self, order_id: &str) -> ApiResult<PublicOrderView> {
        let result = self.orders.get_order_public(order_id).await.map(PublicOrderView::from);
        respond(200, result)
    }

    pub async fn create_order(
        &self,
        credentials: &Credentials,
        request: CreateOrderRequest,
    ) -> ApiResult<OrderView> {
        respond(201, self.try_create_order(credentials, request).await)
    }

    pub async fn get_order(
        &self,
        credentials: &Credentials,
        order_id: &str,
    ) -> ApiResult<OrderView> {
        respond(200, self.try_get_order(credentials, order_id).await)
    }

    /// Checkout-page payment: no credentials, the order is found by id alone.
    pub async fn create_payment_public(
        &self,
        request: CreatePaymentRequest,
    ) -> ApiResult<PaymentView> {
        respond(201, self.try_create_payment_public(request).await)
    }

    /// Merchant payment: the order must belong to the authenticated merchant.
    pub async fn create_payment(
        &self,
        credentials: &Credentials,
        request: CreatePaymentRequest,
    ) -> ApiResult<PaymentView> {
        respond(201, self.try_create_payment(credentials, request).await)
    }

    pub async fn get_payment(
        &self,
        credentials: &Credentials,
        payment_id: &str,
    ) -> ApiResult<PaymentView> {
        respond(200, self.try_get_payment(credentials, payment_id).await)
    }

    /// All of the merchant's payments, oldest first.
    pub async fn list_payments(&self, credentials: &Credentials) -> ApiResult<Vec<PaymentView>> {
        respond(200, self.try_list_payments(credentials).await)
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<Merchant> {
        self.auth
            .authenticate(&credentials.api_key, &credentials.api_secret)
            .await
    }

    async fn try_create_order(
        &self,
        credentials: &Credentials,
        request: CreateOrderRequest,
    ) -> Result<OrderView> {
        let merchant = self.authenticate(credentials).await?;
        let amount = request
            .amount
            .ok_or_else(|| {
                PaymentError::bad_request(format!("amount must be at least {MIN_ORDER_AMOUNT}"))
            })
            .and_then(Amount::new)?;
        let currency = parse_currency(request.currency)?;
        let order = self
            .orders
            .create_order(&merchant, amount, currency, request.receipt, request.notes)
            .await?;
        Ok(OrderView::from(order))
    }

    async fn try_get_order(&self, credentials: &Credentials, order_id: &str) -> Result<OrderView> {
        let merchant = self.authenticate(credentials).await?;
        let order = self.orders.get_order(order_id, merchant.id).await?;
        Ok(OrderView::from(order))
    }

    async fn try_create_payment_public(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentView> {
        let (Some(order_id), Some(method)) = (&request.order_id, &request.method) else {
            return Err(PaymentError::bad_request("order_id and method are required"));
        };
        let (order_id, method) = (order_id.clone(), method.clone());
        let order = self.orders.get_order_public(&order_id).await?;
        let input = parse_instrument(&method, request)?;
        let payment = self.processor.create_payment(&order, input).await?;
        Ok(PaymentView::from(payment))
    }

    async fn try_create_payment(
        &self,
        credentials: &Credentials,
        request: CreatePaymentRequest,
    ) -> Result<PaymentView> {
        let merchant = self.authenticate(credentials).await?;
        let order_id = request
            .order_id
            .clone()
            .ok_or_else(|| PaymentError::bad_request("order_id is required"))?;
        let order = self.orders.get_order(&order_id, merchant.id).await?;
        let method = request
            .method
            .clone()
            .ok_or_else(|| PaymentError::bad_request("payment method is required"))?;
        let input = parse_instrument(&method, request)?;
        let payment = self.processor.create_payment(&order, input).await?;
        Ok(PaymentView::from(payment))
    }

    async fn try_get_payment(
        &self,
        credentials: &Credentials,
        payment_id: &str,
    ) -> Result<PaymentView> {
        let merchant = self.authenticate(credentials).await?;
        let payment = self.processor.get_payment(payment_id, merchant.id).await?;
        Ok(PaymentView::from(payment))
    }

    async fn try_list_payments(&self, credentials: &Credentials) -> Result<Vec<PaymentView>> {
        let merchant = self.authenticate(credentials).await?;
        let mut payments = self.processor.payments_by_merchant(merchant.id).await?;
        payments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(payments.into_iter().map(PaymentView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_normalization() {
        assert_eq!(parse_currency(None).unwrap(), "INR");
        assert_eq!(parse_currency(Some("usd".to_string())).unwrap(), "USD");
        assert!(parse_currency(Some("RUPEE".to_string())).is_err());
        assert!(parse_currency(Some("1NR".to_string())).is_err());
    }

    #[test]
    fn test_parse_instrument() {
        let upi = CreatePaymentRequest {
            vpa: Some("bob@upi".to_string()),
            ..Default::default()
        };
        assert_eq!(
            parse_instrument("upi", upi).unwrap(),
            InstrumentInput::Upi {
                vpa: Some("bob@upi".to_string())
            }
        );

        let missing_card = parse_instrument("card", CreatePaymentRequest::default());
        assert!(matches!(missing_card, Err(PaymentError::BadRequest(_))));

        let unknown = parse_instrument("netbanking", CreatePaymentRequest::default());
        assert!(matches!(unknown, Err(PaymentError::BadRequest(_))));
    }

    #[test]
    fn test_error_envelope_shape() {
        let err = ApiError::from(PaymentError::InvalidCard);
        assert_eq!(err.status, 400);
        let json = serde_json::to_value(&err.body).unwrap();
        assert_eq!(json["error"]["code"], "INVALID_CARD");
        assert_eq!(json["error"]["description"], "Card validation failed");
    }

    #[test]
    fn test_payment_view_omits_unrelated_fields() {
        let order = Order::new(
            "order_x".to_string(),
            Uuid::new_v4(),
            Amount::new(500).unwrap(),
            "INR".to_string(),
            None,
            None,
            Utc::now(),
        );
        let mut payment = Payment::new(
            "pay_x".to_string(),
            &order,
            PaymentInstrument::Card {
                network: CardNetwork::Rupay,
                last4: "4242".to_string(),
            },
            Utc::now(),
        );
        payment.fail("PAYMENT_FAILED", "Payment processing failed", Utc::now()).unwrap();

        let json = serde_json::to_value(PaymentView::from(payment)).unwrap();
        assert_eq!(json["method"], "card");
        assert_eq!(json["card_network"], "rupay");
        assert_eq!(json["card_last4"], "4242");
        assert_eq!(json["error_code"], "PAYMENT_FAILED");
        assert!(json.get("vpa").is_none());
    }
}
