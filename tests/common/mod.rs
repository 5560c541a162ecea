#![allow(dead_code)]

use paysim::config::ProcessingConfig;
use paysim::domain::merchant::Merchant;
use paysim::infrastructure::in_memory::{
    InMemoryMerchantStore, InMemoryOrderStore, InMemoryPaymentStore,
};
use paysim::infrastructure::random::SeededRandom;
use paysim::interfaces::api::{
    CreateOrderRequest, CreatePaymentRequest, Credentials, GatewayApi, OrderView,
};
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const TEST_DELAY: Duration = Duration::from_millis(1_000);

pub const CSV_HEADER: [&str; 8] = [
    "amount",
    "currency",
    "receipt",
    "method",
    "vpa",
    "card_number",
    "expiry_month",
    "expiry_year",
];

/// A gateway over fresh in-memory stores.
pub fn gateway(config: ProcessingConfig) -> GatewayApi {
    GatewayApi::new(
        Arc::new(InMemoryMerchantStore::new()),
        Arc::new(InMemoryOrderStore::new()),
        Arc::new(InMemoryPaymentStore::new()),
        Arc::new(SeededRandom::new(7)),
        config,
    )
    .unwrap()
}

/// Registers a merchant derived from `name` and returns its credentials.
pub async fn merchant(api: &GatewayApi, name: &str) -> Credentials {
    let merchant = Merchant::new(
        Uuid::new_v4(),
        name,
        format!("{name}@example.com"),
        format!("key_{name}"),
        format!("secret_{name}"),
    );
    api.register_merchant(merchant).await.unwrap();
    Credentials::new(format!("key_{name}"), format!("secret_{name}"))
}

pub fn order_request(amount: i64) -> CreateOrderRequest {
    CreateOrderRequest {
        amount: Some(amount),
        ..Default::default()
    }
}

/// Creates an order of `amount` INR and returns it.
pub async fn place_order(api: &GatewayApi, credentials: &Credentials, amount: i64) -> OrderView {
    let response = api.create_order(credentials, order_request(amount)).await;
    response.unwrap().body
}

pub fn upi_payment(order_id: &str, vpa: &str) -> CreatePaymentRequest {
    CreatePaymentRequest {
        order_id: Some(order_id.to_string()),
        method: Some("upi".to_string()),
        vpa: Some(vpa.to_string()),
        card: None,
    }
}

/// Writes `rows` UPI checkouts of 500 INR each.
pub fn generate_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(CSV_HEADER)?;

    for i in 1..=rows {
        wtr.write_record([
            "500",
            "INR",
            &format!("rcpt_{i}"),
            "upi",
            &format!("payer{i}@upi"),
            "",
            "",
            "",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
