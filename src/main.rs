use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paysim::config::ProcessingConfig;
use paysim::domain::merchant::Merchant;
use paysim::domain::ports::{
    SharedMerchantStore, SharedOrderStore, SharedPaymentStore, SharedRandom,
};
use paysim::infrastructure::in_memory::{
    InMemoryMerchantStore, InMemoryOrderStore, InMemoryPaymentStore,
};
use paysim::infrastructure::random::{SeededRandom, ThreadRandom};
use paysim::interfaces::api::{ApiError, Credentials, GatewayApi, PaymentView};
use paysim::interfaces::csv::checkout_reader::{CheckoutReader, CheckoutRow};
use paysim::interfaces::csv::payment_writer::PaymentWriter;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const TEST_MERCHANT_ID: Uuid = Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440000);
const TEST_MERCHANT_NAME: &str = "Test Merchant";
const TEST_MERCHANT_EMAIL: &str = "test@example.com";
const TEST_API_KEY: &str = "key_test_abc123";
const TEST_API_SECRET: &str = "secret_test_xyz789";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input checkouts CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Fixed delay and outcome, as configured by TEST_PAYMENT_SUCCESS and TEST_PROCESSING_DELAY
    #[arg(long)]
    test_mode: bool,

    /// Seed for reproducible ids, delays and outcomes
    #[arg(long)]
    seed: Option<u64>,

    /// Fail payments left in `processing` for longer than this before the batch starts
    #[arg(long, default_value_t = 60)]
    sweep_after_secs: u64,
}

type Stores = (SharedMerchantStore, SharedOrderStore, SharedPaymentStore);

fn in_memory_stores() -> Stores {
    (
        Arc::new(InMemoryMerchantStore::new()),
        Arc::new(InMemoryOrderStore::new()),
        Arc::new(InMemoryPaymentStore::new()),
    )
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<&Path>) -> Result<Stores> {
    use paysim::infrastructure::rocksdb::RocksDBStore;

    let Some(db_path) = db_path else {
        return Ok(in_memory_stores());
    };
    let store = RocksDBStore::open(db_path).into_diagnostic()?;
    Ok((Arc::new(store.clone()), Arc::new(store.clone()), Arc::new(store)))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<&Path>) -> Result<Stores> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

/// Runs one checkout: create the order, then pay for it.
async fn checkout(
    api: &GatewayApi,
    credentials: &Credentials,
    row: CheckoutRow,
) -> std::result::Result<PaymentView, ApiError> {
    let order = api.create_order(credentials, row.order_request()).await?.body;
    let payment = api
        .create_payment(credentials, row.payment_request(&order.id))
        .await?
        .body;
    Ok(payment)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ProcessingConfig::from_env().into_diagnostic()?;
    if cli.test_mode {
        config.test_mode = true;
    }

    let random: SharedRandom = match cli.seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom),
    };

    let (merchants, orders, payments) = open_stores(cli.db_path.as_deref())?;
    let api = GatewayApi::new(merchants, orders, payments, random, config).into_diagnostic()?;

    let merchant = Merchant::new(
        TEST_MERCHANT_ID,
        TEST_MERCHANT_NAME,
        TEST_MERCHANT_EMAIL,
        TEST_API_KEY,
        TEST_API_SECRET,
    );
    api.register_merchant(merchant).await.into_diagnostic()?;

    let swept = api
        .sweep_stale_payments(Duration::from_secs(cli.sweep_after_secs))
        .await
        .into_diagnostic()?;
    if swept > 0 {
        info!(swept, "failed stale payments from a previous run");
    }

    let credentials = Arc::new(Credentials::new(TEST_API_KEY, TEST_API_SECRET));

    // Every checkout runs on its own task; results are collected in input order.
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CheckoutReader::new(file);
    let mut handles = Vec::new();
    for row_result in reader.checkouts() {
        match row_result {
            Ok(row) => {
                let api = api.clone();
                let credentials = Arc::clone(&credentials);
                handles.push(tokio::spawn(async move { checkout(&api, &credentials, row).await }));
            }
            Err(e) => {
                eprintln!("Error reading checkout: {}", e);
            }
        }
    }

    let mut settled = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await.into_diagnostic()? {
            Ok(payment) => settled.push(payment),
            Err(e) => eprintln!("Checkout rejected: {} ({})", e.code(), e.description()),
        }
    }

    let stdout = io::stdout();
    let mut writer = PaymentWriter::new(stdout.lock());
    writer.write_payments(&settled).into_diagnostic()?;

    Ok(())
}
