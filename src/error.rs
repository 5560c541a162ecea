use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

/// Every failure the gateway can report.
///
/// Instrument errors (`InvalidVpa`, `InvalidCard`, `ExpiredCard`) are raised before
/// a payment is persisted. A payment that fails during processing is not an error:
/// it is stored with status `failed` and returned normally.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Invalid API credentials")]
    Authentication,
    #[error("{0}")]
    BadRequest(String),
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("VPA format invalid")]
    InvalidVpa,
    #[error("Card validation failed")]
    InvalidCard,
    #[error("Card expiry date invalid")]
    ExpiredCard,
    #[error("Payment {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: &'static str,
        to: &'static str,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl PaymentError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(Box::new(std::io::Error::other(message.into())))
    }

    /// Stable machine-readable code surfaced in error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Authentication => "AUTHENTICATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST_ERROR",
            Self::NotFound { .. } => "NOT_FOUND_ERROR",
            Self::InvalidVpa => "INVALID_VPA",
            Self::InvalidCard => "INVALID_CARD",
            Self::ExpiredCard => "EXPIRED_CARD",
            Self::InvalidTransition { .. }
            | Self::Config(_)
            | Self::CsvError(_)
            | Self::IoError(_)
            | Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Human-readable description. Internal failures are masked.
    pub fn description(&self) -> String {
        match self {
            Self::InvalidTransition { .. }
            | Self::Config(_)
            | Self::CsvError(_)
            | Self::IoError(_)
            | Self::InternalError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// HTTP status an adapter should answer with.
    pub fn status(&self) -> u16 {
        match self {
            Self::Authentication => 401,
            Self::NotFound { .. } => 404,
            Self::BadRequest(_) | Self::InvalidVpa | Self::InvalidCard | Self::ExpiredCard => 400,
            _ => 500,
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for PaymentError {
    fn from(err: rocksdb::Error) -> Self {
        Self::InternalError(Box::new(err))
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        Self::InternalError(Box::new(err))
    }
}
